//! Free-tier quota under concurrent submission.
//!
//! Run with: `cargo test -p inkwell-api --test concurrency_test`

mod helpers;

use helpers::setup_test_app;
use inkwell_api::auth::AuthContext;
use inkwell_api::services::generation::ArticleRequest;
use inkwell_api::services::GenerationRequest;
use inkwell_core::constants::FREE_USAGE_LIMIT;
use inkwell_core::models::Plan;
use inkwell_core::AppError;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_exceed_free_limit() {
    let app = setup_test_app();
    // Keep requests in flight long enough to overlap.
    app.text.set_delay(Some(Duration::from_millis(20)));

    let auth = AuthContext {
        user_id: "user_racing".to_string(),
        plan: Plan::Free,
    };

    let mut tasks = JoinSet::new();
    for i in 0..25 {
        let gateway = app.gateway.clone();
        let auth = auth.clone();
        tasks.spawn(async move {
            let request = GenerationRequest::Article(ArticleRequest {
                prompt: Some(format!("Article {}", i)),
                length: Some(100),
            });
            gateway.generate(&auth, request).await
        });
    }

    let mut succeeded = 0;
    let mut limited = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::UsageLimitExceeded { .. }) => limited += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, FREE_USAGE_LIMIT as usize);
    assert_eq!(limited, 25 - FREE_USAGE_LIMIT as usize);
    assert_eq!(app.ledger.free_usage_of("user_racing"), FREE_USAGE_LIMIT);
    assert_eq!(app.ledger.reserved_of("user_racing"), 0);
    assert_eq!(app.creations.len(), FREE_USAGE_LIMIT as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_requests_return_their_slots() {
    let app = setup_test_app();
    app.text.set_failing(true);

    let auth = AuthContext {
        user_id: "user_unlucky".to_string(),
        plan: Plan::Free,
    };

    let mut tasks = JoinSet::new();
    for _ in 0..15 {
        let gateway = app.gateway.clone();
        let auth = auth.clone();
        tasks.spawn(async move {
            let request = GenerationRequest::Article(ArticleRequest {
                prompt: Some("Write about oceans".to_string()),
                length: Some(100),
            });
            gateway.generate(&auth, request).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().is_err());
    }

    assert_eq!(app.ledger.free_usage_of("user_unlucky"), 0);
    assert_eq!(app.ledger.reserved_of("user_unlucky"), 0);
    assert!(app.creations.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abandoned_request_does_not_leak_its_slot() {
    let app = setup_test_app();
    app.ledger.set_free_usage("user_leaving", 9);
    app.text.set_delay(Some(Duration::from_millis(300)));

    let auth = AuthContext {
        user_id: "user_leaving".to_string(),
        plan: Plan::Free,
    };
    let request = GenerationRequest::Article(ArticleRequest {
        prompt: Some("Write about oceans".to_string()),
        length: Some(100),
    });

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), app.gateway.generate(&auth, request)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;

    // The generation ran to completion and was charged exactly once.
    assert_eq!(app.ledger.reserved_of("user_leaving"), 0);
    assert_eq!(app.ledger.free_usage_of("user_leaving"), FREE_USAGE_LIMIT);
    assert_eq!(app.creations.len(), 1);

    app.text.set_delay(None);
    let next = app
        .gateway
        .generate(
            &auth,
            GenerationRequest::Article(ArticleRequest {
                prompt: Some("Write about rivers".to_string()),
                length: Some(100),
            }),
        )
        .await;
    assert!(matches!(
        next,
        Err(AppError::UsageLimitExceeded { used: 10, limit: 10 })
    ));
}
