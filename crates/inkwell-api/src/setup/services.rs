//! Construction of the stores and external capabilities

use crate::services::{Capabilities, GenerationGateway, GenerationLimits};
use crate::state::AppState;
use anyhow::{Context, Result};
use inkwell_core::Config;
use inkwell_db::{CreationRepository, CreationStore, UsageLedger, UsageRepository};
use inkwell_providers::{
    ClipDropClient, ClipDropImageGenerator, CloudinaryClient, CloudinaryConfig,
    OpenAiCompatibleClient, PdfTextExtractor,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Build the production capabilities from configuration.
pub fn setup_capabilities(config: &Config) -> Result<Capabilities> {
    let timeout = config.external_call_timeout();

    let text = OpenAiCompatibleClient::new(
        config.llm_base_url().to_string(),
        config.llm_api_key().to_string(),
        config.llm_model().to_string(),
        timeout,
    )
    .context("Failed to create language model client")?;

    let cloudinary = Arc::new(
        CloudinaryClient::new(
            CloudinaryConfig {
                cloud_name: config.cloudinary_cloud_name().to_string(),
                api_key: config.cloudinary_api_key().to_string(),
                api_secret: config.cloudinary_api_secret().to_string(),
            },
            timeout,
        )
        .context("Failed to create Cloudinary client")?,
    );

    let clipdrop = ClipDropClient::new(config.clipdrop_api_key().to_string(), timeout)
        .context("Failed to create ClipDrop client")?;

    tracing::info!(
        llm_model = config.llm_model(),
        cloud_name = config.cloudinary_cloud_name(),
        timeout_secs = timeout.as_secs(),
        "External capabilities configured"
    );

    Ok(Capabilities {
        text: Arc::new(text),
        images: Arc::new(ClipDropImageGenerator::new(clipdrop, cloudinary.clone())),
        editor: cloudinary,
        documents: Arc::new(PdfTextExtractor::new()),
    })
}

/// Wire the gateway and application state over Postgres.
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let capabilities = setup_capabilities(config)?;
    let ledger: Arc<dyn UsageLedger> = Arc::new(UsageRepository::new(pool.clone()));
    let creations: Arc<dyn CreationStore> = Arc::new(CreationRepository::new(pool));

    let gateway = GenerationGateway::new(
        capabilities,
        ledger,
        creations.clone(),
        GenerationLimits::from_config(config),
    );

    Ok(Arc::new(AppState::new(Arc::new(gateway), creations)))
}
