pub mod middleware;
pub mod models;
pub mod session;

pub use middleware::auth_middleware;
pub use models::{AuthContext, SessionClaims};
pub use session::SessionVerifier;
