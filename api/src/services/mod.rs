pub mod auth;
pub mod documents;

pub use auth::{AuthService, LoginError, RegisterError};
pub use documents::{IngestError, IngestService};
