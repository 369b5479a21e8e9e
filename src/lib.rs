pub mod api;
pub mod authz;
pub mod errors;
pub mod guard;
pub mod models;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod toast;
pub mod token;

// Re-export commonly used items for tests and the CLI
pub use authz::{DefaultEvaluator, PermissionEvaluator, ProfileRegistry, Role};
pub use errors::{AppError, AppResult};
pub use models::SessionUser;
pub use session::{SessionManager, SessionStore};
pub use toast::ToastQueue;
pub use token::TokenStore;
