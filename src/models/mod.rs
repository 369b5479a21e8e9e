pub mod user;

pub use user::{AuthResponse, LoginRequest, SessionUser, SignupRequest, UserStatus};
