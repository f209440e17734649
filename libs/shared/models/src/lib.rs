pub mod auth;
pub mod error;
pub mod session;
pub mod user;

pub use auth::{AuthResponse, AuthUser};
pub use error::LoadTestError;
pub use session::{Role, SessionState};
pub use user::SyntheticUser;
