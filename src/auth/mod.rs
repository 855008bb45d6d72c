pub mod extract;
pub mod password;
pub mod session;

pub use extract::{CurrentUser, LoginRedirect};
pub use session::{SessionKeys, SESSION_COOKIE};
