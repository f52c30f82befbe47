//! Password hashing, session cookies and the middleware guarding authenticated routes.

mod cookie;
mod middleware;
mod password;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::{invalidate_auth_cookie, set_auth_cookie};
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};

#[cfg(test)]
pub(crate) use cookie::COOKIE_USER_ID;
