//! Users, their store and the account route handlers.

mod core;
mod handlers;

pub use core::{SQLiteUserStore, User, UserID, UserStore, create_user, create_user_table};
pub use handlers::{change_password, get_profile, log_in, log_out, register_user, update_profile};
