//! User accounts, password handling and cookie sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{get_register_page, register_user};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub use user::get_user_by_email;
