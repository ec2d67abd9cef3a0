pub mod auth_log;
pub mod user;

pub use auth_log::AuthLogRow;
pub use user::{NewUser, UserRow, UserUpdate, clamp_balance};
