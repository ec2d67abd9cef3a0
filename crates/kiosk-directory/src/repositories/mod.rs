pub mod auth_log;
pub mod user;

pub use auth_log::{AuthLogRepository, RestAuthLog};
pub use user::{CardLookup, RestUserDirectory, UserRepository};
