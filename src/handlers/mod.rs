pub mod health;
pub mod users;

pub use health::health_check;
pub use users::{delete_user, get_user, register_user, update_user};
