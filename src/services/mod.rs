pub mod database;
pub mod users;

pub use database::MongoDb;
pub use users::UserService;
