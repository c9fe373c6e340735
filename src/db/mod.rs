pub mod postgres;
pub mod store;

pub use postgres::{create_pool, PgStore};
pub use store::{CourseStore, GroupStore, MentorStore, PostStore, UserStore};
