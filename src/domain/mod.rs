pub mod article;
pub mod filter;
pub mod user;

pub use article::{Article, NewsResponse};
pub use filter::FilterSet;
pub use user::UserId;
