mod favorite_service;
mod friend_service;
mod participation_service;
mod relation_error;

pub use favorite_service::*;
pub use friend_service::*;
pub use participation_service::*;
pub use relation_error::*;
