mod counter_projector;
mod favorite_service_impl;
mod friend_service_impl;
mod outbox;
mod pagination;
mod participation_service_impl;

pub use counter_projector::*;
pub use favorite_service_impl::*;
pub use friend_service_impl::*;
pub use participation_service_impl::*;
