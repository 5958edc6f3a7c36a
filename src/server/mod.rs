mod event_bus_memory;
mod event_consumer_impl;
mod event_handler_impl;
mod event_publisher_impl;
mod invite_reaper;
mod notifier;
mod port;
mod server;

pub use event_bus_memory::*;
pub use event_consumer_impl::*;
pub use event_handler_impl::*;
pub use event_publisher_impl::*;
pub use invite_reaper::*;
pub use notifier::*;
pub use port::*;
pub use server::*;
