mod counter;
mod cursor;
mod event;
mod favorite;
mod friend;
mod participation;
mod party;
mod unit;
mod user;

pub use counter::*;
pub use cursor::*;
pub use event::*;
pub use favorite::*;
pub use friend::*;
pub use participation::*;
pub use party::*;
pub use unit::*;
pub use user::*;
