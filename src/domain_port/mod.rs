// store

mod counter_store;

pub use counter_store::*;

// repo

mod favorite_party_repo;
mod friend_relation_repo;
mod outbox_repo;
mod party_participation_repo;

mod conditional_write;
mod repo_tx;

pub use favorite_party_repo::*;
pub use friend_relation_repo::*;
pub use outbox_repo::*;
pub use party_participation_repo::*;

pub use conditional_write::*;
pub use repo_tx::*;
