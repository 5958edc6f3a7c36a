mod counter_store_memory;
mod database;
mod favorite_party_repo_memory;
mod friend_relation_repo_memory;
mod outbox_repo_memory;
mod party_participation_repo_memory;

pub use counter_store_memory::*;
pub use database::{MemoryDatabase, MemoryTx, MemoryTxManager};
pub use favorite_party_repo_memory::*;
pub use friend_relation_repo_memory::*;
pub use outbox_repo_memory::*;
pub use party_participation_repo_memory::*;
