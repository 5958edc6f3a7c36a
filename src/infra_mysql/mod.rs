mod favorite_party_repo_mysql;
mod friend_relation_repo_mysql;
mod outbox_repo_mysql;
mod party_participation_repo_mysql;

pub use favorite_party_repo_mysql::*;
pub use friend_relation_repo_mysql::*;
pub use outbox_repo_mysql::*;
pub use party_participation_repo_mysql::*;

mod repo_tx_mysql;

pub use repo_tx_mysql::*;

mod util;
