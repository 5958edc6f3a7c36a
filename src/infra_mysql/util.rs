use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

pub fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> anyhow::Result<&'a mut MySqlTx<'t>> {
    if tx.backend() != StoreBackend::MySql {
        anyhow::bail!(
            "mysql repository handed a {:?} transaction",
            tx.backend()
        );
    }

    // SAFETY: `MySqlTx` is the only `StorageTx` reporting `StoreBackend::MySql`.
    unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MySqlTx<'t>;
        Ok(&mut *p)
    }
}

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}
