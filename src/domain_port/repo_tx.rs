/// Which adapter a transaction belongs to. Repositories check this before touching the
/// adapter-specific connection behind a `StorageTx`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// An atomic batch. Dropping it without `commit` discards every statement issued through it.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    fn backend(&self) -> StoreBackend;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
