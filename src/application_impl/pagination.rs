use crate::application_port::RelationError;
use crate::domain_model::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One keyset-paginated read: where to resume and how many rows to ask the store for.
pub(crate) struct KeysetScan<K> {
    scope: String,
    pub after: Option<K>,
    limit: u16,
}

impl<K> KeysetScan<K>
where
    K: Serialize + DeserializeOwned,
{
    pub fn open(
        scope: String,
        cursor: &PageCursor,
        requested: PageSize,
        default_limit: u16,
    ) -> Result<Self, RelationError> {
        let after = cursor.position::<K>(&scope)?;
        Ok(Self {
            scope,
            after,
            limit: requested.resolve(default_limit),
        })
    }

    /// One row beyond the page, so the last page is recognised without another round-trip.
    pub fn fetch_limit(&self) -> u32 {
        u32::from(self.limit) + 1
    }

    pub fn finish<T>(self, rows: Vec<T>, key: impl Fn(&T) -> K) -> Result<Page<T>, RelationError> {
        Ok(Page::from_overfetch(rows, self.limit, &self.scope, key)?)
    }
}
