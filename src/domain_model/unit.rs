use serde::Deserialize;

pub const MAX_PAGE_SIZE: u16 = 100;

/// Requested page size. Zero means "use the listing's default".
#[derive(Debug, Default, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PageSize(pub u16);

impl PageSize {
    pub fn resolve(self, default: u16) -> u16 {
        match self.0 {
            0 => default,
            n => n.min(MAX_PAGE_SIZE),
        }
    }
}
