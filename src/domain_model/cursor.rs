//! Opaque pagination continuation tokens.
//!
//! A cursor wraps the keyset position of the last row handed out, tagged with the listing
//! it came from. Callers never look inside; the boundary only moves the bytes around as
//! base64url. An empty cursor means "first page" on the way in and "no more pages" on the
//! way out.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("cursor payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("cursor belongs to listing `{found}`, not `{expected}`")]
    ScopeMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PageCursor(Vec<u8>);

#[derive(Serialize, Deserialize)]
struct ScanPosition<K> {
    scope: String,
    after: K,
}

impl PageCursor {
    pub fn first() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Transport form. The empty cursor encodes to the empty string.
    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        URL_SAFE.encode(&self.0)
    }

    pub fn decode(s: &str) -> Result<Self, CursorError> {
        if s.is_empty() {
            return Ok(Self::first());
        }
        Ok(Self(URL_SAFE.decode(s)?))
    }

    pub fn at<K: Serialize>(scope: &str, after: &K) -> Result<Self, CursorError> {
        let position = ScanPosition {
            scope: scope.to_owned(),
            after,
        };
        Ok(Self(serde_json::to_vec(&position)?))
    }

    /// The key to resume after, or `None` for the first page.
    pub fn position<K: DeserializeOwned>(&self, scope: &str) -> Result<Option<K>, CursorError> {
        if self.0.is_empty() {
            return Ok(None);
        }
        let position: ScanPosition<K> = serde_json::from_slice(&self.0)?;
        if position.scope != scope {
            return Err(CursorError::ScopeMismatch {
                expected: scope.to_owned(),
                found: position.scope,
            });
        }
        Ok(Some(position.after))
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: PageCursor,
}

impl<T> Page<T> {
    /// Builds a page from a scan that fetched up to `limit + 1` rows. The extra row only
    /// proves that another page exists; it is not returned.
    pub fn from_overfetch<K, F>(
        mut rows: Vec<T>,
        limit: u16,
        scope: &str,
        key: F,
    ) -> Result<Self, CursorError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let limit = usize::from(limit);
        if rows.len() <= limit {
            return Ok(Self {
                items: rows,
                next: PageCursor::first(),
            });
        }

        rows.truncate(limit);
        let next = match rows.last() {
            Some(last) => PageCursor::at(scope, &key(last))?,
            None => PageCursor::first(),
        };
        Ok(Self { items: rows, next })
    }

    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor_is_the_first_page() {
        let cursor = PageCursor::decode("").unwrap();
        assert!(cursor.is_empty());
        assert_eq!(cursor.encode(), "");
        assert_eq!(cursor.position::<u32>("friends:a").unwrap(), None);
    }

    #[test]
    fn position_survives_transport() {
        let cursor = PageCursor::at("friends:a", &42u32).unwrap();
        let wire = cursor.encode();
        assert!(!wire.contains('+') && !wire.contains('/'));

        let decoded = PageCursor::decode(&wire).unwrap();
        assert_eq!(decoded, cursor);
        assert_eq!(decoded.position::<u32>("friends:a").unwrap(), Some(42));
    }

    #[test]
    fn cursor_from_another_listing_is_rejected() {
        let cursor = PageCursor::at("friends:a", &1u32).unwrap();
        let err = cursor.position::<u32>("requests:a").unwrap_err();
        assert!(matches!(err, CursorError::ScopeMismatch { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            PageCursor::decode("not base64!"),
            Err(CursorError::Encoding(_))
        ));

        let cursor = PageCursor::from_bytes(b"\x00\x01".to_vec());
        assert!(matches!(
            cursor.position::<u32>("friends:a"),
            Err(CursorError::Payload(_))
        ));
    }

    #[test]
    fn overfetch_decides_whether_another_page_exists() {
        let page = Page::from_overfetch(vec![1, 2, 3], 2, "s", |n| *n).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.next.position::<i32>("s").unwrap(), Some(2));

        let page = Page::from_overfetch(vec![1, 2], 2, "s", |n| *n).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.is_last());
    }
}
