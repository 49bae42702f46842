//! Short tokens standing in for long artist/album names inside action ids.
//!
//! Action identifiers have a hard length ceiling, so any value that could
//! push one over it is replaced by a derived token:
//!
//! - short values without `:` that don't start with `#` are their own token
//!   and nothing is stored;
//! - everything else becomes `#` + the first `token_len` hex characters of
//!   its SHA-256, and the mapping is remembered.
//!
//! Two values sharing a derived token resolve last-write-wins. The cache is
//! a bounded LRU; once an entry is evicted, [`TokenCache::get`] falls back to
//! returning the token itself.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::config::NavigationConfig;

/// Marks a derived token. Raw values never start with it.
pub const TOKEN_SIGIL: char = '#';

/// Process-lifetime token → value map
pub struct TokenCache {
    entries: Mutex<LruCache<String, String>>,
    raw_max_len: usize,
    token_len: usize,
}

impl TokenCache {
    pub fn new(capacity: usize, raw_max_len: usize, token_len: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            raw_max_len,
            token_len: token_len.clamp(1, 64),
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(
            config.token_cache_capacity,
            config.raw_token_max_len,
            config.token_len,
        )
    }

    /// Token for `value`, remembering the mapping when one is derived.
    pub fn put(&self, value: &str) -> String {
        if self.is_raw(value) {
            return value.to_string();
        }

        let token = self.derive(value);
        let previous = self.entries.lock().put(token.clone(), value.to_string());
        if let Some(previous) = previous
            && previous != value
        {
            tracing::warn!("Token {} reassigned from {:?} to {:?}", token, previous, value);
        }
        token
    }

    /// Value behind `token`, or the token itself when nothing is stored.
    pub fn get(&self, token: &str) -> String {
        self.entries
            .lock()
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether `value` can travel in an action id unchanged.
    pub fn is_raw(&self, value: &str) -> bool {
        value.len() <= self.raw_max_len
            && !value.contains(':')
            && !value.starts_with(TOKEN_SIGIL)
    }

    fn derive(&self, value: &str) -> String {
        let digest = format!("{:x}", Sha256::digest(value.as_bytes()));
        format!("{}{}", TOKEN_SIGIL, &digest[..self.token_len])
    }
}
