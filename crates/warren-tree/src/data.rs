//! The interning data table.
//!
//! Caller-supplied `(key, value)` pairs live here for the tree's lifetime.
//! Keys are opaque byte strings (typically a content hash of the value);
//! the insertion-ordered map index doubles as the [`KeyId`], so byte-equal
//! keys always resolve to the same identity and record comparison reduces
//! to id comparison. Values are released all at once when the table drops.

use indexmap::IndexMap;

use warren_core::KeyId;

/// Interning store for data values keyed by opaque bytes.
pub struct DataTable<V> {
    entries: IndexMap<Box<[u8]>, V>,
}

impl<V> DataTable<V> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Intern `(key, value)` and return the key's identity.
    ///
    /// Interning an already-present key returns the existing identity and
    /// keeps the first value; two logical inserts of the same key resolve
    /// to the same interned value.
    pub fn intern(&mut self, key: &[u8], value: V) -> KeyId {
        if let Some(index) = self.entries.get_index_of(key) {
            return KeyId(index as u32);
        }
        let (index, _) = self.entries.insert_full(key.into(), value);
        KeyId(index as u32)
    }

    /// The value interned under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this table.
    pub fn value(&self, id: KeyId) -> &V {
        self.entries
            .get_index(id.0 as usize)
            .map(|(_, v)| v)
            .expect("key ids are only minted by intern")
    }

    /// The key bytes interned under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this table.
    pub fn key(&self, id: KeyId) -> &[u8] {
        self.entries
            .get_index(id.0 as usize)
            .map(|(k, _)| k.as_ref())
            .expect("key ids are only minted by intern")
    }

    /// Look a value up by its key bytes.
    pub fn lookup(&self, key: &[u8]) -> Option<&V> {
        self.entries.get(key)
    }

    /// Number of distinct interned keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for DataTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
