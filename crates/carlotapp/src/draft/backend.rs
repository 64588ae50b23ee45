use crate::error::Result;

/// Abstract interface for the durable client-side key-value store.
///
/// String keys, string values, synchronous, surviving restarts until a key
/// is explicitly removed. This trait handles the "where" (disk vs memory);
/// [`super::DraftStore`] handles the "what" (draft encoding, corruption,
/// revisions).
///
/// All methods take `&self`: implementations use interior mutability or are
/// stateless I/O.
pub trait KvBackend {
    /// Read a value. Returns `Ok(None)` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    /// MUST be atomic so a crash never leaves a half-written draft.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KvBackend + ?Sized> KvBackend for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
