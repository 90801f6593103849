//! Access grants: which privilege label a caller holds.

use sigil_foundation::Result;

/// Durable table of `caller id -> privilege label` grants.
///
/// The access policy never reads this table directly; grant-backed access
/// predicates do, once per dispatch.
pub trait GrantStore: Send + Sync {
    /// Returns the label granted to `caller_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn grant(&self, caller_id: &str) -> Result<Option<String>>;

    /// Grants `label` to `caller_id`, replacing any previous grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn put_grant(&self, caller_id: &str, label: &str) -> Result<()>;

    /// Removes the grant for `caller_id`. Returns true if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn revoke(&self, caller_id: &str) -> Result<bool>;

    /// Returns all grants ordered by caller id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn grants(&self) -> Result<Vec<(String, String)>>;
}
