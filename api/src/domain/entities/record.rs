//! Record contract shared by every persisted entity

use uuid::Uuid;

/// A persisted entity with store-assigned identity
///
/// `id` and `guid` are assigned once by `Repository::create` and never change
/// afterwards; everything else on the record is mutable domain data.
pub trait Record: Clone + Send + Sync + 'static {
    /// Display name of the entity kind, used in handler messages
    const ENTITY: &'static str;

    fn id(&self) -> i32;

    fn guid(&self) -> Uuid;

    /// Called by the repository when the record is first staged
    fn assign_identity(&mut self, id: i32, guid: Uuid);

    /// Name matched by `Lookup::Name`, if the record carries one
    fn lookup_name(&self) -> Option<&str> {
        None
    }

    /// Id of the owning record, matched by `Lookup::Parent`
    fn parent_id(&self) -> Option<i32> {
        None
    }
}

/// A record whose `lookup_name` must be unique after normalization
pub trait Named: Record {}

/// Normalize a name for uniqueness comparisons (trimmed, case-folded)
///
/// The stored value is only trimmed; this form is never persisted.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
