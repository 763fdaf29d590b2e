pub mod entity;
pub mod invariants;

pub use entity::{CatalogEntry, EntryRecord};
pub use invariants::validate_entry;
