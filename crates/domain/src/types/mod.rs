//! Domain data types

pub mod catalog;
pub mod message;
pub mod state;
pub mod stream;

pub use catalog::{Catalog, CatalogEntry, MetadataEntry};
pub use message::TapMessage;
pub use state::TapState;
pub use stream::{ReplicationMethod, StreamDef, SyncMode};
