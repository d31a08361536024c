//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod draft;
pub mod memory;
pub mod pocketbase;

pub use draft::FileDraftStore;
pub use memory::{InMemoryDraftStore, InMemoryRecordStore};
pub use pocketbase::{PocketBaseClient, PocketBaseConfig};
