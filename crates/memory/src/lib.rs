//! # Chessmind Memory
//!
//! Working memory for agent players, keyed by (game, player).
//!
//! ## Components
//!
//! - `MemoryRecord` - The strategic notes blob and its template
//! - `MemoryStore` - Persistence port
//! - `FileMemoryStore` - Markdown files on disk, survives restarts
//! - `InMemoryMemoryStore` - Process-local store for tests and spectating

mod file_store;
mod in_memory;
mod record;
mod store;

pub use file_store::FileMemoryStore;
pub use in_memory::InMemoryMemoryStore;
pub use record::{MemoryRecord, MEMORY_SECTIONS, MEMORY_TEMPLATE};
pub use store::{MemoryStore, StoreError};
