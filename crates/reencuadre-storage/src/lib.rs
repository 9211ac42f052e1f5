// crates/reencuadre-storage/src/lib.rs
pub mod error;
pub mod identity;
pub mod memory;
pub mod sled_store;

pub use error::StoreError;
pub use identity::{resolve_owner, Identity, IdentityProvider, IdentitySource, SledIdentityProvider};
pub use memory::MemoryHistoryStore;
pub use sled_store::SledHistoryStore;
