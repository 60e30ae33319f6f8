//! Blob store adapters.
//!
//! Both stores are capacity-constrained and reject over-budget writes with
//! `StoreError::CapacityExceeded`; eviction policy belongs to the consumer,
//! not the store.

pub mod disk_store;
pub mod memory_store;

pub use disk_store::{DEFAULT_STORE_CAPACITY, DiskBlobStore};
pub use memory_store::MemoryBlobStore;
