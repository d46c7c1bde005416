//! # luthier-store
//!
//! Persistence seam for the Luthier CMS core. The engine talks to a
//! `Store`: reads are individual round-trips, writes go through an
//! atomically applied `WriteBatch`. Because all row ids are
//! client-generated, a whole aggregate (dependents first, then the owner
//! row referencing them) is known up front and submits as one batch —
//! a transaction in the Postgres store, a single all-or-nothing splice
//! in the in-memory store.
//!
//! Uniqueness constraints (`(owner_id, language_id)` on translations,
//! `(workspace_id, path)` on derived slugs) surface as typed
//! `StoreError::Conflict` values so callers can retry-as-merge instead
//! of taking an application-level lock.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

// Public modules
pub mod batch;
pub mod error;
pub mod memory;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports for convenient access
pub use batch::{WriteBatch, WriteOp};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::Store;

#[cfg(feature = "postgres")]
pub use postgres::{PgStore, PgStoreConfig};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::batch::{WriteBatch, WriteOp};
	pub use crate::error::{StoreError, StoreResult};
	pub use crate::memory::MemoryStore;
	pub use crate::store::Store;

	#[cfg(feature = "postgres")]
	pub use crate::postgres::{PgStore, PgStoreConfig};
}
