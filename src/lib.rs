//! # Luthier
//!
//! Multi-tenant CMS backend core: the Resource Aggregate & Translation
//! Consistency Engine behind workspaces of typed resources (pages,
//! articles, projects, events, councils, contacts, libraries, media
//! folders, menu items, templates).
//!
//! The engine owns the one piece with real invariants:
//!
//! - atomic assembly of a resource's dependent sub-records on creation
//! - complete, in-sync per-language translation rows as languages come
//!   and go
//! - cycle-free parent/child forests for tree-shaped resources
//! - cascading, orphan-free deletion of whole aggregates and subtrees
//! - order-preserving deep copies of content aggregates
//!
//! HTTP routing, form rendering, auth and UI are external collaborators
//! that call into this crate in-process.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - Postgres-backed store via sqlx + sea-query;
//!   the in-memory store is always available
//!
//! ## Quick Start
//!
//! ```rust
//! use luthier::engine::Engine;
//! use luthier::store::MemoryStore;
//!
//! let engine = Engine::new(MemoryStore::new());
//! # let _ = engine;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub use luthier_core as core;
pub use luthier_engine as engine;
pub use luthier_store as store;

/// Prelude module for convenient imports
pub mod prelude {
	pub use luthier_core::prelude::*;
	pub use luthier_engine::prelude::*;
	pub use luthier_store::prelude::*;

	// Both core and engine export a `Result` alias; the engine's is
	// the one callers of this facade want
	pub use luthier_engine::error::Result;
}
