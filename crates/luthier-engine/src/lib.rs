//! # luthier-engine
//!
//! The Resource Aggregate & Translation Consistency Engine: the five
//! operations with real invariants behind a multi-tenant CMS backend.
//!
//! ## Current Features
//!
//! - **Aggregate Composer**: dependents-first, all-or-nothing creation
//!   of a resource and its SEO/content/tracking/slug/translation rows
//! - **Translation Reconciler**: query-once merge/create per language,
//!   backfill for languages enabled after the fact, retry-as-merge on
//!   the create-vs-create race
//! - **Hierarchical Tree Manager**: pure build/flatten/descendant
//!   functions over any `(id, parent_id)` node set, cycle-rejecting
//!   reparent guard
//! - **Cascading Cleanup**: dependency-safe, best-effort-isolated
//!   deletion of an aggregate and (for tree kinds) its whole subtree
//! - **Content Duplication**: order-renumbering deep copy with
//!   re-attached (not copied) file/slug associations
//!
//! ## Architecture
//!
//! ```text
//! luthier-engine
//! ├── compose   - aggregate composition + slug derivation/repair
//! ├── reconcile - translation reconciliation + backfill
//! ├── tree      - forest building, descendant queries, reparent guard
//! ├── cleanup   - cascading cleanup orchestrator
//! └── duplicate - content aggregate deep copy
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use luthier_engine::Engine;
//! use luthier_store::MemoryStore;
//!
//! let engine = Engine::new(MemoryStore::new());
//! let page = engine
//!     .compose_resource(ResourceKind::Page, request, &languages)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use luthier_store::Store;

// Public modules
pub mod associations;
pub mod cleanup;
pub mod clock;
pub mod compose;
pub mod duplicate;
pub mod error;
pub mod reconcile;
pub mod tree;

// Re-exports for convenient access
pub use cleanup::{AssetReleaser, NoopReleaser};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compose::ComposeRequest;
pub use duplicate::{DuplicationReport, DuplicationWarning};
pub use error::{EngineError, Result};
pub use tree::{TreeEntry, TreeNode};

/// The engine facade HTTP controllers call in-process
///
/// Holds the shared relational store, a clock for timestamping and the
/// asset releaser hook cleanup invokes for externally owned side
/// effects. The enabled-language snapshot is *not* held here: it is
/// passed into each call so reconciliation stays a deterministic
/// function of its inputs.
pub struct Engine<S> {
	store: S,
	clock: Arc<dyn Clock>,
	releaser: Arc<dyn AssetReleaser>,
}

impl<S: Store> Engine<S> {
	/// Create an engine with the system clock and a no-op asset releaser
	pub fn new(store: S) -> Self {
		Self {
			store,
			clock: Arc::new(SystemClock),
			releaser: Arc::new(NoopReleaser),
		}
	}

	/// Replace the clock (tests use `FixedClock`)
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Replace the asset releaser
	pub fn with_releaser(mut self, releaser: Arc<dyn AssetReleaser>) -> Self {
		self.releaser = releaser;
		self
	}

	/// The underlying store
	pub fn store(&self) -> &S {
		&self.store
	}

	pub(crate) fn clock(&self) -> &dyn Clock {
		self.clock.as_ref()
	}

	pub(crate) fn releaser(&self) -> &dyn AssetReleaser {
		self.releaser.as_ref()
	}
}

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::cleanup::{AssetReleaser, NoopReleaser};
	pub use crate::clock::{Clock, FixedClock, SystemClock};
	pub use crate::compose::ComposeRequest;
	pub use crate::duplicate::{DuplicationReport, DuplicationWarning};
	pub use crate::error::{EngineError, Result};
	pub use crate::tree::{TreeEntry, TreeNode};
	pub use crate::Engine;
}
