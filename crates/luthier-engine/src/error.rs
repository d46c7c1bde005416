//! Engine error taxonomy

use luthier_core::{IntegrityViolation, ResourceKind};
use luthier_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by engine operations
///
/// Integrity violations and partial aggregate failures propagate to the
/// caller as typed values; orphan handling and non-fatal slug derivation
/// failures are absorbed internally and never appear here.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Structured validation failure, rejected before any write
	#[error(transparent)]
	Integrity(#[from] IntegrityViolation),

	/// Aggregate composition failed; nothing was persisted
	#[error("Partial aggregate failure composing {kind}: {reason}")]
	PartialAggregate {
		/// Kind of the resource that failed to compose
		kind: ResourceKind,
		/// The underlying store failure
		reason: String,
	},

	/// One or more cleanup steps failed; the rest were still attempted
	#[error("Cleanup of {resource} incomplete: {} step(s) failed", failures.len())]
	CleanupIncomplete {
		/// The aggregate whose cleanup was incomplete
		resource: Uuid,
		/// One entry per failed step
		failures: Vec<String>,
	},

	/// Entity lookup came back empty
	#[error("{entity} not found: {id}")]
	NotFound {
		/// What was looked up ("resource", "content", ...)
		entity: &'static str,
		/// The id that did not resolve
		id: Uuid,
	},

	/// Store failure outside the typed conflict paths
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
