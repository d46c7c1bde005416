//! Shared error taxonomy

use thiserror::Error;
use uuid::Uuid;

/// Integrity violations are rejected before any write and are never
/// auto-corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
	/// Reparenting a node under itself or one of its descendants
	#[error("Cycle attempt: cannot place {node} under {new_parent}")]
	CycleAttempt {
		/// The node being reparented
		node: Uuid,
		/// The rejected parent
		new_parent: Uuid,
	},

	/// A second translation row for the same (owner, language) pair
	#[error("Duplicate translation for owner {owner} and language {language}")]
	DuplicateTranslation {
		/// The owning translatable entity
		owner: Uuid,
		/// The doubly-covered language
		language: Uuid,
	},

	/// A slug path already taken within the workspace scope
	#[error("Slug path collision in workspace {workspace:?}: {path}")]
	SlugCollision {
		/// Workspace scope of the collision; `None` for global
		workspace: Option<Uuid>,
		/// The contested path
		path: String,
	},
}

/// Errors shared across the Luthier crates
#[derive(Debug, Error)]
pub enum CoreError {
	/// A structured validation failure, rejected before any write
	#[error(transparent)]
	Integrity(#[from] IntegrityViolation),

	/// Resource kind string did not match any known kind
	#[error("Unknown resource kind: {0}")]
	UnknownKind(String),

	/// Entity lookup came back empty
	#[error("{entity} not found: {id}")]
	NotFound {
		/// What was looked up ("resource", "content", ...)
		entity: &'static str,
		/// The id that did not resolve
		id: Uuid,
	},
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
