//! Store errors and the shared constraint names

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by a `Store`
#[derive(Debug, Error)]
pub enum StoreError {
	/// A uniqueness constraint rejected a write
	///
	/// `constraint` names the violated constraint so callers can
	/// distinguish the translation race from a slug collision.
	#[error("Uniqueness conflict on {constraint}")]
	Conflict {
		/// Name of the violated constraint
		constraint: String,
	},

	/// Entity lookup came back empty where a row was required
	#[error("{entity} not found: {id}")]
	NotFound {
		/// What was looked up ("translation", "slug", ...)
		entity: &'static str,
		/// The id that did not resolve
		id: Uuid,
	},

	/// Backend failure (connection, SQL, serialization)
	#[error("Store backend error: {0}")]
	Backend(String),
}

impl StoreError {
	/// Whether this error is a uniqueness conflict on the given constraint
	pub fn is_conflict_on(&self, name: &str) -> bool {
		matches!(self, Self::Conflict { constraint } if constraint == name)
	}
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Constraint names shared by every backend
pub mod constraints {
	/// Unique `(owner_id, language_id)` on translations
	pub const TRANSLATION_OWNER_LANGUAGE: &str = "translations_owner_language";

	/// Unique `(workspace_id, path)` on derived slugs
	pub const SLUG_WORKSPACE_PATH: &str = "slugs_workspace_path";
}
