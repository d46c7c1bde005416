//! Enabled-language registry snapshot
//!
//! The set of enabled languages can grow over a resource's lifetime, so
//! every reconciliation/backfill takes an explicit, request-scoped
//! snapshot instead of reading ambient global state. This keeps both
//! operations deterministic functions of their inputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An enabled language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
	/// Language id
	pub id: Uuid,

	/// ISO-style language code ("en", "fr", ...)
	pub code: String,

	/// Whether this is the workspace default language
	pub default: bool,
}

impl Language {
	/// Create a language entry
	pub fn new(id: Uuid, code: impl Into<String>, default: bool) -> Self {
		Self {
			id,
			code: code.into(),
			default,
		}
	}
}

/// Read-mostly snapshot of the enabled languages
///
/// # Example
/// ```
/// use luthier_core::{Language, LanguageRegistry};
/// use uuid::Uuid;
///
/// let en = Uuid::new_v4();
/// let registry = LanguageRegistry::new(vec![Language::new(en, "en", true)]);
///
/// assert!(registry.contains(en));
/// assert_eq!(registry.default_language().map(|l| l.code.as_str()), Some("en"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
	languages: Vec<Language>,
}

impl LanguageRegistry {
	/// Create a registry from the currently enabled languages
	pub fn new(languages: Vec<Language>) -> Self {
		Self { languages }
	}

	/// Whether a language id is currently enabled
	pub fn contains(&self, id: Uuid) -> bool {
		self.languages.iter().any(|l| l.id == id)
	}

	/// Look up a language by id
	pub fn get(&self, id: Uuid) -> Option<&Language> {
		self.languages.iter().find(|l| l.id == id)
	}

	/// Look up a language by code
	pub fn by_code(&self, code: &str) -> Option<&Language> {
		self.languages.iter().find(|l| l.code == code)
	}

	/// The workspace default language, if one is flagged
	pub fn default_language(&self) -> Option<&Language> {
		self.languages.iter().find(|l| l.default)
	}

	/// Iterate over the enabled languages
	pub fn iter(&self) -> impl Iterator<Item = &Language> {
		self.languages.iter()
	}

	/// Iterate over the enabled language ids
	pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
		self.languages.iter().map(|l| l.id)
	}

	/// Number of enabled languages
	pub fn len(&self) -> usize {
		self.languages.len()
	}

	/// Whether the registry is empty
	pub fn is_empty(&self) -> bool {
		self.languages.is_empty()
	}
}
