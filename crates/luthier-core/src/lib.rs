//! # luthier-core
//!
//! Domain model for the Luthier CMS core: typed resources scoped to
//! workspaces, their dependent sub-records (SEO, content, tracking,
//! slugs, per-language translations) and the shared error taxonomy.
//!
//! ## Current Features
//!
//! - `Resource` model with a per-kind capability matrix (`ResourceKind`)
//! - Sub-record models: `SeoRecord`, `Content`/`ContentItem`,
//!   `TrackingRecord`, `Slug`, `Translation`
//! - `Language` registry snapshot passed explicitly into every operation
//! - Error taxonomy distinguishing integrity violations from partial
//!   aggregate failures
//!
//! ## Quick Start
//!
//! ```rust
//! use luthier_core::{Language, LanguageRegistry, ResourceKind};
//! use uuid::Uuid;
//!
//! let languages = LanguageRegistry::new(vec![
//!     Language::new(Uuid::new_v4(), "en", true),
//!     Language::new(Uuid::new_v4(), "fr", false),
//! ]);
//!
//! assert_eq!(languages.len(), 2);
//! assert!(ResourceKind::Library.is_tree());
//! assert!(ResourceKind::Article.owns_content());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

// Public modules
pub mod error;
pub mod language;
pub mod records;
pub mod resource;

// Re-exports for convenient access
pub use error::{CoreError, IntegrityViolation, Result};
pub use language::{Language, LanguageRegistry};
pub use records::{
	Attachment, AttachmentKind, Content, ContentItem, ItemState, SeoRecord, Slug, TrackingRecord,
	Translation,
};
pub use resource::{Resource, ResourceKind};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::error::{CoreError, IntegrityViolation, Result};
	pub use crate::language::{Language, LanguageRegistry};
	pub use crate::records::{
		Attachment, AttachmentKind, Content, ContentItem, ItemState, SeoRecord, Slug,
		TrackingRecord, Translation,
	};
	pub use crate::resource::{Resource, ResourceKind};
}
