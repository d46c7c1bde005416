//! Resource model and per-kind capability matrix

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// The typed resource kinds a workspace can contain
///
/// The capability matrix below decides which dependent sub-records the
/// aggregate composer materializes for a kind, and which kinds form a
/// parent/child hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	/// A site page with the full aggregate
	Page,
	/// An article with the full aggregate
	Article,
	/// A portfolio project with the full aggregate
	Project,
	/// An event with the full aggregate
	Event,
	/// A council directory entry (tracking only)
	Council,
	/// A contact directory entry (tracking only)
	Contact,
	/// A tree-forming document library node
	Library,
	/// A tree-forming media folder
	MediaFolder,
	/// A tree-forming navigation item, addressable by slug
	MenuItem,
	/// A reusable page template with the full aggregate
	Template,
}

impl ResourceKind {
	/// Kinds carrying an SEO record
	pub fn owns_seo(&self) -> bool {
		matches!(
			self,
			Self::Page | Self::Article | Self::Project | Self::Event | Self::Template
		)
	}

	/// Kinds carrying a rich-content container
	pub fn owns_content(&self) -> bool {
		matches!(
			self,
			Self::Page | Self::Article | Self::Project | Self::Event | Self::Template
		)
	}

	/// Kinds carrying a visit-tracking counter
	pub fn owns_tracking(&self) -> bool {
		matches!(
			self,
			Self::Page
				| Self::Article
				| Self::Project
				| Self::Event
				| Self::Template
				| Self::Council
				| Self::Contact
		)
	}

	/// Kinds addressable by a pretty URL slug
	///
	/// Menu items carry one too: their path derives from the parent
	/// item's slug plus the kind discriminator.
	pub fn owns_slug(&self) -> bool {
		matches!(
			self,
			Self::Page
				| Self::Article
				| Self::Project
				| Self::Event
				| Self::Template
				| Self::MenuItem
		)
	}

	/// Every kind declares per-language translations
	pub fn is_translatable(&self) -> bool {
		true
	}

	/// Kinds forming a self-referencing parent/child forest
	pub fn is_tree(&self) -> bool {
		matches!(self, Self::Library | Self::MediaFolder | Self::MenuItem)
	}

	/// Stable string form used for persistence and slug discriminators
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Page => "page",
			Self::Article => "article",
			Self::Project => "project",
			Self::Event => "event",
			Self::Council => "council",
			Self::Contact => "contact",
			Self::Library => "library",
			Self::MediaFolder => "media_folder",
			Self::MenuItem => "menu_item",
			Self::Template => "template",
		}
	}
}

impl std::str::FromStr for ResourceKind {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"page" => Ok(Self::Page),
			"article" => Ok(Self::Article),
			"project" => Ok(Self::Project),
			"event" => Ok(Self::Event),
			"council" => Ok(Self::Council),
			"contact" => Ok(Self::Contact),
			"library" => Ok(Self::Library),
			"media_folder" => Ok(Self::MediaFolder),
			"menu_item" => Ok(Self::MenuItem),
			"template" => Ok(Self::Template),
			other => Err(CoreError::UnknownKind(other.to_string())),
		}
	}
}

impl std::fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A top-level CMS entity scoped to a workspace
///
/// Dependent-id columns are nullable-until-set: they are populated in the
/// same atomic write that creates the dependents, so a persisted resource
/// never references a row that does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
	/// Opaque resource id (client-generated v4)
	pub id: Uuid,

	/// Resource kind
	pub kind: ResourceKind,

	/// Owning workspace; `None` for global resources
	pub workspace_id: Option<Uuid>,

	/// Parent node for tree kinds; always `None` otherwise
	pub parent_id: Option<Uuid>,

	/// Owned SEO record
	pub seo_id: Option<Uuid>,

	/// Owned content container
	pub content_id: Option<Uuid>,

	/// Owned visit-tracking counter
	pub tracking_id: Option<Uuid>,

	/// Owned URL slug
	pub slug_id: Option<Uuid>,

	/// Creating user
	pub created_by: Option<Uuid>,

	/// Last updating user
	pub updated_by: Option<Uuid>,

	/// Creation timestamp
	pub created_at: DateTime<Utc>,

	/// Last update timestamp
	pub updated_at: DateTime<Utc>,
}

impl Resource {
	/// The ids of every owned one-to-one dependent that is set
	pub fn dependent_ids(&self) -> Vec<Uuid> {
		[self.seo_id, self.content_id, self.tracking_id, self.slug_id]
			.into_iter()
			.flatten()
			.collect()
	}
}
