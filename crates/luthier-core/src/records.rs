//! Dependent sub-record models
//!
//! These rows only ever exist as part of a resource aggregate: they are
//! created together with their owner and removed by the cascading
//! cleanup. Translations are unified behind a single row shape keyed by
//! `(owner_id, language_id)` so categories, content items, contacts and
//! tree nodes all reconcile through the same code path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A per-language translation row
///
/// Invariant: unique per `(owner_id, language_id)` — the store enforces
/// this with a uniqueness constraint, which is what resolves concurrent
/// create-vs-create races (the loser retries as a merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
	/// Row id
	pub id: Uuid,

	/// Owning translatable entity (resource or content item)
	pub owner_id: Uuid,

	/// Language this row localizes for
	pub language_id: Uuid,

	/// Localized fields (title, description, props, ...)
	pub fields: JsonValue,

	/// Creation timestamp
	pub created_at: DateTime<Utc>,

	/// Last update timestamp
	pub updated_at: DateTime<Utc>,
}

impl Translation {
	/// An empty translation row, as created by the backfill pass
	pub fn empty(owner_id: Uuid, language_id: Uuid, now: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4(),
			owner_id,
			language_id,
			fields: JsonValue::Object(Default::default()),
			created_at: now,
			updated_at: now,
		}
	}

	/// Merge incoming localized fields into this row
	///
	/// Incoming keys overwrite existing ones; keys absent from the
	/// payload are left untouched. Non-object payloads replace the
	/// fields blob wholesale.
	pub fn merge_fields(&mut self, incoming: &JsonValue, now: DateTime<Utc>) {
		match (&mut self.fields, incoming) {
			(JsonValue::Object(existing), JsonValue::Object(update)) => {
				for (key, value) in update {
					existing.insert(key.clone(), value.clone());
				}
			}
			(fields, other) => *fields = other.clone(),
		}
		self.updated_at = now;
	}
}

/// SEO metadata owned by a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoRecord {
	/// Row id
	pub id: Uuid,

	/// Page title override
	pub title: Option<String>,

	/// Meta description
	pub description: Option<String>,

	/// Meta keywords
	pub keywords: Option<String>,
}

impl SeoRecord {
	/// A blank SEO record, as composed with a new resource
	pub fn blank(id: Uuid) -> Self {
		Self {
			id,
			title: None,
			description: None,
			keywords: None,
		}
	}
}

/// Visit-tracking counter owned by a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
	/// Row id
	pub id: Uuid,

	/// Accumulated visit count
	pub visits: i64,
}

impl TrackingRecord {
	/// A zeroed counter
	pub fn zero(id: Uuid) -> Self {
		Self { id, visits: 0 }
	}
}

/// A pretty-URL slug, unique per `(workspace_id, path)` once derived
///
/// `path` and `slug` stay unset until the post-compose derivation pass
/// runs; a resource whose derivation failed exists but is unreachable by
/// pretty URL until `repair_slug` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
	/// Row id
	pub id: Uuid,

	/// Workspace scope of the uniqueness constraint
	pub workspace_id: Option<Uuid>,

	/// Full path ("/page-3f2a91c0d4b1")
	pub path: Option<String>,

	/// Final path segment
	pub slug: Option<String>,
}

impl Slug {
	/// An underived slug row, as composed with a new resource
	pub fn underived(id: Uuid, workspace_id: Option<Uuid>) -> Self {
		Self {
			id,
			workspace_id,
			path: None,
			slug: None,
		}
	}
}

/// Rich-content container owned by a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
	/// Row id
	pub id: Uuid,
}

/// Publication state of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
	/// Authored but not publicly visible
	Draft,
	/// Publicly visible
	Published,
}

impl ItemState {
	/// Stable string form used for persistence
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Draft => "draft",
			Self::Published => "published",
		}
	}
}

impl std::str::FromStr for ItemState {
	type Err = crate::error::CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"draft" => Ok(Self::Draft),
			"published" => Ok(Self::Published),
			other => Err(crate::error::CoreError::UnknownKind(other.to_string())),
		}
	}
}

/// An ordered, typed content block inside a `Content` container
///
/// `order` is only a relative sort key: duplicate or gapped values are
/// legal and preserved as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
	/// Row id
	pub id: Uuid,

	/// Owning content container
	pub content_id: Uuid,

	/// Block kind discriminator ("text", "gallery", ...)
	pub block_kind: String,

	/// Publication state
	pub state: ItemState,

	/// Relative sort key
	pub order: i64,

	/// Block payload
	pub props: JsonValue,

	/// Creating user
	pub created_by: Option<Uuid>,

	/// Last updating user
	pub updated_by: Option<Uuid>,

	/// Creation timestamp
	pub created_at: DateTime<Utc>,

	/// Last update timestamp
	pub updated_at: DateTime<Utc>,
}

/// Target kind of a many-to-many association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
	/// A shared media file
	File,
	/// A free-form tag
	Tag,
	/// A taxonomy category
	Category,
	/// A shared slug row (content items link these)
	Slug,
}

impl AttachmentKind {
	/// Stable string form used for persistence
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::File => "file",
			Self::Tag => "tag",
			Self::Category => "category",
			Self::Slug => "slug",
		}
	}
}

impl std::str::FromStr for AttachmentKind {
	type Err = crate::error::CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"file" => Ok(Self::File),
			"tag" => Ok(Self::Tag),
			"category" => Ok(Self::Category),
			"slug" => Ok(Self::Slug),
			other => Err(crate::error::CoreError::UnknownKind(other.to_string())),
		}
	}
}

/// A many-to-many association row
///
/// The target row (file, tag, category, shared slug) is referenced, not
/// owned: cleanup detaches these links but never deletes the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
	/// Owning entity (resource or content item)
	pub owner_id: Uuid,

	/// Association kind
	pub kind: AttachmentKind,

	/// Referenced target row
	pub target_id: Uuid,
}
