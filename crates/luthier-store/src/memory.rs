//! In-memory reference store
//!
//! Backs the test suites and doubles as the executable reference for the
//! consistency contract: batches apply all-or-nothing, uniqueness
//! constraints reject with typed conflicts, deletes are idempotent.

use async_trait::async_trait;
use luthier_core::{
	Attachment, AttachmentKind, Content, ContentItem, Resource, ResourceKind, SeoRecord, Slug,
	TrackingRecord, Translation,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{constraints, StoreError, StoreResult};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
struct Inner {
	resources: HashMap<Uuid, Resource>,
	seo: HashMap<Uuid, SeoRecord>,
	contents: HashMap<Uuid, Content>,
	items: HashMap<Uuid, ContentItem>,
	tracking: HashMap<Uuid, TrackingRecord>,
	slugs: HashMap<Uuid, Slug>,
	translations: HashMap<Uuid, Translation>,
	attachments: HashSet<Attachment>,
}

impl Inner {
	fn translation_conflict(&self, row: &Translation) -> bool {
		self.translations.values().any(|t| {
			t.id != row.id && t.owner_id == row.owner_id && t.language_id == row.language_id
		})
	}

	fn slug_conflict(&self, row: &Slug) -> bool {
		let Some(path) = &row.path else {
			// Underived slugs are outside the uniqueness constraint
			return false;
		};
		self.slugs.values().any(|s| {
			s.id != row.id && s.workspace_id == row.workspace_id && s.path.as_ref() == Some(path)
		})
	}

	fn apply(&mut self, op: WriteOp) -> StoreResult<()> {
		match op {
			WriteOp::InsertResource(row) => {
				self.resources.insert(row.id, row);
			}
			WriteOp::UpdateResource(row) => {
				if !self.resources.contains_key(&row.id) {
					return Err(StoreError::NotFound {
						entity: "resource",
						id: row.id,
					});
				}
				self.resources.insert(row.id, row);
			}
			WriteOp::DeleteResource(id) => {
				self.resources.remove(&id);
			}
			WriteOp::InsertSeo(row) => {
				self.seo.insert(row.id, row);
			}
			WriteOp::DeleteSeo(id) => {
				self.seo.remove(&id);
			}
			WriteOp::InsertContent(row) => {
				self.contents.insert(row.id, row);
			}
			WriteOp::DeleteContent(id) => {
				self.contents.remove(&id);
			}
			WriteOp::InsertContentItem(row) => {
				self.items.insert(row.id, row);
			}
			WriteOp::DeleteContentItem(id) => {
				self.items.remove(&id);
			}
			WriteOp::InsertTracking(row) => {
				self.tracking.insert(row.id, row);
			}
			WriteOp::UpdateTracking(row) => {
				if !self.tracking.contains_key(&row.id) {
					return Err(StoreError::NotFound {
						entity: "tracking",
						id: row.id,
					});
				}
				self.tracking.insert(row.id, row);
			}
			WriteOp::DeleteTracking(id) => {
				self.tracking.remove(&id);
			}
			WriteOp::InsertSlug(row) => {
				if self.slug_conflict(&row) {
					return Err(StoreError::Conflict {
						constraint: constraints::SLUG_WORKSPACE_PATH.to_string(),
					});
				}
				self.slugs.insert(row.id, row);
			}
			WriteOp::UpdateSlug(row) => {
				if !self.slugs.contains_key(&row.id) {
					return Err(StoreError::NotFound {
						entity: "slug",
						id: row.id,
					});
				}
				if self.slug_conflict(&row) {
					return Err(StoreError::Conflict {
						constraint: constraints::SLUG_WORKSPACE_PATH.to_string(),
					});
				}
				self.slugs.insert(row.id, row);
			}
			WriteOp::DeleteSlug(id) => {
				self.slugs.remove(&id);
			}
			WriteOp::InsertTranslation(row) => {
				if self.translation_conflict(&row) {
					return Err(StoreError::Conflict {
						constraint: constraints::TRANSLATION_OWNER_LANGUAGE.to_string(),
					});
				}
				self.translations.insert(row.id, row);
			}
			WriteOp::UpdateTranslation(row) => {
				if !self.translations.contains_key(&row.id) {
					return Err(StoreError::NotFound {
						entity: "translation",
						id: row.id,
					});
				}
				self.translations.insert(row.id, row);
			}
			WriteOp::DeleteTranslation(id) => {
				self.translations.remove(&id);
			}
			WriteOp::Attach(link) => {
				self.attachments.insert(link);
			}
			WriteOp::Detach {
				owner_id,
				kind,
				target_id,
			} => {
				self.attachments.retain(|a| {
					!(a.owner_id == owner_id
						&& a.kind == kind
						&& target_id.is_none_or(|t| a.target_id == t))
				});
			}
		}
		Ok(())
	}
}

/// In-memory `Store` implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
	inner: RwLock<Inner>,
}

impl MemoryStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Total number of translation rows (test helper)
	pub fn translation_count(&self) -> usize {
		self.inner.read().translations.len()
	}

	/// Total number of attachment rows (test helper)
	pub fn attachment_count(&self) -> usize {
		self.inner.read().attachments.len()
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
		let mut inner = self.inner.write();

		// Stage against a copy so a mid-batch failure leaves nothing applied
		let mut staged = inner.clone();
		for op in batch.into_ops() {
			staged.apply(op)?;
		}
		*inner = staged;
		Ok(())
	}

	async fn resource(&self, id: Uuid) -> StoreResult<Option<Resource>> {
		Ok(self.inner.read().resources.get(&id).cloned())
	}

	async fn resources_in_scope(
		&self,
		workspace_id: Option<Uuid>,
		kind: ResourceKind,
	) -> StoreResult<Vec<Resource>> {
		Ok(self
			.inner
			.read()
			.resources
			.values()
			.filter(|r| r.kind == kind && r.workspace_id == workspace_id)
			.cloned()
			.collect())
	}

	async fn seo(&self, id: Uuid) -> StoreResult<Option<SeoRecord>> {
		Ok(self.inner.read().seo.get(&id).cloned())
	}

	async fn content(&self, id: Uuid) -> StoreResult<Option<Content>> {
		Ok(self.inner.read().contents.get(&id).cloned())
	}

	async fn tracking(&self, id: Uuid) -> StoreResult<Option<TrackingRecord>> {
		Ok(self.inner.read().tracking.get(&id).cloned())
	}

	async fn slug(&self, id: Uuid) -> StoreResult<Option<Slug>> {
		Ok(self.inner.read().slugs.get(&id).cloned())
	}

	async fn translations_for(&self, owner_id: Uuid) -> StoreResult<Vec<Translation>> {
		Ok(self
			.inner
			.read()
			.translations
			.values()
			.filter(|t| t.owner_id == owner_id)
			.cloned()
			.collect())
	}

	async fn content_items(&self, content_id: Uuid) -> StoreResult<Vec<ContentItem>> {
		let mut items: Vec<ContentItem> = self
			.inner
			.read()
			.items
			.values()
			.filter(|i| i.content_id == content_id)
			.cloned()
			.collect();
		items.sort_by_key(|i| i.order);
		Ok(items)
	}

	async fn attachments_for(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
	) -> StoreResult<Vec<Uuid>> {
		Ok(self
			.inner
			.read()
			.attachments
			.iter()
			.filter(|a| a.owner_id == owner_id && a.kind == kind)
			.map(|a| a.target_id)
			.collect())
	}
}
