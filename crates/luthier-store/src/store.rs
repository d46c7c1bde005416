//! The `Store` trait the engine is generic over

use async_trait::async_trait;
use luthier_core::{
	AttachmentKind, Content, ContentItem, Resource, ResourceKind, SeoRecord, Slug, TrackingRecord,
	Translation,
};
use uuid::Uuid;

use crate::batch::WriteBatch;
use crate::error::StoreResult;

/// A relational backing store for resource aggregates
///
/// Reads are point or scope queries; all writes go through `apply`,
/// which the backend executes atomically where it can (the Postgres
/// store wraps a transaction around the batch; the in-memory store
/// applies it under a single lock, all-or-nothing). Backends must
/// enforce the two uniqueness constraints named in
/// [`crate::error::constraints`] and surface violations as
/// `StoreError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
	/// Apply a write batch atomically
	async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;

	/// Load a resource row
	async fn resource(&self, id: Uuid) -> StoreResult<Option<Resource>>;

	/// Load every resource of `kind` in a workspace scope
	///
	/// `workspace_id: None` selects the global scope. For tree kinds
	/// this is the flat node set the tree manager operates on.
	async fn resources_in_scope(
		&self,
		workspace_id: Option<Uuid>,
		kind: ResourceKind,
	) -> StoreResult<Vec<Resource>>;

	/// Load an SEO record
	async fn seo(&self, id: Uuid) -> StoreResult<Option<SeoRecord>>;

	/// Load a content container
	async fn content(&self, id: Uuid) -> StoreResult<Option<Content>>;

	/// Load a tracking counter
	async fn tracking(&self, id: Uuid) -> StoreResult<Option<TrackingRecord>>;

	/// Load a slug row
	async fn slug(&self, id: Uuid) -> StoreResult<Option<Slug>>;

	/// Load every translation row owned by an entity
	async fn translations_for(&self, owner_id: Uuid) -> StoreResult<Vec<Translation>>;

	/// Load a content container's items, ordered ascending by `order`
	async fn content_items(&self, content_id: Uuid) -> StoreResult<Vec<ContentItem>>;

	/// Load the target ids attached to an owner for one association kind
	async fn attachments_for(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
	) -> StoreResult<Vec<Uuid>>;
}
