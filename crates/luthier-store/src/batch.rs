//! Atomically applied write batches
//!
//! A `WriteBatch` is an ordered list of row-level operations the store
//! applies all-or-nothing. The aggregate composer submits a whole
//! aggregate as one batch (dependents first, owner row last); the
//! duplicator submits one batch per copied item.

use luthier_core::{
	Attachment, AttachmentKind, Content, ContentItem, Resource, SeoRecord, Slug, TrackingRecord,
	Translation,
};
use uuid::Uuid;

/// A single row-level write operation
///
/// Inserts create, updates require an existing row, deletes are
/// idempotent.
#[derive(Debug, Clone)]
pub enum WriteOp {
	/// Insert a resource row
	InsertResource(Resource),
	/// Update an existing resource row
	UpdateResource(Resource),
	/// Delete a resource row
	DeleteResource(Uuid),

	/// Insert an SEO record
	InsertSeo(SeoRecord),
	/// Delete an SEO record
	DeleteSeo(Uuid),

	/// Insert a content container
	InsertContent(Content),
	/// Delete a content container
	DeleteContent(Uuid),

	/// Insert a content item
	InsertContentItem(ContentItem),
	/// Delete a content item
	DeleteContentItem(Uuid),

	/// Insert a tracking counter
	InsertTracking(TrackingRecord),
	/// Update an existing tracking counter
	UpdateTracking(TrackingRecord),
	/// Delete a tracking counter
	DeleteTracking(Uuid),

	/// Insert a slug row
	InsertSlug(Slug),
	/// Update an existing slug row
	UpdateSlug(Slug),
	/// Delete a slug row
	DeleteSlug(Uuid),

	/// Insert a translation row
	InsertTranslation(Translation),
	/// Update an existing translation row
	UpdateTranslation(Translation),
	/// Delete a translation row
	DeleteTranslation(Uuid),

	/// Attach a target to an owner; attaching an existing pair is a no-op
	Attach(Attachment),

	/// Detach associations from an owner
	///
	/// The target rows themselves are never deleted.
	Detach {
		/// The owning entity
		owner_id: Uuid,
		/// Association kind to detach
		kind: AttachmentKind,
		/// One specific target, or every target of `kind` when `None`
		target_id: Option<Uuid>,
	},
}

/// An ordered, atomically applied list of write operations
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
	ops: Vec<WriteOp>,
}

impl WriteBatch {
	/// Create an empty batch
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a batch holding a single operation
	pub fn single(op: WriteOp) -> Self {
		Self { ops: vec![op] }
	}

	/// Append an operation
	pub fn push(&mut self, op: WriteOp) -> &mut Self {
		self.ops.push(op);
		self
	}

	/// The operations in application order
	pub fn ops(&self) -> &[WriteOp] {
		&self.ops
	}

	/// Consume the batch into its operations
	pub fn into_ops(self) -> Vec<WriteOp> {
		self.ops
	}

	/// Number of operations
	pub fn len(&self) -> usize {
		self.ops.len()
	}

	/// Whether the batch holds no operations
	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}
}
