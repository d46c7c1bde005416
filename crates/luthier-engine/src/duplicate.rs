//! Content duplication
//!
//! Deep-copies a Content aggregate (ordered items, their translations,
//! file/slug associations) into another Content aggregate, e.g. when
//! instantiating a template. Orders are renumbered contiguously from
//! the offset; associations are re-attached to the same underlying
//! shared rows, not copied. Each item copies all-or-nothing, but items
//! are independent of each other: one failed copy does not roll back
//! the previous ones and is surfaced as a warning instead.

use luthier_core::{Attachment, AttachmentKind, Translation};
use luthier_store::{Store, WriteBatch, WriteOp};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::Engine;

/// Outcome of one duplication run
#[derive(Debug, Default)]
pub struct DuplicationReport {
	/// Ids of the newly created item copies, in target order
	pub copied: Vec<Uuid>,

	/// Items that could not be copied
	pub warnings: Vec<DuplicationWarning>,
}

impl DuplicationReport {
	/// Whether every item copied cleanly
	pub fn is_complete(&self) -> bool {
		self.warnings.is_empty()
	}
}

/// A single item's copy failure
#[derive(Debug)]
pub struct DuplicationWarning {
	/// The original item that failed to copy
	pub source_item: Uuid,

	/// Failure description
	pub reason: String,
}

impl<S: Store> Engine<S> {
	/// Deep-copy the items of one content container into another
	///
	/// Items are taken ascending by their original `order` and written
	/// with `order = order_offset + position` — contiguous renumbering,
	/// not a copy of the original gapped values. `actor`, if supplied,
	/// overrides `created_by`/`updated_by` on the copies; otherwise the
	/// original attribution is preserved.
	pub async fn duplicate_content(
		&self,
		from: Uuid,
		to: Uuid,
		order_offset: i64,
		actor: Option<Uuid>,
	) -> Result<DuplicationReport> {
		for id in [from, to] {
			self.store()
				.content(id)
				.await?
				.ok_or(EngineError::NotFound {
					entity: "content",
					id,
				})?;
		}

		let now = self.clock().now();
		let items = self.store().content_items(from).await?;
		let mut report = DuplicationReport::default();

		for (position, item) in items.iter().enumerate() {
			let copy_id = Uuid::new_v4();
			let outcome = async {
				let mut batch = WriteBatch::new();

				let mut copy = item.clone();
				copy.id = copy_id;
				copy.content_id = to;
				copy.order = order_offset + position as i64;
				copy.created_at = now;
				copy.updated_at = now;
				if let Some(actor) = actor {
					copy.created_by = Some(actor);
					copy.updated_by = Some(actor);
				}
				batch.push(WriteOp::InsertContentItem(copy));

				// Translations copied field-for-field per language
				for original in self.store().translations_for(item.id).await? {
					batch.push(WriteOp::InsertTranslation(Translation {
						id: Uuid::new_v4(),
						owner_id: copy_id,
						language_id: original.language_id,
						fields: original.fields,
						created_at: now,
						updated_at: now,
					}));
				}

				// Shared rows re-attached, duplicate ids removed
				for kind in [AttachmentKind::File, AttachmentKind::Slug] {
					let targets: BTreeSet<Uuid> = self
						.store()
						.attachments_for(item.id, kind)
						.await?
						.into_iter()
						.collect();
					for target_id in targets {
						batch.push(WriteOp::Attach(Attachment {
							owner_id: copy_id,
							kind,
							target_id,
						}));
					}
				}

				self.store().apply(batch).await?;
				Ok::<(), EngineError>(())
			}
			.await;

			match outcome {
				Ok(()) => report.copied.push(copy_id),
				Err(e) => {
					warn!(item = %item.id, error = %e, "content item copy failed; continuing");
					report.warnings.push(DuplicationWarning {
						source_item: item.id,
						reason: e.to_string(),
					});
				}
			}
		}

		debug!(
			from = %from,
			to = %to,
			copied = report.copied.len(),
			failed = report.warnings.len(),
			"content duplication finished"
		);
		Ok(report)
	}
}
