//! Many-to-many association affordances
//!
//! Attach/detach links between an owner (resource or content item) and
//! shared rows (files, tags, categories, slugs). Targets are referenced,
//! never owned: detaching removes the link only, and duplicate target
//! ids in one attach call collapse to a single link.

use luthier_core::{Attachment, AttachmentKind};
use luthier_store::{Store, WriteBatch, WriteOp};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::Result;
use crate::Engine;

impl<S: Store> Engine<S> {
	/// Attach targets to an owner, duplicates removed
	pub async fn attach(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
		target_ids: &[Uuid],
	) -> Result<()> {
		let unique: BTreeSet<Uuid> = target_ids.iter().copied().collect();
		if unique.is_empty() {
			return Ok(());
		}
		let mut batch = WriteBatch::new();
		for target_id in unique {
			batch.push(WriteOp::Attach(Attachment {
				owner_id,
				kind,
				target_id,
			}));
		}
		Ok(self.store().apply(batch).await?)
	}

	/// Detach one target, or every target of `kind` when `target_id`
	/// is `None`
	pub async fn detach(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
		target_id: Option<Uuid>,
	) -> Result<()> {
		Ok(self
			.store()
			.apply(WriteBatch::single(WriteOp::Detach {
				owner_id,
				kind,
				target_id,
			}))
			.await?)
	}

	/// The target ids currently attached to an owner
	pub async fn attachments(&self, owner_id: Uuid, kind: AttachmentKind) -> Result<Vec<Uuid>> {
		Ok(self.store().attachments_for(owner_id, kind).await?)
	}
}
