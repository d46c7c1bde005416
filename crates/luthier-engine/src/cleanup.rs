//! Cascading cleanup orchestrator
//!
//! Deletes an aggregate's owned sub-records and, for tree kinds, its
//! entire subtree, in dependency-safe order. Steps are
//! best-effort-isolated: one dependent's failure is recorded and the
//! remaining steps still run, but the overall operation reports failure
//! if anything failed. The subtree's rows are batch-loaded in one scope
//! query before any recursion, then removed leaves-first.
//!
//! Store-level `ON DELETE CASCADE` is deliberately not relied on — the
//! orchestrator controls ordering and external side effects itself.

use async_trait::async_trait;
use luthier_core::{AttachmentKind, Resource};
use luthier_store::{Store, WriteBatch, WriteOp};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::tree;
use crate::Engine;

/// Hook for releasing file-system or external-asset side effects owned
/// exclusively by a resource (image variants and the like)
///
/// Implementations must be idempotent and safe to retry.
#[async_trait]
pub trait AssetReleaser: Send + Sync {
	/// Release everything the resource exclusively owns
	async fn release(&self, resource: &Resource) -> std::result::Result<(), String>;
}

/// Default releaser for deployments without external assets
pub struct NoopReleaser;

#[async_trait]
impl AssetReleaser for NoopReleaser {
	async fn release(&self, _resource: &Resource) -> std::result::Result<(), String> {
		Ok(())
	}
}

impl<S: Store> Engine<S> {
	/// Clean up and delete a resource aggregate
	///
	/// For tree kinds the whole subtree goes with it. After this
	/// returns `Ok`, none of the former dependents, translations or
	/// subtree rows are loadable.
	pub async fn cleanup_and_delete(&self, resource_id: Uuid) -> Result<()> {
		let resource = self
			.store()
			.resource(resource_id)
			.await?
			.ok_or(EngineError::NotFound {
				entity: "resource",
				id: resource_id,
			})?;

		// Leaves-first deletion order; the scope query is the one batch
		// load bounding the work per deletion.
		let targets: Vec<Resource> = if resource.kind.is_tree() {
			let nodes = self
				.store()
				.resources_in_scope(resource.workspace_id, resource.kind)
				.await?;
			let mut ordered: Vec<Resource> = tree::subtree_ids(resource.id, &nodes)
				.into_iter()
				.filter_map(|id| nodes.iter().find(|n| n.id == id).cloned())
				.collect();
			ordered.reverse();
			// The root row may not be in the scope query result if it
			// was the lookup above; ensure it is last exactly once
			if !ordered.iter().any(|n| n.id == resource.id) {
				ordered.push(resource.clone());
			}
			ordered
		} else {
			vec![resource.clone()]
		};

		let mut failures = Vec::new();
		for node in &targets {
			self.cleanup_one(node, &mut failures).await;
		}

		if failures.is_empty() {
			debug!(resource = %resource_id, removed = targets.len(), "aggregate cleanup complete");
			Ok(())
		} else {
			warn!(resource = %resource_id, failed = failures.len(), "aggregate cleanup incomplete");
			Err(EngineError::CleanupIncomplete {
				resource: resource_id,
				failures,
			})
		}
	}

	/// Clean one resource's owned rows, then the row itself
	async fn cleanup_one(&self, resource: &Resource, failures: &mut Vec<String>) {
		// One-to-one dependents first
		if let Some(seo_id) = resource.seo_id {
			self.try_op(WriteOp::DeleteSeo(seo_id), "seo", failures).await;
		}
		if let Some(content_id) = resource.content_id {
			self.cleanup_content(content_id, failures).await;
		}
		if let Some(tracking_id) = resource.tracking_id {
			self.try_op(WriteOp::DeleteTracking(tracking_id), "tracking", failures)
				.await;
		}
		if let Some(slug_id) = resource.slug_id {
			self.try_op(WriteOp::DeleteSlug(slug_id), "slug", failures)
				.await;
		}

		// The resource's own translation rows
		self.cleanup_translations(resource.id, failures).await;

		// Resource-level associations are links to shared rows: detach
		for kind in [
			AttachmentKind::File,
			AttachmentKind::Tag,
			AttachmentKind::Category,
		] {
			self.try_op(
				WriteOp::Detach {
					owner_id: resource.id,
					kind,
					target_id: None,
				},
				"attachments",
				failures,
			)
			.await;
		}

		// External-asset side effects; idempotent, safe to retry
		if let Err(reason) = self.releaser().release(resource).await {
			failures.push(format!("asset release for {}: {reason}", resource.id));
		}

		// The owner row goes last
		self.try_op(WriteOp::DeleteResource(resource.id), "resource", failures)
			.await;
	}

	/// Content cleanup recurses into items; item file/slug links are
	/// detached, never deleted (the targets are shared)
	async fn cleanup_content(&self, content_id: Uuid, failures: &mut Vec<String>) {
		match self.store().content_items(content_id).await {
			Ok(items) => {
				for item in items {
					self.cleanup_translations(item.id, failures).await;
					for kind in [AttachmentKind::File, AttachmentKind::Slug] {
						self.try_op(
							WriteOp::Detach {
								owner_id: item.id,
								kind,
								target_id: None,
							},
							"item attachments",
							failures,
						)
						.await;
					}
					self.try_op(WriteOp::DeleteContentItem(item.id), "content item", failures)
						.await;
				}
			}
			Err(e) => failures.push(format!("loading items of content {content_id}: {e}")),
		}
		self.try_op(WriteOp::DeleteContent(content_id), "content", failures)
			.await;
	}

	async fn cleanup_translations(&self, owner_id: Uuid, failures: &mut Vec<String>) {
		match self.store().translations_for(owner_id).await {
			Ok(rows) => {
				for row in rows {
					self.try_op(WriteOp::DeleteTranslation(row.id), "translation", failures)
						.await;
				}
			}
			Err(e) => failures.push(format!("loading translations of {owner_id}: {e}")),
		}
	}

	async fn try_op(&self, op: WriteOp, what: &str, failures: &mut Vec<String>) {
		if let Err(e) = self.store().apply(WriteBatch::single(op)).await {
			failures.push(format!("{what}: {e}"));
		}
	}
}
