//! Aggregate composer
//!
//! Creates the constellation of sub-records that constitute one logical
//! resource as a single unit of work. All row ids are client-generated,
//! so every dependent id is known before anything is persisted and the
//! whole aggregate (dependents first, owner row last) submits as one
//! atomically applied batch — a persisted resource is never observable
//! referencing a row that does not exist.
//!
//! Slug `path`/`slug` derivation runs as a second, best-effort pass: a
//! failure there leaves the resource usable but unreachable by pretty
//! URL, is logged rather than fatal, and is idempotently repairable via
//! [`Engine::repair_slug`].

use luthier_core::{
	Content, IntegrityViolation, LanguageRegistry, Resource, ResourceKind, SeoRecord, Slug,
	TrackingRecord, Translation,
};
use luthier_store::error::constraints;
use luthier_store::{Store, StoreError, WriteBatch, WriteOp};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::Engine;

/// Inputs for composing one resource aggregate
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
	/// Owning workspace; `None` for global scope
	pub workspace_id: Option<Uuid>,

	/// Parent node, for tree kinds
	pub parent_id: Option<Uuid>,

	/// Creating user, recorded as `created_by`/`updated_by`
	pub actor: Option<Uuid>,

	/// Initial localized fields per language id
	///
	/// Languages not present here still get an empty translation row
	/// via the backfill that runs as part of composition.
	pub translations: HashMap<Uuid, JsonValue>,
}

impl<S: Store> Engine<S> {
	/// Compose and persist a resource aggregate
	///
	/// Every insert (dependents and the owner row) applies atomically;
	/// any failure surfaces as `PartialAggregate` with nothing
	/// persisted.
	pub async fn compose_resource(
		&self,
		kind: ResourceKind,
		request: ComposeRequest,
		languages: &LanguageRegistry,
	) -> Result<Resource> {
		let now = self.clock().now();
		let id = Uuid::new_v4();
		let mut batch = WriteBatch::new();

		let seo_id = kind.owns_seo().then(Uuid::new_v4);
		let content_id = kind.owns_content().then(Uuid::new_v4);
		let tracking_id = kind.owns_tracking().then(Uuid::new_v4);
		let slug_id = kind.owns_slug().then(Uuid::new_v4);

		if let Some(seo_id) = seo_id {
			batch.push(WriteOp::InsertSeo(SeoRecord::blank(seo_id)));
		}
		if let Some(content_id) = content_id {
			batch.push(WriteOp::InsertContent(Content { id: content_id }));
		}
		if let Some(tracking_id) = tracking_id {
			batch.push(WriteOp::InsertTracking(TrackingRecord::zero(tracking_id)));
		}
		if let Some(slug_id) = slug_id {
			batch.push(WriteOp::InsertSlug(Slug::underived(
				slug_id,
				request.workspace_id,
			)));
		}

		// Translation backfill for every then-enabled language, with any
		// supplied payload merged in. Payloads for unknown languages are
		// skipped silently, same as reconciliation.
		let mut language_ids: Vec<Uuid> = languages.ids().collect();
		language_ids.sort();
		for language_id in language_ids {
			let mut row = Translation::empty(id, language_id, now);
			if let Some(fields) = request.translations.get(&language_id) {
				row.merge_fields(fields, now);
			}
			batch.push(WriteOp::InsertTranslation(row));
		}

		let resource = Resource {
			id,
			kind,
			workspace_id: request.workspace_id,
			parent_id: kind.is_tree().then_some(request.parent_id).flatten(),
			seo_id,
			content_id,
			tracking_id,
			slug_id,
			created_by: request.actor,
			updated_by: request.actor,
			created_at: now,
			updated_at: now,
		};
		batch.push(WriteOp::InsertResource(resource.clone()));

		self.store().apply(batch).await.map_err(|e| {
			warn!(resource = %id, kind = %kind, error = %e, "aggregate composition rolled back");
			EngineError::PartialAggregate {
				kind,
				reason: e.to_string(),
			}
		})?;
		debug!(resource = %id, kind = %kind, "aggregate composed");

		// Second pass: best-effort slug derivation, absorbed on failure
		if resource.slug_id.is_some() {
			if let Err(e) = self.repair_slug(resource.id).await {
				warn!(resource = %id, error = %e, "slug derivation deferred; resource has no pretty URL yet");
			}
		}

		Ok(resource)
	}

	/// Derive and persist a resource's slug path, idempotently
	///
	/// Safe to re-run at any time: an already-derived slug is left
	/// untouched. A path collision surfaces as an integrity violation.
	pub async fn repair_slug(&self, resource_id: Uuid) -> Result<()> {
		let resource = self
			.store()
			.resource(resource_id)
			.await?
			.ok_or(EngineError::NotFound {
				entity: "resource",
				id: resource_id,
			})?;
		let Some(slug_id) = resource.slug_id else {
			return Ok(());
		};
		let Some(mut slug) = self.store().slug(slug_id).await? else {
			// Dangling slug reference: tolerated, repairable by recompose
			debug!(resource = %resource_id, "slug row absent; skipping derivation");
			return Ok(());
		};
		if slug.path.is_some() {
			return Ok(());
		}

		let segment = derive_segment(&resource);
		let path = match self.parent_slug_path(&resource).await? {
			Some(parent_path) => format!("{parent_path}/{segment}"),
			None => format!("/{segment}"),
		};
		slug.slug = Some(segment);
		slug.path = Some(path.clone());

		match self
			.store()
			.apply(WriteBatch::single(WriteOp::UpdateSlug(slug)))
			.await
		{
			Ok(()) => Ok(()),
			Err(StoreError::Conflict { constraint })
				if constraint == constraints::SLUG_WORKSPACE_PATH =>
			{
				Err(IntegrityViolation::SlugCollision {
					workspace: resource.workspace_id,
					path,
				}
				.into())
			}
			Err(e) => Err(e.into()),
		}
	}

	/// The derived path of the parent's slug, if the resource has a
	/// parent with one
	async fn parent_slug_path(&self, resource: &Resource) -> Result<Option<String>> {
		let Some(parent_id) = resource.parent_id else {
			return Ok(None);
		};
		// Missing parents are treated as absent, never as errors
		let Some(parent) = self.store().resource(parent_id).await? else {
			return Ok(None);
		};
		let Some(slug_id) = parent.slug_id else {
			return Ok(None);
		};
		Ok(self
			.store()
			.slug(slug_id)
			.await?
			.and_then(|slug| slug.path))
	}

	/// Bump a resource's visit counter
	pub async fn record_visit(&self, resource_id: Uuid) -> Result<i64> {
		let resource = self
			.store()
			.resource(resource_id)
			.await?
			.ok_or(EngineError::NotFound {
				entity: "resource",
				id: resource_id,
			})?;
		let Some(tracking_id) = resource.tracking_id else {
			return Ok(0);
		};
		let Some(mut tracking) = self.store().tracking(tracking_id).await? else {
			return Ok(0);
		};
		tracking.visits += 1;
		let visits = tracking.visits;
		self.store()
			.apply(WriteBatch::single(WriteOp::UpdateTracking(tracking)))
			.await?;
		Ok(visits)
	}
}

/// Deterministic slug segment: the kind discriminator plus a stable
/// fragment of the resource id
fn derive_segment(resource: &Resource) -> String {
	let id = resource.id.simple().to_string();
	format!("{}-{}", resource.kind.as_str(), &id[..12])
}
