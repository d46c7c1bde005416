//! Shared fixtures for the engine test suites

// Not every suite uses every fixture
#![allow(dead_code)]

use async_trait::async_trait;
use luthier_core::{
	AttachmentKind, Content, ContentItem, Language, LanguageRegistry, Resource, ResourceKind,
	SeoRecord, Slug, TrackingRecord, Translation,
};
use luthier_engine::Engine;
use luthier_store::{MemoryStore, Store, StoreResult, WriteBatch};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Two enabled languages (en default, fr)
pub fn two_languages() -> (LanguageRegistry, Uuid, Uuid) {
	let en = Uuid::new_v4();
	let fr = Uuid::new_v4();
	let registry = LanguageRegistry::new(vec![
		Language::new(en, "en", true),
		Language::new(fr, "fr", false),
	]);
	(registry, en, fr)
}

/// Add a language to an existing registry snapshot
pub fn with_language(registry: &LanguageRegistry, code: &str) -> (LanguageRegistry, Uuid) {
	let id = Uuid::new_v4();
	let mut languages: Vec<Language> = registry.iter().cloned().collect();
	languages.push(Language::new(id, code, false));
	(LanguageRegistry::new(languages), id)
}

pub fn engine() -> Engine<MemoryStore> {
	Engine::new(MemoryStore::new())
}

/// Store wrapper that fails the nth `apply` call (1-based), then
/// recovers; reads always delegate
pub struct FlakyStore {
	inner: Arc<MemoryStore>,
	applies: AtomicUsize,
	fail_on: usize,
}

impl FlakyStore {
	pub fn failing_on(inner: Arc<MemoryStore>, fail_on: usize) -> Self {
		Self {
			inner,
			applies: AtomicUsize::new(0),
			fail_on,
		}
	}
}

#[async_trait]
impl Store for FlakyStore {
	async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
		let n = self.applies.fetch_add(1, Ordering::SeqCst) + 1;
		if n == self.fail_on {
			return Err(luthier_store::StoreError::Backend(
				"injected failure".to_string(),
			));
		}
		self.inner.apply(batch).await
	}

	async fn resource(&self, id: Uuid) -> StoreResult<Option<Resource>> {
		self.inner.resource(id).await
	}

	async fn resources_in_scope(
		&self,
		workspace_id: Option<Uuid>,
		kind: ResourceKind,
	) -> StoreResult<Vec<Resource>> {
		self.inner.resources_in_scope(workspace_id, kind).await
	}

	async fn seo(&self, id: Uuid) -> StoreResult<Option<SeoRecord>> {
		self.inner.seo(id).await
	}

	async fn content(&self, id: Uuid) -> StoreResult<Option<Content>> {
		self.inner.content(id).await
	}

	async fn tracking(&self, id: Uuid) -> StoreResult<Option<TrackingRecord>> {
		self.inner.tracking(id).await
	}

	async fn slug(&self, id: Uuid) -> StoreResult<Option<Slug>> {
		self.inner.slug(id).await
	}

	async fn translations_for(&self, owner_id: Uuid) -> StoreResult<Vec<Translation>> {
		self.inner.translations_for(owner_id).await
	}

	async fn content_items(&self, content_id: Uuid) -> StoreResult<Vec<ContentItem>> {
		self.inner.content_items(content_id).await
	}

	async fn attachments_for(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
	) -> StoreResult<Vec<Uuid>> {
		self.inner.attachments_for(owner_id, kind).await
	}
}

/// Store wrapper that hides existing translation rows from the next
/// `translations_for` call, simulating a reconcile racing a concurrent
/// create
pub struct RacingStore {
	inner: Arc<MemoryStore>,
	hide_once: AtomicBool,
}

impl RacingStore {
	pub fn hiding_translations_once(inner: Arc<MemoryStore>) -> Self {
		Self {
			inner,
			hide_once: AtomicBool::new(true),
		}
	}
}

#[async_trait]
impl Store for RacingStore {
	async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
		self.inner.apply(batch).await
	}

	async fn resource(&self, id: Uuid) -> StoreResult<Option<Resource>> {
		self.inner.resource(id).await
	}

	async fn resources_in_scope(
		&self,
		workspace_id: Option<Uuid>,
		kind: ResourceKind,
	) -> StoreResult<Vec<Resource>> {
		self.inner.resources_in_scope(workspace_id, kind).await
	}

	async fn seo(&self, id: Uuid) -> StoreResult<Option<SeoRecord>> {
		self.inner.seo(id).await
	}

	async fn content(&self, id: Uuid) -> StoreResult<Option<Content>> {
		self.inner.content(id).await
	}

	async fn tracking(&self, id: Uuid) -> StoreResult<Option<TrackingRecord>> {
		self.inner.tracking(id).await
	}

	async fn slug(&self, id: Uuid) -> StoreResult<Option<Slug>> {
		self.inner.slug(id).await
	}

	async fn translations_for(&self, owner_id: Uuid) -> StoreResult<Vec<Translation>> {
		if self.hide_once.swap(false, Ordering::SeqCst) {
			return Ok(Vec::new());
		}
		self.inner.translations_for(owner_id).await
	}

	async fn content_items(&self, content_id: Uuid) -> StoreResult<Vec<ContentItem>> {
		self.inner.content_items(content_id).await
	}

	async fn attachments_for(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
	) -> StoreResult<Vec<Uuid>> {
		self.inner.attachments_for(owner_id, kind).await
	}
}
