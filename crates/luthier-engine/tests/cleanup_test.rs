//! Cascading cleanup orchestrator tests

mod common;

use common::{engine, two_languages, FlakyStore};
use chrono::Utc;
use luthier_core::{AttachmentKind, ContentItem, ItemState, ResourceKind};
use luthier_engine::{ComposeRequest, Engine, EngineError};
use luthier_store::{MemoryStore, Store, WriteBatch, WriteOp};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn item(content_id: Uuid, order: i64) -> ContentItem {
	let now = Utc::now();
	ContentItem {
		id: Uuid::new_v4(),
		content_id,
		block_kind: "text".to_string(),
		state: ItemState::Published,
		order,
		props: json!({"text": "hello"}),
		created_by: None,
		updated_by: None,
		created_at: now,
		updated_at: now,
	}
}

#[rstest]
#[tokio::test]
async fn test_library_subtree_is_removed_entirely() {
	// Arrange - root with [child1, child2], child1 has a grandchild
	let engine = engine();
	let (languages, _en, _fr) = two_languages();
	let workspace = Some(Uuid::new_v4());
	let compose = |parent: Option<Uuid>| ComposeRequest {
		workspace_id: workspace,
		parent_id: parent,
		..Default::default()
	};
	let root = engine
		.compose_resource(ResourceKind::Library, compose(None), &languages)
		.await
		.unwrap();
	let child1 = engine
		.compose_resource(ResourceKind::Library, compose(Some(root.id)), &languages)
		.await
		.unwrap();
	let child2 = engine
		.compose_resource(ResourceKind::Library, compose(Some(root.id)), &languages)
		.await
		.unwrap();
	let grandchild = engine
		.compose_resource(ResourceKind::Library, compose(Some(child1.id)), &languages)
		.await
		.unwrap();

	// Act
	engine.cleanup_and_delete(root.id).await.unwrap();

	// Assert - none of the four nor their translations are loadable
	let store = engine.store();
	for id in [root.id, child1.id, child2.id, grandchild.id] {
		assert!(store.resource(id).await.unwrap().is_none());
		assert!(store.translations_for(id).await.unwrap().is_empty());
	}
}

#[rstest]
#[tokio::test]
async fn test_page_aggregate_leaves_no_dependents() {
	// Arrange - full aggregate with items, item translations, attachments
	let engine = engine();
	let (languages, en, _fr) = two_languages();
	let page = engine
		.compose_resource(ResourceKind::Page, ComposeRequest::default(), &languages)
		.await
		.unwrap();
	let content_id = page.content_id.unwrap();
	let block = item(content_id, 0);
	engine
		.store()
		.apply(WriteBatch::single(WriteOp::InsertContentItem(block.clone())))
		.await
		.unwrap();
	let mut payloads = std::collections::HashMap::new();
	payloads.insert(en, json!({"text": "bonjour"}));
	engine
		.reconcile_translations(block.id, &payloads, &languages)
		.await
		.unwrap();

	// A file shared with another owner: the link must go, the sharer's stays
	let shared_file = Uuid::new_v4();
	let other_owner = Uuid::new_v4();
	engine
		.attach(block.id, AttachmentKind::File, &[shared_file])
		.await
		.unwrap();
	engine
		.attach(other_owner, AttachmentKind::File, &[shared_file])
		.await
		.unwrap();

	// Act
	engine.cleanup_and_delete(page.id).await.unwrap();

	// Assert
	let store = engine.store();
	assert!(store.resource(page.id).await.unwrap().is_none());
	assert!(store.seo(page.seo_id.unwrap()).await.unwrap().is_none());
	assert!(store.content(content_id).await.unwrap().is_none());
	assert!(store
		.tracking(page.tracking_id.unwrap())
		.await
		.unwrap()
		.is_none());
	assert!(store.slug(page.slug_id.unwrap()).await.unwrap().is_none());
	assert!(store.content_items(content_id).await.unwrap().is_empty());
	assert!(store.translations_for(page.id).await.unwrap().is_empty());
	assert!(store.translations_for(block.id).await.unwrap().is_empty());
	assert!(store
		.attachments_for(block.id, AttachmentKind::File)
		.await
		.unwrap()
		.is_empty());
	assert_eq!(
		store
			.attachments_for(other_owner, AttachmentKind::File)
			.await
			.unwrap(),
		vec![shared_file]
	);
}

#[rstest]
#[tokio::test]
async fn test_failed_step_is_reported_but_others_still_run() {
	// Arrange - composing takes 2 applies; the 3rd (first cleanup step)
	// fails, everything after it must still be attempted
	let inner = Arc::new(MemoryStore::new());
	let engine = Engine::new(FlakyStore::failing_on(inner.clone(), 3));
	let (languages, _en, _fr) = two_languages();
	let page = engine
		.compose_resource(ResourceKind::Page, ComposeRequest::default(), &languages)
		.await
		.unwrap();

	// Act
	let result = engine.cleanup_and_delete(page.id).await;

	// Assert - reported failed, with the one failure recorded
	let Err(EngineError::CleanupIncomplete { resource, failures }) = result else {
		panic!("expected CleanupIncomplete");
	};
	assert_eq!(resource, page.id);
	assert_eq!(failures.len(), 1);

	// Assert - the later steps ran anyway: the resource row is gone
	assert!(inner.resource(page.id).await.unwrap().is_none());
	assert!(inner.translations_for(page.id).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_cleanup_of_missing_resource_is_not_found() {
	let engine = engine();
	let missing = Uuid::new_v4();

	let result = engine.cleanup_and_delete(missing).await;

	assert!(matches!(
		result,
		Err(EngineError::NotFound { entity: "resource", id }) if id == missing
	));
}
