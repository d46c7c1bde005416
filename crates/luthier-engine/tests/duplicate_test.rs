//! Content duplication tests

mod common;

use common::{engine, two_languages, FlakyStore};
use chrono::Utc;
use luthier_core::{AttachmentKind, Content, ContentItem, ItemState, ResourceKind};
use luthier_engine::Engine;
use luthier_store::{MemoryStore, Store, WriteBatch, WriteOp};
use rstest::rstest;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

fn item(content_id: Uuid, order: i64, actor: Option<Uuid>) -> ContentItem {
	let now = Utc::now();
	ContentItem {
		id: Uuid::new_v4(),
		content_id,
		block_kind: "text".to_string(),
		state: ItemState::Published,
		order,
		props: json!({"text": format!("block at {order}")}),
		created_by: actor,
		updated_by: actor,
		created_at: now,
		updated_at: now,
	}
}

/// Two empty content containers, directly inserted
async fn two_contents(store: &impl Store) -> (Uuid, Uuid) {
	let from = Uuid::new_v4();
	let to = Uuid::new_v4();
	let mut batch = WriteBatch::new();
	batch.push(WriteOp::InsertContent(Content { id: from }));
	batch.push(WriteOp::InsertContent(Content { id: to }));
	store.apply(batch).await.unwrap();
	(from, to)
}

#[rstest]
#[tokio::test]
async fn test_copies_every_item_renumbered_from_offset() {
	// Arrange - gapped source orders: 3, 10, 11
	let engine = engine();
	let (from, to) = two_contents(engine.store()).await;
	let mut batch = WriteBatch::new();
	for order in [3, 10, 11] {
		batch.push(WriteOp::InsertContentItem(item(from, order, None)));
	}
	engine.store().apply(batch).await.unwrap();

	// Act
	let report = engine.duplicate_content(from, to, 5, None).await.unwrap();

	// Assert - same count, contiguous orders from the offset
	assert!(report.is_complete());
	assert_eq!(report.copied.len(), 3);
	let copies = engine.store().content_items(to).await.unwrap();
	assert_eq!(copies.len(), 3);
	let orders: Vec<i64> = copies.iter().map(|i| i.order).collect();
	assert_eq!(orders, vec![5, 6, 7]);
	// Source order survives into target order
	assert_eq!(copies[0].props, json!({"text": "block at 3"}));
	assert_eq!(copies[2].props, json!({"text": "block at 11"}));
	// Source untouched
	assert_eq!(engine.store().content_items(from).await.unwrap().len(), 3);
}

#[rstest]
#[tokio::test]
async fn test_translations_are_deep_copied_per_language() {
	// Arrange - one item with en and fr translations
	let engine = engine();
	let (languages, en, fr) = two_languages();
	let (from, to) = two_contents(engine.store()).await;
	let original = item(from, 0, None);
	engine
		.store()
		.apply(WriteBatch::single(WriteOp::InsertContentItem(
			original.clone(),
		)))
		.await
		.unwrap();
	let mut payloads = HashMap::new();
	payloads.insert(en, json!({"text": "hello"}));
	payloads.insert(fr, json!({"text": "bonjour"}));
	engine
		.reconcile_translations(original.id, &payloads, &languages)
		.await
		.unwrap();

	// Act
	let report = engine.duplicate_content(from, to, 0, None).await.unwrap();

	// Assert - copy has its own rows with equal fields per language
	let copy_id = report.copied[0];
	let copied = engine.store().translations_for(copy_id).await.unwrap();
	assert_eq!(copied.len(), 2);
	for row in &copied {
		let source = engine
			.store()
			.translations_for(original.id)
			.await
			.unwrap()
			.into_iter()
			.find(|t| t.language_id == row.language_id)
			.unwrap();
		assert_eq!(row.fields, source.fields);
		assert_ne!(row.id, source.id);
		assert_eq!(row.owner_id, copy_id);
	}
}

#[rstest]
#[tokio::test]
async fn test_actor_override_and_preserved_attribution() {
	// Arrange
	let engine = engine();
	let (from, to) = two_contents(engine.store()).await;
	let author = Some(Uuid::new_v4());
	engine
		.store()
		.apply(WriteBatch::single(WriteOp::InsertContentItem(item(
			from, 0, author,
		))))
		.await
		.unwrap();

	// Act - once without an actor, once with
	let duplicator = Uuid::new_v4();
	engine.duplicate_content(from, to, 0, None).await.unwrap();
	engine
		.duplicate_content(from, to, 10, Some(duplicator))
		.await
		.unwrap();

	// Assert
	let copies = engine.store().content_items(to).await.unwrap();
	assert_eq!(copies[0].created_by, author);
	assert_eq!(copies[0].updated_by, author);
	assert_eq!(copies[1].created_by, Some(duplicator));
	assert_eq!(copies[1].updated_by, Some(duplicator));
}

#[rstest]
#[tokio::test]
async fn test_attachments_reattach_to_same_targets() {
	// Arrange - item with file links; targets are shared, not copied
	let engine = engine();
	let (from, to) = two_contents(engine.store()).await;
	let original = item(from, 0, None);
	engine
		.store()
		.apply(WriteBatch::single(WriteOp::InsertContentItem(
			original.clone(),
		)))
		.await
		.unwrap();
	let file_a = Uuid::new_v4();
	let file_b = Uuid::new_v4();
	engine
		.attach(original.id, AttachmentKind::File, &[file_a, file_b, file_a])
		.await
		.unwrap();

	// Act
	let report = engine.duplicate_content(from, to, 0, None).await.unwrap();

	// Assert - same target set on the copy, no duplicate links
	let copy_id = report.copied[0];
	let mut linked = engine
		.store()
		.attachments_for(copy_id, AttachmentKind::File)
		.await
		.unwrap();
	linked.sort();
	let mut expected = vec![file_a, file_b];
	expected.sort();
	assert_eq!(linked, expected);
}

#[rstest]
#[tokio::test]
async fn test_one_failed_item_copy_does_not_stop_the_rest() {
	// Arrange - three items, seeded on the inner store; the wrapper only
	// counts the three copy applies and fails the middle one
	let inner = Arc::new(MemoryStore::new());
	let (from, to) = two_contents(inner.as_ref()).await;
	let mut batch = WriteBatch::new();
	for order in [0, 1, 2] {
		batch.push(WriteOp::InsertContentItem(item(from, order, None)));
	}
	inner.apply(batch).await.unwrap();
	let engine = Engine::new(FlakyStore::failing_on(inner.clone(), 2));

	// Act
	let report = engine.duplicate_content(from, to, 0, None).await.unwrap();

	// Assert - two copied, one warned, previous copies kept
	assert!(!report.is_complete());
	assert_eq!(report.copied.len(), 2);
	assert_eq!(report.warnings.len(), 1);
	let copies = inner.content_items(to).await.unwrap();
	assert_eq!(copies.len(), 2);
	let failed = report.warnings[0].source_item;
	assert!(inner.content_items(from).await.unwrap().iter().any(|i| i.id == failed));
}

#[rstest]
#[tokio::test]
async fn test_unknown_source_or_target_is_not_found() {
	let engine = engine();
	let (languages, _en, _fr) = two_languages();
	let page = engine
		.compose_resource(
			ResourceKind::Page,
			luthier_engine::ComposeRequest::default(),
			&languages,
		)
		.await
		.unwrap();
	let content_id = page.content_id.unwrap();

	let missing = Uuid::new_v4();
	assert!(engine
		.duplicate_content(missing, content_id, 0, None)
		.await
		.is_err());
	assert!(engine
		.duplicate_content(content_id, missing, 0, None)
		.await
		.is_err());
}
