//! Aggregate composer tests

mod common;

use common::{engine, two_languages, FlakyStore};
use luthier_core::{IntegrityViolation, ResourceKind, Slug};
use luthier_engine::{ComposeRequest, Engine, EngineError};
use luthier_store::{MemoryStore, Store, WriteBatch, WriteOp};
use rstest::rstest;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[rstest]
#[tokio::test]
async fn test_page_aggregate_is_fully_composed() {
	// Arrange
	let engine = engine();
	let (languages, en, _fr) = two_languages();
	let workspace = Some(Uuid::new_v4());
	let mut translations = HashMap::new();
	translations.insert(en, json!({"title": "Home"}));

	// Act
	let page = engine
		.compose_resource(
			ResourceKind::Page,
			ComposeRequest {
				workspace_id: workspace,
				translations,
				..Default::default()
			},
			&languages,
		)
		.await
		.unwrap();

	// Assert - every dependent exists and is referenced
	let store = engine.store();
	assert!(store.seo(page.seo_id.unwrap()).await.unwrap().is_some());
	assert!(store
		.content(page.content_id.unwrap())
		.await
		.unwrap()
		.is_some());
	assert!(store
		.tracking(page.tracking_id.unwrap())
		.await
		.unwrap()
		.is_some());

	// Assert - one translation row per enabled language, payload merged
	let rows = store.translations_for(page.id).await.unwrap();
	assert_eq!(rows.len(), 2);
	let en_row = rows.iter().find(|t| t.language_id == en).unwrap();
	assert_eq!(en_row.fields["title"], "Home");

	// Assert - slug derived in the second pass
	let slug = store.slug(page.slug_id.unwrap()).await.unwrap().unwrap();
	assert!(slug.path.unwrap().starts_with("/page-"));
}

#[rstest]
#[tokio::test]
async fn test_council_owns_tracking_but_no_content_bundle() {
	// Arrange
	let engine = engine();
	let (languages, _en, _fr) = two_languages();

	// Act
	let council = engine
		.compose_resource(ResourceKind::Council, ComposeRequest::default(), &languages)
		.await
		.unwrap();

	// Assert
	assert!(council.seo_id.is_none());
	assert!(council.content_id.is_none());
	assert!(council.slug_id.is_none());
	assert!(council.tracking_id.is_some());
	assert_eq!(
		engine.store().translations_for(council.id).await.unwrap().len(),
		2
	);
}

#[rstest]
#[tokio::test]
async fn test_failed_compose_persists_nothing() {
	// Arrange - the first apply (the aggregate batch) fails
	let inner = Arc::new(MemoryStore::new());
	let engine = Engine::new(FlakyStore::failing_on(inner.clone(), 1));
	let (languages, _en, _fr) = two_languages();

	// Act
	let result = engine
		.compose_resource(ResourceKind::Article, ComposeRequest::default(), &languages)
		.await;

	// Assert - typed failure, nothing visible to readers
	assert!(matches!(result, Err(EngineError::PartialAggregate { .. })));
	assert_eq!(inner.translation_count(), 0);
	assert!(inner
		.resources_in_scope(None, ResourceKind::Article)
		.await
		.unwrap()
		.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_slug_derivation_failure_is_absorbed_and_repairable() {
	// Arrange - the second apply (the slug update) fails
	let inner = Arc::new(MemoryStore::new());
	let engine = Engine::new(FlakyStore::failing_on(inner.clone(), 2));
	let (languages, _en, _fr) = two_languages();

	// Act - compose succeeds despite the derivation failure
	let page = engine
		.compose_resource(ResourceKind::Page, ComposeRequest::default(), &languages)
		.await
		.unwrap();

	// Assert - resource exists but has no pretty URL yet
	let slug_id = page.slug_id.unwrap();
	assert!(inner.slug(slug_id).await.unwrap().unwrap().path.is_none());

	// Act - explicit repair derives the path idempotently
	engine.repair_slug(page.id).await.unwrap();
	engine.repair_slug(page.id).await.unwrap();

	// Assert
	let slug = inner.slug(slug_id).await.unwrap().unwrap();
	assert!(slug.path.unwrap().starts_with("/page-"));
}

#[rstest]
#[tokio::test]
async fn test_repair_slug_surfaces_path_collision_as_integrity_error() {
	// Arrange - derivation is deferred (the slug update apply fails),
	// then another row occupies the exact path the repair would derive
	let inner = Arc::new(MemoryStore::new());
	let engine = Engine::new(FlakyStore::failing_on(inner.clone(), 2));
	let (languages, _en, _fr) = two_languages();
	let page = engine
		.compose_resource(ResourceKind::Page, ComposeRequest::default(), &languages)
		.await
		.unwrap();
	let taken = format!("/page-{}", &page.id.simple().to_string()[..12]);
	inner
		.apply(WriteBatch::single(WriteOp::InsertSlug(Slug {
			id: Uuid::new_v4(),
			workspace_id: None,
			path: Some(taken.clone()),
			slug: Some(taken.trim_start_matches('/').to_string()),
		})))
		.await
		.unwrap();

	// Act
	let result = engine.repair_slug(page.id).await;

	// Assert - the conflict comes back typed, not as a backend error
	assert!(matches!(
		result,
		Err(EngineError::Integrity(IntegrityViolation::SlugCollision { workspace: None, path }))
			if path == taken
	));
	// The slug row itself stays underived
	let slug = inner.slug(page.slug_id.unwrap()).await.unwrap().unwrap();
	assert!(slug.path.is_none());
}

#[rstest]
#[tokio::test]
async fn test_menu_item_child_slug_extends_parent_path() {
	// Arrange
	let engine = engine();
	let (languages, _en, _fr) = two_languages();
	let parent = engine
		.compose_resource(ResourceKind::MenuItem, ComposeRequest::default(), &languages)
		.await
		.unwrap();

	// Act
	let child = engine
		.compose_resource(
			ResourceKind::MenuItem,
			ComposeRequest {
				parent_id: Some(parent.id),
				..Default::default()
			},
			&languages,
		)
		.await
		.unwrap();

	// Assert - child path nests under the parent's derived path
	let store = engine.store();
	let parent_path = store
		.slug(parent.slug_id.unwrap())
		.await
		.unwrap()
		.unwrap()
		.path
		.unwrap();
	let child_path = store
		.slug(child.slug_id.unwrap())
		.await
		.unwrap()
		.unwrap()
		.path
		.unwrap();
	assert!(child_path.starts_with(&format!("{parent_path}/menu_item-")));
}

#[rstest]
#[tokio::test]
async fn test_record_visit_increments_counter() {
	// Arrange
	let engine = engine();
	let (languages, _en, _fr) = two_languages();
	let page = engine
		.compose_resource(ResourceKind::Page, ComposeRequest::default(), &languages)
		.await
		.unwrap();

	// Act
	engine.record_visit(page.id).await.unwrap();
	let visits = engine.record_visit(page.id).await.unwrap();

	// Assert
	assert_eq!(visits, 2);
	assert_eq!(
		engine
			.store()
			.tracking(page.tracking_id.unwrap())
			.await
			.unwrap()
			.unwrap()
			.visits,
		2
	);
}
