//! Postgres-backed store
//!
//! SQL is built at runtime with `sea-query` and executed through `sqlx`;
//! a `WriteBatch` runs inside one transaction. Unique-violation errors
//! are mapped back to `StoreError::Conflict` by constraint name, which
//! is what lets the reconciler retry a lost create as a merge.

use async_trait::async_trait;
use luthier_core::{
	AttachmentKind, Content, ContentItem, Resource, ResourceKind, SeoRecord, Slug, TrackingRecord,
	Translation,
};
use sea_query::{Expr, Iden, OnConflict, Order, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

#[derive(Iden)]
enum Resources {
	Table,
	Id,
	Kind,
	WorkspaceId,
	ParentId,
	SeoId,
	ContentId,
	TrackingId,
	SlugId,
	CreatedBy,
	UpdatedBy,
	CreatedAt,
	UpdatedAt,
}

#[derive(Iden)]
enum SeoRecords {
	Table,
	Id,
	Title,
	Description,
	Keywords,
}

#[derive(Iden)]
enum Contents {
	Table,
	Id,
}

#[derive(Iden)]
enum ContentItems {
	Table,
	Id,
	ContentId,
	BlockKind,
	State,
	SortOrder,
	Props,
	CreatedBy,
	UpdatedBy,
	CreatedAt,
	UpdatedAt,
}

#[derive(Iden)]
enum TrackingRecords {
	Table,
	Id,
	Visits,
}

#[derive(Iden)]
enum Slugs {
	Table,
	Id,
	WorkspaceId,
	Path,
	Slug,
}

#[derive(Iden)]
enum Translations {
	Table,
	Id,
	OwnerId,
	LanguageId,
	Fields,
	CreatedAt,
	UpdatedAt,
}

#[derive(Iden)]
enum Attachments {
	Table,
	OwnerId,
	Kind,
	TargetId,
}

/// Connection settings for the Postgres store
#[derive(Debug, Clone, Deserialize)]
pub struct PgStoreConfig {
	/// Connection URL (postgres://...)
	pub url: String,

	/// Pool size cap
	#[serde(default = "PgStoreConfig::default_max_connections")]
	pub max_connections: u32,

	/// Connect timeout in seconds
	#[serde(default = "PgStoreConfig::default_connect_timeout_secs")]
	pub connect_timeout_secs: u64,
}

impl PgStoreConfig {
	fn default_max_connections() -> u32 {
		10
	}

	fn default_connect_timeout_secs() -> u64 {
		5
	}
}

/// Postgres `Store` implementation
#[derive(Debug, Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	/// Wrap an existing pool
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Connect using the given configuration
	pub async fn connect(config: &PgStoreConfig) -> StoreResult<Self> {
		let pool = PgPoolOptions::new()
			.max_connections(config.max_connections)
			.acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
			.connect(&config.url)
			.await
			.map_err(map_sqlx_err)?;
		debug!(max_connections = config.max_connections, "connected to postgres");
		Ok(Self { pool })
	}

	/// Run the bundled schema migrations
	pub async fn migrate(&self) -> StoreResult<()> {
		sqlx::migrate!()
			.run(&self.pool)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;
		info!("schema migrations applied");
		Ok(())
	}

	/// The underlying pool
	pub fn pool(&self) -> &PgPool {
		&self.pool
	}
}

fn map_sqlx_err(e: sqlx::Error) -> StoreError {
	if let sqlx::Error::Database(db) = &e {
		if db.is_unique_violation() {
			return StoreError::Conflict {
				constraint: db.constraint().unwrap_or("unknown").to_string(),
			};
		}
	}
	StoreError::Backend(e.to_string())
}

fn parse_col<T: FromStr>(row: &PgRow, col: &str) -> StoreResult<T> {
	let raw: String = row
		.try_get(col)
		.map_err(|e| StoreError::Backend(e.to_string()))?;
	T::from_str(&raw).map_err(|_| StoreError::Backend(format!("bad {col} value: {raw}")))
}

fn resource_from_row(row: &PgRow) -> StoreResult<Resource> {
	Ok(Resource {
		id: get(row, "id")?,
		kind: parse_col(row, "kind")?,
		workspace_id: get(row, "workspace_id")?,
		parent_id: get(row, "parent_id")?,
		seo_id: get(row, "seo_id")?,
		content_id: get(row, "content_id")?,
		tracking_id: get(row, "tracking_id")?,
		slug_id: get(row, "slug_id")?,
		created_by: get(row, "created_by")?,
		updated_by: get(row, "updated_by")?,
		created_at: get(row, "created_at")?,
		updated_at: get(row, "updated_at")?,
	})
}

fn item_from_row(row: &PgRow) -> StoreResult<ContentItem> {
	Ok(ContentItem {
		id: get(row, "id")?,
		content_id: get(row, "content_id")?,
		block_kind: get(row, "block_kind")?,
		state: parse_col(row, "state")?,
		order: get(row, "sort_order")?,
		props: get(row, "props")?,
		created_by: get(row, "created_by")?,
		updated_by: get(row, "updated_by")?,
		created_at: get(row, "created_at")?,
		updated_at: get(row, "updated_at")?,
	})
}

fn translation_from_row(row: &PgRow) -> StoreResult<Translation> {
	Ok(Translation {
		id: get(row, "id")?,
		owner_id: get(row, "owner_id")?,
		language_id: get(row, "language_id")?,
		fields: get(row, "fields")?,
		created_at: get(row, "created_at")?,
		updated_at: get(row, "updated_at")?,
	})
}

fn get<'r, T>(row: &'r PgRow, col: &str) -> StoreResult<T>
where
	T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
	row.try_get(col)
		.map_err(|e| StoreError::Backend(e.to_string()))
}

async fn exec_op(
	tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
	op: WriteOp,
) -> StoreResult<()> {
	let (sql, values) = match op {
		WriteOp::InsertResource(r) => Query::insert()
			.into_table(Resources::Table)
			.columns([
				Resources::Id,
				Resources::Kind,
				Resources::WorkspaceId,
				Resources::ParentId,
				Resources::SeoId,
				Resources::ContentId,
				Resources::TrackingId,
				Resources::SlugId,
				Resources::CreatedBy,
				Resources::UpdatedBy,
				Resources::CreatedAt,
				Resources::UpdatedAt,
			])
			.values_panic([
				r.id.into(),
				r.kind.as_str().into(),
				r.workspace_id.into(),
				r.parent_id.into(),
				r.seo_id.into(),
				r.content_id.into(),
				r.tracking_id.into(),
				r.slug_id.into(),
				r.created_by.into(),
				r.updated_by.into(),
				r.created_at.into(),
				r.updated_at.into(),
			])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::UpdateResource(r) => Query::update()
			.table(Resources::Table)
			.values([
				(Resources::WorkspaceId, r.workspace_id.into()),
				(Resources::ParentId, r.parent_id.into()),
				(Resources::SeoId, r.seo_id.into()),
				(Resources::ContentId, r.content_id.into()),
				(Resources::TrackingId, r.tracking_id.into()),
				(Resources::SlugId, r.slug_id.into()),
				(Resources::UpdatedBy, r.updated_by.into()),
				(Resources::UpdatedAt, r.updated_at.into()),
			])
			.and_where(Expr::col(Resources::Id).eq(r.id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteResource(id) => Query::delete()
			.from_table(Resources::Table)
			.and_where(Expr::col(Resources::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertSeo(s) => Query::insert()
			.into_table(SeoRecords::Table)
			.columns([
				SeoRecords::Id,
				SeoRecords::Title,
				SeoRecords::Description,
				SeoRecords::Keywords,
			])
			.values_panic([
				s.id.into(),
				s.title.into(),
				s.description.into(),
				s.keywords.into(),
			])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteSeo(id) => Query::delete()
			.from_table(SeoRecords::Table)
			.and_where(Expr::col(SeoRecords::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertContent(c) => Query::insert()
			.into_table(Contents::Table)
			.columns([Contents::Id])
			.values_panic([c.id.into()])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteContent(id) => Query::delete()
			.from_table(Contents::Table)
			.and_where(Expr::col(Contents::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertContentItem(i) => Query::insert()
			.into_table(ContentItems::Table)
			.columns([
				ContentItems::Id,
				ContentItems::ContentId,
				ContentItems::BlockKind,
				ContentItems::State,
				ContentItems::SortOrder,
				ContentItems::Props,
				ContentItems::CreatedBy,
				ContentItems::UpdatedBy,
				ContentItems::CreatedAt,
				ContentItems::UpdatedAt,
			])
			.values_panic([
				i.id.into(),
				i.content_id.into(),
				i.block_kind.into(),
				i.state.as_str().into(),
				i.order.into(),
				i.props.into(),
				i.created_by.into(),
				i.updated_by.into(),
				i.created_at.into(),
				i.updated_at.into(),
			])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteContentItem(id) => Query::delete()
			.from_table(ContentItems::Table)
			.and_where(Expr::col(ContentItems::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertTracking(t) => Query::insert()
			.into_table(TrackingRecords::Table)
			.columns([TrackingRecords::Id, TrackingRecords::Visits])
			.values_panic([t.id.into(), t.visits.into()])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::UpdateTracking(t) => Query::update()
			.table(TrackingRecords::Table)
			.values([(TrackingRecords::Visits, t.visits.into())])
			.and_where(Expr::col(TrackingRecords::Id).eq(t.id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteTracking(id) => Query::delete()
			.from_table(TrackingRecords::Table)
			.and_where(Expr::col(TrackingRecords::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertSlug(s) => Query::insert()
			.into_table(Slugs::Table)
			.columns([Slugs::Id, Slugs::WorkspaceId, Slugs::Path, Slugs::Slug])
			.values_panic([
				s.id.into(),
				s.workspace_id.into(),
				s.path.into(),
				s.slug.into(),
			])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::UpdateSlug(s) => Query::update()
			.table(Slugs::Table)
			.values([
				(Slugs::Path, s.path.into()),
				(Slugs::Slug, s.slug.into()),
			])
			.and_where(Expr::col(Slugs::Id).eq(s.id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteSlug(id) => Query::delete()
			.from_table(Slugs::Table)
			.and_where(Expr::col(Slugs::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::InsertTranslation(t) => Query::insert()
			.into_table(Translations::Table)
			.columns([
				Translations::Id,
				Translations::OwnerId,
				Translations::LanguageId,
				Translations::Fields,
				Translations::CreatedAt,
				Translations::UpdatedAt,
			])
			.values_panic([
				t.id.into(),
				t.owner_id.into(),
				t.language_id.into(),
				t.fields.into(),
				t.created_at.into(),
				t.updated_at.into(),
			])
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::UpdateTranslation(t) => Query::update()
			.table(Translations::Table)
			.values([
				(Translations::Fields, t.fields.into()),
				(Translations::UpdatedAt, t.updated_at.into()),
			])
			.and_where(Expr::col(Translations::Id).eq(t.id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::DeleteTranslation(id) => Query::delete()
			.from_table(Translations::Table)
			.and_where(Expr::col(Translations::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::Attach(a) => Query::insert()
			.into_table(Attachments::Table)
			.columns([
				Attachments::OwnerId,
				Attachments::Kind,
				Attachments::TargetId,
			])
			.values_panic([
				a.owner_id.into(),
				a.kind.as_str().into(),
				a.target_id.into(),
			])
			.on_conflict(
				OnConflict::columns([
					Attachments::OwnerId,
					Attachments::Kind,
					Attachments::TargetId,
				])
				.do_nothing()
				.to_owned(),
			)
			.build_sqlx(PostgresQueryBuilder),
		WriteOp::Detach {
			owner_id,
			kind,
			target_id,
		} => {
			let mut stmt = Query::delete();
			stmt.from_table(Attachments::Table)
				.and_where(Expr::col(Attachments::OwnerId).eq(owner_id))
				.and_where(Expr::col(Attachments::Kind).eq(kind.as_str()));
			if let Some(target) = target_id {
				stmt.and_where(Expr::col(Attachments::TargetId).eq(target));
			}
			stmt.build_sqlx(PostgresQueryBuilder)
		}
	};

	sqlx::query_with(&sql, values)
		.execute(&mut **tx)
		.await
		.map_err(map_sqlx_err)?;
	Ok(())
}

#[async_trait]
impl Store for PgStore {
	async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
		let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
		for op in batch.into_ops() {
			exec_op(&mut tx, op).await?;
		}
		tx.commit().await.map_err(map_sqlx_err)
	}

	async fn resource(&self, id: Uuid) -> StoreResult<Option<Resource>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(Resources::Table)
			.and_where(Expr::col(Resources::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder);
		let row = sqlx::query_with(&sql, values)
			.fetch_optional(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		row.as_ref().map(resource_from_row).transpose()
	}

	async fn resources_in_scope(
		&self,
		workspace_id: Option<Uuid>,
		kind: ResourceKind,
	) -> StoreResult<Vec<Resource>> {
		let mut stmt = Query::select();
		stmt.expr(Expr::asterisk())
			.from(Resources::Table)
			.and_where(Expr::col(Resources::Kind).eq(kind.as_str()));
		match workspace_id {
			Some(ws) => {
				stmt.and_where(Expr::col(Resources::WorkspaceId).eq(ws));
			}
			None => {
				stmt.and_where(Expr::col(Resources::WorkspaceId).is_null());
			}
		}
		let (sql, values) = stmt.build_sqlx(PostgresQueryBuilder);
		let rows = sqlx::query_with(&sql, values)
			.fetch_all(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		rows.iter().map(resource_from_row).collect()
	}

	async fn seo(&self, id: Uuid) -> StoreResult<Option<SeoRecord>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(SeoRecords::Table)
			.and_where(Expr::col(SeoRecords::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder);
		let row = sqlx::query_with(&sql, values)
			.fetch_optional(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		row.map(|r| {
			Ok(SeoRecord {
				id: get(&r, "id")?,
				title: get(&r, "title")?,
				description: get(&r, "description")?,
				keywords: get(&r, "keywords")?,
			})
		})
		.transpose()
	}

	async fn content(&self, id: Uuid) -> StoreResult<Option<Content>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(Contents::Table)
			.and_where(Expr::col(Contents::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder);
		let row = sqlx::query_with(&sql, values)
			.fetch_optional(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		row.map(|r| Ok(Content { id: get(&r, "id")? })).transpose()
	}

	async fn tracking(&self, id: Uuid) -> StoreResult<Option<TrackingRecord>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(TrackingRecords::Table)
			.and_where(Expr::col(TrackingRecords::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder);
		let row = sqlx::query_with(&sql, values)
			.fetch_optional(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		row.map(|r| {
			Ok(TrackingRecord {
				id: get(&r, "id")?,
				visits: get(&r, "visits")?,
			})
		})
		.transpose()
	}

	async fn slug(&self, id: Uuid) -> StoreResult<Option<Slug>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(Slugs::Table)
			.and_where(Expr::col(Slugs::Id).eq(id))
			.build_sqlx(PostgresQueryBuilder);
		let row = sqlx::query_with(&sql, values)
			.fetch_optional(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		row.map(|r| {
			Ok(Slug {
				id: get(&r, "id")?,
				workspace_id: get(&r, "workspace_id")?,
				path: get(&r, "path")?,
				slug: get(&r, "slug")?,
			})
		})
		.transpose()
	}

	async fn translations_for(&self, owner_id: Uuid) -> StoreResult<Vec<Translation>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(Translations::Table)
			.and_where(Expr::col(Translations::OwnerId).eq(owner_id))
			.build_sqlx(PostgresQueryBuilder);
		let rows = sqlx::query_with(&sql, values)
			.fetch_all(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		rows.iter().map(translation_from_row).collect()
	}

	async fn content_items(&self, content_id: Uuid) -> StoreResult<Vec<ContentItem>> {
		let (sql, values) = Query::select()
			.expr(Expr::asterisk())
			.from(ContentItems::Table)
			.and_where(Expr::col(ContentItems::ContentId).eq(content_id))
			.order_by(ContentItems::SortOrder, Order::Asc)
			.build_sqlx(PostgresQueryBuilder);
		let rows = sqlx::query_with(&sql, values)
			.fetch_all(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		rows.iter().map(item_from_row).collect()
	}

	async fn attachments_for(
		&self,
		owner_id: Uuid,
		kind: AttachmentKind,
	) -> StoreResult<Vec<Uuid>> {
		let (sql, values) = Query::select()
			.column(Attachments::TargetId)
			.from(Attachments::Table)
			.and_where(Expr::col(Attachments::OwnerId).eq(owner_id))
			.and_where(Expr::col(Attachments::Kind).eq(kind.as_str()))
			.build_sqlx(PostgresQueryBuilder);
		let rows = sqlx::query_with(&sql, values)
			.fetch_all(&self.pool)
			.await
			.map_err(map_sqlx_err)?;
		rows.iter().map(|r| get(r, "target_id")).collect()
	}
}
