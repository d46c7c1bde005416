//! Translation reconciler
//!
//! Keeps a one-row-per-language translation set complete and consistent
//! for any translatable entity. Current rows are loaded once per call
//! and reused in memory — never re-queried per language. The reconciler
//! never deletes translations as a side effect of an update; languages
//! absent from a payload are left untouched.
//!
//! Two concurrent calls racing on the same missing language can both
//! decide to create; the store's `(owner_id, language_id)` uniqueness
//! constraint makes the loser's insert fail closed, and the loser
//! retries as a merge against the row that won.

use luthier_core::{LanguageRegistry, Translation};
use luthier_store::error::constraints;
use luthier_store::{Store, StoreError, WriteBatch, WriteOp};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::Engine;

impl<S: Store> Engine<S> {
	/// Merge per-language payloads into an entity's translation rows
	///
	/// Payload languages that are not currently enabled are skipped
	/// silently (stale ids from a removed language are not an error).
	pub async fn reconcile_translations(
		&self,
		owner_id: Uuid,
		payloads: &HashMap<Uuid, JsonValue>,
		languages: &LanguageRegistry,
	) -> Result<()> {
		let now = self.clock().now();

		// Query once, then reuse in memory
		let mut by_language: HashMap<Uuid, Translation> = self
			.store()
			.translations_for(owner_id)
			.await?
			.into_iter()
			.map(|t| (t.language_id, t))
			.collect();

		// Sorted for a deterministic write order
		let mut payload_languages: Vec<Uuid> = payloads.keys().copied().collect();
		payload_languages.sort();

		for language_id in payload_languages {
			let fields = &payloads[&language_id];
			if !languages.contains(language_id) {
				debug!(owner = %owner_id, language = %language_id, "skipping payload for disabled language");
				continue;
			}

			if let Some(row) = by_language.get_mut(&language_id) {
				row.merge_fields(fields, now);
				self.store()
					.apply(WriteBatch::single(WriteOp::UpdateTranslation(row.clone())))
					.await?;
				continue;
			}

			let mut row = Translation::empty(owner_id, language_id, now);
			row.merge_fields(fields, now);
			match self
				.store()
				.apply(WriteBatch::single(WriteOp::InsertTranslation(row.clone())))
				.await
			{
				Ok(()) => {
					by_language.insert(language_id, row);
				}
				Err(StoreError::Conflict { constraint })
					if constraint == constraints::TRANSLATION_OWNER_LANGUAGE =>
				{
					// Lost the create race: merge into the winner's row
					debug!(owner = %owner_id, language = %language_id, "translation create lost race; retrying as merge");
					let mut winner = self
						.find_translation(owner_id, language_id)
						.await?
						.unwrap_or(row);
					winner.merge_fields(fields, now);
					self.store()
						.apply(WriteBatch::single(WriteOp::UpdateTranslation(
							winner.clone(),
						)))
						.await?;
					by_language.insert(language_id, winner);
				}
				Err(e) => return Err(e.into()),
			}
		}
		Ok(())
	}

	/// Ensure every enabled language has at least an empty translation
	/// row for the entity
	///
	/// Runs at resource-creation time and is safe to re-run at any
	/// time; languages enabled after the entity already existed get
	/// their missing rows here. Returns the number of rows created.
	pub async fn backfill_translations(
		&self,
		owner_id: Uuid,
		languages: &LanguageRegistry,
	) -> Result<usize> {
		let now = self.clock().now();
		let existing: Vec<Uuid> = self
			.store()
			.translations_for(owner_id)
			.await?
			.into_iter()
			.map(|t| t.language_id)
			.collect();

		let mut missing: Vec<Uuid> = languages
			.ids()
			.filter(|id| !existing.contains(id))
			.collect();
		missing.sort();

		let mut created = 0;
		for language_id in missing {
			let row = Translation::empty(owner_id, language_id, now);
			match self
				.store()
				.apply(WriteBatch::single(WriteOp::InsertTranslation(row)))
				.await
			{
				Ok(()) => created += 1,
				Err(StoreError::Conflict { constraint })
					if constraint == constraints::TRANSLATION_OWNER_LANGUAGE =>
				{
					// A concurrent backfill/reconcile won; the row exists
				}
				Err(e) => return Err(e.into()),
			}
		}
		Ok(created)
	}

	async fn find_translation(
		&self,
		owner_id: Uuid,
		language_id: Uuid,
	) -> Result<Option<Translation>> {
		Ok(self
			.store()
			.translations_for(owner_id)
			.await?
			.into_iter()
			.find(|t| t.language_id == language_id))
	}
}
