use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use chartcode_storage::models::NewChartNote;

use crate::{ChartService, Error, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestRequest {
	pub chart_id: Option<String>,
	#[serde(default)]
	pub notes: Vec<IngestNoteInput>,
}

/// Every field is optional at the wire so that a missing one surfaces as a
/// field-level error instead of a deserialization failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestNoteInput {
	pub note_id: Option<String>,
	pub chart_id: Option<String>,
	pub note_type: Option<String>,
	pub content: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestResponse {
	pub inserted_count: u64,
}

impl ChartService {
	/// Stores the unseen notes of a batch. The whole batch is validated
	/// before the first write: one note missing a required field aborts the
	/// request and nothing is stored. Notes whose `note_id` already exists
	/// are skipped and not counted.
	pub async fn ingest(&self, req: IngestRequest) -> Result<IngestResponse> {
		let base_now = OffsetDateTime::now_utc();
		let records = validated_notes(&req, base_now)?;
		let mut inserted_count = 0_u64;

		for record in &records {
			let inserted = self.notes.upsert_if_absent(record).await?;

			if inserted {
				inserted_count += 1;
			} else {
				tracing::debug!(note_id = %record.note_id, "Duplicate note_id; insert skipped.");
			}
		}

		tracing::info!(
			received = records.len(),
			inserted = inserted_count,
			"Chart notes ingested."
		);

		Ok(IngestResponse { inserted_count })
	}
}

fn validated_notes(req: &IngestRequest, base_now: OffsetDateTime) -> Result<Vec<NewChartNote>> {
	if req.chart_id.as_deref().map(str::trim).unwrap_or("").is_empty() {
		return Err(Error::MissingField { field: "chart_id".to_string() });
	}

	let mut records = Vec::with_capacity(req.notes.len());

	for (idx, note) in req.notes.iter().enumerate() {
		let note_id = require_field(note.note_id.as_ref(), idx, "note_id")?;
		let chart_id = require_field(note.chart_id.as_ref(), idx, "chart_id")?;
		let note_type = require_field(note.note_type.as_ref(), idx, "note_type")?;
		let content = require_field(note.content.as_ref(), idx, "content")?;

		// Offset keeps creation timestamps strictly increasing within the
		// batch even when the clock does not tick between notes.
		records.push(NewChartNote {
			note_id: note_id.clone(),
			chart_id: chart_id.clone(),
			note_type: note_type.clone(),
			content: content.clone(),
			created_at: base_now + Duration::microseconds(idx as i64),
		});
	}

	Ok(records)
}

fn require_field<'a>(value: Option<&'a String>, idx: usize, name: &str) -> Result<&'a String> {
	value.ok_or_else(|| Error::MissingField { field: format!("notes[{idx}].{name}") })
}
