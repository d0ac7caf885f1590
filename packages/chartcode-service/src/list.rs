use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ChartService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListedNote {
	pub id: i64,
	pub chart_id: String,
	pub note_id: String,
	pub note_type: String,
	pub content: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
	pub notes: Vec<ListedNote>,
}

impl ChartService {
	pub async fn list_notes(&self) -> Result<ListResponse> {
		let rows = self.notes.list_all().await?;
		let notes = rows
			.into_iter()
			.map(|note| ListedNote {
				id: note.row_id,
				chart_id: note.chart_id,
				note_id: note.note_id,
				note_type: note.note_type,
				content: note.content,
				created_at: note.created_at,
			})
			.collect();

		Ok(ListResponse { notes })
	}
}
