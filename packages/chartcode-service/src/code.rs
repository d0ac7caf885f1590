use serde::{Deserialize, Serialize};

use chartcode_domain::score;

use crate::{ChartService, Error, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeRequest {
	pub chart_id: Option<String>,
}

/// The coding outcome for one note. All matched fields are null when the
/// index returned nothing for the note; that is a successful assignment,
/// distinct from the index being unreachable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeAssignment {
	pub note_id: String,
	pub note_type: String,
	pub code: Option<String>,
	pub short_description: Option<String>,
	pub long_description: Option<String>,
	pub raw_score: Option<f64>,
	pub normalized_similarity: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeResponse {
	pub chart_id: String,
	pub results: Vec<CodeAssignment>,
}

impl ChartService {
	/// Assigns the best-matching catalog code to every note of a chart,
	/// preserving the repository's note order. A chart with no stored notes
	/// is a not-found error, never an empty result.
	pub async fn code_chart(&self, req: CodeRequest) -> Result<CodeResponse> {
		let Some(chart_id) = req.chart_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
		else {
			return Err(Error::MissingField { field: "chart_id".to_string() });
		};
		let notes = self.notes.find_by_chart(chart_id).await?;

		if notes.is_empty() {
			return Err(Error::NotFound {
				message: format!("No notes found for chart_id={chart_id}."),
			});
		}

		let mut results = Vec::with_capacity(notes.len());

		for note in notes {
			let matches = self.index.query(note.content.as_str(), 1).await?;
			let assignment = match matches.into_iter().next() {
				Some(matched) => CodeAssignment {
					note_id: note.note_id,
					note_type: note.note_type,
					code: Some(matched.code),
					short_description: Some(matched.short_description),
					long_description: Some(matched.long_description),
					raw_score: Some(matched.raw_score),
					normalized_similarity: score::normalized_similarity(matched.raw_score),
				},
				None => CodeAssignment {
					note_id: note.note_id,
					note_type: note.note_type,
					code: None,
					short_description: None,
					long_description: None,
					raw_score: None,
					normalized_similarity: None,
				},
			};

			results.push(assignment);
		}

		tracing::info!(chart_id, results = results.len(), "Chart coded.");

		Ok(CodeResponse { chart_id: chart_id.to_string(), results })
	}
}
