//! Line-oriented segmentation of raw chart dumps into discrete notes.

use serde::{Deserialize, Serialize};

/// Sentinel chart identifier used when a dump yields no notes.
pub const UNKNOWN_CHART_ID: &str = "unknown";

const NOTE_ID_MARKER: &str = "Note ID:";
const FIELD_SEPARATOR: char = ':';
const CHART_ID_DELIMITER: char = '-';

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedNote {
	pub note_type: String,
	pub note_id: String,
	pub chart_id: String,
	pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedChart {
	pub chart_id: String,
	pub notes: Vec<SegmentedNote>,
}

#[derive(Default)]
struct Accumulator {
	note_type: Option<String>,
	note_id: Option<String>,
	content_lines: Vec<String>,
}
impl Accumulator {
	/// Finalizes the in-progress note. A note that never received an ID line
	/// is dropped, content included.
	fn close(&mut self, out: &mut Vec<(String, String, String)>) {
		let note_type = self.note_type.take();
		let note_id = self.note_id.take();
		let content = self.content_lines.join(" ");

		self.content_lines.clear();

		if let (Some(note_type), Some(note_id)) = (note_type, note_id) {
			out.push((note_type, note_id, content));
		}
	}
}

/// Splits a raw chart dump into notes and derives the chart identifier.
///
/// Single forward pass over the input lines, one line of lookahead at most:
/// an all-uppercase line with no `:` opens a new note, a `Note ID:` line
/// assigns its identifier, and every other non-blank line accumulates into
/// the content of the note currently carrying an identifier. Blank lines
/// separate nothing.
///
/// The chart identifier is the segment after the last `-` in the first
/// emitted note's identifier. This leans on the upstream naming convention
/// for note identifiers and has no stronger contract; dumps that produce no
/// notes get [`UNKNOWN_CHART_ID`].
pub fn segment_chart(raw_text: &str) -> SegmentedChart {
	let mut emitted = Vec::new();
	let mut current = Accumulator::default();

	for line in raw_text.lines() {
		let trimmed = line.trim();

		if trimmed.is_empty() {
			continue;
		}
		if is_header(trimmed) {
			current.close(&mut emitted);
			current.note_type = Some(trimmed.to_string());
		} else if let Some(rest) = trimmed.strip_prefix(NOTE_ID_MARKER) {
			current.note_id = Some(rest.trim().to_string());
		} else if current.note_id.is_some() {
			current.content_lines.push(trimmed.to_string());
		}
	}

	current.close(&mut emitted);

	let chart_id = emitted
		.first()
		.and_then(|(_, note_id, _)| note_id.rsplit(CHART_ID_DELIMITER).next())
		.unwrap_or(UNKNOWN_CHART_ID)
		.to_string();
	let notes = emitted
		.into_iter()
		.map(|(note_type, note_id, content)| SegmentedNote {
			note_type,
			note_id,
			chart_id: chart_id.clone(),
			content,
		})
		.collect();

	SegmentedChart { chart_id, notes }
}

/// A header line is entirely uppercase (ignoring whitespace and other
/// uncased characters, but requiring at least one cased letter) and carries
/// no field separator.
fn is_header(trimmed: &str) -> bool {
	if trimmed.contains(FIELD_SEPARATOR) {
		return false;
	}

	let mut has_cased = false;

	for ch in trimmed.chars() {
		if ch.is_lowercase() {
			return false;
		}
		if ch.is_uppercase() {
			has_cased = true;
		}
	}

	has_cased
}
