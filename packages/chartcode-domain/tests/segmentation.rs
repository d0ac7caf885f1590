use chartcode_domain::segment::{self, SegmentedNote, UNKNOWN_CHART_ID};

#[test]
fn splits_two_notes_in_order() {
	let raw = "\
HISTORY OF PRESENT ILLNESS
Note ID: note-hpi-case12
Patient reports chest pain
radiating to the left arm.

REVIEW OF SYSTEMS
Note ID: note-ros-case12
No fever. No cough.";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.chart_id, "case12");
	assert_eq!(chart.notes, vec![
		SegmentedNote {
			note_type: "HISTORY OF PRESENT ILLNESS".to_string(),
			note_id: "note-hpi-case12".to_string(),
			chart_id: "case12".to_string(),
			content: "Patient reports chest pain radiating to the left arm.".to_string(),
		},
		SegmentedNote {
			note_type: "REVIEW OF SYSTEMS".to_string(),
			note_id: "note-ros-case12".to_string(),
			chart_id: "case12".to_string(),
			content: "No fever. No cough.".to_string(),
		},
	]);
}

#[test]
fn drops_fragment_without_note_id() {
	let chart = segment::segment_chart("HEADER\nsome text");

	assert_eq!(chart.chart_id, UNKNOWN_CHART_ID);
	assert!(chart.notes.is_empty());
}

#[test]
fn drops_trailing_fragment_but_keeps_complete_notes() {
	let raw = "\
ALLERGIES
Note ID: note-allergy-case3
Penicillin.
ASSESSMENT
Dangling text with no identifier.";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.notes.len(), 1);
	assert_eq!(chart.notes[0].note_id, "note-allergy-case3");
	assert_eq!(chart.notes[0].content, "Penicillin.");
}

#[test]
fn chart_id_comes_from_first_note_id_suffix() {
	let raw = "\
HPI
Note ID: note-hpi-case12
text
ROS
Note ID: note-ros-case99
text";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.chart_id, "case12");
	assert!(chart.notes.iter().all(|note| note.chart_id == "case12"));
}

#[test]
fn chart_id_without_delimiter_is_the_whole_note_id() {
	let chart = segment::segment_chart("HPI\nNote ID: case7\ntext");

	assert_eq!(chart.chart_id, "case7");
}

#[test]
fn empty_input_yields_unknown_chart() {
	let chart = segment::segment_chart("");

	assert_eq!(chart.chart_id, UNKNOWN_CHART_ID);
	assert!(chart.notes.is_empty());
}

#[test]
fn blank_lines_never_terminate_a_note() {
	let raw = "\
PLAN
Note ID: note-plan-case5

Start aspirin.

Follow up in two weeks.";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.notes.len(), 1);
	assert_eq!(chart.notes[0].content, "Start aspirin. Follow up in two weeks.");
}

#[test]
fn content_before_the_id_line_is_not_accumulated() {
	let raw = "\
PLAN
ignored preamble
Note ID: note-plan-case5
kept";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.notes.len(), 1);
	assert_eq!(chart.notes[0].content, "kept");
}

#[test]
fn lines_with_separators_or_lowercase_are_not_headers() {
	let raw = "\
VITALS
Note ID: note-vitals-case8
BP: 120/80
HR 72
Temp NORMAL TODAY";
	let chart = segment::segment_chart(raw);

	// "BP: 120/80" stays content because of the separator. "HR 72" is all
	// uppercase and opens a fresh note, which never gets an ID and is
	// dropped along with everything after it.
	assert_eq!(chart.notes.len(), 1);
	assert_eq!(chart.notes[0].content, "BP: 120/80");
}

#[test]
fn uppercase_header_with_digits_still_opens_a_note() {
	let raw = "\
SECTION 2 LABS
Note ID: note-labs-case4
wbc normal";
	let chart = segment::segment_chart(raw);

	assert_eq!(chart.notes[0].note_type, "SECTION 2 LABS");
}

#[test]
fn note_id_line_without_open_header_never_emits() {
	let chart = segment::segment_chart("Note ID: note-orphan-case1\nsome content");

	assert!(chart.notes.is_empty());
	assert_eq!(chart.chart_id, UNKNOWN_CHART_ID);
}
