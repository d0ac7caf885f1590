/// DDL applied at startup. `row_id` is the repository's stable insertion
/// order; `note_id` carries the uniqueness invariant that makes re-ingestion
/// a no-op.
pub fn render_schema() -> String {
	"\
CREATE TABLE IF NOT EXISTS chart_notes (
	row_id BIGSERIAL PRIMARY KEY,
	note_id TEXT NOT NULL UNIQUE,
	chart_id TEXT NOT NULL,
	note_type TEXT NOT NULL,
	content TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chart_notes_chart_id ON chart_notes (chart_id)"
		.to_string()
}
