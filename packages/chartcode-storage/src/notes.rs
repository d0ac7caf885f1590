use crate::{
	Result,
	db::Db,
	models::{ChartNote, NewChartNote},
};

/// Inserts a note unless its `note_id` already exists. Returns whether a new
/// row was created. A duplicate key is "not inserted", never an error, and
/// the pre-existing row is left untouched.
pub async fn upsert_note_if_absent(db: &Db, note: &NewChartNote) -> Result<bool> {
	let result = sqlx::query(
		"\
INSERT INTO chart_notes (
	note_id,
	chart_id,
	note_type,
	content,
	created_at
)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (note_id) DO NOTHING",
	)
	.bind(note.note_id.as_str())
	.bind(note.chart_id.as_str())
	.bind(note.note_type.as_str())
	.bind(note.content.as_str())
	.bind(note.created_at)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// All notes of one chart, in insertion order.
pub async fn notes_by_chart(db: &Db, chart_id: &str) -> Result<Vec<ChartNote>> {
	let notes = sqlx::query_as::<_, ChartNote>(
		"\
SELECT row_id, note_id, chart_id, note_type, content, created_at
FROM chart_notes
WHERE chart_id = $1
ORDER BY row_id",
	)
	.bind(chart_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(notes)
}

/// Full dump of the repository, in insertion order.
pub async fn all_notes(db: &Db) -> Result<Vec<ChartNote>> {
	let notes = sqlx::query_as::<_, ChartNote>(
		"\
SELECT row_id, note_id, chart_id, note_type, content, created_at
FROM chart_notes
ORDER BY row_id",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(notes)
}
