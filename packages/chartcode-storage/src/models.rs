use time::OffsetDateTime;

/// One stored clinical note. `row_id` is assigned by the database and
/// reflects insertion order within the repository.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ChartNote {
	pub row_id: i64,
	pub note_id: String,
	pub chart_id: String,
	pub note_type: String,
	pub content: String,
	pub created_at: OffsetDateTime,
}

/// A note about to be inserted, before the database assigns its row id.
#[derive(Clone, Debug)]
pub struct NewChartNote {
	pub note_id: String,
	pub chart_id: String,
	pub note_type: String,
	pub content: String,
	pub created_at: OffsetDateTime,
}
