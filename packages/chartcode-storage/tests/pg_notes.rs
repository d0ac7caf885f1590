use std::env;

use time::OffsetDateTime;

use chartcode_storage::{
	db::Db,
	models::NewChartNote,
	notes,
};

fn env_dsn() -> Option<String> {
	env::var("CHARTCODE_PG_DSN").ok()
}

fn new_note(note_id: &str, chart_id: &str, content: &str) -> NewChartNote {
	NewChartNote {
		note_id: note_id.to_string(),
		chart_id: chart_id.to_string(),
		note_type: "HPI".to_string(),
		content: content.to_string(),
		created_at: OffsetDateTime::now_utc(),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CHARTCODE_PG_DSN to run."]
async fn upsert_is_idempotent_and_ordering_is_stable() {
	let Some(dsn) = env_dsn() else {
		eprintln!("Skipping Postgres tests; set CHARTCODE_PG_DSN to run this test.");

		return;
	};
	let cfg = chartcode_config::Postgres { dsn, pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let chart_id = format!("chart-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
	let first = new_note(&format!("note-a-{chart_id}"), &chart_id, "first content");
	let second = new_note(&format!("note-b-{chart_id}"), &chart_id, "second content");

	assert!(notes::upsert_note_if_absent(&db, &first).await.expect("Insert failed."));
	assert!(notes::upsert_note_if_absent(&db, &second).await.expect("Insert failed."));

	// Same key again, mutated content: no insert, no overwrite.
	let mut duplicate = first.clone();

	duplicate.content = "mutated content".to_string();

	assert!(!notes::upsert_note_if_absent(&db, &duplicate).await.expect("Upsert failed."));

	let stored = notes::notes_by_chart(&db, &chart_id).await.expect("Fetch failed.");

	assert_eq!(stored.len(), 2);
	assert_eq!(stored[0].note_id, first.note_id);
	assert_eq!(stored[0].content, "first content");
	assert_eq!(stored[1].note_id, second.note_id);
	assert!(stored[0].row_id < stored[1].row_id);
}
