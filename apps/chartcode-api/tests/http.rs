use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use chartcode_api::{routes, state::AppState};
use chartcode_service::{CatalogEntry, ChartService};
use chartcode_testkit::{MemoryIndex, MemoryNoteStore, temp_path, test_config};

fn test_state(entries: Vec<CatalogEntry>) -> AppState {
	let service = ChartService::with_collaborators(
		test_config(temp_path("chartcode_http")),
		Arc::new(MemoryNoteStore::new()),
		Arc::new(MemoryIndex::seeded(entries)),
	);

	AppState { service: Arc::new(service) }
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let app = routes::router(test_state(Vec::new()));
	let response = app
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn segment_returns_ordered_notes() {
	let app = routes::router(test_state(Vec::new()));
	let payload = serde_json::json!({
		"raw_text": "HPI\nNote ID: note-hpi-case12\nchest pain\n\nROS\nNote ID: note-ros-case12\nno fever"
	});
	let response =
		app.oneshot(post_json("/v1/charts/segment", payload)).await.expect("Failed to segment.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["chart_id"], "case12");
	assert_eq!(json["notes"][0]["note_id"], "note-hpi-case12");
	assert_eq!(json["notes"][0]["content"], "chest pain");
	assert_eq!(json["notes"][1]["note_id"], "note-ros-case12");
}

#[tokio::test]
async fn upload_list_and_code_roundtrip() {
	let long_description =
		"Migraine, unspecified, not intractable, without status migrainosus".to_string();
	let state = test_state(vec![CatalogEntry {
		code: "G43.909".to_string(),
		short_description: "Migraine unsp".to_string(),
		long_description: long_description.clone(),
	}]);
	let upload_payload = serde_json::json!({
		"chart_id": "case12",
		"notes": [{
			"note_id": "note-hpi-case12",
			"chart_id": "case12",
			"note_type": "HPI",
			"content": long_description,
		}]
	});
	let response = routes::router(state.clone())
		.oneshot(post_json("/v1/charts/upload", upload_payload.clone()))
		.await
		.expect("Failed to upload.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response_json(response).await["inserted_count"], 1);

	// Re-uploading the same batch inserts nothing.
	let response = routes::router(state.clone())
		.oneshot(post_json("/v1/charts/upload", upload_payload))
		.await
		.expect("Failed to re-upload.");

	assert_eq!(response_json(response).await["inserted_count"], 0);

	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.uri("/v1/charts")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to list.");
	let json = response_json(response).await;

	assert_eq!(json["notes"].as_array().map(Vec::len), Some(1));
	assert!(json["notes"][0]["created_at"].is_string());

	let response = routes::router(state)
		.oneshot(post_json("/v1/charts/code", serde_json::json!({ "chart_id": "case12" })))
		.await
		.expect("Failed to code.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["chart_id"], "case12");
	assert_eq!(json["results"][0]["code"], "G43.909");
	assert_eq!(json["results"][0]["normalized_similarity"], 1.0);
}

#[tokio::test]
async fn upload_with_missing_field_stores_nothing() {
	let state = test_state(Vec::new());
	let payload = serde_json::json!({
		"chart_id": "case12",
		"notes": [
			{
				"note_id": "note-hpi-case12",
				"chart_id": "case12",
				"note_type": "HPI",
				"content": "fine",
			},
			{
				"note_id": "note-ros-case12",
				"chart_id": "case12",
				"note_type": "ROS",
			}
		]
	});
	let response = routes::router(state.clone())
		.oneshot(post_json("/v1/charts/upload", payload))
		.await
		.expect("Failed to upload.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = response_json(response).await;

	assert_eq!(json["error_code"], "missing_field");
	assert_eq!(json["fields"][0], "notes[1].content");

	let response = routes::router(state)
		.oneshot(
			Request::builder()
				.uri("/v1/charts")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to list.");

	assert_eq!(response_json(response).await["notes"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn coding_an_unknown_chart_is_404() {
	let app = routes::router(test_state(Vec::new()));
	let response = app
		.oneshot(post_json("/v1/charts/code", serde_json::json!({ "chart_id": "missing" })))
		.await
		.expect("Failed to code.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(response_json(response).await["error_code"], "not_found");
}

#[tokio::test]
async fn malformed_json_is_400() {
	let app = routes::router(test_state(Vec::new()));
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/charts/segment")
				.header("content-type", "application/json")
				.body(Body::from("{not json"))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call segment.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(response_json(response).await["error_code"], "malformed_input");
}
