//! In-memory collaborator fakes so service and API behavior is testable
//! without a live Postgres or Qdrant.

use std::{
	collections::HashSet,
	path::PathBuf,
	sync::{
		Mutex,
		atomic::{AtomicU64, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::eyre;
use serde_json::Map;

use chartcode_config::{
	Catalog, Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Service, Storage,
};
use chartcode_service::{BoxFuture, CatalogEntry, IndexMatch, NoteStore, SemanticIndex};
use chartcode_storage::models::{ChartNote, NewChartNote};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A note repository backed by a vector, preserving insertion order and
/// deduplicating on `note_id` exactly like the Postgres store.
#[derive(Default)]
pub struct MemoryNoteStore {
	rows: Mutex<Vec<ChartNote>>,
}
impl MemoryNoteStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn row_count(&self) -> usize {
		self.rows.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
impl NoteStore for MemoryNoteStore {
	fn upsert_if_absent<'a>(
		&'a self,
		note: &'a NewChartNote,
	) -> BoxFuture<'a, color_eyre::Result<bool>> {
		Box::pin(async move {
			let mut rows = self.rows.lock().unwrap_or_else(|err| err.into_inner());

			if rows.iter().any(|row| row.note_id == note.note_id) {
				return Ok(false);
			}

			let row_id = rows.len() as i64 + 1;

			rows.push(ChartNote {
				row_id,
				note_id: note.note_id.clone(),
				chart_id: note.chart_id.clone(),
				note_type: note.note_type.clone(),
				content: note.content.clone(),
				created_at: note.created_at,
			});

			Ok(true)
		})
	}

	fn find_by_chart<'a>(
		&'a self,
		chart_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>> {
		Box::pin(async move {
			let rows = self.rows.lock().unwrap_or_else(|err| err.into_inner());

			Ok(rows.iter().filter(|row| row.chart_id == chart_id).cloned().collect())
		})
	}

	fn list_all<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>> {
		Box::pin(async move {
			Ok(self.rows.lock().unwrap_or_else(|err| err.into_inner()).clone())
		})
	}
}

/// A semantic index ranking catalog entries by a deterministic token-overlap
/// distance: zero for an exact text match, growing toward one as the
/// queried text and the indexed description share fewer tokens.
#[derive(Default)]
pub struct MemoryIndex {
	entries: Mutex<Vec<CatalogEntry>>,
}
impl MemoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn seeded(entries: Vec<CatalogEntry>) -> Self {
		Self { entries: Mutex::new(entries) }
	}
}
impl SemanticIndex for MemoryIndex {
	fn index<'a>(&'a self, entries: &'a [CatalogEntry]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.entries
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.extend(entries.iter().cloned());

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		text: &'a str,
		k: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexMatch>>> {
		Box::pin(async move {
			let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
			let mut scored = entries
				.iter()
				.map(|entry| IndexMatch {
					code: entry.code.clone(),
					short_description: entry.short_description.clone(),
					long_description: entry.long_description.clone(),
					raw_score: token_distance(text, &entry.long_description),
				})
				.collect::<Vec<_>>();

			scored.sort_by(|a, b| a.raw_score.total_cmp(&b.raw_score));
			scored.truncate(k as usize);

			Ok(scored)
		})
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move {
			Ok(self.entries.lock().unwrap_or_else(|err| err.into_inner()).len() as u64)
		})
	}
}

/// Returns the same matches for every query. Useful for driving the coding
/// engine with scores a real index would not hand out, like NaN.
pub struct StaticIndex {
	pub matches: Vec<IndexMatch>,
}
impl SemanticIndex for StaticIndex {
	fn index<'a>(&'a self, _entries: &'a [CatalogEntry]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(()) })
	}

	fn query<'a>(
		&'a self,
		_text: &'a str,
		k: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexMatch>>> {
		Box::pin(async move {
			Ok(self.matches.iter().take(k as usize).cloned().collect())
		})
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move { Ok(self.matches.len() as u64) })
	}
}

/// Fails every call, standing in for an unreachable index backend.
pub struct FailingIndex;
impl SemanticIndex for FailingIndex {
	fn index<'a>(&'a self, _entries: &'a [CatalogEntry]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Err(eyre::eyre!("Semantic index is unreachable.")) })
	}

	fn query<'a>(
		&'a self,
		_text: &'a str,
		_k: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexMatch>>> {
		Box::pin(async move { Err(eyre::eyre!("Semantic index is unreachable.")) })
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move { Err(eyre::eyre!("Semantic index is unreachable.")) })
	}
}

pub fn token_distance(query: &str, doc: &str) -> f64 {
	if query.trim() == doc.trim() {
		return 0.0;
	}

	let query_tokens = tokens(query);
	let doc_tokens = tokens(doc);

	if query_tokens.is_empty() && doc_tokens.is_empty() {
		return 0.0;
	}

	let intersection = query_tokens.intersection(&doc_tokens).count() as f64;
	let union = query_tokens.union(&doc_tokens).count() as f64;

	1.0 - intersection / union
}

fn tokens(text: &str) -> HashSet<String> {
	text.split_whitespace().map(str::to_lowercase).collect()
}

pub fn test_config(csv_path: PathBuf) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres { dsn: "postgres://localhost/unused".to_string(), pool_max_conns: 1 },
			qdrant: Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				collection: "test".to_string(),
				vector_dim: 8,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/".to_string(),
				model: "test".to_string(),
				dimensions: 8,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		catalog: Catalog { csv_path },
	}
}

/// A unique path under the system temp directory, for tests that need to
/// write a catalog file.
pub fn temp_path(prefix: &str) -> PathBuf {
	let stamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
	let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

	std::env::temp_dir().join(format!("{prefix}_{stamp}_{counter}.csv"))
}
