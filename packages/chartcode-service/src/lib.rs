pub mod catalog;
pub mod code;
pub mod ingest;
pub mod list;
pub mod segment;
pub mod time_serde;

mod error;

pub use error::{Error, Result};

pub use catalog::CatalogLoadReport;
pub use code::{CodeAssignment, CodeRequest, CodeResponse};
pub use ingest::{IngestNoteInput, IngestRequest, IngestResponse};
pub use list::{ListResponse, ListedNote};
pub use segment::{SegmentRequest, SegmentResponse};

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use qdrant_client::{
	client::Payload,
	qdrant::{PointStruct, Value, value::Kind},
};
use uuid::Uuid;

use chartcode_config::Config;
use chartcode_providers::embedding;
use chartcode_storage::{
	db::Db,
	models::{ChartNote, NewChartNote},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const EMBED_BATCH_SIZE: usize = 64;

/// One reference code from the catalog. The long description is the text
/// fed to the semantic index; code and short description travel as payload
/// metadata only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
	pub code: String,
	pub short_description: String,
	pub long_description: String,
}

/// A ranked catalog match. `raw_score` is distance-like: smaller means more
/// similar, zero means identical.
#[derive(Clone, Debug)]
pub struct IndexMatch {
	pub code: String,
	pub short_description: String,
	pub long_description: String,
	pub raw_score: f64,
}

/// The keyed note repository the service delegates persistence to.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn upsert_if_absent<'a>(
		&'a self,
		note: &'a NewChartNote,
	) -> BoxFuture<'a, color_eyre::Result<bool>>;

	fn find_by_chart<'a>(
		&'a self,
		chart_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>>;

	fn list_all<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>>;
}

/// The opaque semantic search collaborator: index catalog text, query for
/// nearest matches.
pub trait SemanticIndex
where
	Self: Send + Sync,
{
	fn index<'a>(&'a self, entries: &'a [CatalogEntry]) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn query<'a>(
		&'a self,
		text: &'a str,
		k: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexMatch>>>;

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>>;
}

pub struct ChartService {
	pub cfg: Arc<Config>,
	pub notes: Arc<dyn NoteStore>,
	pub index: Arc<dyn SemanticIndex>,
}
impl ChartService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let cfg = Arc::new(cfg);
		let index = QdrantSemanticIndex { store: qdrant, cfg: cfg.clone() };

		Self { cfg, notes: Arc::new(PgNoteStore { db }), index: Arc::new(index) }
	}

	pub fn with_collaborators(
		cfg: Config,
		notes: Arc<dyn NoteStore>,
		index: Arc<dyn SemanticIndex>,
	) -> Self {
		Self { cfg: Arc::new(cfg), notes, index }
	}
}

struct PgNoteStore {
	db: Db,
}
impl NoteStore for PgNoteStore {
	fn upsert_if_absent<'a>(
		&'a self,
		note: &'a NewChartNote,
	) -> BoxFuture<'a, color_eyre::Result<bool>> {
		Box::pin(async move {
			Ok(chartcode_storage::notes::upsert_note_if_absent(&self.db, note).await?)
		})
	}

	fn find_by_chart<'a>(
		&'a self,
		chart_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>> {
		Box::pin(async move {
			Ok(chartcode_storage::notes::notes_by_chart(&self.db, chart_id).await?)
		})
	}

	fn list_all<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<ChartNote>>> {
		Box::pin(async move { Ok(chartcode_storage::notes::all_notes(&self.db).await?) })
	}
}

struct QdrantSemanticIndex {
	store: QdrantStore,
	cfg: Arc<Config>,
}
impl QdrantSemanticIndex {
	fn point_id(code: &str) -> String {
		Uuid::new_v5(&Uuid::NAMESPACE_OID, code.as_bytes()).to_string()
	}
}
impl SemanticIndex for QdrantSemanticIndex {
	fn index<'a>(&'a self, entries: &'a [CatalogEntry]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			for chunk in entries.chunks(EMBED_BATCH_SIZE) {
				let texts =
					chunk.iter().map(|entry| entry.long_description.clone()).collect::<Vec<_>>();
				let vectors = embedding::embed(&self.cfg.providers.embedding, &texts).await?;

				if vectors.len() != chunk.len() {
					return Err(color_eyre::eyre::eyre!(
						"Embedding provider returned mismatched vector count."
					));
				}

				let mut points = Vec::with_capacity(chunk.len());

				for (entry, vector) in chunk.iter().zip(vectors) {
					if vector.len() != self.store.vector_dim as usize {
						return Err(color_eyre::eyre::eyre!(
							"Embedding vector dimension mismatch."
						));
					}

					let mut payload = Payload::new();

					payload.insert("code", entry.code.clone());
					payload.insert("short_description", entry.short_description.clone());
					payload.insert("long_description", entry.long_description.clone());

					points.push(PointStruct::new(Self::point_id(&entry.code), vector, payload));
				}

				self.store.upsert_points(points).await?;
			}

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		text: &'a str,
		k: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexMatch>>> {
		Box::pin(async move {
			let vectors =
				embedding::embed(&self.cfg.providers.embedding, &[text.to_string()]).await?;
			let Some(vector) = vectors.into_iter().next() else {
				return Err(color_eyre::eyre::eyre!("Embedding provider returned no vectors."));
			};

			if vector.len() != self.store.vector_dim as usize {
				return Err(color_eyre::eyre::eyre!("Embedding vector dimension mismatch."));
			}

			let points = self.store.nearest(vector, k).await?;
			let mut matches = Vec::with_capacity(points.len());

			for point in points {
				let Some(code) = payload_str(&point.payload, "code") else {
					tracing::warn!("Catalog match is missing its code payload.");

					continue;
				};
				let Some(short_description) = payload_str(&point.payload, "short_description")
				else {
					tracing::warn!(code = %code, "Catalog match is missing its short description payload.");

					continue;
				};
				let Some(long_description) = payload_str(&point.payload, "long_description") else {
					tracing::warn!(code = %code, "Catalog match is missing its long description payload.");

					continue;
				};

				// Qdrant reports cosine similarity; the coding engine works in
				// distances, smaller meaning more similar. Clamped at zero so
				// float noise on an exact match cannot leave the metric domain.
				matches.push(IndexMatch {
					code,
					short_description,
					long_description,
					raw_score: (1.0 - f64::from(point.score)).max(0.0),
				});
			}

			Ok(matches)
		})
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move { Ok(self.store.point_count().await?) })
	}
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	payload.get(key).and_then(|value| match value.kind.as_ref() {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	})
}
