use qdrant_client::qdrant::{
	CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder,
	ScoredPoint, UpsertPointsBuilder, VectorParamsBuilder,
};

use crate::Result;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &chartcode_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		self.client
			.create_collection(CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
				VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
			))
			.await?;

		Ok(())
	}

	pub async fn point_count(&self) -> Result<u64> {
		let response =
			self.client.count(CountPointsBuilder::new(self.collection.clone()).exact(true)).await?;

		Ok(response.result.map(|result| result.count).unwrap_or(0))
	}

	pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<()> {
		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
			.await?;

		Ok(())
	}

	pub async fn nearest(&self, vector: Vec<f32>, k: u64) -> Result<Vec<ScoredPoint>> {
		let response = self
			.client
			.query(
				QueryPointsBuilder::new(self.collection.clone())
					.query(Query::new_nearest(vector))
					.with_payload(true)
					.limit(k),
			)
			.await?;

		Ok(response.result)
	}
}
