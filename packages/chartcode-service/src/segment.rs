use serde::{Deserialize, Serialize};

use chartcode_domain::segment::{self, SegmentedNote};

use crate::ChartService;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentRequest {
	pub raw_text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentResponse {
	pub chart_id: String,
	pub notes: Vec<SegmentedNote>,
}

impl ChartService {
	/// Pure segmentation of a raw chart dump. Absent or empty input is a
	/// valid empty chart, not an error.
	pub fn segment(&self, req: SegmentRequest) -> SegmentResponse {
		let chart = segment::segment_chart(req.raw_text.as_deref().unwrap_or(""));

		SegmentResponse { chart_id: chart.chart_id, notes: chart.notes }
	}
}
