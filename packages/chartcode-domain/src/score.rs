/// Maps a raw distance-like score onto a bounded similarity in `(0, 1]`.
///
/// A distance of zero (identical) maps to exactly `1.0` and the result
/// decays toward zero as the distance grows, without assuming any calibrated
/// upper bound on the metric. Scores outside the domain of a distance metric
/// (negative, NaN, infinite) produce no similarity at all rather than a
/// substitute value.
pub fn normalized_similarity(raw_score: f64) -> Option<f64> {
	if !raw_score.is_finite() || raw_score < 0.0 {
		return None;
	}

	Some(1.0 / (1.0 + raw_score))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_distance_maps_to_one() {
		assert_eq!(normalized_similarity(0.0), Some(1.0));
	}

	#[test]
	fn grows_monotonically_smaller_with_distance() {
		let near = normalized_similarity(0.1).unwrap();
		let far = normalized_similarity(3.0).unwrap();

		assert!(near > far);
		assert!(near < 1.0);
		assert!(far > 0.0);
	}

	#[test]
	fn stays_within_unit_interval() {
		for raw in [0.0, 0.5, 1.0, 10.0, 1e9] {
			let similarity = normalized_similarity(raw).unwrap();

			assert!(similarity > 0.0 && similarity <= 1.0, "raw={raw} similarity={similarity}");
		}
	}

	#[test]
	fn rejects_scores_outside_the_metric_domain() {
		assert_eq!(normalized_similarity(f64::NAN), None);
		assert_eq!(normalized_similarity(f64::INFINITY), None);
		assert_eq!(normalized_similarity(f64::NEG_INFINITY), None);
		assert_eq!(normalized_similarity(-0.5), None);
	}
}
