use std::fs;

use serde::{Deserialize, Serialize};

use crate::{CatalogEntry, ChartService, Error, Result};

const CODE_COLUMN: &str = "icd_code";
const SHORT_DESCRIPTION_COLUMN: &str = "short_description";
const LONG_DESCRIPTION_COLUMN: &str = "long_description";
const REQUIRED_COLUMNS: [&str; 5] = [
	CODE_COLUMN,
	SHORT_DESCRIPTION_COLUMN,
	LONG_DESCRIPTION_COLUMN,
	"order_number",
	"valid_for_transaction",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogLoadReport {
	pub indexed_count: u64,
	pub skipped_count: u64,
	pub already_loaded: bool,
}

impl ChartService {
	/// Idempotent catalog warm-up. A non-empty index short-circuits the
	/// load; this guard cannot tell a partial prior load from a complete
	/// one, so warm-up must run as a single-writer step before requests are
	/// served.
	pub async fn ensure_loaded(&self) -> Result<CatalogLoadReport> {
		let existing = self.index.count().await?;

		if existing > 0 {
			tracing::info!(existing, "Catalog already indexed; skipping load.");

			return Ok(CatalogLoadReport {
				indexed_count: 0,
				skipped_count: 0,
				already_loaded: true,
			});
		}

		let path = &self.cfg.catalog.csv_path;
		let raw = fs::read_to_string(path).map_err(|err| Error::Upstream {
			message: format!("Failed to read catalog file {path:?}: {err}"),
		})?;
		let (entries, skipped_count) = parse_catalog(&raw)?;

		self.index.index(&entries).await?;

		tracing::info!(indexed = entries.len(), skipped = skipped_count, "Catalog indexed.");

		Ok(CatalogLoadReport {
			indexed_count: entries.len() as u64,
			skipped_count,
			already_loaded: false,
		})
	}
}

/// Parses the tabular catalog. Rows with a blank long description carry no
/// searchable text and are excluded from indexing.
pub(crate) fn parse_catalog(raw: &str) -> Result<(Vec<CatalogEntry>, u64)> {
	let mut lines = raw.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());
	let Some((_, header)) = lines.next() else {
		return Err(Error::Upstream { message: "Catalog file is empty.".to_string() });
	};
	let columns = split_csv_fields(header);
	let column_index = |name: &str| {
		columns.iter().position(|column| column.trim() == name).ok_or_else(|| Error::Upstream {
			message: format!("Catalog header is missing the {name} column."),
		})
	};

	for name in REQUIRED_COLUMNS {
		column_index(name)?;
	}

	let code_idx = column_index(CODE_COLUMN)?;
	let short_idx = column_index(SHORT_DESCRIPTION_COLUMN)?;
	let long_idx = column_index(LONG_DESCRIPTION_COLUMN)?;
	let width = columns.len();
	let mut entries = Vec::new();
	let mut skipped_count = 0_u64;

	for (line_no, line) in lines {
		let fields = split_csv_fields(line);

		if fields.len() != width {
			return Err(Error::Upstream {
				message: format!(
					"Catalog row {} has {} columns, expected {width}.",
					line_no + 1,
					fields.len()
				),
			});
		}

		let long_description = fields[long_idx].trim();

		if long_description.is_empty() {
			skipped_count += 1;

			continue;
		}

		entries.push(CatalogEntry {
			code: fields[code_idx].trim().to_string(),
			short_description: fields[short_idx].trim().to_string(),
			long_description: long_description.to_string(),
		});
	}

	Ok((entries, skipped_count))
}

/// Splits one CSV record into fields, honoring double-quoted fields and
/// doubled-quote escapes. Embedded record separators are not supported; the
/// catalog ships one record per line.
fn split_csv_fields(line: &str) -> Vec<String> {
	let mut fields = Vec::new();
	let mut field = String::new();
	let mut chars = line.chars().peekable();
	let mut in_quotes = false;

	while let Some(ch) = chars.next() {
		if in_quotes {
			if ch == '"' {
				if chars.peek() == Some(&'"') {
					field.push('"');
					chars.next();
				} else {
					in_quotes = false;
				}
			} else {
				field.push(ch);
			}
		} else {
			match ch {
				'"' => in_quotes = true,
				',' => fields.push(std::mem::take(&mut field)),
				_ => field.push(ch),
			}
		}
	}

	fields.push(field);

	fields
}
