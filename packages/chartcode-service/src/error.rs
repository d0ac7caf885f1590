pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Malformed input: {message}")]
	MalformedInput { message: String },
	#[error("Missing required field: {field}")]
	MissingField { field: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Upstream unavailable: {message}")]
	Upstream { message: String },
}
impl From<chartcode_storage::Error> for Error {
	fn from(err: chartcode_storage::Error) -> Self {
		Self::Upstream { message: err.to_string() }
	}
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Upstream { message: err.to_string() }
	}
}
