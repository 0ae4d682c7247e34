pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Parse error: {message}")]
	Parse { message: String },
	#[error("Retrieval error: {message}")]
	Retrieval { message: String },
	#[error("Write error: {message}")]
	Write { message: String },
}
impl Error {
	pub(crate) fn parse(err: color_eyre::Report) -> Self {
		Self::Parse { message: err.to_string() }
	}

	pub(crate) fn retrieval(err: color_eyre::Report) -> Self {
		Self::Retrieval { message: err.to_string() }
	}

	pub(crate) fn write(err: color_eyre::Report) -> Self {
		Self::Write { message: err.to_string() }
	}
}
