pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Injected {operation} failure.")]
	Injected { operation: &'static str },

	#[error("Document not found: {path}.")]
	NotFound { path: String },

	#[error("Document is unreadable: {path}.")]
	Unreadable { path: String },
}
