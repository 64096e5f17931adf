//! Error types for loading, validating and saving the tree.

use thiserror::Error;

/// Failure talking to a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
	/// The request never produced a response
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// The hosted backend answered with a non-success status
	#[error("backend returned {status}: {message}")]
	Status {
		/// HTTP status code
		status: u16,
		/// Body text, if any
		message: String,
	},

	/// Browser storage rejected a read or write
	#[error("storage error: {0}")]
	Storage(String),

	/// A stored or received record did not match its shape
	#[error("malformed record: {0}")]
	Serde(#[from] serde_json::Error),

	/// The operation needs a capability the backend does not have
	#[error("unavailable: {0}")]
	Unavailable(String),
}

/// A form submission that must not reach the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Kōwhiria tētahi kōtaha / Select a profile.")]
	MissingProfile,

	#[error("Kōwhiria te tāngata me te momo hononga / Select people and relation type.")]
	MissingRelationFields,

	#[error("Kua tāpirihia kē / Already added.")]
	AlreadyMember,

	#[error("Kāore e tika te hono ki a ia anō / Cannot relate a person to themselves.")]
	SelfRelationship,

	#[error("Kāore {0} i te rākau / {0} is not in the tree.")]
	NotAMember(String),

	#[error("Takiuru hei tiaki / Login to save.")]
	NotSignedIn,

	#[error("Kāore he mana / Only tree editors can change the tree.")]
	NotAuthorized,
}

/// Why an add-member or add-relationship submission failed.
#[derive(Error, Debug)]
pub enum MutationError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("Hapa tāpiri / Failed to save: {0}")]
	Store(#[from] StoreError),
}

/// The page configuration could not be read.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("invalid configuration: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("configuration is not JSON-serializable")]
	NotSerializable,
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
