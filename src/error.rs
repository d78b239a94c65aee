use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	/// Rejected construction parameters. Nothing was built.
	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("invalid key {0:?}: at most two distinct variables per term")]
	Key(Vec<usize>),

	/// A solution vector could not be decoded.
	#[error("cannot decode solution: {0}")]
	Decode(String),

	#[error("cannot encode solution: {0}")]
	Encode(String),

	#[error("cannot evaluate: {0}")]
	Value(String),

	#[error("{0} variables is too many to enumerate")]
	TooLarge(usize),

	#[error("cannot parse: {0}")]
	Parse(#[from] serde_json::Error),

	/// The requested feature does not exist yet. Distinct from every
	/// solving failure so callers can detect its absence.
	#[error("{0} is not implemented")]
	NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
