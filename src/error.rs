use std::io;

use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error,Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    #[error("CSV error: {0}")]
    CSV(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Request failed ({status}): {body}")]
    RequestFailed { status: reqwest::StatusCode, body: String },
    #[error("Parse failed: {0}")]
    ParseFailed(String),
    #[error("Insufficient data for fit ({regime}): {points} point(s)")]
    InsufficientDataForFit { regime: String, points: usize },
    #[error("Coverage invariant violated: {0}")]
    CoverageInvariantViolated(String),
    #[error("{stage} failed: {source}")]
    Stage { stage: &'static str, source: Box<Error> },
}

impl Error {

    pub fn parse<S: Into<String>>(msg: S) -> Self {
	Self::ParseFailed(msg.into())
    }

    pub fn in_stage(self, stage: &'static str) -> Self {
	Self::Stage { stage, source: Box::new(self) }
    }

    /// Whether another attempt at the same request could succeed.
    pub fn is_transient(&self) -> bool {
	match self {
	    Self::Reqwest(_) => true,
	    Self::RequestFailed { status, .. } => status.is_server_error(),
	    Self::Stage { source, .. } => source.is_transient(),
	    _ => false
	}
    }

}
