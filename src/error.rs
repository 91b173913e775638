use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A formula precondition was violated; the message is user-facing.
    #[error("{0}")]
    Domain(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl CalcError {
    pub fn is_domain(&self) -> bool {
        matches!(self, CalcError::Domain(_))
    }
}

pub type CalcResult<T> = Result<T, CalcError>;
