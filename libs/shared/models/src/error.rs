use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Warm-up check failed: {0}")]
    WarmUp(String),

    #[error("Invalid threshold expression: {0}")]
    InvalidThreshold(String),

    #[error("Load generation failed: {0}")]
    Attack(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Report output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoadTestError {
    /// Process exit code used by the binary when the run aborts with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadTestError::Config(_) | LoadTestError::InvalidThreshold(_) => 78,
            LoadTestError::WarmUp(_) | LoadTestError::Client(_) => 69,
            LoadTestError::Io(_) | LoadTestError::Serialization(_) => 74,
            LoadTestError::Attack(_) | LoadTestError::Metrics(_) => 70,
        }
    }
}
