use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("trial {index} is outside the pre-generated plan of {len} trials")]
    PlanExhausted { index: usize, len: usize },

    // display or keyboard failures are fatal for the whole run
    #[error(transparent)]
    Device(#[from] anyhow::Error),
}

impl ExperimentError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ExperimentError::InvalidConfiguration(msg.into())
    }
}
