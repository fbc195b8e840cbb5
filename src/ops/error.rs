use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid processing configuration: {details}")]
    InvalidConfig { details: String },

    #[error("unknown space group '{symbol}'")]
    UnknownSpaceGroup { symbol: String },

    #[error("malformed symmetry operator '{operator}': {reason}")]
    MalformedOperator { operator: String, reason: String },

    #[error("structure must be finalized before {stage}: {missing} is not built")]
    NotFinalized { stage: String, missing: String },

    #[error(transparent)]
    Model(#[from] crate::model::error::Error),
}

impl Error {
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    pub fn unknown_space_group(symbol: impl Into<String>) -> Self {
        Self::UnknownSpaceGroup {
            symbol: symbol.into(),
        }
    }

    pub fn malformed_operator(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedOperator {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    pub fn not_finalized(stage: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::NotFinalized {
            stage: stage.into(),
            missing: missing.into(),
        }
    }
}
