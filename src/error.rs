use thiserror::Error;

/// Errors raised by the firing solution core
///
/// None of these are fatal: a failed search leaves its bracket empty, and an
/// empty envelope is reported to the caller as "no viable solution".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("golden-section search did not converge on [{lower}, {upper}] after {iterations} iterations")]
    NoConvergence {
        lower: f64,
        upper: f64,
        iterations: usize,
    },
    #[error("no viable solution: every charge failed to produce a direct or indirect trajectory")]
    NoViableSolution,
    #[error("charge {0} has no direct or indirect solution")]
    ChargeWithoutSolution(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type SolverResult<T> = Result<T, SolverError>;
