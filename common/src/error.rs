use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{program} exited with non-zero status (code {code:?})")]
    ExecutionFailure {
        program: String,
        code: Option<i32>,
    },
    #[error("malformed report: {0}")]
    MalformedReport(String),
}
