use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Unable to read the password from the terminal")]
    PasswordPrompt { source: std::io::Error },

    #[error("A worker thread panicked - the run summary is incomplete")]
    WorkerPanicked,

    #[error("Run aborted after a failure, {not_attempted} record(s) were not processed")]
    Aborted { not_attempted: usize },

    #[error("Run finished with {failed} failed record(s)")]
    RecordsFailed { failed: usize },

    #[error(transparent)]
    TenancyError(#[from] tenancy::error::Error),
}
