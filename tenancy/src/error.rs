use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {

    #[error("Unable to open file {path}")]
    CannotOpenCsv { path: String, source: csv::Error },

    #[error("Unable to read row {row} from {path}")]
    CannotParseCsvRow { path: String, row: u64, source: csv::Error },

    #[error("File {path} has {found} columns but the {schema} layout expects {expected}")]
    SchemaMismatch { path: String, schema: String, expected: usize, found: usize },

    #[error("Logos directory {path} does not exist")]
    LogosDirMissing { path: String },

    #[error("Unable to read directory {path}")]
    CannotReadDir { path: String, source: std::io::Error },

    #[error("Template {path} not found")]
    TemplateFileNotFound { path: String, source: std::io::Error },

    #[error("Template {path} contains invalid JSON")]
    InvalidTemplate { path: String, source: serde_json::Error },

    #[error("Template {path} must be an object of blocks, each an object of fields")]
    TemplateNotBlocks { path: String },

    #[error("Invalid API URL {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unable to build the REST client for {url}")]
    CannotBuildClient { url: String, source: reqwest::Error },

    #[error("{operation} failed with status {status}: {body}")]
    RemoteStatus { operation: String, status: u16, body: String },

    #[error("{operation} failed")]
    RemoteTransport { operation: String, source: reqwest::Error },

    #[error("Response to {operation} could not be decoded")]
    RemoteDecode { operation: String, source: reqwest::Error },
}

impl Error {
    ///
    /// True for any failure reported by, or on the way to, the administration API.
    ///
    pub fn is_remote(&self) -> bool {
        matches!(self,
            Error::RemoteStatus { .. }
            | Error::RemoteTransport { .. }
            | Error::RemoteDecode { .. })
    }

    ///
    /// True when the input files themselves could not be read.
    ///
    pub fn is_parse(&self) -> bool {
        matches!(self,
            Error::CannotOpenCsv { .. }
            | Error::CannotParseCsvRow { .. }
            | Error::SchemaMismatch { .. })
    }
}
