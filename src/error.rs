use core::fmt;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph construction and the detection/layout engines.
///
/// Degenerate graphs are not errors: detection on an empty graph returns an
/// empty partition, layout returns an empty positioning, and edgeless graphs
/// produce all-singleton partitions. Iteration caps are likewise non-fatal;
/// algorithms log a warning and return the best state reached.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An edge record could not be turned into a graph edge.
    MalformedInput {
        /// What was wrong with the record.
        reason: String,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A layout strategy cannot synthesize a multi-component layout.
    ///
    /// Neither built-in strategy returns this; spring layout tolerates
    /// disconnection and Kamada-Kawai lays components out on a grid.
    DisconnectedLayout,
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedInput { reason } => write!(f, "malformed edge record: {reason}"),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::DisconnectedLayout => write!(f, "layout requires a connected graph"),
        }
    }
}

impl std::error::Error for Error {}
