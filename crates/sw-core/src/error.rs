use std::result;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{pass} failed in function `{function}`: {source}")]
    Pass {
        pass: &'static str,
        function: String,
        #[source]
        source: BoxedSource,
    },
    #[error("Generic error: {0}")]
    Generic(eyre::Error),
}

impl Error {
    pub fn pass(
        pass: &'static str,
        function: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Error::Pass {
            pass,
            function: function.into(),
            source: source.into(),
        }
    }

    /// Name of the function whose compilation was aborted, if any.
    pub fn function(&self) -> Option<&str> {
        match self {
            Error::Pass { function, .. } => Some(function),
            Error::Generic(_) => None,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(eyre::Error::msg(s))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.into())
    }
}
