use std::fmt;

use cohort_api::client::error::RequestError;
use cohort_lib::context_trait;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// broad category of a failed command, decides the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// the given value or form was rejected by validation
    Invalid,
    Failure,
    Config,
    /// the server could not be reached or refused the request
    Remote,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Invalid => 1,
            ErrorKind::Failure => 2,
            ErrorKind::Config => 3,
            ErrorKind::Remote => 4,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    context: Option<String>,
    src: Option<BoxDynError>,
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl Error {
    pub fn new() -> Error {
        Error {
            kind: ErrorKind::Failure,
            context: None,
            src: None,
        }
    }

    /// a validation rejection with the message shown to the user
    pub fn invalid<M>(msg: M) -> Error
    where
        M: Into<String>
    {
        Error::new()
            .with_kind(ErrorKind::Invalid)
            .context(msg)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Error {
        self.kind = kind;
        self
    }

    pub fn context<C>(mut self, cxt: C) -> Error
    where
        C: Into<String>
    {
        self.context = Some(cxt.into());
        self
    }

    pub fn source<S>(mut self, src: S) -> Error
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// writes the context followed by every error in the source chain
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = match &self.context {
            Some(cxt) => {
                write!(f, "{cxt}")?;
                false
            },
            None => true,
        };

        let mut next = self.src.as_deref().map(|v| v as &(dyn std::error::Error + 'static));

        if first && next.is_none() {
            return write!(f, "unknown error");
        }

        while let Some(err) = next {
            if first {
                write!(f, "{err}")?;
                first = false;
            } else {
                write!(f, ": {err}")?;
            }

            next = err.source();
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::new().context(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::new().context(msg)
    }
}

context_trait!(Error);

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new().source(err)
    }
}

impl From<cohort_lib::BindError> for Error {
    fn from(err: cohort_lib::BindError) -> Self {
        Error::new()
            .with_kind(ErrorKind::Config)
            .context("form rules do not fit the upload form")
            .source(err)
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(err) => Error::new()
                .with_kind(ErrorKind::Remote)
                .context("server rejected request")
                .source(err),
            err => Error::new()
                .with_kind(ErrorKind::Remote)
                .context("error server request")
                .source(err)
        }
    }
}
