use std::error::Error;
use std::fmt;

use cohort_lib::RemoteError;

use crate::ApiError;

#[derive(Debug)]
pub enum ApiClientError {
    PoisonedLock,
    InvalidUrl(url::ParseError),
    CookieStore(Box<dyn std::error::Error + Sync + Send>),
    Reqwest(reqwest::Error),
    StdIo(std::io::Error),
}

impl fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiClientError::PoisonedLock => write!(f, "ApiClientError::PoisonedLock"),
            ApiClientError::InvalidUrl(_) => write!(f, "ApiClientError::InvalidUrl"),
            ApiClientError::CookieStore(_) => write!(f, "ApiClientError::CookieStore"),
            ApiClientError::Reqwest(_) => write!(f, "ApiClientError::Reqwest"),
            ApiClientError::StdIo(_) => write!(f, "ApiClientError::StdIo"),
        }
    }
}

impl Error for ApiClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiClientError::InvalidUrl(v) => Some(v),
            ApiClientError::CookieStore(v) => Some(&**v),
            ApiClientError::Reqwest(v) => Some(v),
            ApiClientError::StdIo(v) => Some(v),
            _ => None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unexpected response status {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error)
}

impl RequestError {
    pub fn as_api(self) -> Result<ApiError, Self> {
        match self {
            RequestError::Api(v) => Ok(v),
            v => Err(v)
        }
    }
}

impl From<RequestError> for RemoteError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Reqwest(err) => {
                if err.is_timeout() {
                    RemoteError::Timeout
                } else if err.is_decode() {
                    RemoteError::InvalidBody(Box::new(err))
                } else if let Some(status) = err.status() {
                    RemoteError::Status(status.as_u16())
                } else {
                    RemoteError::Request(Box::new(err))
                }
            },
            RequestError::Status(status) => RemoteError::Status(status.as_u16()),
            err => RemoteError::Request(Box::new(err)),
        }
    }
}
