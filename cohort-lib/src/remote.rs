use std::future::Future;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// answer from a remote validation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVerdict {
    Available,
    /// optionally carries a message provided by the endpoint
    Taken(Option<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote check timed out")]
    Timeout,

    #[error("remote check responded with status {0}")]
    Status(u16),

    #[error("remote check responded with an invalid body")]
    InvalidBody(#[source] BoxDynError),

    #[error("remote check request failed")]
    Request(#[source] BoxDynError),
}

/// performs the query behind a [`Rule::Remote`](crate::rules::Rule::Remote)
pub trait RemoteCheck {
    /// asks `endpoint` whether `value` is available for `field`
    fn check(
        &self,
        endpoint: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<RemoteVerdict, RemoteError>>;
}

impl<R> RemoteCheck for &R
where
    R: RemoteCheck
{
    fn check(
        &self,
        endpoint: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<RemoteVerdict, RemoteError>> {
        (**self).check(endpoint, field, value)
    }
}
