use aws_sdk_dynamodb::error::SdkError;
use thiserror::Error;

/// Failure from the storage backend. Wraps the SDK service error so the
/// router can log it and collapse it into a generic 500 without leaking
/// detail to the caller.
#[derive(Debug, Error)]
#[error("dynamodb request failed: {0}")]
pub(crate) struct StoreError(#[source] Box<aws_sdk_dynamodb::Error>);

impl<E, R> From<SdkError<E, R>> for StoreError
where
    aws_sdk_dynamodb::Error: From<SdkError<E, R>>,
{
    fn from(err: SdkError<E, R>) -> Self {
        Self(Box::new(err.into()))
    }
}

#[derive(Debug, Error)]
pub(crate) enum HandlerError {
    /// Missing required parameter. Becomes a 400 carrying this exact message.
    #[error("{0}")]
    Validation(&'static str),
    /// Malformed JSON in a request body or pagination cursor. Shares the
    /// generic 500 path rather than getting its own 400 class.
    #[error("invalid request payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] StoreError),
    #[error("{0}")]
    Internal(&'static str),
}
