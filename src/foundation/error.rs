/// Convenience result type used across photostrip.
pub type StripResult<T> = Result<T, StripError>;

/// Top-level error taxonomy for a strip run.
///
/// Only fatal conditions live here. Per-cell photo decode failures are reported as
/// [`DecodeWarning`](crate::DecodeWarning) values and never abort a run.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    /// Missing or malformed caller input (request fields, layout, colours, sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// The run could not obtain a drawing surface, usually because of pathological dimensions.
    #[error("resource error: {0}")]
    Resource(String),

    /// The finished surface could not be compressed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Errors when serializing or deserializing request/response data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    /// Build a [`StripError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StripError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`StripError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`StripError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Message suitable for the `error` field of a failure response.
    ///
    /// Validation messages are surfaced verbatim so callers see e.g. `empty layout` rather than
    /// the prefixed display form.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(m) | Self::Resource(m) | Self::Encoding(m) | Self::Serde(m) => {
                m.clone()
            }
            Self::Other(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
