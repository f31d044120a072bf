//! Tripcode error types.

use std::sync::Arc;

/// A clonable trait-object inner error.
#[derive(Clone, Default)]
pub struct DynInnerError(
    pub Option<Arc<dyn std::error::Error + 'static + Send + Sync>>,
);

impl std::fmt::Debug for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            None => f.write_str("None"),
            Some(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for DynInnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.as_ref().map(|s| {
            let out: &(dyn std::error::Error + 'static) = &**s;
            out
        })
    }
}

impl DynInnerError {
    /// Construct a new DynInnerError from a source error.
    pub fn new<E: std::error::Error + 'static + Send + Sync>(e: E) -> Self {
        Self(Some(Arc::new(e)))
    }
}

/// The tripcode error type.
///
/// The prefix variants are configuration errors, they are detected
/// before any search work starts. [TripError::KeyspaceExhausted] is
/// unrecoverable. [TripError::Other] is used for transport and io
/// failures, which remote dealers treat as transient.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TripError {
    /// The target prefix has fewer characters than can constrain a byte.
    #[error("target prefix is too short: {len} < {min} characters")]
    PrefixTooShort {
        /// Length of the rejected prefix.
        len: usize,

        /// Minimum accepted length.
        min: usize,
    },

    /// The target prefix can never match an encoded digest.
    #[error("target prefix is too long: {len} > {max} characters")]
    PrefixTooLong {
        /// Length of the rejected prefix.
        len: usize,

        /// Maximum accepted length.
        max: usize,
    },

    /// The target prefix is not valid under the digest encoding.
    #[error("failed to decode target prefix {prefix:?} (src: {src})")]
    PrefixNotDecodable {
        /// The rejected prefix.
        prefix: Arc<str>,

        /// The decode error.
        #[source]
        src: DynInnerError,
    },

    /// The position counter cannot be advanced any further.
    #[error("keyspace exhausted after {issued} blocks")]
    KeyspaceExhausted {
        /// Number of blocks issued before the counter overflowed.
        issued: u64,
    },

    /// A digit vector that does not describe a position in the keyspace.
    #[error("invalid position: {0}")]
    InvalidPosition(Arc<str>),

    /// Generic tripcode internal error.
    #[error("{ctx} (src: {src})")]
    Other {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },
}

impl TripError {
    /// Construct an "other" error with an inner source error.
    pub fn other_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::new(src),
        }
    }

    /// Construct an "other" error.
    pub fn other<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::default(),
        }
    }

    /// Construct an "invalid position" error.
    pub fn invalid_position<C: std::fmt::Display>(ctx: C) -> Self {
        Self::InvalidPosition(ctx.to_string().into_boxed_str().into())
    }

    /// Returns true if this is a configuration error, i.e. one that
    /// is raised before any work starts and should not be retried
    /// without corrected input.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::PrefixTooShort { .. }
                | Self::PrefixTooLong { .. }
                | Self::PrefixNotDecodable { .. }
        )
    }
}

/// The tripcode result type.
pub type TripResult<T> = Result<T, TripError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            "bla (src: None)",
            TripError::other("bla").to_string().as_str(),
        );
        assert_eq!(
            "foo (src: bar)",
            TripError::other_src("foo", std::io::Error::other("bar"))
                .to_string()
                .as_str(),
        );
        assert_eq!(
            "target prefix is too short: 3 < 5 characters",
            TripError::PrefixTooShort { len: 3, min: 5 }.to_string(),
        );
        assert_eq!(
            "keyspace exhausted after 42 blocks",
            TripError::KeyspaceExhausted { issued: 42 }.to_string(),
        );
    }

    #[test]
    fn config_errors_are_flagged() {
        assert!(TripError::PrefixTooShort { len: 1, min: 5 }.is_config());
        assert!(TripError::PrefixTooLong { len: 30, max: 27 }.is_config());
        assert!(TripError::PrefixNotDecodable {
            prefix: "a=aaa".into(),
            src: DynInnerError::default(),
        }
        .is_config());
        assert!(!TripError::KeyspaceExhausted { issued: 0 }.is_config());
        assert!(!TripError::other("net").is_config());
    }

    #[test]
    fn ensure_trip_error_type_is_send_and_sync() {
        fn ensure<T: std::fmt::Display + Send + Sync>(_t: T) {}
        ensure(TripError::other("bla"));
    }
}
