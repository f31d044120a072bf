//! Target prefix parsing and digest matching.

use base64::prelude::*;
use tripcode_api::*;

/// Fewer base64 characters than this do not fully determine a byte.
pub const MIN_PREFIX_LEN: usize = 5;

/// A SHA-1 digest encodes to 28 characters, the last always being `=`.
pub const MAX_PREFIX_LEN: usize = 27;

/// The length of the digest being matched.
pub const DIGEST_LEN: usize = 20;

/// A parsed target prefix.
///
/// Matching is two-stage. [TargetPrefix::byte_filter] compares raw digest
/// bytes against the bytes the prefix decodes to, minus the last 3 which
/// the prefix does not fully determine. It may admit false positives.
/// [TargetPrefix::verify] base64 encodes the digest and does the exact
/// string prefix test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPrefix {
    literal: String,
    expect: Vec<u8>,
}

impl std::fmt::Display for TargetPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.literal)
    }
}

impl TargetPrefix {
    /// Parse a target prefix, computing its expected digest bytes.
    pub fn parse(prefix: &str) -> TripResult<Self> {
        let len = prefix.len();
        if len < MIN_PREFIX_LEN {
            return Err(TripError::PrefixTooShort {
                len,
                min: MIN_PREFIX_LEN,
            });
        }
        if len > MAX_PREFIX_LEN {
            return Err(TripError::PrefixTooLong {
                len,
                max: MAX_PREFIX_LEN,
            });
        }

        let not_decodable = |src| TripError::PrefixNotDecodable {
            prefix: prefix.into(),
            src,
        };

        if !prefix.is_ascii() {
            return Err(not_decodable(DynInnerError::default()));
        }

        // pad out to whole 4 character groups with the last character
        let mut padded = prefix.to_string();
        if len % 4 != 0 {
            let last = &prefix[len - 1..];
            padded.push_str(&last.repeat(4 - len % 4));
        }

        let mut expect = BASE64_STANDARD
            .decode(&padded)
            .map_err(|err| not_decodable(DynInnerError::new(err)))?;

        // the trailing 3 bytes may differ from what the prefix implies
        expect.truncate(expect.len().saturating_sub(3));

        Ok(Self {
            literal: prefix.to_string(),
            expect,
        })
    }

    /// The literal prefix string.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// The truncated digest bytes the byte filter compares against.
    pub fn expected_bytes(&self) -> &[u8] {
        &self.expect
    }

    /// The cheap pre-check on raw digest bytes.
    #[inline]
    pub fn byte_filter(&self, digest: &[u8]) -> bool {
        digest.starts_with(&self.expect)
    }

    /// The exact check on the base64 encoded digest.
    pub fn verify(&self, digest: &[u8]) -> bool {
        BASE64_STANDARD
            .encode(digest)
            .starts_with(self.literal.as_str())
    }

    /// Both checks, in order.
    #[inline]
    pub fn matches(&self, digest: &[u8]) -> bool {
        self.byte_filter(digest) && self.verify(digest)
    }
}
