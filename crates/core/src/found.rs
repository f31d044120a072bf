//! Match notification.

use base64::prelude::*;
use sha1::Digest;

/// The reporter label used for matches found in this process.
pub const MYSELF: &str = "myself";

/// A verified match, as recorded by a dealer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// The candidate string.
    pub trip: String,

    /// The base64 encoded SHA-1 digest of the candidate.
    pub encoded: String,

    /// Who found it. [MYSELF] for matches found in-process, otherwise
    /// the label the remote reporter sent.
    pub by: String,
}

impl std::fmt::Display for Found {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} -> {} (by {})", self.trip, self.encoded, self.by)
    }
}

impl Found {
    /// Recompute the digest of a trip and attribute it to `by`.
    pub fn new(trip: &str, by: &str) -> Self {
        Self {
            trip: trip.to_string(),
            encoded: encode_digest(trip.as_bytes()),
            by: by.to_string(),
        }
    }
}

/// The base64 encoded SHA-1 digest of a candidate.
pub fn encode_digest(trip: &[u8]) -> String {
    BASE64_STANDARD.encode(sha1::Sha1::digest(trip))
}

/// Print a human readable notification for a match and return it.
pub fn announce(trip: &str, by: &str) -> Found {
    let found = Found::new(trip, by);
    tracing::info!(trip = %found.trip, encoded = %found.encoded, by = %found.by, "found");
    // this line is the product, print it regardless of the log filter
    println!("\nFOUND!!!: {found}");
    found
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn found_display() {
        let f = Found::new("abc", MYSELF);
        assert_eq!("qZk+NkcGgWq6PiVxeFDCbJzQ2J0=", f.encoded);
        assert_eq!("#abc -> qZk+NkcGgWq6PiVxeFDCbJzQ2J0= (by myself)", f.to_string());
    }
}
