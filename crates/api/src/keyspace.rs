//! The shape of the search space.

use crate::*;

/// The shape of the search space.
///
/// Every candidate is `trip_length` characters long. The first
/// `worker_digits` characters are enumerated exhaustively by a worker,
/// the rest are fixed per block by the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyspace {
    /// Candidate length in characters.
    ///
    /// Default: 16.
    pub trip_length: usize,

    /// Low-order positions owned by the worker.
    ///
    /// Default: 4.
    pub worker_digits: usize,
}

impl Default for Keyspace {
    fn default() -> Self {
        Self {
            trip_length: 16,
            worker_digits: 4,
        }
    }
}

impl Keyspace {
    /// Make sure the dealer owns at least one digit and the worker owns
    /// at least one, and that a block's combination count fits a u64.
    pub fn validate(&self) -> TripResult<()> {
        if self.worker_digits == 0 {
            return Err(TripError::other("worker_digits must be at least 1"));
        }
        if self.worker_digits >= self.trip_length {
            return Err(TripError::other(format!(
                "worker_digits ({}) must be less than trip_length ({})",
                self.worker_digits, self.trip_length,
            )));
        }
        if self.checked_block_size().is_none() {
            return Err(TripError::other(format!(
                "worker_digits ({}) is too large",
                self.worker_digits,
            )));
        }
        Ok(())
    }

    /// Number of candidates a worker examines per block:
    /// `CHARS_LEN ^ worker_digits`.
    pub fn block_size(&self) -> u64 {
        self.checked_block_size().unwrap_or(u64::MAX)
    }

    fn checked_block_size(&self) -> Option<u64> {
        let exp = u32::try_from(self.worker_digits).ok()?;
        (CHARS_LEN as u64).checked_pow(exp)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_canonical() {
        let k = Keyspace::default();
        assert_eq!(16, k.trip_length);
        assert_eq!(4, k.worker_digits);
        assert_eq!(65 * 65 * 65 * 65, k.block_size());
        k.validate().unwrap();
    }

    #[test]
    fn reject_bad_shapes() {
        Keyspace {
            trip_length: 4,
            worker_digits: 4,
        }
        .validate()
        .unwrap_err();
        Keyspace {
            trip_length: 4,
            worker_digits: 0,
        }
        .validate()
        .unwrap_err();
        Keyspace {
            trip_length: 64,
            worker_digits: 32,
        }
        .validate()
        .unwrap_err();
    }

    #[test]
    fn serde_camel_case() {
        let k: Keyspace =
            serde_json::from_str(r#"{"tripLength":8,"workerDigits":2}"#)
                .unwrap();
        assert_eq!(
            Keyspace {
                trip_length: 8,
                worker_digits: 2
            },
            k
        );
    }
}
