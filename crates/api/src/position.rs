//! The dealer's position in the keyspace.

use crate::*;

/// A base-[CHARS_LEN] counter over the keyspace, one digit per candidate
/// character, least significant digit first.
///
/// The first `worker_digits` digits belong to the worker and are never
/// advanced by [Position::next]. They stay at the floor value `0`.
///
/// Serializes as a plain list of integers, which is also the body of
/// the dealer server's `/pos` response.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Position(Vec<u8>);

impl std::ops::Deref for Position {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Position {
    /// The initial position of a dealer: all zeros.
    pub fn zero(keyspace: &Keyspace) -> Self {
        Self(vec![0; keyspace.trip_length])
    }

    /// The last position a dealer can hand out. Advancing it overflows.
    pub fn last(keyspace: &Keyspace) -> Self {
        let mut out = Self::zero(keyspace);
        for d in out.0.iter_mut().skip(keyspace.worker_digits) {
            *d = (CHARS_LEN - 1) as u8;
        }
        out
    }

    /// Construct a position from raw digits, checking that it fits
    /// the keyspace.
    pub fn from_digits(keyspace: &Keyspace, digits: Vec<u8>) -> TripResult<Self> {
        if digits.len() != keyspace.trip_length {
            return Err(TripError::invalid_position(format!(
                "expected {} digits, got {}",
                keyspace.trip_length,
                digits.len(),
            )));
        }
        if let Some((i, d)) =
            digits.iter().enumerate().find(|(_, d)| **d as usize >= CHARS_LEN)
        {
            return Err(TripError::invalid_position(format!(
                "digit {i} is {d}, must be less than {CHARS_LEN}",
            )));
        }
        Ok(Self(digits))
    }

    /// Re-derive the position a block was materialized from.
    pub fn from_block(block: &[u8]) -> TripResult<Self> {
        block
            .iter()
            .enumerate()
            .map(|(i, c)| {
                alphabet::digit_of(*c).ok_or_else(|| {
                    TripError::invalid_position(format!(
                        "character {i} ({:?}) is not in the alphabet",
                        *c as char,
                    ))
                })
            })
            .collect::<TripResult<Vec<_>>>()
            .map(Self)
    }

    /// The raw digits, least significant first.
    pub fn digits(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap the raw digits.
    pub fn into_digits(self) -> Vec<u8> {
        self.0
    }

    /// The position one unit after this one.
    ///
    /// Walks the digits from just past the worker-owned low digits to
    /// the last one. The first digit below the maximum is incremented,
    /// every maximum digit before it is reset to zero.
    /// Returns `None` if the carry runs off the last digit.
    pub fn next(&self, worker_digits: usize) -> Option<Self> {
        let mut out = self.clone();
        for d in out.0.iter_mut().skip(worker_digits) {
            if (*d as usize) < CHARS_LEN - 1 {
                *d += 1;
                return Some(out);
            }
            *d = 0;
        }
        None
    }

    /// Map every digit through the alphabet.
    pub fn to_block(&self) -> Block {
        Block::from(
            self.0
                .iter()
                .map(|d| CHARS[*d as usize])
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const K: Keyspace = Keyspace {
        trip_length: 6,
        worker_digits: 2,
    };

    #[test]
    fn next_skips_worker_digits() {
        let p = Position::zero(&K);
        let n = p.next(K.worker_digits).unwrap();
        assert_eq!(&[0, 0, 1, 0, 0, 0], n.digits());
    }

    #[test]
    fn next_carries() {
        let top = (CHARS_LEN - 1) as u8;
        let p = Position::from_digits(&K, vec![7, 3, top, top, 5, 0]).unwrap();
        let n = p.next(K.worker_digits).unwrap();
        // the worker digits are left alone
        assert_eq!(&[7, 3, 0, 0, 6, 0], n.digits());
    }

    #[test]
    fn next_overflows_at_last() {
        let last = Position::last(&K);
        assert_eq!(None, last.next(K.worker_digits));

        let top = (CHARS_LEN - 1) as u8;
        let before = Position::from_digits(&K, vec![0, 0, top - 1, top, top, top])
            .unwrap();
        assert_eq!(Some(last), before.next(K.worker_digits));
    }

    #[test]
    fn sequence_is_strictly_increasing() {
        // the counter is little-endian, compare on the reversed digits
        let key = |p: &Position| p.digits().iter().rev().copied().collect::<Vec<_>>();
        let mut p = Position::zero(&K);
        for _ in 0..(CHARS_LEN * CHARS_LEN + 3) {
            let n = p.next(K.worker_digits).unwrap();
            assert!(key(&n) > key(&p));
            p = n;
        }
        assert_eq!(&[0, 0, 3, 0, 1, 0], p.digits());
    }

    #[test]
    fn from_digits_validates() {
        Position::from_digits(&K, vec![0; 5]).unwrap_err();
        Position::from_digits(&K, vec![0; 7]).unwrap_err();
        Position::from_digits(&K, vec![0, 0, 0, 65, 0, 0]).unwrap_err();
        Position::from_digits(&K, vec![0, 0, 0, 64, 0, 0]).unwrap();
    }

    #[test]
    fn block_round_trip() {
        let top = (CHARS_LEN - 1) as u8;
        for digits in [
            vec![0, 0, 0, 0, 0, 0],
            vec![1, 2, 3, 4, 5, 6],
            vec![top, 0, top, 0, top, 0],
            vec![top; 6],
            vec![12, 40, 61, 63, 64, 9],
        ] {
            let p = Position::from_digits(&K, digits).unwrap();
            let b = p.to_block();
            assert_eq!(K.trip_length, b.len());
            assert_eq!(p, Position::from_block(&b).unwrap());
        }
    }

    #[test]
    fn block_round_trip_every_char_everywhere() {
        for i in 0..K.trip_length {
            for d in 0..CHARS_LEN as u8 {
                let mut digits = vec![0; K.trip_length];
                digits[i] = d;
                let p = Position::from_digits(&K, digits).unwrap();
                let b = p.to_block();
                assert_eq!(CHARS[d as usize], b[i]);
                assert_eq!(p, Position::from_block(&b).unwrap());
            }
        }
    }

    #[test]
    fn last_tolerates_unvalidated_keyspace() {
        let k = Keyspace {
            trip_length: 2,
            worker_digits: 5,
        };
        assert_eq!(&[0, 0], Position::last(&k).digits());
    }

    #[test]
    fn from_block_rejects_foreign_chars() {
        Position::from_block(b"abcDef").unwrap_err();
    }

    #[test]
    fn serializes_as_int_list() {
        let p = Position::zero(&K).next(K.worker_digits).unwrap();
        assert_eq!("[0,0,1,0,0,0]", serde_json::to_string(&p).unwrap());
        let back: Position = serde_json::from_str("[0,0,1,0,0,0]").unwrap();
        assert_eq!(p, back);
    }
}
