//! The in-process dealer.

use crate::found::{self, Found};
use std::sync::{Arc, Mutex};
use tripcode_api::*;

#[derive(Debug)]
struct State {
    pos: Position,
    issued: u64,
}

/// A dealer whose position counter lives in memory.
///
/// All in-process workers share one instance. The position is only
/// reachable through [LocalDealer::next_position], which reads and
/// advances it under a single lock.
#[derive(Debug)]
pub struct LocalDealer {
    keyspace: Keyspace,
    state: Mutex<State>,
    found: Mutex<Vec<Found>>,
}

impl LocalDealer {
    /// Construct a dealer at the start of the keyspace.
    pub fn new(keyspace: Keyspace) -> TripResult<Self> {
        let pos = Position::zero(&keyspace);
        Self::with_position(keyspace, pos)
    }

    /// Construct a dealer that will hand out `pos` next.
    pub fn with_position(keyspace: Keyspace, pos: Position) -> TripResult<Self> {
        keyspace.validate()?;
        let pos = Position::from_digits(&keyspace, pos.into_digits())?;
        Ok(Self {
            keyspace,
            state: Mutex::new(State { pos, issued: 0 }),
            found: Mutex::new(Vec::new()),
        })
    }

    /// Construct a trait-object dealer at the start of the keyspace.
    pub fn create(keyspace: Keyspace) -> TripResult<DynDealer> {
        let out: DynDealer = Arc::new(Self::new(keyspace)?);
        Ok(out)
    }

    /// The keyspace this dealer covers.
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// Take the current position and advance the counter by one unit.
    ///
    /// The returned position is a copy taken under the lock, so later
    /// increments never show through to a slow caller. If the counter
    /// cannot be advanced nothing is handed out and the state is left
    /// untouched, so every later call fails the same way.
    pub fn next_position(&self) -> TripResult<Position> {
        let mut state = self.state.lock().unwrap();
        let next = state
            .pos
            .next(self.keyspace.worker_digits)
            .ok_or(TripError::KeyspaceExhausted {
                issued: state.issued,
            })?;
        let out = std::mem::replace(&mut state.pos, next);
        state.issued += 1;
        Ok(out)
    }

    /// The number of blocks handed out so far.
    pub fn issued(&self) -> u64 {
        self.state.lock().unwrap().issued
    }

    /// Announce a match and keep a record of it.
    pub fn record_found(&self, trip: &str, by: &str) -> Found {
        let found = found::announce(trip, by);
        self.found.lock().unwrap().push(found.clone());
        found
    }

    /// All matches recorded so far.
    pub fn found(&self) -> Vec<Found> {
        self.found.lock().unwrap().clone()
    }
}

impl Dealer for LocalDealer {
    fn start(&self) -> TripResult<()> {
        Ok(())
    }

    fn next_block(&self) -> TripResult<Block> {
        Ok(self.next_position()?.to_block())
    }

    fn report_match(&self, trip: &str) {
        self.record_found(trip, found::MYSELF);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    const K: Keyspace = Keyspace {
        trip_length: 6,
        worker_digits: 2,
    };

    #[test]
    fn starts_at_zero() {
        let d = LocalDealer::new(Keyspace::default()).unwrap();
        let b = d.next_block().unwrap();
        assert_eq!(b"0000000000000000", &b[..]);
        assert_eq!(1, d.issued());
    }

    #[test]
    fn two_calls_differ_by_one_unit() {
        let d = LocalDealer::new(K).unwrap();
        let a = d.next_position().unwrap();
        let b = d.next_position().unwrap();
        assert_eq!(Position::zero(&K), a);
        assert_eq!(a.next(K.worker_digits).unwrap(), b);
        assert_eq!(b"002000", &d.next_block().unwrap()[..]);
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let d = LocalDealer::with_position(K, Position::last(&K)).unwrap();
        for _ in 0..3 {
            match d.next_block() {
                Err(TripError::KeyspaceExhausted { issued: 0 }) => (),
                oth => panic!("expected exhaustion, got {oth:?}"),
            }
        }
        assert_eq!(0, d.issued());
    }

    #[test]
    fn reject_position_outside_keyspace() {
        LocalDealer::with_position(K, Position::zero(&Keyspace::default()))
            .unwrap_err();
    }

    #[test]
    fn concurrent_calls_are_unique_and_sequential() {
        const THREADS: usize = 8;
        const CALLS: usize = 500;

        let d = Arc::new(LocalDealer::new(K).unwrap());

        let handles = (0..THREADS)
            .map(|_| {
                let d = d.clone();
                std::thread::spawn(move || {
                    (0..CALLS)
                        .map(|_| d.next_position().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let mut all = HashSet::new();
        for h in handles {
            for p in h.join().unwrap() {
                assert!(all.insert(p), "duplicate position");
            }
        }

        // the returned set is exactly the first N values of the sequence
        let mut expect = HashSet::new();
        let mut p = Position::zero(&K);
        for _ in 0..THREADS * CALLS {
            let n = p.next(K.worker_digits).unwrap();
            expect.insert(std::mem::replace(&mut p, n));
        }
        assert_eq!(expect, all);
        assert_eq!((THREADS * CALLS) as u64, d.issued());
    }

    #[test]
    fn report_match_is_recorded() {
        let d = LocalDealer::new(K).unwrap();
        d.report_match("abc");
        d.record_found("def", "remote-host");
        let found = d.found();
        assert_eq!(2, found.len());
        assert_eq!("abc", found[0].trip);
        assert_eq!(found::MYSELF, found[0].by);
        assert_eq!("remote-host", found[1].by);
    }
}
