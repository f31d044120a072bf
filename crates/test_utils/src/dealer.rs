//! An in-memory dealer for worker tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tripcode_api::*;

/// A dealer that hands out a scripted list of blocks.
///
/// Once the list runs out every call fails with
/// [TripError::KeyspaceExhausted]. Reported matches are kept in order,
/// and every call to [Dealer::next_block] is counted, including the
/// failing ones.
#[derive(Debug, Default)]
pub struct FakeDealer {
    blocks: Mutex<VecDeque<Block>>,
    found: Mutex<Vec<String>>,
    calls: AtomicU64,
    issued: AtomicU64,
}

impl FakeDealer {
    /// Construct a fake dealer that will hand out `blocks` in order.
    pub fn new<I: IntoIterator<Item = Block>>(blocks: I) -> Arc<Self> {
        Arc::new(Self {
            blocks: Mutex::new(blocks.into_iter().collect()),
            ..Default::default()
        })
    }

    /// Construct a fake dealer handing out the blocks of `positions`.
    pub fn from_positions<I: IntoIterator<Item = Position>>(
        positions: I,
    ) -> Arc<Self> {
        Self::new(positions.into_iter().map(|p| p.to_block()))
    }

    /// Every trip reported so far.
    pub fn found(&self) -> Vec<String> {
        self.found.lock().unwrap().clone()
    }

    /// How many times `next_block` was called.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Dealer for FakeDealer {
    fn start(&self) -> TripResult<()> {
        Ok(())
    }

    fn next_block(&self) -> TripResult<Block> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.blocks.lock().unwrap().pop_front() {
            Some(block) => {
                self.issued.fetch_add(1, Ordering::SeqCst);
                Ok(block)
            }
            None => Err(TripError::KeyspaceExhausted {
                issued: self.issued.load(Ordering::SeqCst),
            }),
        }
    }

    fn report_match(&self, trip: &str) {
        self.found.lock().unwrap().push(trip.to_string());
    }
}
