//! The search worker.

use crate::prefix::TargetPrefix;
use sha1::Digest;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tripcode_api::*;

/// Candidates between checks of the continue flag, and between
/// updates of the shared candidate counter.
const CHECK_INTERVAL: u64 = (CHARS_LEN * CHARS_LEN) as u64;

/// Configuration for a [Tripper].
#[derive(Debug, Clone)]
pub struct TripperConfig {
    /// The base64 prefix to search for.
    pub prefix: String,

    /// Search a single block and return, instead of running until
    /// the dealer is exhausted or the worker is stopped.
    pub once: bool,

    /// Low-order block positions this worker enumerates. Must match
    /// the dealer's keyspace.
    ///
    /// Default: 4.
    pub worker_digits: usize,
}

impl TripperConfig {
    /// A run-forever configuration over the canonical keyspace.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            once: false,
            worker_digits: Keyspace::default().worker_digits,
        }
    }
}

/// Write combination number `index` into the worker-owned positions.
///
/// Digit decomposition in base [CHARS_LEN], `out[0]` varies fastest.
/// Every index in `0..CHARS_LEN ^ out.len()` maps to a distinct
/// combination.
#[inline]
pub fn combination(index: u64, out: &mut [u8]) {
    let mut rem = index;
    for c in out.iter_mut() {
        *c = CHARS[(rem % CHARS_LEN as u64) as usize];
        rem /= CHARS_LEN as u64;
    }
}

/// Exhaustively searches blocks handed out by a [Dealer].
#[derive(Debug)]
pub struct Tripper {
    dealer: DynDealer,
    config: TripperConfig,
    count: Arc<AtomicU64>,
    cont: Arc<AtomicBool>,
}

impl Tripper {
    /// Construct a new worker bound to `dealer`.
    pub fn new(dealer: DynDealer, config: TripperConfig) -> Self {
        Self {
            dealer,
            config,
            count: Arc::new(AtomicU64::new(0)),
            cont: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Observe a shared continue flag. Once it is cleared the worker
    /// stops at the next check and [Tripper::run] returns `Ok(())`.
    pub fn with_cont(mut self, cont: Arc<AtomicBool>) -> Self {
        self.cont = cont;
        self
    }

    /// The running count of candidates examined. Advisory only, it is
    /// updated in batches with relaxed ordering.
    pub fn counter(&self) -> Arc<AtomicU64> {
        self.count.clone()
    }

    /// Candidates examined so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Fetch and search blocks.
    ///
    /// Configuration errors are returned before any block is fetched.
    /// Dealer errors, including keyspace exhaustion, are returned as-is.
    /// Matches never stop the search.
    pub fn run(&self) -> TripResult<()> {
        let prefix = TargetPrefix::parse(&self.config.prefix)?;
        let worker_digits = self.config.worker_digits;
        let block_size = Keyspace {
            trip_length: worker_digits + 1,
            worker_digits,
        }
        .validate()
        .map(|_| (CHARS_LEN as u64).pow(worker_digits as u32))?;

        tracing::debug!(%prefix, worker_digits, "tripper starting");

        while self.cont.load(Ordering::Relaxed) {
            let mut block = self.dealer.next_block()?;
            if block.len() <= worker_digits {
                return Err(TripError::invalid_position(format!(
                    "block of {} characters leaves nothing past the {} worker digits",
                    block.len(),
                    worker_digits,
                )));
            }

            self.search_block(&prefix, &mut block, worker_digits, block_size);

            if self.config.once {
                break;
            }
        }

        Ok(())
    }

    fn search_block(
        &self,
        prefix: &TargetPrefix,
        block: &mut Block,
        worker_digits: usize,
        block_size: u64,
    ) {
        let mut pending = 0;

        for index in 0..block_size {
            if pending == CHECK_INTERVAL {
                self.count.fetch_add(pending, Ordering::Relaxed);
                pending = 0;
                if !self.cont.load(Ordering::Relaxed) {
                    return;
                }
            }

            combination(index, &mut block[..worker_digits]);

            let digest = sha1::Sha1::digest(&block[..]);
            if prefix.matches(&digest) {
                self.dealer.report_match(&block.to_string());
            }

            pending += 1;
        }

        self.count.fetch_add(pending, Ordering::Relaxed);
    }
}
