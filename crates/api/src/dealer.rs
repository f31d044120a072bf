//! Tripcode dealer related types.

use crate::*;
use std::sync::Arc;

/// Hands out non-overlapping blocks of the keyspace.
///
/// Every implementation must guarantee that no two calls to
/// [Dealer::next_block], from any number of threads (and, for networked
/// dealers, from any number of machines), ever return blocks derived
/// from the same [Position].
///
/// Workers depend only on this trait, so the same worker code runs
/// against a local, a serving, or a remote dealer.
pub trait Dealer: 'static + Send + Sync + std::fmt::Debug {
    /// Begin serving. For purely local dealers this is a no-op.
    /// Networked dealers start their listener or polling task here.
    fn start(&self) -> TripResult<()>;

    /// Atomically take the next unassigned block.
    ///
    /// Returns [TripError::KeyspaceExhausted] once the position counter
    /// can no longer be advanced. Remote dealers may block here until
    /// a block is available.
    fn next_block(&self) -> TripResult<Block>;

    /// Record a verified match.
    ///
    /// Must not block for long: remote dealers report on a best-effort
    /// basis and only log failures.
    fn report_match(&self, trip: &str);
}

/// Trait-object [Dealer].
pub type DynDealer = Arc<dyn Dealer>;
