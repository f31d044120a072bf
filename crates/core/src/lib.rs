#![deny(missing_docs)]
//! Tripcode search core.
//!
//! - [LocalDealer] is the in-process [Dealer](tripcode_api::Dealer),
//!   also wrapped by the dealer server.
//! - [Tripper] is the search worker. Any number of them can share one
//!   dealer.
//! - [TargetPrefix] turns the user supplied prefix into the two-stage
//!   digest match the worker runs on every candidate.

pub mod found;
pub use found::Found;

mod local_dealer;
pub use local_dealer::*;

pub mod prefix;
pub use prefix::TargetPrefix;

mod tripper;
pub use tripper::*;
