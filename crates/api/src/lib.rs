#![deny(missing_docs)]
//! Tripcode API contains the dealer trait and the basic types required
//! to define the api of that trait.
//!
//! A tripcode search hands out non-overlapping [Block]s of the keyspace
//! from a [Dealer] to any number of workers. The dealer tracks its
//! progress as a [Position], a base-[CHARS_LEN] counter whose low
//! `worker_digits` are never advanced, since workers enumerate those
//! themselves.
//!
//! If you want to actually run a search, please see the tripcode crate.

mod error;
pub use error::*;

pub mod alphabet;
pub use alphabet::{CHARS, CHARS_LEN};

mod keyspace;
pub use keyspace::*;

mod position;
pub use position::*;

mod block;
pub use block::*;

pub mod dealer;
pub use dealer::*;
