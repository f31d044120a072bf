#![deny(missing_docs)]
//! Tripcode dealer server is an HTTP server that hands out blocks of
//! the tripcode keyspace to remote workers and collects the matches
//! they find.
//!
//! The server wraps a [tripcode_core::LocalDealer]. Local workers take
//! blocks straight from that dealer while remote workers take them over
//! http, and both draw from the same counter, so no block is ever handed
//! out twice. In `standalone` mode no listener is started at all and
//! the server behaves exactly like the local dealer.
//!
//! For details on the wire format, please see the [protocol].

/// This is a documentation module containing the dealer wire protocol.
///
/// #### 1. Types
///
/// ```text
/// Position = [ u8, .. ]   // one digit per candidate character,
///                         // least significant first, each < 65
/// ErrResponse = { "error": string }
/// OkResponse = {}
/// ```
///
/// #### 2. REST API
///
/// - `GET /pos`
///   - Response Body: `Position | ErrResponse`
/// - `POST /found?by=<label>&trip=<trip>`
///   - Response Body: `OkResponse | ErrResponse`
/// - `GET /health`
///   - Response Body: `OkResponse | ErrResponse`
///
/// ##### 2.1. Fetching a block.
///
/// A `GET` on `/pos`.
///
/// - Every request advances the shared position by one unit, exactly
///   like a local `next_block` call. The request is NOT idempotent:
///   a client that retries after a timeout skips a block, which is
///   lost work, never duplicated work.
/// - Once the keyspace is exhausted the server MUST respond with an
///   `ErrResponse` and status 500 on every further request.
///
/// ##### 2.2. Reporting a match.
///
/// A `POST` on `/found` with two query parameters, both form-url-encoded.
///
/// - `trip` - the matching candidate string.
/// - `by` - a label identifying the reporter, usually its hostname.
///
/// - The server MUST respond with status 400 if either is missing.
/// - The server prints a match notification attributed to `by` and
///   records the match.
/// - The server does not re-verify the digest. Reports are not
///   authenticated.
///
/// ##### 2.3. Health check.
///
/// A `GET` on `/health`.
///
/// - The server, in general, SHOULD return `OkResponse` to this request.
///
/// #### 3. Client Recommendations
///
/// - A client should treat any non-200 status or transport failure
///   on `/pos` as transient and try again.
/// - A client should not retry `/found`. It should surface the match
///   locally before reporting, so a failed report loses nothing for
///   the operator.
#[cfg(doc)]
pub mod protocol {}

/// The default port of the dealer server.
pub const DEALER_PORT: u16 = 52313;

mod config;
pub use config::*;

mod http;
use http::*;

mod server;
pub use server::*;
