//! A client for the tripcode dealer server.

#![deny(missing_docs)]

use std::sync::{Arc, Mutex};
use tripcode_api::*;
use tripcode_core::found::{self, Found};
use url::Url;

/// The reporter label used when the hostname cannot be determined.
pub const UNNAMED_CLIENT: &str = "unnamed-client";

/// Take the next position from the dealer server.
///
/// Every call consumes one unit of the server's keyspace, whether or not
/// the response makes it back to us. The received digit list is checked
/// against `keyspace` before it is returned.
///
/// Note the `blocking_` prefix. This is a hint to the caller that if the function is used in
/// an async context, it should be treated as a blocking operation.
pub fn blocking_fetch(
    agent: &ureq::Agent,
    mut server_url: Url,
    keyspace: &Keyspace,
) -> TripResult<Position> {
    server_url.set_path("pos");

    let encoded = agent
        .get(server_url.as_str())
        .call()
        .map_err(|e| TripError::other_src("Failed to fetch position", e))?
        .into_string()
        .map_err(TripError::other)?;

    let digits: Vec<u8> = serde_json::from_str(&encoded).map_err(|e| {
        TripError::invalid_position(format!("{e}: {encoded:?}"))
    })?;

    Position::from_digits(keyspace, digits)
}

/// Report a match to the dealer server, attributed to `by`.
///
/// Note the `blocking_` prefix. This is a hint to the caller that if the function is used in
/// an async context, it should be treated as a blocking operation.
pub fn blocking_report(
    agent: &ureq::Agent,
    mut server_url: Url,
    trip: &str,
    by: &str,
) -> TripResult<()> {
    server_url.set_path("found");

    agent
        .post(server_url.as_str())
        .query("by", by)
        .query("trip", trip)
        .call()
        .map_err(|e| TripError::other_src("Failed to report match", e))?;

    Ok(())
}

/// The local machine's hostname, or [UNNAMED_CLIENT].
pub fn default_reporter() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNNAMED_CLIENT.to_string())
}

/// Configuration for a [ClientDealer].
#[derive(Debug, Clone)]
pub struct ClientDealerConfig {
    /// The dealer server base url, e.g. `http://host:52313`.
    pub server_url: String,

    /// Timeout for each http request to the server.
    ///
    /// Default: 1 second.
    pub request_timeout_ms: u32,

    /// Minimum backoff in ms between failed polls.
    ///
    /// Default: 0, retry immediately.
    pub backoff_min_ms: u32,

    /// Maximum backoff in ms between failed polls. The wait doubles
    /// from the minimum up to this value, and resets on success.
    /// Zero disables the backoff.
    ///
    /// Default: 0, retry immediately.
    pub backoff_max_ms: u32,

    /// The label sent along with match reports.
    ///
    /// Default: the local hostname.
    pub reporter: String,

    /// The keyspace shape. Must match the server's.
    pub keyspace: Keyspace,
}

impl ClientDealerConfig {
    /// A default configuration against `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            request_timeout_ms: 1000,
            backoff_min_ms: 0,
            backoff_max_ms: 0,
            reporter: default_reporter(),
            keyspace: Keyspace::default(),
        }
    }

    /// Get the request timeout duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms as u64)
    }

    /// Get the minimum backoff duration.
    pub fn backoff_min(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.backoff_min_ms as u64)
    }

    /// Get the maximum backoff duration.
    pub fn backoff_max(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.backoff_max_ms as u64)
    }

    /// The wait before the next poll after a failure, given the wait
    /// used after the previous consecutive failure, if any.
    ///
    /// Zero while `backoff_max_ms` is zero. Otherwise doubles from
    /// `backoff_min_ms` (at least 1ms) up to `backoff_max_ms`.
    pub fn next_backoff(
        &self,
        prev: Option<std::time::Duration>,
    ) -> std::time::Duration {
        let max = self.backoff_max();
        if max.is_zero() {
            return max;
        }
        let next = match prev {
            None => self
                .backoff_min()
                .max(std::time::Duration::from_millis(1)),
            Some(p) => p * 2,
        };
        next.min(max)
    }

    /// Check the server url and keyspace, returning the parsed url.
    pub fn validate(&self) -> TripResult<Url> {
        self.keyspace.validate()?;

        let url = Url::parse(&self.server_url).map_err(|e| {
            TripError::other_src(
                format!("invalid server url {:?}", self.server_url),
                e,
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base()
        {
            return Err(TripError::other(format!(
                "server url must be an http(s) base url: {:?}",
                self.server_url
            )));
        }

        Ok(url)
    }
}

type PosSend = async_channel::Sender<Position>;
type PosRecv = async_channel::Receiver<Position>;

/// A dealer that takes its blocks from a remote dealer server.
///
/// [Dealer::start] spawns a poll thread which keeps one position ready
/// in a single-slot channel. [Dealer::next_block] waits on that slot, so
/// workers stall (without failing) while the server is unreachable.
pub struct ClientDealer {
    config: Arc<ClientDealerConfig>,
    server_url: Url,
    agent: ureq::Agent,
    send: PosSend,
    recv: PosRecv,
    poll_task: Mutex<Option<std::thread::JoinHandle<()>>>,
    found: Mutex<Vec<Found>>,
}

impl std::fmt::Debug for ClientDealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDealer")
            .field("config", &self.config)
            .field("closed", &self.recv.is_closed())
            .finish()
    }
}

impl Drop for ClientDealer {
    fn drop(&mut self) {
        self.close();
    }
}

impl ClientDealer {
    /// Construct a new client dealer. Nothing is fetched until
    /// [Dealer::start] is called.
    pub fn new(config: ClientDealerConfig) -> TripResult<Self> {
        let server_url = config.validate()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();

        // one block of lookahead
        let (send, recv) = async_channel::bounded(1);

        Ok(Self {
            config: Arc::new(config),
            server_url,
            agent,
            send,
            recv,
            poll_task: Mutex::new(None),
            found: Mutex::new(Vec::new()),
        })
    }

    /// Construct and start a trait-object client dealer.
    pub fn create(config: ClientDealerConfig) -> TripResult<DynDealer> {
        let out = Self::new(config)?;
        out.start()?;
        let out: DynDealer = Arc::new(out);
        Ok(out)
    }

    /// The parsed server url.
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// All matches reported through this dealer.
    pub fn found(&self) -> Vec<Found> {
        self.found.lock().unwrap().clone()
    }

    /// Stop polling. Pending and future [Dealer::next_block] calls
    /// return an error once the slot is drained.
    pub fn close(&self) {
        self.send.close();
        if let Some(task) = self.poll_task.lock().unwrap().take() {
            if task.join().is_err() {
                tracing::error!("client dealer poll thread panicked");
            }
        }
    }
}

impl Dealer for ClientDealer {
    fn start(&self) -> TripResult<()> {
        let mut lock = self.poll_task.lock().unwrap();
        if lock.is_some() || self.send.is_closed() {
            return Ok(());
        }

        let config = self.config.clone();
        let agent = self.agent.clone();
        let server_url = self.server_url.clone();
        let send = self.send.clone();

        let task = std::thread::Builder::new()
            .name("tripcode-dealer-poll".into())
            .spawn(move || poll_task(config, agent, server_url, send))
            .map_err(|e| TripError::other_src("failed to spawn poll thread", e))?;

        *lock = Some(task);

        Ok(())
    }

    fn next_block(&self) -> TripResult<Block> {
        match self.recv.recv_blocking() {
            Ok(pos) => Ok(pos.to_block()),
            Err(_) => Err(TripError::other("client dealer closed")),
        }
    }

    fn report_match(&self, trip: &str) {
        // surface the match locally first, the remote report may fail
        let found = found::announce(trip, found::MYSELF);
        self.found.lock().unwrap().push(found);

        if let Err(err) = blocking_report(
            &self.agent,
            self.server_url.clone(),
            trip,
            &self.config.reporter,
        ) {
            tracing::warn!(?err, "failed to report match to dealer server");
        }
    }
}

fn poll_task(
    config: Arc<ClientDealerConfig>,
    agent: ureq::Agent,
    server_url: Url,
    send: PosSend,
) {
    let mut wait = None;

    while !send.is_closed() {
        match blocking_fetch(&agent, server_url.clone(), &config.keyspace) {
            Ok(pos) => {
                wait = None;

                tracing::trace!(?pos, "fetched position");

                // blocks until the slot is free
                if send.send_blocking(pos).is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(?err, "failed to fetch position from dealer server");

                let next = config.next_backoff(wait);
                wait = Some(next);

                if !next.is_zero() {
                    std::thread::sleep(next);
                }
            }
        }
    }

    tracing::debug!("client dealer poll thread has ended");
}
