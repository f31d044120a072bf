#![deny(missing_docs)]
//! Tripcode prefix search.
//!
//! [Search] wires one dealer to a pool of [Tripper] worker threads.
//! Without a remote host the dealer is a
//! [DealerSrv](tripcode_dealer_srv::DealerSrv), which serves remote
//! clients too unless it is `standalone`. With a remote host it is a
//! [ClientDealer](tripcode_dealer_client::ClientDealer) drawing blocks
//! from someone else's server.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tripcode_api::*;
use tripcode_core::{Found, TargetPrefix, Tripper, TripperConfig};
use tripcode_dealer_client::{ClientDealer, ClientDealerConfig};
use tripcode_dealer_srv::DealerSrv;

mod progress;
pub use progress::*;

/// Configuration for a [Search].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// The base64 prefix to search for.
    pub prefix: String,

    /// Number of worker threads.
    ///
    /// Default: twice the cpu count.
    pub workers: usize,

    /// Search one block per worker, then return.
    ///
    /// Default: false.
    pub once: bool,

    /// Take blocks from the dealer server at this base url instead of
    /// dealing them ourselves.
    ///
    /// Default: None.
    pub remote: Option<String>,

    /// Where the dealer server listens when we are not a client.
    ///
    /// Default: `0.0.0.0:52313`.
    pub listen_address: std::net::SocketAddr,

    /// Deal blocks to local workers only, without listening.
    ///
    /// Default: false.
    pub standalone: bool,

    /// The keyspace shape. Remote clients and their server must agree.
    pub keyspace: Keyspace,
}

impl SearchConfig {
    /// A default configuration for `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            workers: num_cpus::get() * 2,
            once: false,
            remote: None,
            listen_address: (
                std::net::Ipv4Addr::UNSPECIFIED,
                tripcode_dealer_srv::DEALER_PORT,
            )
                .into(),
            standalone: false,
            keyspace: Keyspace::default(),
        }
    }
}

#[derive(Debug)]
enum Backend {
    Server(Arc<DealerSrv>),
    Client(Arc<ClientDealer>),
}

/// Stops the workers of a [Search]. Cheap to clone.
#[derive(Debug, Clone)]
struct Stopper {
    cont: Arc<AtomicBool>,
    client: Option<Arc<ClientDealer>>,
    failure: Arc<Mutex<Option<TripError>>>,
}

impl Stopper {
    /// Stop everyone because of `err`, unless we are already stopping,
    /// in which case `err` is most likely a result of the shutdown.
    fn fail(&self, err: TripError) {
        {
            let mut failure = self.failure.lock().unwrap();
            if self.is_stopped() {
                tracing::debug!(?err, "tripper ended during shutdown");
                return;
            }
            tracing::error!(?err, "tripper failed");
            *failure = Some(err);
        }
        self.stop();
    }

    fn stop(&self) {
        self.cont.store(false, Ordering::SeqCst);

        // wake workers parked on an empty handoff slot
        if let Some(client) = &self.client {
            client.close();
        }
    }

    fn is_stopped(&self) -> bool {
        !self.cont.load(Ordering::SeqCst)
    }
}

/// A running prefix search.
#[derive(Debug)]
pub struct Search {
    config: SearchConfig,
    backend: Backend,
    stopper: Stopper,
    counters: Mutex<Vec<Arc<AtomicU64>>>,
}

impl Search {
    /// Check the configuration, build the dealer and start it.
    ///
    /// The prefix is checked first, so a configuration error never
    /// leaves a thread or a socket behind.
    pub fn new(config: SearchConfig) -> TripResult<Self> {
        TargetPrefix::parse(&config.prefix)?;
        config.keyspace.validate()?;
        if config.workers == 0 {
            return Err(TripError::other("at least one worker is required"));
        }

        let backend = match &config.remote {
            Some(server_url) => {
                let client = Arc::new(ClientDealer::new(ClientDealerConfig {
                    keyspace: config.keyspace,
                    ..ClientDealerConfig::new(server_url.clone())
                })?);
                client.start()?;
                tracing::info!(%server_url, "taking blocks from remote dealer");
                Backend::Client(client)
            }
            None => {
                let srv = Arc::new(DealerSrv::new(tripcode_dealer_srv::Config {
                    listen_address_list: vec![config.listen_address],
                    standalone: config.standalone,
                    keyspace: config.keyspace,
                    ..tripcode_dealer_srv::Config::production()
                })?);
                srv.start()?;
                srv.print_addrs();
                Backend::Server(srv)
            }
        };

        let stopper = Stopper {
            cont: Arc::new(AtomicBool::new(true)),
            client: match &backend {
                Backend::Client(client) => Some(client.clone()),
                Backend::Server(_) => None,
            },
            failure: Arc::new(Mutex::new(None)),
        };

        Ok(Self {
            config,
            backend,
            stopper,
            counters: Mutex::new(Vec::new()),
        })
    }

    /// The dealer all workers of this search share.
    pub fn dealer(&self) -> DynDealer {
        match &self.backend {
            Backend::Server(srv) => srv.clone(),
            Backend::Client(client) => client.clone(),
        }
    }

    /// The addresses remote clients can reach us at. Empty for clients
    /// and standalone searches.
    pub fn listen_addrs(&self) -> Vec<std::net::SocketAddr> {
        match &self.backend {
            Backend::Server(srv) => srv.listen_addrs(),
            Backend::Client(_) => Vec::new(),
        }
    }

    /// Matches surfaced by this process, including those reported to
    /// our server by remote clients.
    pub fn found(&self) -> Vec<Found> {
        match &self.backend {
            Backend::Server(srv) => srv.local_dealer().found(),
            Backend::Client(client) => client.found(),
        }
    }

    /// Run the workers and wait for all of them to return.
    ///
    /// Any worker failing stops the others, and the first such failure
    /// is returned. Errors seen after [Search::stop] are ignored.
    pub fn run(&self) -> TripResult<()> {
        let tripper_config = TripperConfig {
            once: self.config.once,
            worker_digits: self.config.keyspace.worker_digits,
            ..TripperConfig::new(self.config.prefix.clone())
        };

        tracing::info!(workers = self.config.workers, "starting search");

        let mut tasks = Vec::with_capacity(self.config.workers);
        for i in 0..self.config.workers {
            let tripper = Tripper::new(self.dealer(), tripper_config.clone())
                .with_cont(self.stopper.cont.clone());
            self.counters.lock().unwrap().push(tripper.counter());

            let stopper = self.stopper.clone();
            let task = std::thread::Builder::new()
                .name(format!("tripper-{i}"))
                .spawn(move || {
                    if let Err(err) = tripper.run() {
                        stopper.fail(err);
                    }
                });

            match task {
                Ok(task) => tasks.push(task),
                Err(err) => {
                    self.stop();
                    tasks.into_iter().for_each(|t| drop(t.join()));
                    return Err(TripError::other_src(
                        "failed to spawn tripper thread",
                        err,
                    ));
                }
            }
        }

        for task in tasks {
            if task.join().is_err() {
                self.stopper
                    .fail(TripError::other("tripper thread panicked"));
            }
        }

        match self.stopper.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Total candidates examined by all workers so far. Advisory.
    pub fn total_count(&self) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Ask all workers to return. They notice within one check interval.
    pub fn stop(&self) {
        self.stopper.stop();
    }

    /// True once [Search::stop] was called or a worker failed.
    pub fn is_stopped(&self) -> bool {
        self.stopper.is_stopped()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let c = SearchConfig::new("aaaaa");
        assert!(c.workers >= 2);
        assert_eq!(52313, c.listen_address.port());
        assert!(c.remote.is_none());
        assert!(!c.once);
        assert!(!c.standalone);
    }

    #[test]
    fn config_errors_come_first() {
        let mut c = SearchConfig::new("abc");
        c.standalone = true;
        let err = Search::new(c).unwrap_err();
        assert!(err.is_config(), "{err:?}");

        let mut c = SearchConfig::new("a=aaaa");
        c.remote = Some("not a url".into());
        let err = Search::new(c).unwrap_err();
        assert!(err.is_config(), "{err:?}");
    }

    #[test]
    fn reject_zero_workers() {
        let mut c = SearchConfig::new("aaaaa");
        c.standalone = true;
        c.workers = 0;
        assert!(Search::new(c).is_err());
    }
}
