//! config types.

use tripcode_api::Keyspace;

/// Configuration for running a DealerSrv.
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker thread count.
    ///
    /// These threads only read-and-advance the shared position and
    /// record matches, so they never block for long. A handful is
    /// plenty even for many remote clients.
    ///
    /// Defaults:
    /// - `testing = 2`
    /// - `production = cpu_count`
    pub worker_thread_count: usize,

    /// The address(es) at which to listen.
    ///
    /// Defaults:
    /// - `testing = "[127.0.0.1:0]"`
    /// - `production = "[0.0.0.0:52313]"`
    pub listen_address_list: Vec<std::net::SocketAddr>,

    /// How long an http handler waits on a worker thread before
    /// responding with an internal timeout error.
    ///
    /// Defaults:
    /// - `testing = 10s`
    /// - `production = 10s`
    pub request_timeout: std::time::Duration,

    /// Do not listen at all. The server then only serves in-process
    /// workers, exactly like a local dealer.
    ///
    /// Defaults:
    /// - `testing = false`
    /// - `production = false`
    pub standalone: bool,

    /// The keyspace shape. Remote clients must be configured with
    /// the same shape.
    ///
    /// Defaults:
    /// - `testing = 16 characters, 4 worker digits`
    /// - `production = 16 characters, 4 worker digits`
    pub keyspace: Keyspace,
}

impl Config {
    /// Get a dealer_srv config suitable for testing.
    pub fn testing() -> Self {
        Self {
            worker_thread_count: 2,
            listen_address_list: vec![(std::net::Ipv4Addr::LOCALHOST, 0).into()],
            request_timeout: std::time::Duration::from_secs(10),
            standalone: false,
            keyspace: Keyspace::default(),
        }
    }

    /// Get a dealer_srv config suitable for production.
    pub fn production() -> Self {
        Self {
            worker_thread_count: num_cpus::get(),
            listen_address_list: vec![(
                std::net::Ipv4Addr::UNSPECIFIED,
                crate::DEALER_PORT,
            )
                .into()],
            request_timeout: std::time::Duration::from_secs(10),
            standalone: false,
            keyspace: Keyspace::default(),
        }
    }
}
