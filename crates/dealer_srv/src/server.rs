//! dealer http server types.

use std::sync::{Arc, Mutex};

use tripcode_api::*;
use tripcode_core::LocalDealer;

use crate::*;

/// Print out a message if this thread dies.
struct ThreadGuard(&'static str);

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        tracing::debug!("{}", self.0);
    }
}

struct Running {
    cont: Arc<std::sync::atomic::AtomicBool>,
    workers: Vec<std::thread::JoinHandle<()>>,
    addrs: Vec<std::net::SocketAddr>,
    server: Option<Server>,
}

/// A dealer that also serves its blocks to remote workers.
///
/// This server is built to be direct, light-weight, and responsive.
/// Request handling runs on os thread workers. The async http front
/// end only forwards requests to them.
pub struct DealerSrv {
    config: Arc<Config>,
    dealer: Arc<LocalDealer>,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for DealerSrv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DealerSrv")
            .field("config", &self.config)
            .field("dealer", &self.dealer)
            .field("listen_addrs", &self.listen_addrs())
            .finish()
    }
}

impl Drop for DealerSrv {
    fn drop(&mut self) {
        let _g = ThreadGuard("Server Shutdown Complete!");

        tracing::debug!("begin server shutdown...");
        let _ = self.shutdown();
    }
}

impl DealerSrv {
    /// Construct a new DealerSrv at the start of the keyspace.
    ///
    /// Nothing is bound until [Dealer::start] is called.
    pub fn new(config: Config) -> TripResult<Self> {
        let dealer = Arc::new(LocalDealer::new(config.keyspace)?);
        Ok(Self::with_dealer(config, dealer))
    }

    /// Construct a new DealerSrv serving an existing local dealer.
    pub fn with_dealer(config: Config, dealer: Arc<LocalDealer>) -> Self {
        Self {
            config: Arc::new(config),
            dealer,
            running: Mutex::new(None),
        }
    }

    /// Construct and start a trait-object DealerSrv.
    pub fn create(config: Config) -> TripResult<DynDealer> {
        let out = Self::new(config)?;
        out.start()?;
        let out: DynDealer = Arc::new(out);
        Ok(out)
    }

    /// The wrapped local dealer.
    pub fn local_dealer(&self) -> &Arc<LocalDealer> {
        &self.dealer
    }

    /// Get the bound listening addresses of this server.
    ///
    /// Empty before [Dealer::start], and always empty in standalone mode.
    pub fn listen_addrs(&self) -> Vec<std::net::SocketAddr> {
        match self.running.lock().unwrap().as_ref() {
            Some(running) => running.addrs.clone(),
            None => Vec::new(),
        }
    }

    /// Print the address server started on
    pub fn print_addrs(&self) {
        println!("#tripcode_dealer_srv#running#");
        for addr in self.listen_addrs() {
            // print these incase someone wants to parse for them
            println!("#tripcode_dealer_srv#listening#{addr:?}#");
        }
    }

    /// Shutdown the server, returning an error result if any
    /// of the worker threads had panicked.
    pub fn shutdown(&self) -> std::io::Result<()> {
        let mut running = match self.running.lock().unwrap().take() {
            Some(running) => running,
            None => return Ok(()),
        };

        let mut is_err = false;
        running.cont.store(false, std::sync::atomic::Ordering::SeqCst);
        drop(running.server.take());
        while let Some(worker) = running.workers.pop() {
            tracing::debug!(
                "waiting on {} threads to close...",
                running.workers.len() + 1
            );
            if worker.join().is_err() {
                tracing::error!("worker thread panicked");
                is_err = true;
            }
        }
        tracing::debug!("all threads closed.");
        if is_err {
            Err(std::io::Error::other("Failure shutting down worker thread"))
        } else {
            Ok(())
        }
    }

    fn serve(&self) -> std::io::Result<()> {
        let mut lock = self.running.lock().unwrap();
        if lock.is_some() {
            return Ok(());
        }

        // atomic flag for telling worker threads to shutdown
        let cont = Arc::new(std::sync::atomic::AtomicBool::new(true));

        // start the actual http server
        let server = Server::new(self.config.clone())?;

        // get the address that was assigned
        let addrs = server.server_addrs().to_vec();
        tracing::info!(?addrs, "Listening");

        // spawn our worker threads
        let mut workers = Vec::with_capacity(self.config.worker_thread_count);
        for _ in 0..self.config.worker_thread_count {
            let cont = cont.clone();
            let dealer = self.dealer.clone();
            let recv = server.receiver().clone();
            workers.push(std::thread::spawn(move || worker(cont, dealer, recv)));
        }

        *lock = Some(Running {
            cont,
            workers,
            addrs,
            server: Some(server),
        });

        Ok(())
    }
}

impl Dealer for DealerSrv {
    fn start(&self) -> TripResult<()> {
        if self.config.standalone {
            tracing::info!("standalone, not listening");
            return Ok(());
        }
        self.serve()
            .map_err(|err| TripError::other_src("failed to start dealer server", err))
    }

    fn next_block(&self) -> TripResult<Block> {
        self.dealer.next_block()
    }

    fn report_match(&self, trip: &str) {
        self.dealer.report_match(trip)
    }
}

fn worker(
    cont: Arc<std::sync::atomic::AtomicBool>,
    dealer: Arc<LocalDealer>,
    recv: HttpReceiver,
) {
    let _g = ThreadGuard("worker thread has ended");

    while cont.load(std::sync::atomic::Ordering::SeqCst) {
        let (req, res) = match recv.recv() {
            None => break,
            Some(r) => r,
        };

        let handler = Handler {
            dealer: &dealer,
            res,
        };

        handler.handle(req);
    }
}

/// `{"error": "<debug text>"}`
fn error_body(err: &std::io::Error) -> Vec<u8> {
    serde_json::json!({ "error": format!("{err:?}") })
        .to_string()
        .into_bytes()
}

struct Handler<'lt> {
    dealer: &'lt LocalDealer,
    res: HttpRespondCb,
}

impl Handler<'_> {
    /// Wrap the handle call so we can respond to the client with errors.
    ///
    /// Every request gets a response, so a failing request never takes
    /// its worker thread down with it.
    pub fn handle(self, req: HttpRequest) {
        match self.handle_inner(req) {
            Ok((status, body)) => self.respond(status, body),
            Err(err) => {
                tracing::warn!(?err, "request failed");
                self.respond(500, error_body(&err))
            }
        }
    }

    /// Dispatch to the correct handlers.
    fn handle_inner(&self, req: HttpRequest) -> std::io::Result<(u16, Vec<u8>)> {
        match req {
            HttpRequest::HealthGet => Ok((200, b"{}".to_vec())),
            HttpRequest::PosGet => self.handle_pos_get(),
            HttpRequest::FoundPost { trip, by } => {
                self.handle_found_post(trip, by)
            }
        }
    }

    /// Hand out the next position.
    fn handle_pos_get(&self) -> std::io::Result<(u16, Vec<u8>)> {
        let pos = self.dealer.next_position().map_err(std::io::Error::other)?;

        Ok((200, serde_json::to_vec(&pos)?))
    }

    /// Announce a match found by a remote worker.
    fn handle_found_post(
        &self,
        trip: String,
        by: String,
    ) -> std::io::Result<(u16, Vec<u8>)> {
        self.dealer.record_found(&trip, &by);

        Ok((200, b"{}".to_vec()))
    }

    /// Process the response.
    fn respond(self, status: u16, body: Vec<u8>) {
        let Self { res, .. } = self;
        res(HttpResponse { status, body });
    }
}
