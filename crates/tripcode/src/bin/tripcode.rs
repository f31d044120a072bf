//! The binary tripcode.
//!
//! Searches for a trip whose SHA-1 digest, base64 encoded, starts with
//! the given prefix.

use std::io::Write;
use std::sync::Arc;
use tripcode::*;

#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The base64 prefix to search for, at least 5 characters.
    pub prefix: String,

    /// Number of worker threads. Defaults to twice the cpu count.
    #[arg(short = 'n', long)]
    pub workers: Option<usize>,

    /// Take blocks from the dealer server on this host instead of
    /// dealing them ourselves. A full `http://` url is accepted too.
    #[arg(long)]
    pub remote: Option<String>,

    /// The dealer server port, ours or the remote one.
    #[arg(long, default_value_t = tripcode_dealer_srv::DEALER_PORT)]
    pub port: u16,

    /// Do not listen for remote clients.
    #[arg(long, conflicts_with = "remote")]
    pub standalone: bool,

    /// Search a single block per worker, then exit.
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Map the command line onto a search configuration.
    pub fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::new(self.prefix.clone());
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.once = self.once;
        config.standalone = self.standalone;
        config.listen_address.set_port(self.port);
        config.remote = self.remote.as_ref().map(|host| {
            if host.contains("://") {
                host.clone()
            } else {
                format!("http://{host}:{}", self.port)
            }
        });
        config
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let args = <Args as clap::Parser>::parse();
    let config = args.search_config();

    println!(
        "Searching for '{}' with {} workers...",
        config.prefix, config.workers
    );

    let search = match Search::new(config) {
        Ok(search) => Arc::new(search),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(if err.is_config() { 2 } else { 1 });
        }
    };

    {
        let search = search.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            println!("\nTerminating...");
            search.stop();
        }) {
            eprintln!("failed to set ctrl-c handler: {err}");
            std::process::exit(1);
        }
    }

    {
        let search = search.clone();
        std::thread::spawn(move || {
            let mut progress = Progress::new();
            while !search.is_stopped() {
                print!("\r{}", progress.line(search.total_count()));
                let _ = std::io::stdout().flush();
                std::thread::sleep(std::time::Duration::from_secs(1));
            }
        });
    }

    let res = search.run();
    println!();

    match res {
        Ok(()) => {
            println!("Done. {} matches.", search.found().len());
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(if err.is_config() { 2 } else { 1 });
        }
    }
}
