//! The binary tripcode-dealer-srv.
//!
//! Runs a dealer server without any local workers, purely to hand out
//! blocks to remote `tripcode --remote` clients and collect their matches.

use tripcode_api::Dealer;
use tripcode_dealer_srv::*;

#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// By default tripcode-dealer-srv runs in "testing" configuration,
    /// listening only on a random localhost port. This is enough for
    /// trying out a distributed search on a single machine.
    ///
    /// To listen on all interfaces at the well-known dealer port,
    /// set this "production" mode.
    #[arg(long)]
    pub production: bool,

    /// Override the listening port.
    #[arg(long)]
    pub port: Option<u16>,
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

    let mut config = if args.production {
        Config::production()
    } else {
        Config::testing()
    };

    if let Some(port) = args.port {
        for addr in config.listen_address_list.iter_mut() {
            addr.set_port(port);
        }
    }

    println!("{args:?}--{config:?}");

    let (send, recv) = std::sync::mpsc::channel();

    if let Err(err) = ctrlc::set_handler(move || {
        let _ = send.send(());
    }) {
        eprintln!("failed to set ctrl-c handler: {err}");
        std::process::exit(1);
    }

    let srv = match DealerSrv::new(config) {
        Ok(srv) => srv,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = srv.start() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    srv.print_addrs();

    let _ = recv.recv();

    println!("Terminating...");
    println!("Issued {} blocks.", srv.local_dealer().issued());
    drop(srv);
    println!("Done.");
    std::process::exit(0);
}
