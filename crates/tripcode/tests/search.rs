use std::sync::Arc;
use tripcode::*;
use tripcode_api::*;
use tripcode_core::found;
use tripcode_test_utils::enable_tracing;

const K: Keyspace = Keyspace {
    trip_length: 6,
    worker_digits: 2,
};

fn standalone(prefix: &str) -> SearchConfig {
    SearchConfig {
        workers: 2,
        standalone: true,
        keyspace: K,
        ..SearchConfig::new(prefix)
    }
}

fn listening(prefix: &str) -> SearchConfig {
    SearchConfig {
        standalone: false,
        listen_address: (std::net::Ipv4Addr::LOCALHOST, 0).into(),
        ..standalone(prefix)
    }
}

fn run_in_background(search: Arc<Search>) -> std::thread::JoinHandle<TripResult<()>> {
    std::thread::spawn(move || search.run())
}

#[test]
fn once_searches_one_block_per_worker() {
    enable_tracing();

    let search = Search::new(SearchConfig {
        workers: 3,
        once: true,
        ..standalone("aaaaaaaaaa")
    })
    .unwrap();
    assert!(search.listen_addrs().is_empty());

    search.run().unwrap();
    assert_eq!(3 * K.block_size(), search.total_count());
}

#[test]
fn planted_match_is_found() {
    // block 0 is "000000", the workers vary the first two characters
    let target = found::encode_digest(b"x70000");

    let search = Search::new(SearchConfig {
        workers: 1,
        once: true,
        ..standalone(&target[..10])
    })
    .unwrap();
    search.run().unwrap();

    let found = search.found();
    assert!(found.iter().any(|f| f.trip == "x70000"), "{found:?}");
    assert!(found.iter().all(|f| f.encoded.starts_with(&target[..10])));
}

#[test]
fn exhaustion_is_an_error() {
    let search = Search::new(SearchConfig {
        workers: 4,
        keyspace: Keyspace {
            trip_length: 2,
            worker_digits: 1,
        },
        ..standalone("aaaaaaaaaa")
    })
    .unwrap();

    // one dealer digit: the all-maximum vector is never handed out,
    // since advancing past it overflows
    const ISSUED: u64 = (CHARS_LEN - 1) as u64;

    match search.run() {
        Err(TripError::KeyspaceExhausted { issued: ISSUED }) => (),
        oth => panic!("unexpected {oth:?}"),
    }
    // workers still mid-block when the first one hit the end stop early
    assert!(search.total_count() <= ISSUED * CHARS_LEN as u64);
    assert!(search.is_stopped());
}

#[test]
fn stop_ends_run_cleanly() {
    let search = Arc::new(Search::new(standalone("aaaaaaaaaa")).unwrap());
    let task = run_in_background(search.clone());

    std::thread::sleep(std::time::Duration::from_millis(200));
    search.stop();

    task.join().unwrap().unwrap();
    assert!(search.total_count() > 0);
}

#[test]
fn remote_search_draws_from_server() {
    enable_tracing();

    let server = Search::new(listening("aaaaaaaaaa")).unwrap();
    let addr = server.listen_addrs()[0];

    let client = Search::new(SearchConfig {
        once: true,
        remote: Some(format!("http://{addr:?}")),
        ..standalone("aaaaaaaaaa")
    })
    .unwrap();
    assert!(client.listen_addrs().is_empty());

    client.run().unwrap();
    assert_eq!(2 * K.block_size(), client.total_count());

    // the server never hands out the client's blocks again
    let p0 = Position::zero(&K);
    let p1 = p0.next(K.worker_digits).unwrap();
    let next = Position::from_block(&server.dealer().next_block().unwrap())
        .unwrap();
    assert_ne!(p0, next);
    assert_ne!(p1, next);
}

#[test]
fn remote_match_reaches_server() {
    let server = Search::new(listening("aaaaaaaaaa")).unwrap();
    let addr = server.listen_addrs()[0];

    let target = found::encode_digest(b"x70000");
    let client = Search::new(SearchConfig {
        workers: 1,
        once: true,
        remote: Some(format!("http://{addr:?}")),
        ..standalone(&target[..10])
    })
    .unwrap();
    client.run().unwrap();

    assert!(client.found().iter().any(|f| f.trip == "x70000"));
    assert!(server.found().iter().any(|f| f.trip == "x70000"));
}

#[test]
fn stop_unblocks_workers_waiting_on_unreachable_server() {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = l.local_addr().unwrap();
    drop(l);

    let search = Arc::new(
        Search::new(SearchConfig {
            remote: Some(format!("http://{addr:?}")),
            ..standalone("aaaaaaaaaa")
        })
        .unwrap(),
    );
    let task = run_in_background(search.clone());

    std::thread::sleep(std::time::Duration::from_millis(200));
    search.stop();

    task.join().unwrap().unwrap();
    assert_eq!(0, search.total_count());
}
