use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::Duration,
};

use connection_pool::{ConnectionPool, Endpoint, PoolBuilder, PoolStats};

const THREADS: usize = 8;

fn endpoints(prefix: &str, count: usize) -> Vec<Endpoint> {
    (0..count)
        .map(|idx| Endpoint::new(format!("http://{prefix}-{idx}:9200")).unwrap())
        .collect()
}

#[test]
fn round_robin_spreads_load_across_threads() {
    let uris: Vec<_> = (0..4).map(|idx| format!("http://node-{idx}:9200")).collect();
    let pool = Arc::new(PoolBuilder::new().build_static(&uris).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));
    let per_thread = 1000;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..per_thread)
                    .map(|_| pool.next(None).unwrap().endpoint)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut counts = std::collections::HashMap::new();
    for handle in handles {
        for endpoint in handle.join().unwrap() {
            *counts.entry(endpoint).or_insert(0usize) += 1;
        }
    }
    // The shared cursor hands out each endpoint exactly once per sweep.
    assert_eq!(counts.len(), 4);
    assert!(counts.values().all(|&count| count == THREADS * per_thread / 4));
}

#[test]
fn concurrent_failures_and_successes_keep_records_consistent() {
    let pool = Arc::new(
        PoolBuilder::new()
            .build_static(["http://a:9200", "http://b:9200"])
            .unwrap(),
    );
    let a = Endpoint::new("http://a:9200").unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            let a = a.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..500 {
                    pool.report_failure(
                        &a,
                        Some(Duration::from_secs(60)),
                        Some(Duration::from_secs(600)),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // No failure report is lost.
    let state = pool.endpoint_state(&a).unwrap();
    assert_eq!(state.failed_attempts(), (THREADS * 500) as u32);
    assert!(!state.is_alive());
    assert_eq!(pool.stats(), PoolStats::new(2, 1));

    pool.report_success(&a);
    assert_eq!(pool.stats(), PoolStats::new(2, 2));
}

#[test]
fn replacement_is_atomic_for_readers() {
    let first = endpoints("old", 3);
    let second = endpoints("new", 7);
    let pool = Arc::new(
        PoolBuilder::new()
            .build_sniffing(["http://old-0:9200", "http://old-1:9200", "http://old-2:9200"])
            .unwrap(),
    );
    let stop = Arc::new(AtomicBool::new(false));
    let observed = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let stop = Arc::clone(&stop);
            let observed = Arc::clone(&observed);
            let (first, second) = (first.clone(), second.clone());
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let generation: Vec<_> =
                        pool.snapshot().into_iter().map(|(endpoint, _)| endpoint).collect();
                    assert!(generation == first || generation == second);

                    let stats = pool.stats();
                    assert!(stats.total == first.len() || stats.total == second.len());

                    let selection = pool.next(None).unwrap();
                    pool.report_failure(&selection.endpoint, None, None);
                    observed.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for round in 0..500 {
        let set = if round % 2 == 0 { &second } else { &first };
        pool.replace_endpoints(set.clone(), false);
    }
    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(observed.load(Ordering::Relaxed) > 0);
    // The last replacement installed `first`, with fresh health records.
    assert_eq!(pool.endpoints(), first);
}

#[test]
fn replacement_is_not_starved_by_readers() {
    let pool = Arc::new(
        PoolBuilder::new()
            .build_sniffing(["http://old-0:9200"])
            .unwrap(),
    );
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let _ = pool.next(None);
                }
            })
        })
        .collect();

    // Every replacement completes while readers keep hammering the pool.
    for round in 0..100 {
        pool.replace_endpoints(endpoints("new", round % 5 + 1), round == 0);
    }
    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(pool.seen_startup());
    assert_eq!(pool.len(), 5);
}
