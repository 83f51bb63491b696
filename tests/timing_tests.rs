// tests/timing_tests.rs
//! Statistical check that digest comparison does not exit early
//!
//! Timing-sensitive, so ignored by default:
//! `cargo test --release --test timing_tests -- --ignored`

use std::hint::black_box;
use std::time::{Duration, Instant};

use crypto_ops::primitives::constant_time_eq;

const LEN: usize = 4096;
const ROUNDS: usize = 20_000;

fn median_time(a: &[u8], b: &[u8]) -> Duration {
    let mut samples: Vec<Duration> = (0..ROUNDS)
        .map(|_| {
            let start = Instant::now();
            black_box(constant_time_eq(black_box(a), black_box(b)));
            start.elapsed()
        })
        .collect();
    samples.sort_unstable();
    samples[ROUNDS / 2]
}

#[test]
#[ignore]
fn test_compare_time_independent_of_mismatch_position() {
    let expected = vec![0x5a; LEN];
    let mut near_match = expected.clone();
    near_match[LEN - 1] ^= 0x01;
    let all_mismatch = vec![0xa5; LEN];

    // warm up caches and frequency scaling
    median_time(&expected, &near_match);

    let late = median_time(&expected, &near_match).as_nanos() as f64;
    let early = median_time(&expected, &all_mismatch).as_nanos() as f64;
    let ratio = late.max(early) / late.min(early).max(1.0);
    assert!(
        ratio < 1.5,
        "near-match {late}ns vs all-mismatch {early}ns (ratio {ratio:.2})"
    );
}
