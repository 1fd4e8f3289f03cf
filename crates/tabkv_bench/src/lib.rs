//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rand::seq::SliceRandom;
use rand::Rng;
use tabkv_testkit::Order;

const KINDS: [&str; 4] = ["book", "fruit", "tool", "toy"];
const DISTRICTS: [&str; 4] = ["East", "West", "North", "South"];

/// Generate random field bytes of the specified size.
pub fn random_field(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` fields of `size` random bytes each.
pub fn random_fields(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| random_field(size)).collect()
}

/// Generate orders with ids `1..=count` and random attributes.
pub fn random_orders(count: usize) -> Vec<Order> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|id| {
            Order::new(
                id,
                KINDS.choose(&mut rng).copied().unwrap_or("book"),
                rng.gen_range(0..16),
                DISTRICTS.choose(&mut rng).copied().unwrap_or("East"),
            )
        })
        .collect()
}
