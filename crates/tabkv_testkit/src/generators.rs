//! Property-based test generators using proptest.

use crate::fixtures::{Order, Person};
use proptest::prelude::*;
use tabkv_codec::{ESCAPE, SEPARATOR};

/// Strategy for key fields, biased towards the separator and escape bytes.
pub fn field_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    let byte = prop_oneof![
        2 => Just(SEPARATOR),
        2 => Just(ESCAPE),
        6 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..12)
}

/// Strategy for field lists, including the empty list.
pub fn field_list_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(field_bytes_strategy(), 0..6)
}

/// Strategy for order types.
pub fn kind_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("book".to_string()),
        Just("fruit".to_string()),
        Just("tool".to_string()),
        Just("a:b`c".to_string()),
    ]
}

/// Strategy for districts.
pub fn district_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["East", "West", "North", "South"]).prop_map(str::to_string)
}

/// Strategy for a single order with the given id.
pub fn order_strategy(id: u64) -> impl Strategy<Value = Order> {
    (kind_strategy(), 0u32..8, district_strategy()).prop_map(move |(kind, status, district)| {
        Order {
            id,
            kind,
            status,
            district,
        }
    })
}

/// Strategy for up to `max` orders with distinct ids `1..=n`.
pub fn orders_strategy(max: usize) -> impl Strategy<Value = Vec<Order>> {
    (0..=max).prop_flat_map(|n| {
        (1..=n as u64)
            .map(order_strategy)
            .collect::<Vec<_>>()
    })
}

/// Strategy for tag lists drawn from a small vocabulary.
pub fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(
        prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string),
        0..5,
    )
    .prop_map(|tags| tags.into_iter().collect())
}

/// Strategy for a person with the given id.
pub fn person_strategy(id: u64) -> impl Strategy<Value = Person> {
    (tags_strategy(), -5i32..90).prop_map(move |(tags, age)| Person {
        id,
        name: format!("p{id}"),
        age,
        city: "Oslo".to_string(),
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn orders_have_distinct_ids() {
        let mut runner = TestRunner::default();
        for _ in 0..16 {
            let orders = orders_strategy(6)
                .new_tree(&mut runner)
                .unwrap()
                .current();
            let ids: Vec<u64> = orders.iter().map(|o| o.id).collect();
            let expected: Vec<u64> = (1..=orders.len() as u64).collect();
            assert_eq!(ids, expected);
        }
    }
}
