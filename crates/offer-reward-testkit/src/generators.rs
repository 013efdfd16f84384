//! Proptest generators for property-based testing.

use proptest::prelude::*;

use offer_reward_core::{Address, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Offer or answer text, including the empty string and non-ASCII.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9 ]{1,40}",
        "\\PC{1,20}",
    ]
}

/// Offer values at or above the default minimum.
pub fn offer_value() -> impl Strategy<Value = u64> {
    1_000u64..=1_000_000
}

/// A list size and a page request against it: `(n, start, length)`.
pub fn page_request(max_len: u64) -> impl Strategy<Value = (u64, u64, u64)> {
    (0..=max_len).prop_flat_map(move |n| (Just(n), 0..=n + 2, 0..=max_len + 2))
}
