//! Integration tests for the negotiation protocol, driven through the flat
//! `(bool, *len)` convention the way a host sees a foreign callee.

use simbridge_core::{
    deliver, Delivery, NegotiationLimits, Negotiator, Outcome, ProtocolError,
};

const CONFIG: &[u8] = b"deterministic-config-payload";

/// A callee written against the flat convention.
fn raw_starting_config(buf: &mut [u8], len: &mut u64) -> bool {
    let needed = CONFIG.len() as u64;
    if *len < needed {
        *len = needed;
        return false;
    }
    buf[..CONFIG.len()].copy_from_slice(CONFIG);
    *len = needed;
    true
}

/// Calls `raw` the way a host does: offer the whole buffer, classify.
fn call_raw(buf: &mut [u8], raw: fn(&mut [u8], &mut u64) -> bool) -> Outcome {
    let offered = buf.len() as u64;
    let mut len = offered;
    let ok = raw(buf, &mut len);
    Outcome::from_raw(ok, offered, len)
}

#[test]
fn test_zero_capacity_discovery_then_sized_retry() {
    // Phase one: offer nothing.
    let mut empty: [u8; 0] = [];
    let first = call_raw(&mut empty, raw_starting_config);
    let n = first.required_capacity().expect("size request");
    assert!(n > 0);

    // Phase two: offer exactly N, twice.
    let mut a = vec![0u8; n as usize];
    let mut b = vec![0xFFu8; n as usize];
    let ra = call_raw(&mut a, raw_starting_config);
    let rb = call_raw(&mut b, raw_starting_config);
    assert_eq!(ra, Outcome::Complete { len: n });
    assert_eq!(ra, rb);
    assert_eq!(a, b);
}

#[test]
fn test_negotiator_drives_flat_callee() {
    let mut negotiator = Negotiator::new(NegotiationLimits {
        initial_capacity: 0,
        max_capacity: 4096,
    });
    let mut buf = negotiator.buffer();
    let len = negotiator
        .negotiate(&mut buf, |out| call_raw(out, raw_starting_config))
        .unwrap();
    assert_eq!(buf.payload(), CONFIG);
    assert_eq!(len, CONFIG.len());
    assert_eq!(negotiator.stats().growth_retries, 1);

    // A reused buffer is big enough now: no further growth.
    negotiator
        .negotiate(&mut buf, |out| call_raw(out, raw_starting_config))
        .unwrap();
    assert_eq!(negotiator.stats().growth_retries, 1);
    assert_eq!(negotiator.stats().calls, 2);
}

#[test]
fn test_payload_never_exposes_stale_bytes() {
    let mut negotiator = Negotiator::default();
    let mut buf = negotiator.buffer();
    negotiator
        .negotiate(&mut buf, |out| deliver(&[0xEE; 64], out, Delivery::Strict))
        .unwrap();
    negotiator
        .negotiate(&mut buf, |out| deliver(&[0x11; 4], out, Delivery::Strict))
        .unwrap();
    assert_eq!(buf.payload(), &[0x11; 4]);
}

#[test]
fn test_callee_that_keeps_growing_is_cut_off() {
    let mut negotiator = Negotiator::new(NegotiationLimits {
        initial_capacity: 1,
        max_capacity: 1 << 20,
    });
    let mut buf = negotiator.buffer();
    let mut attempts = 0u32;
    let err = negotiator
        .negotiate(&mut buf, |out| {
            attempts += 1;
            Outcome::GrowOnSuccess {
                required: out.len() as u64 + 1,
            }
        })
        .unwrap_err();
    assert!(matches!(err, ProtocolError::RepeatedGrowth { .. }));
    assert_eq!(attempts, 2);
}
