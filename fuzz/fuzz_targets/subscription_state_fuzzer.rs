//! Fuzz target for [`Subscription`] state machine
//!
//! Prevent stale-event leaks via attach/detach races
//!
//! # Strategy
//!
//! - Operation sequences: arbitrary interleavings of attach, detach,
//!   and acceptance probes
//! - Probing both previously issued generations and arbitrary values
//!
//! # Invariants
//!
//! - `attach` hands out a generation only from the detached state
//! - Generations strictly increase and are NEVER reused
//! - `accepts` is true for exactly the live generation
//! - A detached generation is rejected forever, even after re-attach

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veilchat_client::Subscription;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Attach,
    Detach,
    ProbeIssued { index: u8 },
    ProbeArbitrary { generation: u64 },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut sub = Subscription::new();
    let mut issued: Vec<u64> = Vec::new();
    let mut live: Option<u64> = None;

    for op in ops {
        match op {
            Op::Attach => match sub.attach() {
                Some(generation) => {
                    assert!(live.is_none(), "attach while attached must be a no-op");
                    if let Some(&last) = issued.last() {
                        assert!(generation > last, "generation reuse: {generation} <= {last}");
                    }
                    issued.push(generation);
                    live = Some(generation);
                },
                None => assert!(live.is_some(), "attach refused while detached"),
            },
            Op::Detach => {
                let stale = sub.detach();
                assert_eq!(stale, live.take());
            },
            Op::ProbeIssued { index } => {
                if !issued.is_empty() {
                    let generation = issued[index as usize % issued.len()];
                    assert_eq!(sub.accepts(generation), live == Some(generation));
                }
            },
            Op::ProbeArbitrary { generation } => {
                assert_eq!(sub.accepts(generation), live == Some(generation));
            },
        }

        assert_eq!(sub.is_attached(), live.is_some());
    }
});
