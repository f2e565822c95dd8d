//! # Handle and Time Tests

use vsim_core::common::{NetId, PortRef, SimTime, ThreadId};

#[test]
fn test_net_port_reference() {
    let net = NetId(12);
    assert_eq!(net.index(), 12);
    assert_eq!(net.port(3), PortRef { net, port: 3 });
    assert_eq!(net.port(3).to_string(), "N12.3");
}

#[test]
fn test_thread_id_display_and_order() {
    let a = ThreadId { index: 1, generation: 0 };
    let b = ThreadId { index: 1, generation: 1 };
    assert_eq!(b.to_string(), "T1#1");
    assert_ne!(a, b);
    assert!(a < b);
}

#[test]
fn test_sim_time_split() {
    let t = SimTime::from_pair(1, 5);
    assert_eq!(t.ticks(), (1u64 << 32) | 5);
    assert_eq!(t.high(), 1);
    assert_eq!(t.low(), 5);
    assert_eq!(t.pair(), (1, 5));
}
