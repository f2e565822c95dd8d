//! # Signal Tests
//!
//! Storage nodes for variables and nets, including the procedural continuous assignment and
//! force ports.

use pretty_assertions::assert_eq;
use vsim_core::common::NetId;
use vsim_core::net::{EdgeKind, EventFun, Functor, Network, SignalFun, Value};
use vsim_core::sched::PartSelect;

use crate::common::builder::network::{poke, probe};
use crate::common::harness::vec;
use crate::common::mocks::scheduler::RecordingScheduler;

fn fired(net: &Network, ev: NetId) -> u64 {
    match net.functor(ev) {
        Some(Functor::Event(e)) => e.fired(),
        other => panic!("not an event node: {other:?}"),
    }
}

fn watch(net: &mut Network, from: NetId) -> NetId {
    let ev = net.add(EventFun::new(EdgeKind::Any));
    net.link(from, ev.port(0)).unwrap();
    ev
}

#[test]
fn test_initial_values() {
    let mut net = Network::new();
    let var = net.add(SignalFun::variable_vec4(3));
    let wire = net.add(SignalFun::net_vec4(3));
    let tri = net.add(SignalFun::net_vec8(2));
    let r = net.add(SignalFun::variable_real());
    let s = net.add(SignalFun::variable_str());

    assert_eq!(net.read_vec4(var).to_string(), "xxx");
    assert_eq!(net.read_vec4(wire).to_string(), "zzz");
    assert_eq!(net.read_vec4(tri).to_string(), "zz");
    assert_eq!(net.read(r), Value::Real(0.0));
    assert_eq!(net.read(s), Value::Str(String::new()));
    assert_eq!(net.signal_width(var), 3);
    assert_eq!(net.signal_width(r), 0);
}

#[test]
fn test_propagates_only_on_change() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    let ev = watch(&mut net, var);
    let seen = probe(&mut net, var, 4);

    poke(&mut net, &mut sched, var, 0, "0101");
    poke(&mut net, &mut sched, var, 0, "0101");
    assert_eq!(fired(&net, ev), 1);
    assert_eq!(net.read_vec4(seen).to_string(), "0101");

    poke(&mut net, &mut sched, var, 0, "0111");
    assert_eq!(fired(&net, ev), 2);
}

#[test]
fn test_first_write_propagates_even_when_unchanged() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(2));
    let ev = watch(&mut net, var);

    poke(&mut net, &mut sched, var, 0, "xx");
    assert_eq!(fired(&net, ev), 1);
    poke(&mut net, &mut sched, var, 0, "xx");
    assert_eq!(fired(&net, ev), 1);
}

#[test]
fn test_part_write() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    let seen = probe(&mut net, var, 4);

    net.deliver_vec4_pv(var.port(0), &vec("11"), PartSelect { base: 1, vwid: 4 }, &mut sched);
    assert_eq!(net.read_vec4(var).to_string(), "x11x");
    assert_eq!(net.read_vec4(seen).to_string(), "x11x");
}

#[test]
fn test_real_and_string_storage() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let r = net.add(SignalFun::variable_real());
    let s = net.add(SignalFun::variable_str());

    net.deliver(r.port(0), &Value::Real(1.5), &mut sched);
    net.deliver(s.port(0), &Value::Str("hello".to_owned()), &mut sched);
    assert_eq!(net.read(r), Value::Real(1.5));
    assert_eq!(net.read(s), Value::Str("hello".to_owned()));
}

#[test]
fn test_vec4_write_into_strength_net_uses_default_drive() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let tri = net.add(SignalFun::net_vec8(2));
    poke(&mut net, &mut sched, tri, 0, "1z");
    match net.read(tri) {
        Value::Vec8(v) => {
            assert_eq!(v.to_vec4().to_string(), "1z");
            assert!(v.value(0).is_hiz());
        }
        other => panic!("expected a strength vector, got {other:?}"),
    }
}

#[test]
fn test_continuous_assign_masks_ordinary_writes() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));

    poke(&mut net, &mut sched, var, 1, "1111");
    poke(&mut net, &mut sched, var, 0, "0000");
    assert_eq!(net.read_vec4(var).to_string(), "1111");

    net.deassign(var, 0, 4);
    assert_eq!(net.read_vec4(var).to_string(), "1111");
    poke(&mut net, &mut sched, var, 0, "0000");
    assert_eq!(net.read_vec4(var).to_string(), "0000");
}

#[test]
fn test_partial_continuous_assign() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));

    net.deliver_vec4_pv(var.port(1), &vec("11"), PartSelect { base: 0, vwid: 4 }, &mut sched);
    poke(&mut net, &mut sched, var, 0, "0000");
    assert_eq!(net.read_vec4(var).to_string(), "0011");
}

#[test]
fn test_cassign_link_replaces_previous_source() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let dst = net.add(SignalFun::variable_vec4(4));
    let first = net.add(SignalFun::variable_vec4(4));
    let second = net.add(SignalFun::variable_vec4(4));

    net.cassign_link(dst, first).unwrap();
    poke(&mut net, &mut sched, first, 0, "0110");
    assert_eq!(net.read_vec4(dst).to_string(), "0110");

    net.cassign_link(dst, second).unwrap();
    assert!(net.fanout(first).is_empty());
    assert_eq!(net.fanout(second), &[dst.port(1)]);
    poke(&mut net, &mut sched, first, 0, "0000");
    assert_eq!(net.read_vec4(dst).to_string(), "0110");
}

#[test]
fn test_force_overrides_and_variable_keeps_value_on_release() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    let seen = probe(&mut net, var, 4);

    poke(&mut net, &mut sched, var, 2, "1010");
    assert_eq!(net.read_vec4(var).to_string(), "1010");
    assert_eq!(net.read_vec4(seen).to_string(), "1010");

    poke(&mut net, &mut sched, var, 0, "0000");
    assert_eq!(net.read_vec4(var).to_string(), "1010");
    assert_eq!(net.read_vec4(seen).to_string(), "1010");
    assert!(net.stats.filtered >= 1);

    net.release(var, 0, 4, false, &mut sched);
    assert_eq!(net.read_vec4(var).to_string(), "1010");
    assert!(net.filter(var).is_none_or(|f| !f.is_forced()));
}

#[test]
fn test_net_falls_back_to_driven_value_on_release() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let wire = net.add(SignalFun::net_vec4(4));
    let seen = probe(&mut net, wire, 4);

    poke(&mut net, &mut sched, wire, 0, "0000");
    poke(&mut net, &mut sched, wire, 2, "1111");
    assert_eq!(net.read_vec4(seen).to_string(), "1111");

    net.release(wire, 0, 4, true, &mut sched);
    assert_eq!(net.read_vec4(wire).to_string(), "0000");
    assert_eq!(net.read_vec4(seen).to_string(), "0000");
}

#[test]
fn test_partial_force_replaces_forced_bits_only() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    let seen = probe(&mut net, var, 4);

    poke(&mut net, &mut sched, var, 0, "0000");
    net.deliver_vec4_pv(var.port(2), &vec("11"), PartSelect { base: 2, vwid: 4 }, &mut sched);
    assert_eq!(net.read_vec4(seen).to_string(), "1100");

    poke(&mut net, &mut sched, var, 0, "0101");
    assert_eq!(net.read_vec4(var).to_string(), "1101");
    assert_eq!(net.read_vec4(seen).to_string(), "1101");
}

#[test]
#[should_panic(expected = "fatal:")]
fn test_wrong_value_kind_is_fatal() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    net.deliver(var.port(0), &Value::Real(1.0), &mut sched);
}

#[test]
#[should_panic(expected = "fatal:")]
fn test_width_mismatch_is_fatal() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(4));
    poke(&mut net, &mut sched, var, 0, "01");
}

#[test]
#[should_panic(expected = "fatal:")]
fn test_unknown_port_is_fatal() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let var = net.add(SignalFun::variable_vec4(1));
    poke(&mut net, &mut sched, var, 3, "1");
}
