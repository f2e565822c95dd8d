//! # Tri-state Resolver Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use vsim_core::common::error::BuildError;
use vsim_core::logic::{Bit4, Scalar, Strength, Vec8};
use vsim_core::net::{Functor, Network, SignalFun, Value};
use vsim_core::resolv::{Pull, TriFun, link_drivers};

use crate::common::builder::network::tri_net;
use crate::common::harness::{TestContext, bits};
use crate::common::mocks::scheduler::RecordingScheduler;

#[test]
fn test_single_driver_then_conflict() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 2, Pull::None);

    bus.drive(&mut net, &mut sched, 0, "0");
    assert_eq!(bus.value(&net), "0");
    bus.drive(&mut net, &mut sched, 1, "1");
    assert_eq!(bus.value(&net), "x");
    bus.drive(&mut net, &mut sched, 0, "z");
    assert_eq!(bus.value(&net), "1");
}

#[test]
fn test_three_drivers_conflict_and_release() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 3, Pull::None);

    bus.drive(&mut net, &mut sched, 0, "z");
    bus.drive(&mut net, &mut sched, 1, "z");
    bus.drive(&mut net, &mut sched, 2, "0");
    assert_eq!(bus.value(&net), "0");
    bus.drive(&mut net, &mut sched, 1, "1");
    assert_eq!(bus.value(&net), "x");
    bus.drive(&mut net, &mut sched, 1, "z");
    assert_eq!(bus.value(&net), "0");
    bus.drive(&mut net, &mut sched, 0, "0");
    assert_eq!(bus.value(&net), "0");
}

#[rstest]
#[case(Pull::Down, "0")]
#[case(Pull::Up, "1")]
#[case(Pull::None, "z")]
fn test_undriven_net_settles_at_start(#[case] pull: Pull, #[case] expected: &str) {
    let mut ctx = TestContext::new();
    let tri = ctx.network.add(TriFun::new(1, 2, pull));
    let seen = ctx.var(1);
    ctx.network.link(tri, seen.port(0)).unwrap();
    let _ = ctx.thread("main").delay(1).end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, seen), expected);
}

#[test]
fn test_settled_pull_is_overridden_by_driver() {
    let mut ctx = TestContext::new();
    let tri = ctx.network.add(TriFun::new(1, 1, Pull::Up));
    let driver = ctx.var(1);
    link_drivers(&mut ctx.network, tri, &[(driver, 1)]).unwrap();
    let (seen, before) = (ctx.var(1), ctx.var(1));
    ctx.network.link(tri, seen.port(0)).unwrap();
    ctx.thread("main").load(seen).store(before, 1).push(0, 1).store(driver, 1).end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, before), "1");
    assert_eq!(bits(&sim, seen), "0");
}

#[test]
fn test_per_bit_resolution() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 4, 2, Pull::None);

    bus.drive(&mut net, &mut sched, 0, "10zz");
    bus.drive(&mut net, &mut sched, 1, "zz01");
    assert_eq!(bus.value(&net), "1001");
    bus.drive(&mut net, &mut sched, 1, "0z01");
    assert_eq!(bus.value(&net), "x001");
}

#[rstest]
#[case(Pull::Down, "0")]
#[case(Pull::Up, "1")]
#[case(Pull::None, "z")]
fn test_pull_shows_when_undriven(#[case] pull: Pull, #[case] expected: &str) {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 2, pull);

    bus.drive(&mut net, &mut sched, 0, "z");
    assert_eq!(bus.value(&net), expected);
}

#[test]
fn test_strong_driver_beats_pull() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 1, Pull::Up);

    bus.drive(&mut net, &mut sched, 0, "0");
    assert_eq!(bus.value(&net), "0");
    match net.read(bus.probe) {
        Value::Vec8(v) => assert_eq!(v.value(0), Scalar::strong(Bit4::Zero)),
        other => panic!("expected strengths, got {other:?}"),
    }
}

#[test]
fn test_weaker_driver_loses() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let tri = net.add(TriFun::new(1, 2, Pull::None));
    let probe = net.add(SignalFun::net_vec8(1));
    net.link(tri, probe.port(0)).unwrap();

    let weak1 = Vec8::new(1, Scalar::new(Bit4::One, Strength::Weak, Strength::Weak));
    let strong0 = Vec8::from_vec4(&"0".parse().unwrap(), Strength::Strong, Strength::Strong);
    net.deliver(tri.port(0), &Value::Vec8(weak1), &mut sched);
    net.deliver(tri.port(1), &Value::Vec8(strong0), &mut sched);
    assert_eq!(net.read_vec4(probe).to_string(), "0");
}

#[test]
fn test_more_than_four_drivers_use_extend_nodes() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 9, Pull::None);

    let extends = (0..net.len())
        .filter(|&i| matches!(net.functor(vsim_core::common::NetId(i as u32)), Some(Functor::Extend(_))))
        .count();
    assert_eq!(extends, 2);

    bus.drive(&mut net, &mut sched, 8, "1");
    assert_eq!(bus.value(&net), "1");
    bus.drive(&mut net, &mut sched, 5, "0");
    assert_eq!(bus.value(&net), "x");
    bus.drive(&mut net, &mut sched, 8, "z");
    assert_eq!(bus.value(&net), "0");
}

#[test]
fn test_unchanged_root_is_not_resent() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = tri_net(&mut net, 1, 6, Pull::None);

    bus.drive(&mut net, &mut sched, 0, "1");
    let before = net.stats.deliveries;
    bus.drive(&mut net, &mut sched, 1, "1");
    // Driver and resolver only; the probe is not reached.
    assert_eq!(net.stats.deliveries - before, 2);
    assert!(net.stats.resolver_short_circuits >= 1);
}

#[test]
fn test_link_drivers_rejects_width_mismatch() {
    let mut net = Network::new();
    let tri = net.add(TriFun::new(2, 2, Pull::None));
    let driver = net.add(SignalFun::variable_vec4(3));
    let err = link_drivers(&mut net, tri, &[(driver, 3)]).unwrap_err();
    assert_eq!(err, BuildError::WidthMismatch { net: tri.0, expected: 2, found: 3 });
}

#[test]
fn test_link_drivers_rejects_too_many() {
    let mut net = Network::new();
    let tri = net.add(TriFun::new(1, 1, Pull::None));
    let a = net.add(SignalFun::variable_vec4(1));
    let b = net.add(SignalFun::variable_vec4(1));
    assert!(matches!(link_drivers(&mut net, tri, &[(a, 1), (b, 1)]), Err(BuildError::PortOutOfRange { .. })));
}

#[test]
fn test_link_drivers_requires_resolver() {
    let mut net = Network::new();
    let var = net.add(SignalFun::variable_vec4(1));
    assert_eq!(link_drivers(&mut net, var, &[]), Err(BuildError::MissingFunctor(var.0)));
}
