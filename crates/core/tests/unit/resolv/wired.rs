//! # Wired-Logic Resolver Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use vsim_core::logic::Bit4;
use vsim_core::net::Network;
use vsim_core::resolv::wired::{wired_and, wired_or};
use vsim_core::resolv::{WiredFun, WiredOp};

use crate::common::builder::network::wired_net;
use crate::common::harness::{TestContext, bits};
use crate::common::mocks::scheduler::RecordingScheduler;

#[rstest]
#[case(Bit4::Z, Bit4::One, Bit4::One, Bit4::One)]
#[case(Bit4::Zero, Bit4::X, Bit4::Zero, Bit4::X)]
#[case(Bit4::One, Bit4::X, Bit4::X, Bit4::One)]
#[case(Bit4::One, Bit4::Zero, Bit4::Zero, Bit4::One)]
#[case(Bit4::Z, Bit4::Z, Bit4::Z, Bit4::Z)]
#[case(Bit4::X, Bit4::Z, Bit4::X, Bit4::X)]
fn test_wired_tables(#[case] a: Bit4, #[case] b: Bit4, #[case] and: Bit4, #[case] or: Bit4) {
    assert_eq!(wired_and(a, b), and);
    assert_eq!(wired_and(b, a), and);
    assert_eq!(wired_or(a, b), or);
    assert_eq!(wired_or(b, a), or);
}

#[test]
fn test_triand_net() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = wired_net(&mut net, WiredOp::And, 2, 3);

    bus.drive(&mut net, &mut sched, 0, "11");
    assert_eq!(bus.value(&net), "11");
    bus.drive(&mut net, &mut sched, 1, "z0");
    assert_eq!(bus.value(&net), "10");
    bus.drive(&mut net, &mut sched, 2, "x1");
    assert_eq!(bus.value(&net), "x0");
}

#[test]
fn test_trior_net_with_extend() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let bus = wired_net(&mut net, WiredOp::Or, 1, 6);

    bus.drive(&mut net, &mut sched, 0, "0");
    assert_eq!(bus.value(&net), "0");
    bus.drive(&mut net, &mut sched, 5, "1");
    assert_eq!(bus.value(&net), "1");
    bus.drive(&mut net, &mut sched, 4, "x");
    assert_eq!(bus.value(&net), "1");
    bus.drive(&mut net, &mut sched, 5, "z");
    assert_eq!(bus.value(&net), "x");
}

#[rstest]
#[case(WiredOp::And)]
#[case(WiredOp::Or)]
fn test_undriven_net_settles_to_z(#[case] op: WiredOp) {
    let mut ctx = TestContext::new();
    let wired = ctx.network.add(WiredFun::new(op, 2, 2));
    let seen = ctx.var(2);
    ctx.network.link(wired, seen.port(0)).unwrap();
    let _ = ctx.thread("main").delay(1).end();
    let (sim, _) = ctx.run();
    assert_eq!(bits(&sim, seen), "zz");
}
