//! # Event Functor Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use vsim_core::common::{NetId, ThreadId};
use vsim_core::logic::Bit4;
use vsim_core::net::{EdgeKind, EventFun, Functor, Network, SignalFun, Value};

use crate::common::builder::network::poke;
use crate::common::mocks::scheduler::{Call, MockSched, RecordingScheduler};

const T1: ThreadId = ThreadId { index: 1, generation: 0 };
const T2: ThreadId = ThreadId { index: 2, generation: 0 };

fn event(net: &Network, ev: NetId) -> &EventFun {
    match net.functor(ev) {
        Some(Functor::Event(e)) => e,
        other => panic!("not an event node: {other:?}"),
    }
}

fn clocked(kind: EdgeKind) -> (Network, NetId, NetId) {
    let mut net = Network::new();
    let clk = net.add(SignalFun::variable_vec4(1));
    let ev = net.add(EventFun::new(kind));
    net.link(clk, ev.port(0)).unwrap();
    (net, clk, ev)
}

#[rstest]
#[case(EdgeKind::Pos, Bit4::Zero, Bit4::One, true)]
#[case(EdgeKind::Pos, Bit4::Zero, Bit4::X, true)]
#[case(EdgeKind::Pos, Bit4::Z, Bit4::One, true)]
#[case(EdgeKind::Pos, Bit4::One, Bit4::Zero, false)]
#[case(EdgeKind::Pos, Bit4::X, Bit4::Zero, false)]
#[case(EdgeKind::Neg, Bit4::One, Bit4::Zero, true)]
#[case(EdgeKind::Neg, Bit4::One, Bit4::Z, true)]
#[case(EdgeKind::Neg, Bit4::X, Bit4::Zero, true)]
#[case(EdgeKind::Neg, Bit4::Zero, Bit4::One, false)]
#[case(EdgeKind::Edge, Bit4::X, Bit4::Z, true)]
#[case(EdgeKind::Edge, Bit4::One, Bit4::One, false)]
fn test_edge_table(#[case] kind: EdgeKind, #[case] from: Bit4, #[case] to: Bit4, #[case] expected: bool) {
    assert_eq!(kind.matches(from, to), expected);
}

#[test]
fn test_posedge_wakes_waiters_once() {
    let (mut net, clk, ev) = clocked(EdgeKind::Pos);
    let mut sched = RecordingScheduler::new();
    net.add_waiter(ev, T1);
    net.add_waiter(ev, T2);

    poke(&mut net, &mut sched, clk, 0, "0");
    assert!(sched.threads().is_empty());

    poke(&mut net, &mut sched, clk, 0, "1");
    assert_eq!(sched.threads(), vec![T1, T2]);
    assert_eq!(sched.calls[0], Call::Thread { thread: T1, delay: 0, push: false });
    assert!(event(&net, ev).waiters().is_empty());
    assert_eq!(net.stats.event_wakeups, 2);

    poke(&mut net, &mut sched, clk, 0, "0");
    poke(&mut net, &mut sched, clk, 0, "1");
    assert_eq!(sched.threads().len(), 2);
    assert_eq!(event(&net, ev).fired(), 2);
}

#[test]
fn test_first_value_counts_as_change_from_x() {
    let (mut net, clk, ev) = clocked(EdgeKind::Pos);
    let mut sched = RecordingScheduler::new();
    poke(&mut net, &mut sched, clk, 0, "1");
    assert_eq!(event(&net, ev).fired(), 1);

    let (mut net, clk, ev) = clocked(EdgeKind::Neg);
    poke(&mut net, &mut sched, clk, 0, "1");
    assert_eq!(event(&net, ev).fired(), 0);
}

#[test]
fn test_any_change_ignores_repeats() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let ev = net.add(EventFun::new(EdgeKind::AnyChange));
    let bus = vsim_core::logic::literal::parse_bits("0110").unwrap();

    net.deliver(ev.port(0), &Value::Vec4(bus.clone()), &mut sched);
    net.deliver(ev.port(0), &Value::Vec4(bus), &mut sched);
    assert_eq!(event(&net, ev).fired(), 1);
    net.deliver(ev.port(0), &Value::Real(1.0), &mut sched);
    assert_eq!(event(&net, ev).fired(), 2);
}

#[test]
fn test_named_event_fires_every_time_and_chains() {
    let mut net = Network::new();
    let mut sched = RecordingScheduler::new();
    let named = net.add(EventFun::named());
    let either = net.add(EventFun::new(EdgeKind::Any));
    net.link(named, either.port(1)).unwrap();
    net.add_waiter(either, T1);

    let token = Value::Vec4(vsim_core::logic::Vec4::from(Bit4::One));
    net.deliver(named.port(0), &token, &mut sched);
    net.deliver(named.port(0), &token, &mut sched);
    assert_eq!(event(&net, named).fired(), 2);
    assert_eq!(event(&net, either).fired(), 2);
    assert_eq!(sched.threads(), vec![T1]);
}

#[test]
fn test_fire_without_waiters_schedules_nothing() {
    let (mut net, clk, _ev) = clocked(EdgeKind::Edge);
    let mut sched = MockSched::new();
    sched.expect_schedule_thread().never();
    poke(&mut net, &mut sched, clk, 0, "1");
}

#[test]
fn test_fire_schedules_through_scheduler_contract() {
    let (mut net, clk, ev) = clocked(EdgeKind::Edge);
    net.add_waiter(ev, T2);
    let mut sched = MockSched::new();
    sched
        .expect_schedule_thread()
        .withf(|&thread, &delay, &push| thread == T2 && delay == 0 && !push)
        .times(1)
        .return_const(());
    poke(&mut net, &mut sched, clk, 0, "0");
}

#[test]
#[should_panic(expected = "fatal:")]
fn test_waiter_on_non_event_is_fatal() {
    let mut net = Network::new();
    let var = net.add(SignalFun::variable_vec4(1));
    net.add_waiter(var, T1);
}
