//! # Event Queue Tests
//!
//! Time ordering, the zero-delay push-front rule, the non-blocking-assignment batch and
//! `$finish`/`$stop` requests.

use pretty_assertions::assert_eq;
use vsim_core::common::{NetId, SimTime, ThreadId};
use vsim_core::logic::Vec4;
use vsim_core::net::{Network, Value};
use vsim_core::sched::{GenericEvent, Scheduler};
use vsim_core::sim::{Control, Event, EventQueue};

fn tid(index: u32) -> ThreadId {
    ThreadId { index, generation: 0 }
}

/// Short label of an event, for order assertions.
fn label(event: &Event) -> String {
    match event {
        Event::Thread(t) => format!("T{}", t.index),
        Event::Propagate { net, .. } => format!("P{}", net.0),
        Event::Generic(GenericEvent::FunctorTimer(net)) => format!("F{}", net.0),
        Event::Generic(GenericEvent::Callback(_)) => "C".to_owned(),
        Event::Assign { target, .. } => format!("A{}", target.net.0),
    }
}

/// Pops everything, returning `(time, label)` pairs.
fn drain(q: &mut EventQueue) -> Vec<(u64, String)> {
    std::iter::from_fn(|| q.pop().map(|e| (q.now().0, label(&e)))).collect()
}

fn assign(q: &mut EventQueue, net: u32, delay: u64) {
    q.schedule_assign(NetId(net).port(0), delay, Vec4::from_u64(1, 1), None);
}

#[test]
fn test_new_queue_is_empty() {
    let mut q = EventQueue::new();
    assert!(q.is_empty());
    assert_eq!(q.len(), 0);
    assert_eq!(q.next_time(), None);
    assert_eq!(q.now(), SimTime::ZERO);
    assert!(q.pop().is_none());
}

#[test]
fn test_events_pop_in_time_order() {
    let mut q = EventQueue::new();
    q.schedule_thread(tid(1), 5, false);
    q.schedule_thread(tid(2), 1, false);
    q.schedule_thread(tid(3), 5, false);
    assert_eq!(q.len(), 3);
    assert_eq!(q.next_time(), Some(SimTime(1)));
    assert_eq!(drain(&mut q), vec![(1, "T2".to_owned()), (5, "T1".to_owned()), (5, "T3".to_owned())]);
    assert!(q.is_empty());
    assert_eq!(q.current_time(), SimTime(5));
}

#[test]
fn test_delay_is_relative_to_now() {
    let mut q = EventQueue::new();
    q.schedule_thread(tid(1), 4, false);
    let _ = q.pop();
    q.schedule_thread(tid(2), 3, false);
    assert_eq!(q.next_time(), Some(SimTime(7)));
}

#[test]
fn test_pushed_zero_delay_thread_goes_first() {
    let mut q = EventQueue::new();
    q.schedule_thread(tid(1), 0, false);
    q.schedule_propagate(NetId(9), 0, Value::Real(1.0));
    q.schedule_thread(tid(2), 0, true);
    assert_eq!(
        drain(&mut q),
        vec![(0, "T2".to_owned()), (0, "T1".to_owned()), (0, "P9".to_owned())]
    );
}

#[test]
fn test_push_with_delay_is_appended() {
    let mut q = EventQueue::new();
    q.schedule_thread(tid(1), 3, false);
    q.schedule_thread(tid(2), 3, true);
    assert_eq!(drain(&mut q), vec![(3, "T1".to_owned()), (3, "T2".to_owned())]);
}

#[test]
fn test_assignments_wait_for_active_region() {
    let mut q = EventQueue::new();
    assign(&mut q, 1, 0);
    q.schedule_thread(tid(1), 0, false);
    q.schedule_generic_event(GenericEvent::FunctorTimer(NetId(4)), 0);
    assert_eq!(
        drain(&mut q),
        vec![(0, "T1".to_owned()), (0, "F4".to_owned()), (0, "A1".to_owned())]
    );
}

#[test]
fn test_assignment_batch_runs_before_triggered_work() {
    let mut q = EventQueue::new();
    assign(&mut q, 1, 0);
    assign(&mut q, 2, 0);
    let first = q.pop().map(|e| label(&e));
    assert_eq!(first.as_deref(), Some("A1"));
    // Work triggered by the first assignment, including a fresh assignment.
    q.schedule_thread(tid(7), 0, false);
    assign(&mut q, 3, 0);
    assert_eq!(
        drain(&mut q),
        vec![(0, "A2".to_owned()), (0, "T7".to_owned()), (0, "A3".to_owned())]
    );
}

#[test]
fn test_later_slot_keeps_its_own_regions() {
    let mut q = EventQueue::new();
    assign(&mut q, 1, 2);
    q.schedule_thread(tid(1), 2, false);
    q.schedule_thread(tid(2), 1, false);
    assert_eq!(
        drain(&mut q),
        vec![(1, "T2".to_owned()), (2, "T1".to_owned()), (2, "A1".to_owned())]
    );
}

#[test]
fn test_finish_and_stop_requests() {
    let mut q = EventQueue::new();
    assert!(!q.is_finished());
    q.request_stop(1);
    assert!(q.is_finished());
    assert_eq!(q.control(), Some(Control::Stop(1)));
    q.request_finish(2);
    assert_eq!(q.control(), Some(Control::Finish(2)));
    q.request_stop(3);
    assert_eq!(q.control(), Some(Control::Finish(2)));
    assert_eq!(q.take_control(), Some(Control::Finish(2)));
    assert!(!q.is_finished());
    assert_eq!(q.take_control(), None);
}

#[test]
fn test_callback_event_is_queued() {
    let mut q = EventQueue::new();
    q.schedule_generic_event(GenericEvent::Callback(Box::new(|_: &mut Network, _: &mut dyn Scheduler| {})), 6);
    assert_eq!(drain(&mut q), vec![(6, "C".to_owned())]);
}
