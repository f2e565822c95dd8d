use mockall::mock;
use vsim_core::common::{NetId, PortRef, SimTime, ThreadId};
use vsim_core::logic::Vec4;
use vsim_core::net::Value;
use vsim_core::sched::{GenericEvent, PartSelect, Scheduler};

mock! {
    pub Sched {}
    impl Scheduler for Sched {
        fn schedule_thread(&mut self, thread: ThreadId, delay: u64, push: bool);
        fn schedule_generic_event(&mut self, event: GenericEvent, delay: u64);
        fn schedule_propagate(&mut self, net: NetId, delay: u64, value: Value);
        fn schedule_assign(&mut self, target: PortRef, delay: u64, value: Vec4, part: Option<PartSelect>);
        fn current_time(&self) -> SimTime;
        fn request_finish(&mut self, code: i32);
        fn request_stop(&mut self, code: i32);
        fn is_finished(&self) -> bool;
    }
}

/// One call made through the [`Scheduler`] contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Thread { thread: ThreadId, delay: u64, push: bool },
    Timer { net: NetId, delay: u64 },
    Callback { delay: u64 },
    Propagate { net: NetId, delay: u64, value: Value },
    Assign { target: PortRef, delay: u64, value: Vec4, part: Option<PartSelect> },
    Finish(i32),
    Stop(i32),
}

/// A scheduler that only records what it was asked to do.
///
/// Time never advances on its own; tests move it with `now`.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    pub now: SimTime,
    pub calls: Vec<Call>,
    finished: bool,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threads scheduled so far, in order.
    pub fn threads(&self) -> Vec<ThreadId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Thread { thread, .. } => Some(*thread),
                _ => None,
            })
            .collect()
    }

    /// Delays of every functor timer scheduled so far.
    pub fn timers(&self) -> Vec<(NetId, u64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Timer { net, delay } => Some((*net, *delay)),
                _ => None,
            })
            .collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule_thread(&mut self, thread: ThreadId, delay: u64, push: bool) {
        self.calls.push(Call::Thread { thread, delay, push });
    }

    fn schedule_generic_event(&mut self, event: GenericEvent, delay: u64) {
        self.calls.push(match event {
            GenericEvent::FunctorTimer(net) => Call::Timer { net, delay },
            GenericEvent::Callback(_) => Call::Callback { delay },
        });
    }

    fn schedule_propagate(&mut self, net: NetId, delay: u64, value: Value) {
        self.calls.push(Call::Propagate { net, delay, value });
    }

    fn schedule_assign(&mut self, target: PortRef, delay: u64, value: Vec4, part: Option<PartSelect>) {
        self.calls.push(Call::Assign { target, delay, value, part });
    }

    fn current_time(&self) -> SimTime {
        self.now
    }

    fn request_finish(&mut self, code: i32) {
        self.finished = true;
        self.calls.push(Call::Finish(code));
    }

    fn request_stop(&mut self, code: i32) {
        self.finished = true;
        self.calls.push(Call::Stop(code));
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
