//! Simulator: owns the network, the VM and the event queue side by side.
//!
//! Keeping the three as sibling fields lets every dispatch borrow the network and the queue
//! mutably at the same time the VM runs a thread, without interior mutability.

use tracing::{debug, info};

use crate::common::error::SimError;
use crate::common::{SimTime, ThreadId};
use crate::config::Config;
use crate::net::{Network, Value};
use crate::sched::GenericEvent;
use crate::sim::queue::{Control, Event, EventQueue};
use crate::stats::SimStats;
use crate::vm::{ForeignTable, Program, Vm};

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// `$finish` was called with this exit code.
    Finished(i32),
    /// `$stop` was called with this exit code; `run` may be called again to resume.
    Stopped(i32),
    /// No events are left.
    Idle,
    /// The next event lies past `general.stop_time`.
    TimeLimit,
}

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    network: Network,
    vm: Vm,
    queue: EventQueue,
    config: Config,
    stats: SimStats,
    started: bool,
    finished: Option<i32>,
}

impl Simulator {
    /// Creates a simulator for a built network and program.
    ///
    /// # Arguments
    ///
    /// * `network` - The signal network, fully linked.
    /// * `program` - The linked code space and its start list.
    /// * `foreign` - Procedures for every foreign call site of `program`.
    /// * `config`  - Run configuration.
    ///
    /// # Errors
    ///
    /// [`SimError::Build`] if a call site names an unregistered procedure.
    pub fn new(mut network: Network, program: Program, foreign: ForeignTable, config: &Config) -> Result<Self, SimError> {
        let mut vm = Vm::new(program, foreign, &config.vm)?;
        vm.set_trace(config.general.trace_instructions);
        network.set_trace(config.general.trace_propagation);
        network.set_drive(config.network.drive0, config.network.drive1);
        Ok(Self {
            network,
            vm,
            queue: EventQueue::new(),
            config: config.clone(),
            stats: SimStats::default(),
            started: false,
            finished: None,
        })
    }

    /// The signal network.
    pub const fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the network, for test benches that poke inputs.
    pub const fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// The VM.
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }

    /// The event queue.
    pub const fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Mutable access to the event queue, for scheduling stimulus.
    pub const fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// The configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current simulated time.
    pub const fn now(&self) -> SimTime {
        self.queue.now()
    }

    /// Settles the resolvers, then creates the initial threads and schedules them at time
    /// zero.
    pub fn start(&mut self) -> Vec<ThreadId> {
        self.started = true;
        self.network.settle_resolvers(&mut self.queue);
        let threads = self.vm.start(&mut self.queue);
        debug!(target: "vsim::sim", threads = threads.len(), "simulation started");
        threads
    }

    /// Processes one event.
    ///
    /// # Returns
    ///
    /// `false` if the queue was empty.
    ///
    /// # Errors
    ///
    /// [`SimError::NotStarted`] before [`Simulator::start`].
    pub fn step(&mut self) -> Result<bool, SimError> {
        if !self.started {
            return Err(SimError::NotStarted);
        }
        let Some(event) = self.queue.pop() else {
            return Ok(false);
        };
        self.stats.events_processed += 1;
        self.dispatch(event);
        Ok(true)
    }

    fn dispatch(&mut self, event: Event) {
        let (net, queue) = (&mut self.network, &mut self.queue);
        match event {
            Event::Thread(id) => self.vm.run_thread(id, net, queue),
            Event::Propagate { net: from, value } => net.send(from, &value, queue),
            Event::Generic(GenericEvent::FunctorTimer(node)) => net.run_timer(node, queue),
            Event::Generic(GenericEvent::Callback(callback)) => callback(net, queue),
            Event::Assign { target, value, part } => {
                self.stats.assignments += 1;
                match part {
                    Some(part) => net.deliver_vec4_pv(target, &value, part, queue),
                    None => net.deliver(target, &Value::Vec4(value), queue),
                }
            }
        }
    }

    /// Runs until `$finish`, `$stop`, an empty queue or the configured time limit.
    ///
    /// After [`RunOutcome::Stopped`] a further call resumes where the run paused. After
    /// [`RunOutcome::Finished`] every further call returns the same outcome.
    ///
    /// # Errors
    ///
    /// [`SimError::NotStarted`] before [`Simulator::start`].
    pub fn run(&mut self) -> Result<RunOutcome, SimError> {
        if !self.started {
            return Err(SimError::NotStarted);
        }
        if let Some(code) = self.finished {
            return Ok(RunOutcome::Finished(code));
        }
        let outcome = loop {
            match self.queue.take_control() {
                Some(Control::Finish(code)) => {
                    self.finished = Some(code);
                    break RunOutcome::Finished(code);
                }
                Some(Control::Stop(code)) => break RunOutcome::Stopped(code),
                None => {}
            }
            if let (Some(limit), Some(next)) = (self.config.general.stop_time, self.queue.next_time())
                && next.0 > limit
            {
                break RunOutcome::TimeLimit;
            }
            if !self.step()? {
                break RunOutcome::Idle;
            }
        };
        info!(target: "vsim::sim", time = self.queue.now().0, ?outcome, "run ended");
        Ok(outcome)
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> SimStats {
        let mut stats = self.stats.clone();
        stats.sim_time = self.queue.now().0;
        stats.vm = self.vm.stats().clone();
        stats.network = self.network.stats;
        stats
    }
}
