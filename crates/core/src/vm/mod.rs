//! The procedural bytecode VM.
//!
//! Threads execute instructions from an immutable [`Program`] in a fetch loop until an
//! instruction suspends them. The VM is organised as:
//! 1. **Code:** [`CodeBuilder`] assembles and links a [`Program`]; the [`opcode`] table defines
//!    every instruction, its operand kinds and its handler.
//! 2. **Threads:** [`VThread`] state in a generational [`ThreadArena`], with typed
//!    [`ValueStack`]s, index registers and flags.
//! 3. **Lifecycle:** Fork, join, detach, disable and reaping keep the fork tree consistent.
//! 4. **Contexts:** Automatic scopes get per-call storage from a [`ScopeTable`] free list.
//! 5. **Foreign calls:** [`ForeignTable`] maps system task names to [`ForeignProcedure`]s.
//!
//! The VM never owns the event queue. It is resumed through [`Vm::run_thread`] whenever the
//! scheduler dequeues a thread wake-up.

/// Code space, instructions and the builder.
pub mod code;

/// Automatic contexts and the scope table.
pub mod context;

/// Opcode handlers.
pub mod exec;

/// Foreign procedures.
pub mod foreign;

/// Thread lifecycle operations.
mod lifecycle;

/// The opcode table.
pub mod opcode;

/// Typed value stacks.
pub mod stack;

/// Threads and the thread arena.
pub mod thread;

pub use code::{Arg, ArgCounts, CallSite, CodeBuilder, Instruction, Operand, Program, Return, Start};
pub use context::{Context, ScopeInfo, ScopeTable};
pub use exec::Exec;
pub use foreign::{ForeignCall, ForeignOutcome, ForeignProcedure, ForeignTable};
pub use opcode::{Opcode, OpcodeInfo, OperandKind};
pub use stack::ValueStack;
pub use thread::{ThreadArena, ThreadState, VThread, Wait};

use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::error::{BuildError, Fatal, fatal};
use crate::common::{ScopeId, ThreadId};
use crate::config::VmConfig;
use crate::net::Network;
use crate::sched::Scheduler;
use crate::stats::VmStats;

/// Mutable VM state shared by every opcode handler.
#[derive(Debug)]
pub struct VmCore {
    pub(crate) threads: ThreadArena,
    pub(crate) scopes: ScopeTable,
    pub(crate) sites: Vec<CallSite>,
    pub(crate) site_procs: Vec<usize>,
    pub(crate) foreign: ForeignTable,
    pub(crate) config: VmConfig,
    pub(crate) stats: VmStats,
    trace: bool,
}

/// The thread engine.
#[derive(Debug)]
pub struct Vm {
    code: Arc<[Instruction]>,
    starts: Vec<Start>,
    core: VmCore,
}

impl Vm {
    /// Creates a VM for `program`, binding every call site to a procedure in `foreign`.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownForeign`] if a call site names a procedure that is not registered.
    pub fn new(program: Program, foreign: ForeignTable, config: &VmConfig) -> Result<Self, BuildError> {
        let site_procs = program
            .sites
            .iter()
            .map(|site| foreign.resolve(&site.name).ok_or_else(|| BuildError::UnknownForeign(site.name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            code: program.code,
            starts: program.starts,
            core: VmCore {
                threads: ThreadArena::new(),
                scopes: ScopeTable::new(&program.scopes),
                sites: program.sites,
                site_procs,
                foreign,
                config: config.clone(),
                stats: VmStats::default(),
                trace: cfg!(feature = "always-trace"),
            },
        })
    }

    /// Enables per-instruction tracing.
    pub const fn set_trace(&mut self, on: bool) {
        self.core.trace = on || cfg!(feature = "always-trace");
    }

    /// Counters.
    pub const fn stats(&self) -> &VmStats {
        &self.core.stats
    }

    /// The thread arena.
    pub const fn threads(&self) -> &ThreadArena {
        &self.core.threads
    }

    /// Borrows a live thread.
    pub fn thread(&self, id: ThreadId) -> Option<&VThread> {
        self.core.threads.get(id)
    }

    /// The runtime scope table.
    pub const fn scopes(&self) -> &ScopeTable {
        &self.core.scopes
    }

    /// Creates the initial threads and schedules each to run at the current time.
    pub fn start(&mut self, sched: &mut dyn Scheduler) -> Vec<ThreadId> {
        let starts = self.starts.clone();
        starts
            .iter()
            .map(|start| {
                let id = self.core.spawn(start.pc, start.scope, None);
                self.core.wake(id, 0, false, sched);
                id
            })
            .collect()
    }

    /// Creates a parentless thread at `pc` without scheduling it.
    pub fn spawn(&mut self, pc: u32, scope: ScopeId) -> ThreadId {
        self.core.spawn(pc, scope, None)
    }

    /// Runs `id` until it suspends, ends or simulation is finished.
    ///
    /// Wake-ups for threads that have since ended or been reaped are ignored.
    pub fn run_thread(&mut self, id: ThreadId, network: &mut Network, sched: &mut dyn Scheduler) {
        match self.core.threads.get_mut(id) {
            Some(thr) if !thr.ended => thr.state = ThreadState::Running,
            _ => {
                debug!(target: "vsim::vm", thread = %id, "stale wake-up ignored");
                return;
            }
        }
        self.core.stats.thread_wakeups += 1;

        let code = Arc::clone(&self.code);
        let limit = self.core.config.max_instructions_per_quantum;
        let trace_on = self.core.trace;
        let mut count = 0u64;
        let mut ex = Exec { core: &mut self.core, net: network, sched, id };
        loop {
            let thr = ex.thr();
            let pc = thr.pc;
            let Some(inst) = code.get(pc as usize) else {
                fatal(Fatal::PcOutOfRange(pc));
            };
            thr.pc = pc + 1;
            if trace_on {
                trace!(target: "vsim::vm", thread = %id, pc, op = inst.mnemonic(), "exec");
            }
            count += 1;
            if !(inst.opcode().info().handler)(&mut ex, inst) {
                break;
            }
            if ex.sched.is_finished() {
                ex.sched.schedule_thread(id, 0, false);
                break;
            }
            if limit != 0 && count >= limit {
                ex.core.wake(id, 0, false, ex.sched);
                break;
            }
        }
        let core = ex.core;
        core.stats.instructions += count;
        if let Some(thr) = core.threads.get_mut(id) {
            if thr.state == ThreadState::Running {
                thr.state = ThreadState::Runnable;
            }
            core.stats.peak_vec4_depth = core.stats.peak_vec4_depth.max(thr.vec4.peak() as u64);
        }
    }
}
