//! Foreign procedures (system tasks and functions).
//!
//! A call site names a procedure and declares how many values it takes from each stack. The
//! callee reads its arguments through [`ForeignCall`] by position, never by raw stack depth.
//! After the call the VM pops the arguments and, for functions, pushes the return value.

use std::collections::HashMap;
use std::fmt;

use crate::common::error::{Fatal, fatal};
use crate::common::{SimTime, ThreadId};
use crate::logic::Vec4;
use crate::net::{Network, ObjectRef, Value};
use crate::sched::Scheduler;
use crate::vm::code::CallSite;
use crate::vm::thread::VThread;

/// What the VM does with the calling thread after a foreign call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForeignOutcome {
    /// Continue with the next instruction.
    Complete,
    /// Suspend and resume after this many ticks.
    Yield(u64),
    /// Suspend; the procedure has kept the thread handle and will reschedule it.
    Block,
}

/// View of the calling thread handed to a foreign procedure.
pub struct ForeignCall<'a> {
    pub(crate) thread: &'a mut VThread,
    pub(crate) id: ThreadId,
    pub(crate) site: &'a CallSite,
    pub(crate) network: &'a mut Network,
    pub(crate) sched: &'a mut dyn Scheduler,
    pub(crate) ret: Option<Value>,
}

impl fmt::Debug for ForeignCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignCall").field("thread", &self.id).field("site", self.site).finish_non_exhaustive()
    }
}

impl ForeignCall<'_> {
    /// The calling thread.
    pub const fn thread_id(&self) -> ThreadId {
        self.id
    }

    /// The call site being executed.
    pub const fn site(&self) -> &CallSite {
        self.site
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.sched.current_time()
    }

    fn depth(count: usize, idx: usize, stack: &'static str) -> usize {
        if idx >= count {
            fatal(Fatal::StackUnderflow { stack, depth: idx, size: count });
        }
        count - 1 - idx
    }

    /// Vector argument `idx` (0 is the first argument pushed).
    pub fn vec4_arg(&self, idx: usize) -> &Vec4 {
        self.thread.vec4.peek(Self::depth(self.site.args.vec4, idx, "vec4"))
    }

    /// Overwrites vector argument `idx`, for output arguments.
    pub fn set_vec4_arg(&mut self, idx: usize, value: Vec4) {
        let depth = Self::depth(self.site.args.vec4, idx, "vec4");
        self.thread.vec4.poke(depth, value);
    }

    /// Real argument `idx`.
    pub fn real_arg(&self, idx: usize) -> f64 {
        *self.thread.real.peek(Self::depth(self.site.args.real, idx, "real"))
    }

    /// String argument `idx`.
    pub fn str_arg(&self, idx: usize) -> &str {
        self.thread.string.peek(Self::depth(self.site.args.string, idx, "string"))
    }

    /// Object handle argument `idx`.
    pub fn object_arg(&self, idx: usize) -> &ObjectRef {
        self.thread.object.peek(Self::depth(self.site.args.object, idx, "object"))
    }

    /// Sets the function return value.
    pub fn set_return(&mut self, value: Value) {
        self.ret = Some(value);
    }

    /// The network, for procedures that inspect or drive nets.
    pub fn network(&mut self) -> &mut Network {
        self.network
    }

    /// The scheduler.
    pub fn scheduler(&mut self) -> &mut dyn Scheduler {
        self.sched
    }

    /// Requests the end of simulation.
    pub fn finish(&mut self, code: i32) {
        self.sched.request_finish(code);
    }

    /// Requests a pause of simulation.
    pub fn stop(&mut self, code: i32) {
        self.sched.request_stop(code);
    }
}

/// A procedure callable from `%vpi_call` / `%vpi_func`.
pub trait ForeignProcedure {
    /// Executes one call.
    fn call(&mut self, call: &mut ForeignCall<'_>) -> ForeignOutcome;
}

impl<F> ForeignProcedure for F
where
    F: FnMut(&mut ForeignCall<'_>) -> ForeignOutcome,
{
    fn call(&mut self, call: &mut ForeignCall<'_>) -> ForeignOutcome {
        self(call)
    }
}

fn exit_code(call: &ForeignCall<'_>) -> i32 {
    if call.site().args.vec4 == 0 {
        return 0;
    }
    call.vec4_arg(0).to_i64().map_or(0, |v| v as i32)
}

/// `$finish`.
fn builtin_finish(call: &mut ForeignCall<'_>) -> ForeignOutcome {
    let code = exit_code(call);
    call.finish(code);
    ForeignOutcome::Complete
}

/// `$stop`.
fn builtin_stop(call: &mut ForeignCall<'_>) -> ForeignOutcome {
    let code = exit_code(call);
    call.stop(code);
    ForeignOutcome::Complete
}

/// `$time`.
fn builtin_time(call: &mut ForeignCall<'_>) -> ForeignOutcome {
    let now = call.now().ticks();
    call.set_return(Value::Vec4(Vec4::from_u64(64, now)));
    ForeignOutcome::Complete
}

/// Registry of foreign procedures keyed by name.
#[derive(Default)]
pub struct ForeignTable {
    procs: Vec<Box<dyn ForeignProcedure>>,
    names: HashMap<String, usize>,
}

impl fmt::Debug for ForeignTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ForeignTable").field("procedures", &names).finish()
    }
}

impl ForeignTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding `$finish`, `$stop` and `$time`.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("$finish", builtin_finish);
        table.register("$stop", builtin_stop);
        table.register("$time", builtin_time);
        table
    }

    /// Registers `procedure` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, procedure: impl ForeignProcedure + 'static) {
        if let Some(&idx) = self.names.get(name) {
            self.procs[idx] = Box::new(procedure);
            return;
        }
        let _ = self.names.insert(name.to_owned(), self.procs.len());
        self.procs.push(Box::new(procedure));
    }

    /// Index of the procedure registered as `name`.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut dyn ForeignProcedure {
        self.procs[idx].as_mut()
    }
}
