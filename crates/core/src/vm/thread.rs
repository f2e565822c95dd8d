//! Threads and the thread arena.
//!
//! A [`VThread`] is the saved state of one procedural process: program counter, index
//! registers, flags, the four value stacks and its place in the fork tree. Threads live in a
//! [`ThreadArena`] and refer to each other by [`ThreadId`], so parent/child cycles need no
//! reference counting. A handle carries the slot generation; once a thread is reaped every old
//! handle to its slot reports as stale.

use std::collections::BTreeSet;

use crate::common::{ContextId, ScopeId, ThreadId};
use crate::logic::{Bit4, Vec4};
use crate::net::ObjectRef;
use crate::vm::stack::ValueStack;

/// Number of index registers.
pub const WORD_REGS: usize = 16;

/// Number of flag registers.
pub const FLAG_REGS: usize = 256;

/// Flag set by comparisons for equality, and by index loads for an undefined source.
pub const FLAG_EQ: usize = 4;

/// Flag set by magnitude comparisons for less-than.
pub const FLAG_LT: usize = 5;

/// Flag set by comparisons for case equality.
pub const FLAG_EEQ: usize = 6;

/// Why a thread is not running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// `%delay` / `%delayx`.
    Delay,
    /// `%wait` on an event functor.
    Event,
    /// `%join` with no ended child yet.
    Join,
    /// `%wait/fork` with detached children still live.
    Detached,
    /// A foreign procedure asked to keep the thread suspended.
    Foreign,
}

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadState {
    /// Scheduled to run.
    Runnable,
    /// Executing instructions.
    Running,
    /// Suspended.
    Blocked(Wait),
    /// Ended, kept until the parent joins it.
    Zombie,
}

/// One procedural thread.
#[derive(Debug)]
pub struct VThread {
    /// Next instruction.
    pub(crate) pc: u32,
    /// Index registers.
    pub(crate) words: [i64; WORD_REGS],
    flags: Box<[Bit4; FLAG_REGS]>,
    /// Vector stack.
    pub vec4: ValueStack<Vec4>,
    /// Real stack.
    pub real: ValueStack<f64>,
    /// String stack.
    pub string: ValueStack<String>,
    /// Object stack.
    pub object: ValueStack<ObjectRef>,
    pub(crate) state: ThreadState,
    pub(crate) scope: ScopeId,
    pub(crate) parent: Option<ThreadId>,
    pub(crate) children: BTreeSet<ThreadId>,
    pub(crate) detached_children: BTreeSet<ThreadId>,
    pub(crate) detached: bool,
    pub(crate) joining: bool,
    pub(crate) waiting_detached: bool,
    pub(crate) ended: bool,
    pub(crate) disabled: bool,
    pub(crate) wt_context: Option<ContextId>,
    pub(crate) rd_context: Option<ContextId>,
    /// Context shared by the parent at `%fork`; never released by this thread.
    pub(crate) inherited_context: Option<ContextId>,
}

impl VThread {
    /// A fresh thread starting at `pc` in `scope`.
    pub fn new(pc: u32, scope: ScopeId, stack_capacity: usize) -> Self {
        let mut flags = Box::new([Bit4::X; FLAG_REGS]);
        flags[0] = Bit4::Zero;
        flags[1] = Bit4::One;
        flags[2] = Bit4::X;
        flags[3] = Bit4::Z;
        Self {
            pc,
            words: [0; WORD_REGS],
            flags,
            vec4: ValueStack::new("vec4", stack_capacity),
            real: ValueStack::new("real", stack_capacity),
            string: ValueStack::new("string", stack_capacity),
            object: ValueStack::new("object", stack_capacity),
            state: ThreadState::Runnable,
            scope,
            parent: None,
            children: BTreeSet::new(),
            detached_children: BTreeSet::new(),
            detached: false,
            joining: false,
            waiting_detached: false,
            ended: false,
            disabled: false,
            wt_context: None,
            rd_context: None,
            inherited_context: None,
        }
    }

    /// Program counter.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Lifecycle state.
    pub const fn state(&self) -> ThreadState {
        self.state
    }

    /// Scope the thread was created in.
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Parent thread, if any.
    pub const fn parent(&self) -> Option<ThreadId> {
        self.parent
    }

    /// Children that must still be joined.
    pub const fn children(&self) -> &BTreeSet<ThreadId> {
        &self.children
    }

    /// Children released with `%join/detach`.
    pub const fn detached_children(&self) -> &BTreeSet<ThreadId> {
        &self.detached_children
    }

    /// True once the thread has executed `%end` or been disabled.
    pub const fn has_ended(&self) -> bool {
        self.ended
    }

    /// True if the thread was ended by `%disable`.
    pub const fn was_disabled(&self) -> bool {
        self.disabled
    }

    /// Reads index register `idx`.
    #[inline]
    pub fn word(&self, idx: usize) -> i64 {
        self.words[idx]
    }

    /// Writes index register `idx`.
    #[inline]
    pub fn set_word(&mut self, idx: usize, value: i64) {
        self.words[idx] = value;
    }

    /// Reads flag `idx`.
    #[inline]
    pub fn flag(&self, idx: usize) -> Bit4 {
        self.flags[idx]
    }

    /// Writes flag `idx`.
    #[inline]
    pub fn set_flag(&mut self, idx: usize, value: Bit4) {
        self.flags[idx] = value;
    }
}

struct Slot {
    generation: u32,
    thread: Option<VThread>,
}

/// Generational arena of threads.
#[derive(Default)]
pub struct ThreadArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl std::fmt::Debug for ThreadArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadArena").field("slots", &self.slots.len()).field("live", &self.live).finish()
    }
}

impl ThreadArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live threads.
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Stores `thread` and returns its handle.
    pub fn insert(&mut self, thread: VThread) -> ThreadId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.thread = Some(thread);
            return ThreadId { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, thread: Some(thread) });
        ThreadId { index, generation: 0 }
    }

    /// Borrows the thread behind `id`, or `None` if the handle is stale.
    pub fn get(&self, id: ThreadId) -> Option<&VThread> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.thread.as_ref())
    }

    /// Mutably borrows the thread behind `id`, or `None` if the handle is stale.
    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut VThread> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.thread.as_mut())
    }

    /// True if `id` still names a live thread.
    pub fn contains(&self, id: ThreadId) -> bool {
        self.get(id).is_some()
    }

    /// Removes the thread behind `id`, invalidating every handle to it.
    pub fn remove(&mut self, id: ThreadId) -> Option<VThread> {
        let slot = self.slots.get_mut(id.index as usize).filter(|s| s.generation == id.generation)?;
        let thread = slot.thread.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(thread)
    }

    /// Handles of every live thread.
    pub fn ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.thread.is_some()).map(|(i, s)| ThreadId {
            index: i as u32,
            generation: s.generation,
        })
    }
}
