//! Automatic-scope contexts and the scope table.
//!
//! Each call into an automatic (reentrant) task or function gets a [`Context`]: one item per
//! automatic variable of the scope. Contexts are chained into per-thread write and read
//! stacks through [`Context::stacked`] and recycled through a free list owned by the scope.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::error::{Fatal, fatal};
use crate::common::{ContextId, ScopeId, ThreadId};
use crate::net::Value;

/// Static description of a scope, fixed when the code space is built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopeInfo {
    /// Hierarchical name.
    pub name: String,
    /// True for automatic tasks and functions.
    pub automatic: bool,
    /// Initial value of every automatic item.
    #[serde(skip)]
    pub items: Vec<Value>,
}

/// Storage for one invocation of an automatic scope.
#[derive(Clone, Debug)]
pub struct Context {
    scope: ScopeId,
    items: Vec<Value>,
    pub(crate) stacked: Option<ContextId>,
}

impl Context {
    /// Scope this context belongs to.
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Current value of item `slot`.
    pub fn item(&self, slot: usize) -> &Value {
        &self.items[slot]
    }

    /// Overwrites item `slot`.
    pub fn set_item(&mut self, slot: usize, value: Value) {
        self.items[slot] = value;
    }
}

#[derive(Debug)]
struct ScopeState {
    info: ScopeInfo,
    threads: BTreeSet<ThreadId>,
    free: Vec<ContextId>,
}

/// Runtime scope table: static info plus the live threads and context free list per scope.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<ScopeState>,
    contexts: Vec<Context>,
}

impl ScopeTable {
    /// Builds the table from the scopes of a program.
    pub fn new(scopes: &[ScopeInfo]) -> Self {
        Self {
            scopes: scopes
                .iter()
                .map(|info| ScopeState { info: info.clone(), threads: BTreeSet::new(), free: Vec::new() })
                .collect(),
            contexts: Vec::new(),
        }
    }

    fn state(&self, scope: ScopeId) -> &ScopeState {
        self.scopes
            .get(scope.0 as usize)
            .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "scope", index: scope.0 }))
    }

    fn state_mut(&mut self, scope: ScopeId) -> &mut ScopeState {
        self.scopes
            .get_mut(scope.0 as usize)
            .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "scope", index: scope.0 }))
    }

    /// Static description of `scope`.
    pub fn info(&self, scope: ScopeId) -> &ScopeInfo {
        &self.state(scope).info
    }

    /// Number of scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// True if there are no scopes.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Live threads currently attached to `scope`.
    pub fn threads(&self, scope: ScopeId) -> &BTreeSet<ThreadId> {
        &self.state(scope).threads
    }

    pub(crate) fn attach(&mut self, scope: ScopeId, thread: ThreadId) {
        let _ = self.state_mut(scope).threads.insert(thread);
    }

    pub(crate) fn detach(&mut self, scope: ScopeId, thread: ThreadId) {
        let _ = self.state_mut(scope).threads.remove(&thread);
    }

    /// Number of contexts ever allocated (live or on a free list).
    pub fn contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Number of contexts waiting on the free list of `scope`.
    pub fn free_contexts(&self, scope: ScopeId) -> usize {
        self.state(scope).free.len()
    }

    /// Allocates a context for `scope`, reusing one from its free list when possible.
    pub fn alloc(&mut self, scope: ScopeId) -> ContextId {
        let items = self.state(scope).info.items.clone();
        if let Some(id) = self.state_mut(scope).free.pop() {
            let ctx = self.context_mut(id);
            ctx.items = items;
            ctx.stacked = None;
            return id;
        }
        let id = ContextId(self.contexts.len() as u32);
        self.contexts.push(Context { scope, items, stacked: None });
        id
    }

    /// Returns `ctx` to the free list of its scope.
    pub fn free(&mut self, ctx: ContextId) {
        let scope = self.context(ctx).scope;
        self.context_mut(ctx).stacked = None;
        self.state_mut(scope).free.push(ctx);
    }

    /// Borrows a context.
    pub fn context(&self, ctx: ContextId) -> &Context {
        self.contexts
            .get(ctx.0 as usize)
            .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "context", index: ctx.0 }))
    }

    /// Mutably borrows a context.
    pub fn context_mut(&mut self, ctx: ContextId) -> &mut Context {
        self.contexts
            .get_mut(ctx.0 as usize)
            .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "context", index: ctx.0 }))
    }
}
