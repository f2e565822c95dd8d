//! Thread lifecycle: creation, ending, joining, detaching, disabling and reaping.
//!
//! These operations keep the fork tree consistent:
//! 1. **Children:** Threads created by `%fork` that the parent must `%join`.
//! 2. **Detached children:** Threads released by `%join/detach`; only `%wait/fork` and
//!    `%disable/fork` look at them again.
//! 3. **Zombies:** Ended threads waiting for their parent's `%join`. Parentless threads are
//!    reaped as soon as they end.
//!
//! A parent woken by a child is always scheduled, never run inline.

use tracing::debug;

use crate::common::error::{Fatal, fatal};
use crate::common::{ScopeId, ThreadId};
use crate::sched::Scheduler;
use crate::vm::VmCore;
use crate::vm::thread::{ThreadState, VThread, Wait};

impl VmCore {
    pub(crate) fn thread(&self, id: ThreadId) -> &VThread {
        self.threads.get(id).unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "thread", index: id.index }))
    }

    pub(crate) fn thread_mut(&mut self, id: ThreadId) -> &mut VThread {
        self.threads.get_mut(id).unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "thread", index: id.index }))
    }

    /// Creates a thread at `pc` in `scope`, optionally as a child of `parent`.
    pub(crate) fn spawn(&mut self, pc: u32, scope: ScopeId, parent: Option<ThreadId>) -> ThreadId {
        let mut thr = VThread::new(pc, scope, self.config.stack_capacity);
        thr.parent = parent;
        let id = self.threads.insert(thr);
        self.scopes.attach(scope, id);
        if let Some(parent) = parent {
            let _ = self.thread_mut(parent).children.insert(id);
        }
        self.stats.threads_created += 1;
        debug!(target: "vsim::vm", thread = %id, pc, parent = ?parent, "spawn");
        id
    }

    /// Schedules `id` to run after `delay` ticks. Ended threads stay as they are.
    pub(crate) fn wake(&mut self, id: ThreadId, delay: u64, push: bool, sched: &mut dyn Scheduler) {
        match self.threads.get_mut(id) {
            Some(thr) if thr.ended => {
                debug!(target: "vsim::vm", thread = %id, "wake of ended thread dropped");
                return;
            }
            Some(thr) => thr.state = ThreadState::Runnable,
            None => {}
        }
        sched.schedule_thread(id, delay, push);
    }

    /// Suspends `id` for `why`.
    pub(crate) fn block(&mut self, id: ThreadId, why: Wait) {
        self.thread_mut(id).state = ThreadState::Blocked(why);
    }

    /// Returns the contexts `id` allocated and still holds to their scopes' free lists.
    ///
    /// Both context stacks are walked down to the context inherited at `%fork`, which belongs
    /// to the parent.
    fn release_contexts(&mut self, id: ThreadId) {
        let thr = self.thread_mut(id);
        let inherited = thr.inherited_context;
        let stacks = [thr.wt_context, thr.rd_context];
        thr.wt_context = inherited;
        thr.rd_context = inherited;
        for top in stacks {
            let mut next = top;
            while let Some(ctx) = next.filter(|&c| Some(c) != inherited) {
                next = self.scopes.context(ctx).stacked;
                self.scopes.free(ctx);
            }
        }
    }

    /// Deletes a thread, handing its children to its parent.
    pub(crate) fn reap(&mut self, id: ThreadId) {
        let Some(thr) = self.threads.remove(id) else {
            return;
        };
        for &child in &thr.children {
            if let Some(c) = self.threads.get_mut(child) {
                c.parent = thr.parent;
            }
            if let Some(p) = thr.parent.and_then(|p| self.threads.get_mut(p)) {
                let _ = p.children.insert(child);
            }
        }
        for &child in &thr.detached_children {
            if let Some(c) = self.threads.get_mut(child) {
                c.parent = None;
                c.detached = false;
            }
        }
        if let Some(p) = thr.parent.and_then(|p| self.threads.get_mut(p)) {
            let _ = p.children.remove(&id);
            let _ = p.detached_children.remove(&id);
        }
        self.scopes.detach(thr.scope, id);
        self.stats.threads_reaped += 1;
        self.stats.peak_vec4_depth = self.stats.peak_vec4_depth.max(thr.vec4.peak() as u64);
        debug!(target: "vsim::vm", thread = %id, disabled = thr.disabled, "reap");
    }

    /// Completes a `%join` of `parent` with the ended `child`.
    ///
    /// If the child ran in an automatic scope, the context it used moves from the parent's
    /// write stack to its read stack so the parent can collect results before `%free`.
    pub(crate) fn do_join(&mut self, parent: ThreadId, child: ThreadId) {
        let child_ctx = self.threads.get(child).and_then(|c| c.wt_context);
        if child_ctx.is_some() {
            let p = self.thread_mut(parent);
            if p.wt_context != p.rd_context
                && let Some(ctx) = p.wt_context
            {
                let rd = p.rd_context;
                let below = self.scopes.context(ctx).stacked;
                self.scopes.context_mut(ctx).stacked = rd;
                let p = self.thread_mut(parent);
                p.wt_context = below;
                p.rd_context = Some(ctx);
            }
        }
        self.reap(child);
    }

    /// `%end`: marks `id` ended and settles it with its parent.
    pub(crate) fn end(&mut self, id: ThreadId, sched: &mut dyn Scheduler) {
        let thr = self.thread_mut(id);
        thr.ended = true;
        thr.state = ThreadState::Zombie;
        let orphans = std::mem::take(&mut thr.detached_children);
        let parent = thr.parent;
        let detached = thr.detached;
        for child in orphans {
            if let Some(c) = self.threads.get_mut(child) {
                c.parent = None;
                c.detached = false;
            }
        }
        debug!(target: "vsim::vm", thread = %id, "end");

        if let Some(p) = parent {
            if !detached && self.thread(p).joining {
                self.thread_mut(p).joining = false;
                self.wake(p, 0, true, sched);
                self.do_join(p, id);
                return;
            }
            if detached {
                let wake_parent = {
                    let pt = self.thread_mut(p);
                    let _ = pt.detached_children.remove(&id);
                    let done = pt.waiting_detached && pt.detached_children.is_empty();
                    if done {
                        pt.waiting_detached = false;
                    }
                    done
                };
                if wake_parent {
                    self.wake(p, 0, true, sched);
                }
                let thr = self.thread_mut(id);
                thr.detached = false;
                thr.parent = None;
            }
        }
        if self.thread(id).parent.is_none() {
            self.reap(id);
        }
    }

    /// `%join`: reaps an ended child or suspends until one ends.
    ///
    /// Returns `true` if the thread can keep running.
    pub(crate) fn join(&mut self, id: ThreadId) -> bool {
        let thr = self.thread(id);
        if thr.joining {
            fatal(Fatal::ThreadState { thread: id.index, reason: "%join while already joining" });
        }
        if thr.children.is_empty() {
            fatal(Fatal::ThreadState { thread: id.index, reason: "%join with no children" });
        }
        let ended = thr.children.iter().copied().find(|&c| self.threads.get(c).is_some_and(|t| t.ended));
        if let Some(child) = ended {
            self.do_join(id, child);
            return true;
        }
        let thr = self.thread_mut(id);
        thr.joining = true;
        thr.state = ThreadState::Blocked(Wait::Join);
        false
    }

    /// `%join/detach count`: reaps ended children and detaches the rest.
    pub(crate) fn join_detach(&mut self, id: ThreadId, count: usize) {
        let children = std::mem::take(&mut self.thread_mut(id).children);
        if children.len() != count {
            fatal(Fatal::ThreadState { thread: id.index, reason: "%join/detach count does not match children" });
        }
        for child in children {
            let ended = self.threads.get(child).is_none_or(|c| c.ended);
            if ended {
                self.reap(child);
                continue;
            }
            self.thread_mut(child).detached = true;
            let _ = self.thread_mut(id).detached_children.insert(child);
        }
    }

    /// `%wait/fork`: returns `true` if no detached child is left.
    pub(crate) fn wait_fork(&mut self, id: ThreadId) -> bool {
        let thr = self.thread_mut(id);
        if thr.detached_children.is_empty() {
            return true;
        }
        thr.waiting_detached = true;
        thr.state = ThreadState::Blocked(Wait::Detached);
        false
    }

    /// `%disable/fork`: disables every child and detached child of `id`.
    pub(crate) fn disable_fork(&mut self, id: ThreadId, sched: &mut dyn Scheduler) {
        if self.thread(id).joining {
            fatal(Fatal::ThreadState { thread: id.index, reason: "%disable/fork while joining" });
        }
        loop {
            let thr = self.thread(id);
            let Some(child) = thr.children.first().or_else(|| thr.detached_children.first()).copied() else {
                break;
            };
            let _ = self.do_disable(child, id, sched);
            self.reap(child);
        }
        let thr = self.thread_mut(id);
        if thr.waiting_detached {
            thr.waiting_detached = false;
            self.wake(id, 0, true, sched);
        }
    }

    /// Disables `id` and its whole subtree.
    ///
    /// Returns `true` if `matching` (the thread executing the disable) was among the threads
    /// ended.
    pub(crate) fn do_disable(&mut self, id: ThreadId, matching: ThreadId, sched: &mut dyn Scheduler) -> bool {
        let Some(thr) = self.threads.get_mut(id) else {
            return false;
        };
        let scope = thr.scope;
        if !thr.ended {
            self.stats.threads_disabled += 1;
        }
        thr.ended = true;
        thr.disabled = true;
        thr.state = ThreadState::Zombie;
        self.scopes.detach(scope, id);
        self.release_contexts(id);
        debug!(target: "vsim::vm", thread = %id, "disable");

        let mut hit = id == matching;
        loop {
            let thr = self.thread_mut(id);
            thr.joining = false;
            let Some(child) = thr.children.first().or_else(|| thr.detached_children.first()).copied() else {
                break;
            };
            if self.do_disable(child, matching, sched) {
                hit = true;
            }
            self.reap(child);
        }

        let thr = self.thread(id);
        let (parent, detached) = (thr.parent, thr.detached);
        match parent {
            Some(p) if self.thread(p).joining && !detached => {
                let pt = self.thread_mut(p);
                pt.joining = false;
                let parent_ended = pt.ended;
                if !parent_ended {
                    self.wake(p, 0, true, sched);
                }
                self.do_join(p, id);
            }
            Some(p) if detached => {
                let wake_parent = {
                    let pt = self.thread_mut(p);
                    let _ = pt.detached_children.remove(&id);
                    let done = pt.waiting_detached && pt.detached_children.is_empty();
                    if done {
                        pt.waiting_detached = false;
                    }
                    done
                };
                if wake_parent {
                    self.wake(p, 0, true, sched);
                }
                self.reap(id);
            }
            Some(_) => {}
            None => self.reap(id),
        }
        hit
    }

    /// `%disable scope`: disables every thread in `scope`.
    ///
    /// Returns `true` if the executing thread `id` survived.
    pub(crate) fn disable_scope(&mut self, scope: ScopeId, id: ThreadId, sched: &mut dyn Scheduler) -> bool {
        let mut hit = false;
        while let Some(&victim) = self.scopes.threads(scope).first() {
            if self.do_disable(victim, id, sched) {
                hit = true;
            }
            if self.scopes.threads(scope).contains(&victim) {
                self.scopes.detach(scope, victim);
            }
        }
        !hit
    }
}
