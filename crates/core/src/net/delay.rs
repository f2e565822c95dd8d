//! Delay functor.
//!
//! A [`DelayFun`] re-emits its input after a transition-dependent delay. Pending outputs sit in
//! a local queue ordered by due time, and a [`GenericEvent::FunctorTimer`] wakes the node when
//! the head falls due. Delivery is inertial: a new input cancels every pending output due at or
//! after the new output's time.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::functor::{Output, Receive};
use super::value::Value;
use crate::common::SimTime;
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4, Vec8};
use crate::sched::GenericEvent;

/// Rise, fall and decay (to-`Z`) delays in ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelaySpec {
    /// Delay of a transition to `1`.
    pub rise: u64,
    /// Delay of a transition to `0`.
    pub fall: u64,
    /// Delay of a transition to `Z`.
    pub decay: u64,
}

impl DelaySpec {
    /// The same delay for every transition.
    pub const fn uniform(delay: u64) -> Self {
        Self { rise: delay, fall: delay, decay: delay }
    }

    /// Smallest of the three delays.
    pub fn min(self) -> u64 {
        self.rise.min(self.fall).min(self.decay)
    }

    /// Delay of one bit changing from `from` to `to`; a transition to `X` takes the minimum.
    pub fn transition(self, from: Bit4, to: Bit4) -> Option<u64> {
        if from == to {
            return None;
        }
        Some(match to {
            Bit4::One => self.rise,
            Bit4::Zero => self.fall,
            Bit4::Z => self.decay,
            Bit4::X => self.min(),
        })
    }

    /// Delay of a vector change: the largest delay over the bits that change.
    pub fn vector(self, from: &Vec4, to: &Vec4) -> Option<u64> {
        (0..to.width()).filter_map(|i| self.transition(from.bit(i), to.bit(i))).max()
    }
}

/// A delayed, inertial buffer.
#[derive(Clone, Debug)]
pub struct DelayFun {
    delay: DelaySpec,
    current: Option<Value>,
    pending: VecDeque<(SimTime, Value)>,
}

impl DelayFun {
    /// Creates a delay node.
    pub const fn new(delay: DelaySpec) -> Self {
        Self { delay, current: None, pending: VecDeque::new() }
    }

    /// The configured delays.
    pub const fn spec(&self) -> DelaySpec {
        self.delay
    }

    /// Number of outputs waiting to be emitted.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn delay_for(&self, value: &Value) -> Option<u64> {
        match (self.current.as_ref(), value) {
            (None, Value::Real(_)) => Some(self.delay.rise),
            (None, v) => v.to_vec4().map(|bits| self.delay.vector(&Vec4::xs(bits.width()), &bits).unwrap_or(0)),
            (Some(Value::Real(old)), Value::Real(new)) => (old.to_bits() != new.to_bits()).then_some(self.delay.rise),
            (Some(old), new) => {
                let (Some(old), Some(new)) = (old.to_vec4(), new.to_vec4()) else {
                    fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: new.kind() });
                };
                if old.width() != new.width() {
                    return Some(self.delay.min());
                }
                self.delay.vector(&old, &new)
            }
        }
    }

    fn accept(&mut self, port: u32, value: Value, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        let Some(delay) = self.delay_for(&value) else {
            // Strength-only changes still reach the output at the current time.
            if self.current.as_ref().is_some_and(|cur| !cur.eeq(&value)) && self.pending.is_empty() {
                self.current = Some(value.clone());
                out.send(&value);
            }
            return;
        };
        let due = out.now() + delay;
        while self.pending.back().is_some_and(|(t, _)| *t >= due) {
            let _ = self.pending.pop_back();
        }
        self.current = Some(value.clone());
        if delay == 0 && self.pending.is_empty() {
            out.send(&value);
            return;
        }
        self.pending.push_back((due, value));
        let net = out.net();
        out.scheduler().schedule_generic_event(GenericEvent::FunctorTimer(net), delay);
    }

    /// Removes and returns every pending output due at or before `now`.
    pub(crate) fn take_due(&mut self, now: SimTime) -> Vec<Value> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|(t, _)| *t <= now) {
            if let Some((_, v)) = self.pending.pop_front() {
                due.push(v);
            }
        }
        due
    }
}

impl Receive for DelayFun {
    const NAME: &'static str = "delay";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        self.accept(port, Value::Vec4(bits.clone()), out);
    }

    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.accept(port, Value::Vec8(bits.clone()), out);
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        self.accept(port, Value::Real(value), out);
    }
}
