//! Force filters.
//!
//! A [`Filter`] sits on the output of a net and overrides some or all of its bits while a force
//! is active. Values leaving the net pass through [`Filter::apply`], which either lets them
//! through, drops them (every bit forced) or substitutes the forced bits.

use super::value::Value;
use crate::logic::{Bit4, Scalar, Vec4, Vec8};
use crate::sched::PartSelect;

/// Outcome of filtering one outgoing value.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterResult {
    /// Propagate the value unchanged.
    Prop,
    /// Drop the value: every bit is forced.
    Stop,
    /// Propagate this replacement instead.
    Repl(Value),
}

/// Per-bit force state of one net.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    force: Option<Value>,
    mask: Vec<bool>,
}

impl Filter {
    /// True while any bit is forced.
    pub fn is_forced(&self) -> bool {
        self.mask.iter().any(|&m| m)
    }

    /// True while every bit is forced.
    pub fn is_fully_forced(&self) -> bool {
        !self.mask.is_empty() && self.mask.iter().all(|&m| m)
    }

    /// The forced value, if a force was ever applied.
    pub const fn force_value(&self) -> Option<&Value> {
        self.force.as_ref()
    }

    /// Forces `value` onto the net, optionally onto a part of it.
    pub fn force(&mut self, value: &Value, part: Option<PartSelect>) {
        match value {
            Value::Vec4(v) => {
                let (base, vwid) = part.map_or((0, v.width()), |p| (p.base, p.vwid));
                let mut stored = match self.force.take() {
                    Some(Value::Vec4(old)) if old.width() == vwid => old,
                    _ => Vec4::xs(vwid),
                };
                let _ = stored.set_vec(base, v);
                self.force = Some(Value::Vec4(stored));
                self.mark(base, v.width(), vwid);
            }
            Value::Vec8(v) => {
                let (base, vwid) = part.map_or((0, v.width()), |p| (p.base, p.vwid));
                let mut stored = match self.force.take() {
                    Some(Value::Vec8(old)) if old.width() == vwid => old,
                    _ => Vec8::hiz(vwid),
                };
                stored.set_vec(base, v);
                self.force = Some(Value::Vec8(stored));
                self.mark(base, v.width(), vwid);
            }
            other => {
                self.force = Some(other.clone());
                self.mask = vec![true];
            }
        }
    }

    fn mark(&mut self, base: u32, wid: u32, vwid: u32) {
        self.mask.resize(vwid as usize, false);
        let end = base.saturating_add(wid).min(vwid);
        for m in &mut self.mask[base.min(end) as usize..end as usize] {
            *m = true;
        }
    }

    /// Releases bits `[base, base + wid)`. Returns `true` when no bit remains forced.
    pub fn release(&mut self, base: u32, wid: u32) -> bool {
        if self.mask.len() == 1 && !matches!(self.force, Some(Value::Vec4(_) | Value::Vec8(_))) {
            self.mask[0] = false;
        } else {
            let end = (base.saturating_add(wid) as usize).min(self.mask.len());
            for m in &mut self.mask[(base as usize).min(end)..end] {
                *m = false;
            }
        }
        if self.is_forced() {
            false
        } else {
            self.force = None;
            self.mask.clear();
            true
        }
    }

    /// The value a reader sees: `under` with forced bits replaced.
    pub fn filtered(&self, under: &Value) -> Value {
        let Some(force) = self.force.as_ref().filter(|_| self.is_forced()) else {
            return under.clone();
        };
        match (under, force) {
            (Value::Vec4(u), Value::Vec4(f)) => Value::Vec4(self.merge_vec4(u, f, 0)),
            (Value::Vec4(u), Value::Vec8(f)) => Value::Vec4(self.merge_vec4(u, &f.to_vec4(), 0)),
            (Value::Vec8(u), Value::Vec8(f)) => Value::Vec8(self.merge_vec8(u, f)),
            (Value::Vec8(u), Value::Vec4(f)) => {
                let strong = Vec8::from_scalars(f.iter().map(Scalar::strong).collect());
                Value::Vec8(self.merge_vec8(u, &strong))
            }
            _ => force.clone(),
        }
    }

    fn merge_vec4(&self, under: &Vec4, force: &Vec4, base: u32) -> Vec4 {
        let mut out = under.clone();
        for i in 0..under.width() {
            if self.mask.get((base + i) as usize).copied().unwrap_or(false) {
                out.set_bit(i, force.bit(base + i));
            }
        }
        out
    }

    fn merge_vec8(&self, under: &Vec8, force: &Vec8) -> Vec8 {
        let mut out = under.clone();
        for i in 0..under.width() {
            if self.mask.get(i as usize).copied().unwrap_or(false) {
                out.set_value(i, force.value(i));
            }
        }
        out
    }

    /// Filters a full outgoing value.
    pub fn apply(&self, value: &Value) -> FilterResult {
        if !self.is_forced() {
            FilterResult::Prop
        } else if self.is_fully_forced() {
            FilterResult::Stop
        } else {
            FilterResult::Repl(self.filtered(value))
        }
    }

    /// Filters an outgoing part-select of `bits.width()` bits at `part.base`.
    pub fn apply_part(&self, bits: &Vec4, part: PartSelect) -> FilterResult {
        let range = part.base as usize..(part.base + bits.width()) as usize;
        let forced = self.mask.get(range.clone()).map_or(0, |m| m.iter().filter(|&&b| b).count());
        if forced == 0 {
            return FilterResult::Prop;
        }
        if forced == range.len() {
            return FilterResult::Stop;
        }
        let force = match &self.force {
            Some(Value::Vec4(f)) => f.clone(),
            Some(Value::Vec8(f)) => f.to_vec4(),
            _ => Vec4::new(part.vwid, Bit4::X),
        };
        FilterResult::Repl(Value::Vec4(self.merge_vec4(bits, &force, part.base)))
    }
}
