//! String stack handlers.

use super::Exec;
use crate::common::NetId;
use crate::common::error::{Fatal, fatal};
use crate::logic::Bit4;
use crate::net::Value;
use crate::vm::code::Instruction;
use crate::vm::thread::{FLAG_EQ, FLAG_LT};

fn read_str(ex: &mut Exec<'_>, net: NetId) -> String {
    match ex.read_var(net) {
        Value::Str(s) => s,
        _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "string signal" }),
    }
}

/// `%pushi/str text`
pub fn pushi_str(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let text = inst.text(0).to_owned();
    ex.thr().string.push(text);
    true
}

/// `%concati/str text`: appends literal text to the top string.
pub fn concati_str(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().string.peek_mut(0).push_str(inst.text(0));
    true
}

/// `%concat/str`
pub fn concat_str(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().string;
    let tail = stack.pop();
    stack.peek_mut(0).push_str(&tail);
    true
}

/// `%load/str net`
pub fn load_str(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = read_str(ex, inst.net(0));
    ex.thr().string.push(value);
    true
}

/// `%store/str net`
pub fn store_str(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = ex.thr().string.pop();
    ex.write_var(inst.net(0), Value::Str(value));
    true
}

/// `%load/stra arr, idx`: an undefined or negative address reads the empty string.
pub fn load_stra(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let adr = ex.index(inst.bit(1));
    let value = if ex.undefined() || adr < 0 { String::new() } else { ex.net.array(inst.array(0)).get_str(adr as u64) };
    ex.thr().string.push(value);
    true
}

/// `%store/stra arr, idx`
pub fn store_stra(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = ex.thr().string.pop();
    let adr = ex.index(inst.bit(1));
    if !ex.undefined() && adr >= 0 {
        let _ = ex.net.array_mut(inst.array(0)).set_str(adr as u64, value);
    }
    true
}

/// `%pop/str n`
pub fn pop_str(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().string.pop_n(inst.number(0) as usize);
    true
}

/// `%cmp/str`: sets flag 4 to `l == r` and flag 5 to `l < r`, comparing bytes.
pub fn cmp_str(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let thr = ex.thr();
    let r = thr.string.pop();
    let l = thr.string.pop();
    thr.set_flag(FLAG_EQ, Bit4::from_bool(l == r));
    thr.set_flag(FLAG_LT, Bit4::from_bool(l < r));
    true
}

/// `%substr first, last`: replaces the top with bytes `first..=last` (index registers).
///
/// A range that is reversed or leaves the string yields the empty string.
pub fn substr(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let first = ex.index(inst.bit(0));
    let last = ex.index(inst.bit(1));
    let top = ex.thr().string.peek_mut(0);
    let len = top.len() as i64;
    *top = if first < 0 || last < first || last >= len {
        String::new()
    } else {
        String::from_utf8_lossy(&top.as_bytes()[first as usize..=last as usize]).into_owned()
    };
    true
}
