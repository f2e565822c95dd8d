//! Object stack handlers and dynamic arrays.
//!
//! Object variables hold an [`ObjectRef`]; copies share the referenced object. Element access
//! through an undefined, negative or out-of-range index never traps: reads yield `X` and writes
//! are dropped with a warning.

use tracing::warn;

use super::Exec;
use crate::common::NetId;
use crate::common::error::{BuildError, Fatal, fatal};
use crate::logic::{Bit4, Vec4};
use crate::net::{Object, ObjectRef, Value};
use crate::vm::code::Instruction;
use crate::vm::thread::FLAG_EQ;

/// Element type of a dynamic array created by `%new/darray`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElemType {
    /// Vector words; two-state words start at `0`, four-state words at `X`.
    Vec4 {
        /// Word width.
        width: u32,
        /// True for `v`/`sv` (four-state) element types.
        four_state: bool,
    },
    /// `r`: reals.
    Real,
    /// `S`: strings.
    Str,
}

impl ElemType {
    /// Parses a type code: `b<N>`, `sb<N>`, `v<N>`, `sv<N>`, `r` or `S`.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidType`] for anything else, including a zero width.
    pub fn parse(code: &str) -> Result<Self, BuildError> {
        let invalid = || BuildError::InvalidType(code.to_owned());
        match code {
            "r" => return Ok(Self::Real),
            "S" => return Ok(Self::Str),
            _ => {}
        }
        let unsigned = code.strip_prefix('s').unwrap_or(code);
        let (four_state, digits) = match unsigned.split_at_checked(1) {
            Some(("b", rest)) => (false, rest),
            Some(("v", rest)) => (true, rest),
            _ => return Err(invalid()),
        };
        let width = digits.parse::<u32>().map_err(|_| invalid())?;
        if width == 0 {
            return Err(invalid());
        }
        Ok(Self::Vec4 { width, four_state })
    }

    fn allocate(self, len: usize) -> Object {
        match self {
            Self::Vec4 { width, four_state } => {
                let fill = if four_state { Bit4::X } else { Bit4::Zero };
                Object::DArrayVec4 { width, words: vec![Vec4::new(width, fill); len] }
            }
            Self::Real => Object::DArrayReal(vec![0.0; len]),
            Self::Str => Object::DArrayStr(vec![String::new(); len]),
        }
    }
}

fn read_object(ex: &mut Exec<'_>, net: NetId) -> ObjectRef {
    match ex.read_var(net) {
        Value::Object(obj) => obj,
        _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "object signal" }),
    }
}

/// `%new/darray size, type`: pushes a new dynamic array sized by an index register.
pub fn new_darray(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let size = ex.index(inst.bit(0));
    let elem = ElemType::parse(inst.text(1)).unwrap_or_else(|_| {
        fatal(Fatal::Operand { mnemonic: "%new/darray", index: 1, expected: "an element type" })
    });
    let len = if ex.undefined() || size < 0 {
        warn!(target: "vsim::vm", thread = %ex.id, size, "dynamic array with invalid size is empty");
        0
    } else {
        size as usize
    };
    ex.thr().object.push(ObjectRef::new(elem.allocate(len)));
    true
}

/// `%null`
pub fn null(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.thr().object.push(ObjectRef::null());
    true
}

/// `%load/obj net`
pub fn load_obj(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let obj = read_object(ex, inst.net(0));
    ex.thr().object.push(obj);
    true
}

/// `%store/obj net`
pub fn store_obj(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let obj = ex.thr().object.pop();
    ex.write_var(inst.net(0), Value::Object(obj));
    true
}

/// `%pop/obj n`
pub fn pop_obj(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().object.pop_n(inst.number(0) as usize);
    true
}

/// `%dup/obj`
pub fn dup_obj(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().object;
    let top = stack.peek(0).clone();
    stack.push(top);
    true
}

/// `%test_nul net`: sets flag 4 if the object variable is null.
pub fn test_nul(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let obj = read_object(ex, inst.net(0));
    ex.thr().set_flag(FLAG_EQ, Bit4::from_bool(obj.is_null()));
    true
}

fn element_index(ex: &mut Exec<'_>, reg: u32) -> Option<usize> {
    let idx = ex.index(reg);
    if ex.undefined() {
        return None;
    }
    usize::try_from(idx).ok()
}

/// `%load/dar/vec4 net, idx`: pushes one word of a vector dynamic array.
pub fn load_dar_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let net = inst.net(0);
    let obj = read_object(ex, net);
    let idx = element_index(ex, inst.bit(1));
    let value = match obj.get().map(|cell| cell.borrow().clone()) {
        Some(Object::DArrayVec4 { width, words }) => idx.and_then(|i| words.get(i).cloned()).unwrap_or_else(|| Vec4::xs(width)),
        Some(_) => fatal(Fatal::WrongFunctor { net: net.0, expected: "vector dynamic array" }),
        None => {
            warn!(target: "vsim::vm", thread = %ex.id, net = %net, "read from null dynamic array");
            Vec4::xs(1)
        }
    };
    ex.thr().vec4.push(value);
    true
}

/// `%store/dar/vec4 net, idx`: pops a vector into one word of a dynamic array.
pub fn store_dar_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let net = inst.net(0);
    let value = ex.thr().vec4.pop();
    let obj = read_object(ex, net);
    let idx = element_index(ex, inst.bit(1));
    let Some(cell) = obj.get() else {
        warn!(target: "vsim::vm", thread = %ex.id, net = %net, "write to null dynamic array dropped");
        return true;
    };
    match &mut *cell.borrow_mut() {
        Object::DArrayVec4 { width, words } => match idx.and_then(|i| words.get_mut(i)) {
            Some(word) => *word = value.resize(*width, Bit4::Zero),
            None => warn!(target: "vsim::vm", thread = %ex.id, net = %net, "dynamic array write out of range dropped"),
        },
        _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "vector dynamic array" }),
    }
    true
}
