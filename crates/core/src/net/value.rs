//! Values carried along network edges and held on VM stacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::logic::{Bit4, Vec4, Vec8};

/// Heap objects reachable from object-typed signals and the object stack.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    /// Dynamic array of 4-state words.
    DArrayVec4 {
        /// Word width.
        width: u32,
        /// Elements.
        words: Vec<Vec4>,
    },
    /// Dynamic array of reals.
    DArrayReal(Vec<f64>),
    /// Dynamic array of strings.
    DArrayStr(Vec<String>),
}

impl Object {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::DArrayVec4 { words, .. } => words.len(),
            Self::DArrayReal(w) => w.len(),
            Self::DArrayStr(w) => w.len(),
        }
    }

    /// True if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared, nullable reference to an [`Object`].
///
/// Equality is identity: two references are equal when both are null or both point at the
/// same allocation.
#[derive(Clone, Default)]
pub struct ObjectRef(Option<Rc<RefCell<Object>>>);

impl ObjectRef {
    /// The null reference.
    pub const fn null() -> Self {
        Self(None)
    }

    /// Allocates a new object.
    pub fn new(obj: Object) -> Self {
        Self(Some(Rc::new(RefCell::new(obj))))
    }

    /// True for the null reference.
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the referenced object.
    pub fn get(&self) -> Option<&RefCell<Object>> {
        self.0.as_deref()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("null"),
            Some(obj) => write!(f, "{:?}", obj.borrow()),
        }
    }
}

/// A value of any kind a net can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 4-state vector.
    Vec4(Vec4),
    /// Strength-valued vector.
    Vec8(Vec8),
    /// Real number.
    Real(f64),
    /// String.
    Str(String),
    /// Object reference.
    Object(ObjectRef),
}

impl Value {
    /// Short name of the value kind, used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Vec4(_) => "vec4",
            Self::Vec8(_) => "vec8",
            Self::Real(_) => "real",
            Self::Str(_) => "string",
            Self::Object(_) => "object",
        }
    }

    /// The value as a 4-state vector, stripping strengths; `None` for other kinds.
    pub fn to_vec4(&self) -> Option<Vec4> {
        match self {
            Self::Vec4(v) => Some(v.clone()),
            Self::Vec8(v) => Some(v.to_vec4()),
            _ => None,
        }
    }

    /// Least significant bit of a vector value (`X` for non-vectors).
    pub fn lsb(&self) -> Bit4 {
        match self {
            Self::Vec4(v) => v.bit(0),
            Self::Vec8(v) => v.value(0).value(),
            _ => Bit4::X,
        }
    }

    /// Case equality across kinds; values of different kinds are never equal.
    pub fn eeq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Vec8> for Value {
    fn from(v: Vec8) -> Self {
        Self::Vec8(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}
