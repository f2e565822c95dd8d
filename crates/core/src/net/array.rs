//! Word arrays (memories) addressed by the VM.
//!
//! Reads past the end yield the element type's default (`X` for vectors, `0.0`, `""`);
//! writes past the end are dropped.

use crate::logic::Vec4;

/// Storage of one array.
#[derive(Clone, Debug, PartialEq)]
pub enum VArray {
    /// 4-state words of a fixed width.
    Vec4 {
        /// Word width.
        width: u32,
        /// Words, index 0 first.
        words: Vec<Vec4>,
    },
    /// Real words.
    Real(Vec<f64>),
    /// String words.
    Str(Vec<String>),
}

impl VArray {
    /// `len` vector words of `width` bits, initially `X`.
    pub fn vec4(width: u32, len: usize) -> Self {
        Self::Vec4 { width, words: vec![Vec4::xs(width); len] }
    }

    /// `len` real words, initially `0.0`.
    pub fn real(len: usize) -> Self {
        Self::Real(vec![0.0; len])
    }

    /// `len` string words, initially empty.
    pub fn string(len: usize) -> Self {
        Self::Str(vec![String::new(); len])
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        match self {
            Self::Vec4 { words, .. } => words.len(),
            Self::Real(words) => words.len(),
            Self::Str(words) => words.len(),
        }
    }

    /// True if the array has no words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Word width of a vector array, zero otherwise.
    pub const fn width(&self) -> u32 {
        match self {
            Self::Vec4 { width, .. } => *width,
            _ => 0,
        }
    }

    /// Reads vector word `index`.
    pub fn get_vec4(&self, index: u64) -> Vec4 {
        match self {
            Self::Vec4 { width, words } => {
                usize::try_from(index).ok().and_then(|i| words.get(i)).cloned().unwrap_or_else(|| Vec4::xs(*width))
            }
            _ => Vec4::default(),
        }
    }

    /// Writes `value` into vector word `index` at bit offset `off`.
    ///
    /// Returns `false` when the index is out of range.
    pub fn set_vec4(&mut self, index: u64, off: u32, value: &Vec4) -> bool {
        let Self::Vec4 { words, .. } = self else { return false };
        match usize::try_from(index).ok().and_then(|i| words.get_mut(i)) {
            Some(word) => {
                if off == 0 && value.width() == word.width() {
                    *word = value.clone();
                } else {
                    let _ = word.set_vec(off, value);
                }
                true
            }
            None => false,
        }
    }

    /// Reads real word `index`.
    pub fn get_real(&self, index: u64) -> f64 {
        match self {
            Self::Real(words) => usize::try_from(index).ok().and_then(|i| words.get(i)).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Writes real word `index`.
    pub fn set_real(&mut self, index: u64, value: f64) -> bool {
        let Self::Real(words) = self else { return false };
        usize::try_from(index).ok().and_then(|i| words.get_mut(i)).map(|w| *w = value).is_some()
    }

    /// Reads string word `index`.
    pub fn get_str(&self, index: u64) -> String {
        match self {
            Self::Str(words) => usize::try_from(index).ok().and_then(|i| words.get(i)).cloned().unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Writes string word `index`.
    pub fn set_str(&mut self, index: u64, value: String) -> bool {
        let Self::Str(words) = self else { return false };
        usize::try_from(index).ok().and_then(|i| words.get_mut(i)).map(|w| *w = value).is_some()
    }
}
