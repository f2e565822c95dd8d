//! Arena handles.
//!
//! Nets, threads, scopes, contexts, arrays and foreign call sites are stored in arenas and
//! referred to by small copyable indices instead of pointers. Thread handles also carry a
//! generation so that a wake-up queued for a thread that has since been reaped is recognised
//! as stale instead of waking whichever thread reused the slot.

use std::fmt;

use serde::Serialize;

/// Index of a node in the [`crate::net::Network`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NetId(pub u32);

impl NetId {
    /// Returns the arena slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a reference to input `port` of this net.
    #[inline]
    pub const fn port(self, port: u8) -> PortRef {
        PortRef { net: self, port }
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// One input port of one net: the unit of fan-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PortRef {
    /// Receiving net.
    pub net: NetId,
    /// Input port on the receiving net (0..=3).
    pub port: u8,
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.net, self.port)
    }
}

/// Generational handle of a thread in the [`crate::vm::ThreadArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ThreadId {
    /// Arena slot.
    pub index: u32,
    /// Generation of the slot when the handle was issued.
    pub generation: u32,
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}#{}", self.index, self.generation)
    }
}

/// Index of a scope in the [`crate::vm::ScopeTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

/// Index of an automatic-scope context in the [`crate::vm::ScopeTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ContextId(pub u32);

/// Index of a word array in the [`crate::net::Network`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ArrayId(pub u32);

/// Index of a foreign call site in the [`crate::vm::ForeignTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CallSiteId(pub u32);
