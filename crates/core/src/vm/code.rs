//! Code space, instructions and the code builder.
//!
//! The loader assembles a program through [`CodeBuilder`], which owns every piece of
//! build-time state: labels and their forward references, the scope table, the foreign call
//! sites and the start list. [`CodeBuilder::finish`] resolves all labels and freezes the result
//! into an immutable [`Program`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::common::error::{BuildError, Fatal, fatal};
use crate::common::{ArrayId, CallSiteId, NetId, ScopeId};
use crate::net::Value;
use crate::vm::context::ScopeInfo;
use crate::vm::exec::object::ElemType;
use crate::vm::opcode::{Opcode, OperandKind};

/// A resolved instruction operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Unused slot.
    None,
    /// Immediate number.
    Number(u64),
    /// Small immediate.
    Bit(u32),
    /// Code address.
    Code(u32),
    /// Network node.
    Net(NetId),
    /// Word array.
    Array(ArrayId),
    /// Scope.
    Scope(ScopeId),
    /// Foreign call site.
    Call(CallSiteId),
    /// Literal string.
    Text(Box<str>),
}

/// An operand as written by the loader, before labels are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg<'a> {
    /// Immediate number (also used for small immediates).
    Number(u64),
    /// Code label, possibly defined later.
    Label(&'a str),
    /// Network node.
    Net(NetId),
    /// Word array.
    Array(ArrayId),
    /// Scope.
    Scope(ScopeId),
    /// Foreign call site.
    Call(CallSiteId),
    /// Literal string.
    Text(&'a str),
}

impl Arg<'_> {
    const fn kind_name(self) -> &'static str {
        match self {
            Self::Number(_) => "a number",
            Self::Label(_) => "a code label",
            Self::Net(_) => "a net",
            Self::Array(_) => "an array",
            Self::Scope(_) => "a scope",
            Self::Call(_) => "a call site",
            Self::Text(_) => "a string",
        }
    }
}

/// One instruction: an opcode and up to three operands.
#[derive(Clone, Debug)]
pub struct Instruction {
    opcode: Opcode,
    operands: [Operand; 3],
}

impl Instruction {
    /// The opcode.
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }

    /// Operand `idx`.
    pub fn operand(&self, idx: usize) -> &Operand {
        &self.operands[idx]
    }

    #[cold]
    fn wrong(&self, idx: usize, expected: &'static str) -> ! {
        fatal(Fatal::Operand { mnemonic: self.mnemonic(), index: idx, expected })
    }

    /// Immediate number in slot `idx`.
    pub fn number(&self, idx: usize) -> u64 {
        match self.operands[idx] {
            Operand::Number(n) => n,
            _ => self.wrong(idx, "number"),
        }
    }

    /// Small immediate in slot `idx`.
    pub fn bit(&self, idx: usize) -> u32 {
        match self.operands[idx] {
            Operand::Bit(b) => b,
            _ => self.wrong(idx, "small immediate"),
        }
    }

    /// Code address in slot `idx`.
    pub fn code(&self, idx: usize) -> u32 {
        match self.operands[idx] {
            Operand::Code(pc) => pc,
            _ => self.wrong(idx, "code address"),
        }
    }

    /// Net in slot `idx`.
    pub fn net(&self, idx: usize) -> NetId {
        match self.operands[idx] {
            Operand::Net(n) => n,
            _ => self.wrong(idx, "net"),
        }
    }

    /// Array in slot `idx`.
    pub fn array(&self, idx: usize) -> ArrayId {
        match self.operands[idx] {
            Operand::Array(a) => a,
            _ => self.wrong(idx, "array"),
        }
    }

    /// Scope in slot `idx`.
    pub fn scope(&self, idx: usize) -> ScopeId {
        match self.operands[idx] {
            Operand::Scope(s) => s,
            _ => self.wrong(idx, "scope"),
        }
    }

    /// Foreign call site in slot `idx`.
    pub fn call(&self, idx: usize) -> CallSiteId {
        match self.operands[idx] {
            Operand::Call(c) => c,
            _ => self.wrong(idx, "call site"),
        }
    }

    /// Literal string in slot `idx`.
    pub fn text(&self, idx: usize) -> &str {
        match &self.operands[idx] {
            Operand::Text(t) => t,
            _ => self.wrong(idx, "string"),
        }
    }
}

/// Number of stack arguments a foreign call consumes, per stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArgCounts {
    /// Vector arguments.
    pub vec4: usize,
    /// Real arguments.
    pub real: usize,
    /// String arguments.
    pub string: usize,
    /// Object handle arguments.
    pub object: usize,
}

/// Value a foreign function leaves on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Return {
    /// A task: nothing is pushed.
    None,
    /// A vector of this width.
    Vec4(u32),
    /// A real.
    Real,
    /// A string.
    Str,
    /// An object handle.
    Object,
}

/// A foreign call site: procedure name plus its stack layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// Registered procedure name, for example `$finish`.
    pub name: String,
    /// Stack arguments.
    pub args: ArgCounts,
    /// Return value.
    pub ret: Return,
}

/// An initial thread: where it starts and in which scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Start {
    /// First instruction.
    pub pc: u32,
    /// Scope of the thread.
    pub scope: ScopeId,
}

/// An immutable, fully linked program.
#[derive(Clone, Debug)]
pub struct Program {
    pub(crate) code: Arc<[Instruction]>,
    pub(crate) scopes: Vec<ScopeInfo>,
    pub(crate) sites: Vec<CallSite>,
    pub(crate) starts: Vec<Start>,
}

impl Program {
    /// The instructions.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// The scopes.
    pub fn scopes(&self) -> &[ScopeInfo] {
        &self.scopes
    }

    /// The foreign call sites.
    pub fn call_sites(&self) -> &[CallSite] {
        &self.sites
    }

    /// Threads created by [`crate::vm::Vm::start`].
    pub fn starts(&self) -> &[Start] {
        &self.starts
    }
}

struct Fixup {
    instr: usize,
    slot: usize,
    label: String,
}

/// Build-time context for one program.
#[derive(Default)]
pub struct CodeBuilder {
    code: Vec<Instruction>,
    labels: HashMap<String, u32>,
    fixups: Vec<Fixup>,
    scopes: Vec<ScopeInfo>,
    sites: Vec<CallSite>,
    starts: Vec<(String, ScopeId)>,
}

impl std::fmt::Debug for CodeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBuilder")
            .field("instructions", &self.code.len())
            .field("labels", &self.labels.len())
            .field("pending", &self.fixups.len())
            .finish_non_exhaustive()
    }
}

impl CodeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the next emitted instruction will get.
    pub fn pc(&self) -> u32 {
        self.code.len() as u32
    }

    /// Declares a scope.
    pub fn scope(&mut self, name: impl Into<String>, automatic: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeInfo { name: name.into(), automatic, items: Vec::new() });
        id
    }

    /// Adds an automatic item to `scope` and returns its context slot.
    ///
    /// The slot is what an [`crate::net::AutoVar`] node for this variable must carry.
    pub fn auto_item(&mut self, scope: ScopeId, init: Value) -> usize {
        let items = &mut self.scopes[scope.0 as usize].items;
        items.push(init);
        items.len() - 1
    }

    /// Declares a foreign call site.
    pub fn call_site(&mut self, name: impl Into<String>, args: ArgCounts, ret: Return) -> CallSiteId {
        let id = CallSiteId(self.sites.len() as u32);
        self.sites.push(CallSite { name: name.into(), args, ret });
        id
    }

    /// Defines `name` at the current address.
    ///
    /// # Errors
    ///
    /// [`BuildError::DuplicateLabel`] if the label already exists.
    pub fn label(&mut self, name: &str) -> Result<(), BuildError> {
        let pc = self.pc();
        if self.labels.insert(name.to_owned(), pc).is_some() {
            return Err(BuildError::DuplicateLabel(name.to_owned()));
        }
        Ok(())
    }

    /// Adds an initial thread starting at `label` in `scope`.
    pub fn start(&mut self, label: &str, scope: ScopeId) {
        self.starts.push((label.to_owned(), scope));
    }

    /// Appends one instruction.
    ///
    /// # Arguments
    ///
    /// * `mnemonic` - Opcode mnemonic, for example `%load/vec4`.
    /// * `args`     - Operands in table order.
    ///
    /// # Returns
    ///
    /// The address of the instruction.
    ///
    /// # Errors
    ///
    /// Unknown mnemonics, wrong operand counts and operands of the wrong kind.
    pub fn emit(&mut self, mnemonic: &str, args: &[Arg<'_>]) -> Result<u32, BuildError> {
        let opcode = Opcode::lookup(mnemonic).ok_or_else(|| BuildError::UnknownOpcode(mnemonic.to_owned()))?;
        let info = opcode.info();
        if args.len() != info.arity {
            return Err(BuildError::OperandCount { mnemonic: info.mnemonic, expected: info.arity, found: args.len() });
        }
        let pc = self.pc();
        let mut operands = [Operand::None, Operand::None, Operand::None];
        for (slot, (&arg, &kind)) in args.iter().zip(info.kinds.iter()).enumerate() {
            let mismatch = || BuildError::OperandKind {
                mnemonic: info.mnemonic,
                index: slot,
                expected: kind.name(),
                found: arg.kind_name(),
            };
            operands[slot] = match (kind, arg) {
                (OperandKind::Number, Arg::Number(n)) => Operand::Number(n),
                (OperandKind::Bit1 | OperandKind::Bit2, Arg::Number(n)) => {
                    Operand::Bit(u32::try_from(n).map_err(|_| mismatch())?)
                }
                (OperandKind::CodePtr | OperandKind::CodePtr2, Arg::Label(name)) => {
                    self.fixups.push(Fixup { instr: pc as usize, slot, label: name.to_owned() });
                    Operand::Code(0)
                }
                (OperandKind::FuncPtr | OperandKind::FuncPtr2, Arg::Net(n)) => Operand::Net(n),
                (OperandKind::ArrPtr, Arg::Array(a)) => Operand::Array(a),
                (OperandKind::VpiPtr, Arg::Scope(s)) => Operand::Scope(s),
                (OperandKind::VpiPtr, Arg::Call(c)) => Operand::Call(c),
                (OperandKind::String, Arg::Text(t)) => Operand::Text(t.into()),
                _ => {
                    self.fixups.retain(|f| f.instr != pc as usize);
                    return Err(mismatch());
                }
            };
        }
        if info.mnemonic == "%new/darray" {
            let _ = ElemType::parse(match &operands[1] {
                Operand::Text(t) => t,
                _ => "",
            })?;
        }
        self.code.push(Instruction { opcode, operands });
        Ok(pc)
    }

    /// Resolves every label and freezes the program.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnresolvedLabel`] for a label that was referenced (by an instruction or
    /// the start list) but never defined.
    pub fn finish(mut self) -> Result<Program, BuildError> {
        for fix in &self.fixups {
            let pc = *self.labels.get(&fix.label).ok_or_else(|| BuildError::UnresolvedLabel(fix.label.clone()))?;
            self.code[fix.instr].operands[fix.slot] = Operand::Code(pc);
        }
        let starts = self
            .starts
            .iter()
            .map(|(label, scope)| {
                self.labels
                    .get(label)
                    .map(|&pc| Start { pc, scope: *scope })
                    .ok_or_else(|| BuildError::UnresolvedLabel(label.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program { code: self.code.into(), scopes: self.scopes, sites: self.sites, starts })
    }
}
