//! The opcode table.
//!
//! Every instruction the VM understands is listed here, sorted by mnemonic so that the loader
//! can resolve mnemonics with a binary search. Each entry carries:
//! 1. **Handler:** The function executed for the instruction. It returns `false` to end the
//!    current quantum of the thread (blocking instructions, `%end`, jumps that yield).
//! 2. **Arity:** How many operands the instruction takes.
//! 3. **Operand kinds:** What each operand slot holds. [`crate::vm::CodeBuilder`] checks every
//!    emitted instruction against this list, so handlers can read operands without checks.
//!
//! The table is the instruction-set contract between the loader and the VM.

use std::fmt;

use crate::vm::exec::{Handler, arith, assign, call, control, flags, object, real, string, vector};

/// What an operand slot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    /// Unused slot.
    None,
    /// Immediate number.
    Number,
    /// Word array.
    ArrPtr,
    /// First small immediate (flag, register, bit pattern).
    Bit1,
    /// Second small immediate.
    Bit2,
    /// Code address.
    CodePtr,
    /// Code address of a forked child.
    CodePtr2,
    /// Network node.
    FuncPtr,
    /// Second network node.
    FuncPtr2,
    /// Scope or foreign call site.
    VpiPtr,
    /// Literal string.
    String,
}

impl OperandKind {
    /// Human-readable name used in build errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "no operand",
            Self::Number => "a number",
            Self::ArrPtr => "an array",
            Self::Bit1 | Self::Bit2 => "a small immediate",
            Self::CodePtr | Self::CodePtr2 => "a code label",
            Self::FuncPtr | Self::FuncPtr2 => "a net",
            Self::VpiPtr => "a scope or call site",
            Self::String => "a string",
        }
    }
}

/// One row of the opcode table.
pub struct OpcodeInfo {
    /// Assembly mnemonic, for example `%load/vec4`.
    pub mnemonic: &'static str,
    /// Execution function.
    pub handler: Handler,
    /// Number of operands.
    pub arity: usize,
    /// Kind of each operand slot; slots past `arity` are [`OperandKind::None`].
    pub kinds: [OperandKind; 3],
}

impl fmt::Debug for OpcodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeInfo")
            .field("mnemonic", &self.mnemonic)
            .field("arity", &self.arity)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Index of a row in the opcode table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(u16);

impl Opcode {
    /// Finds the opcode for `mnemonic`.
    pub fn lookup(mnemonic: &str) -> Option<Self> {
        OPCODES.binary_search_by(|row| row.mnemonic.cmp(mnemonic)).ok().map(|i| Self(i as u16))
    }

    /// The table row.
    #[inline]
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODES[self.0 as usize]
    }

    /// The mnemonic.
    #[inline]
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Every row of the table, in mnemonic order.
pub fn table() -> &'static [OpcodeInfo] {
    OPCODES
}

macro_rules! op {
    ($mnemonic:literal, $handler:path, $arity:literal, [$k0:ident, $k1:ident, $k2:ident]) => {
        OpcodeInfo {
            mnemonic: $mnemonic,
            handler: $handler,
            arity: $arity,
            kinds: [OperandKind::$k0, OperandKind::$k1, OperandKind::$k2],
        }
    };
}

static OPCODES: &[OpcodeInfo] = &[
    op!("%abs/wr",            real::abs_wr,             0, [None, None, None]),
    op!("%add",               arith::add,               0, [None, None, None]),
    op!("%add/wr",            real::add_wr,             0, [None, None, None]),
    op!("%addi",              arith::addi,              3, [Bit1, Bit2, Number]),
    op!("%alloc",             control::alloc,           1, [VpiPtr, None, None]),
    op!("%and",               arith::and,               0, [None, None, None]),
    op!("%and/r",             arith::and_r,             0, [None, None, None]),
    op!("%assign/vec4",       assign::assign_vec4,      2, [FuncPtr, Bit1, None]),
    op!("%assign/vec4/d",     assign::assign_vec4_d,    2, [FuncPtr, Bit1, None]),
    op!("%assign/vec4/off/d", assign::assign_vec4_off_d, 3, [FuncPtr, Bit1, Bit2]),
    op!("%blend",             vector::blend,            0, [None, None, None]),
    op!("%cassign/link",      assign::cassign_link,     2, [FuncPtr, FuncPtr2, None]),
    op!("%cassign/vec4",      assign::cassign_vec4,     1, [FuncPtr, None, None]),
    op!("%cmp/e",             arith::cmp_e,             0, [None, None, None]),
    op!("%cmp/ne",            arith::cmp_ne,            0, [None, None, None]),
    op!("%cmp/s",             arith::cmp_s,             0, [None, None, None]),
    op!("%cmp/str",           string::cmp_str,          0, [None, None, None]),
    op!("%cmp/u",             arith::cmp_u,             0, [None, None, None]),
    op!("%cmp/we",            arith::cmp_we,            0, [None, None, None]),
    op!("%cmp/wne",           arith::cmp_wne,           0, [None, None, None]),
    op!("%cmp/wr",            real::cmp_wr,             0, [None, None, None]),
    op!("%cmp/x",             arith::cmp_x,             0, [None, None, None]),
    op!("%cmp/z",             arith::cmp_z,             0, [None, None, None]),
    op!("%cmpi/e",            arith::cmpi_e,            3, [Bit1, Bit2, Number]),
    op!("%cmpi/ne",           arith::cmpi_ne,           3, [Bit1, Bit2, Number]),
    op!("%cmpi/s",            arith::cmpi_s,            3, [Bit1, Bit2, Number]),
    op!("%cmpi/u",            arith::cmpi_u,            3, [Bit1, Bit2, Number]),
    op!("%concat/str",        string::concat_str,       0, [None, None, None]),
    op!("%concat/vec4",       vector::concat_vec4,      0, [None, None, None]),
    op!("%concati/str",       string::concati_str,      1, [String, None, None]),
    op!("%concati/vec4",      vector::concati_vec4,     3, [Bit1, Bit2, Number]),
    op!("%cvt/rv",            real::cvt_rv,             0, [None, None, None]),
    op!("%cvt/rv/s",          real::cvt_rv_s,           0, [None, None, None]),
    op!("%cvt/sr",            real::cvt_sr,             1, [Bit1, None, None]),
    op!("%cvt/ur",            real::cvt_ur,             1, [Bit1, None, None]),
    op!("%cvt/vr",            real::cvt_vr,             1, [Number, None, None]),
    op!("%deassign",          assign::deassign,         3, [FuncPtr, Bit1, Bit2]),
    op!("%delay",             control::delay,           2, [Number, Number, None]),
    op!("%delayx",            control::delayx,          1, [Bit1, None, None]),
    op!("%disable",           control::disable,         1, [VpiPtr, None, None]),
    op!("%disable/fork",      control::disable_fork,    0, [None, None, None]),
    op!("%div",               arith::div,               0, [None, None, None]),
    op!("%div/s",             arith::div_s,             0, [None, None, None]),
    op!("%div/wr",            real::div_wr,             0, [None, None, None]),
    op!("%dup/obj",           object::dup_obj,          0, [None, None, None]),
    op!("%dup/real",          real::dup_real,           0, [None, None, None]),
    op!("%dup/vec4",          vector::dup_vec4,         0, [None, None, None]),
    op!("%end",               control::end,             0, [None, None, None]),
    op!("%event",             control::event,           1, [FuncPtr, None, None]),
    op!("%flag_and",          flags::flag_and,          2, [Bit1, Bit2, None]),
    op!("%flag_get/vec4",     flags::flag_get_vec4,     1, [Bit1, None, None]),
    op!("%flag_inv",          flags::flag_inv,          1, [Bit1, None, None]),
    op!("%flag_mov",          flags::flag_mov,          2, [Bit1, Bit2, None]),
    op!("%flag_or",           flags::flag_or,           2, [Bit1, Bit2, None]),
    op!("%flag_set/imm",      flags::flag_set_imm,      2, [Bit1, Bit2, None]),
    op!("%flag_set/vec4",     flags::flag_set_vec4,     1, [Bit1, None, None]),
    op!("%force/link",        assign::force_link,       2, [FuncPtr, FuncPtr2, None]),
    op!("%force/vec4",        assign::force_vec4,       1, [FuncPtr, None, None]),
    op!("%fork",              control::fork,            2, [CodePtr2, VpiPtr, None]),
    op!("%free",              control::free,            1, [VpiPtr, None, None]),
    op!("%inv",               arith::inv,               0, [None, None, None]),
    op!("%ix/add",            flags::ix_add,            3, [Bit1, Number, Bit2]),
    op!("%ix/getv",           flags::ix_getv,           2, [Bit1, FuncPtr, None]),
    op!("%ix/getv/s",         flags::ix_getv_s,         2, [Bit1, FuncPtr, None]),
    op!("%ix/load",           flags::ix_load,           3, [Bit1, Number, Bit2]),
    op!("%ix/mov",            flags::ix_mov,            2, [Bit1, Bit2, None]),
    op!("%ix/mul",            flags::ix_mul,            3, [Bit1, Number, Bit2]),
    op!("%ix/sub",            flags::ix_sub,            3, [Bit1, Number, Bit2]),
    op!("%ix/vec4",           flags::ix_vec4,           1, [Bit1, None, None]),
    op!("%ix/vec4/s",         flags::ix_vec4_s,         1, [Bit1, None, None]),
    op!("%jmp",               control::jmp,             1, [CodePtr, None, None]),
    op!("%jmp/0",             control::jmp_0,           2, [CodePtr, Bit1, None]),
    op!("%jmp/0xz",           control::jmp_0xz,         2, [CodePtr, Bit1, None]),
    op!("%jmp/1",             control::jmp_1,           2, [CodePtr, Bit1, None]),
    op!("%jmp/1xz",           control::jmp_1xz,         2, [CodePtr, Bit1, None]),
    op!("%join",              control::join,            0, [None, None, None]),
    op!("%join/detach",       control::join_detach,     1, [Number, None, None]),
    op!("%load/ar",           real::load_ar,            2, [ArrPtr, Bit1, None]),
    op!("%load/dar/vec4",     object::load_dar_vec4,    2, [FuncPtr, Bit1, None]),
    op!("%load/obj",          object::load_obj,         1, [FuncPtr, None, None]),
    op!("%load/real",         real::load_real,          1, [FuncPtr, None, None]),
    op!("%load/str",          string::load_str,         1, [FuncPtr, None, None]),
    op!("%load/stra",         string::load_stra,        2, [ArrPtr, Bit1, None]),
    op!("%load/vec4",         vector::load_vec4,        1, [FuncPtr, None, None]),
    op!("%load/vec4a",        vector::load_vec4a,       2, [ArrPtr, Bit1, None]),
    op!("%max/wr",            real::max_wr,             0, [None, None, None]),
    op!("%min/wr",            real::min_wr,             0, [None, None, None]),
    op!("%mod",               arith::modulo,            0, [None, None, None]),
    op!("%mod/s",             arith::mod_s,             0, [None, None, None]),
    op!("%mod/wr",            real::mod_wr,             0, [None, None, None]),
    op!("%mul",               arith::mul,               0, [None, None, None]),
    op!("%mul/wr",            real::mul_wr,             0, [None, None, None]),
    op!("%muli",              arith::muli,              3, [Bit1, Bit2, Number]),
    op!("%nand",              arith::nand,              0, [None, None, None]),
    op!("%nand/r",            arith::nand_r,            0, [None, None, None]),
    op!("%new/darray",        object::new_darray,       2, [Bit1, String, None]),
    op!("%noop",              control::noop,            0, [None, None, None]),
    op!("%nor",               arith::nor,               0, [None, None, None]),
    op!("%nor/r",             arith::nor_r,             0, [None, None, None]),
    op!("%null",              object::null,             0, [None, None, None]),
    op!("%or",                arith::or,                0, [None, None, None]),
    op!("%or/r",              arith::or_r,              0, [None, None, None]),
    op!("%pad/s",             vector::pad_s,            1, [Number, None, None]),
    op!("%pad/u",             vector::pad_u,            1, [Number, None, None]),
    op!("%part/s",            vector::part_s,           1, [Number, None, None]),
    op!("%part/u",            vector::part_u,           1, [Number, None, None]),
    op!("%parti/s",           vector::parti_s,          3, [Number, Bit1, Bit2]),
    op!("%parti/u",           vector::parti_u,          3, [Number, Bit1, Bit2]),
    op!("%pop/obj",           object::pop_obj,          1, [Number, None, None]),
    op!("%pop/real",          real::pop_real,           1, [Number, None, None]),
    op!("%pop/str",           string::pop_str,          1, [Number, None, None]),
    op!("%pop/vec4",          vector::pop_vec4,         1, [Number, None, None]),
    op!("%pow",               arith::pow,               0, [None, None, None]),
    op!("%pow/s",             arith::pow_s,             0, [None, None, None]),
    op!("%pow/wr",            real::pow_wr,             0, [None, None, None]),
    op!("%pushi/real",        real::pushi_real,         2, [Number, Bit1, None]),
    op!("%pushi/str",         string::pushi_str,        1, [String, None, None]),
    op!("%pushi/vec4",        vector::pushi_vec4,       3, [Bit1, Bit2, Number]),
    op!("%release/net",       assign::release_net,      3, [FuncPtr, Bit1, Bit2]),
    op!("%release/reg",       assign::release_reg,      3, [FuncPtr, Bit1, Bit2]),
    op!("%replicate",         vector::replicate,        1, [Number, None, None]),
    op!("%shiftl",            arith::shiftl,            1, [Bit1, None, None]),
    op!("%shiftr",            arith::shiftr,            1, [Bit1, None, None]),
    op!("%shiftr/s",          arith::shiftr_s,          1, [Bit1, None, None]),
    op!("%split/vec4",        vector::split_vec4,       1, [Number, None, None]),
    op!("%store/dar/vec4",    object::store_dar_vec4,   2, [FuncPtr, Bit1, None]),
    op!("%store/obj",         object::store_obj,        1, [FuncPtr, None, None]),
    op!("%store/real",        real::store_real,         1, [FuncPtr, None, None]),
    op!("%store/reala",       real::store_reala,        2, [ArrPtr, Bit1, None]),
    op!("%store/str",         string::store_str,        1, [FuncPtr, None, None]),
    op!("%store/stra",        string::store_stra,       2, [ArrPtr, Bit1, None]),
    op!("%store/vec4",        vector::store_vec4,       3, [FuncPtr, Bit1, Bit2]),
    op!("%store/vec4a",       vector::store_vec4a,      3, [ArrPtr, Bit1, Bit2]),
    op!("%sub",               arith::sub,               0, [None, None, None]),
    op!("%sub/wr",            real::sub_wr,             0, [None, None, None]),
    op!("%subi",              arith::subi,              3, [Bit1, Bit2, Number]),
    op!("%substr",            string::substr,           2, [Bit1, Bit2, None]),
    op!("%test_nul",          object::test_nul,         1, [FuncPtr, None, None]),
    op!("%vpi_call",          call::vpi_call,           1, [VpiPtr, None, None]),
    op!("%vpi_func",          call::vpi_func,           1, [VpiPtr, None, None]),
    op!("%vpi_func/o",        call::vpi_func_o,         1, [VpiPtr, None, None]),
    op!("%vpi_func/r",        call::vpi_func_r,         1, [VpiPtr, None, None]),
    op!("%vpi_func/s",        call::vpi_func_s,         1, [VpiPtr, None, None]),
    op!("%wait",              control::wait,            1, [FuncPtr, None, None]),
    op!("%wait/fork",         control::wait_fork,       0, [None, None, None]),
    op!("%xnor",              arith::xnor,              0, [None, None, None]),
    op!("%xnor/r",            arith::xnor_r,            0, [None, None, None]),
    op!("%xor",               arith::xor,               0, [None, None, None]),
    op!("%xor/r",             arith::xor_r,             0, [None, None, None]),
];
