//! The operand model the formatter renders.
//!
//! Grounded on `cmdis/formatter.py`'s `Operand` subclasses: each variant
//! here corresponds to one of the `RegisterOperand`/`ReglistOperand`/
//! `ImmediateOperand`/`LabelOperand`/`ShiftRotateOperand`/`BarrierOperand`/
//! `MemoryAccessOperand`/`SpecialRegisterOperand` classes there.

use crate::semantics::ShiftType;

/// A general-purpose register operand, optionally written back (`Rn!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOperand {
    /// Register index 0-15.
    pub reg: u32,
    /// True if this register is the target of writeback (`!`).
    pub writeback: bool,
}

/// A register-list operand for `PUSH`/`POP`/`LDM`/`STM`, rendered with
/// contiguous runs collapsed to `Rm-Rn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegListOperand {
    /// Ascending list of register indices, 0-15.
    pub registers: Vec<u32>,
}

/// An immediate operand. Values above 9 render with a `; 0x..` hex comment;
/// a value of exactly zero is elided entirely by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImmediateOperand {
    /// The immediate's value.
    pub value: i64,
}

/// A PC-relative branch/load target, rendered as `.±decimal` with the
/// absolute address as a trailing comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOperand {
    /// Signed offset from the instruction.
    pub offset: i32,
    /// The resolved absolute target address.
    pub target: u32,
}

/// A shift/rotate suffix attached to a register operand (`, lsl #2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOperand {
    /// Which shift/rotate operation.
    pub kind: ShiftType,
    /// The shift amount.
    pub amount: u32,
}

/// A `[Rn, #imm]`-style memory access operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOperand {
    /// Base register.
    pub base: u32,
    /// Signed immediate offset, if any.
    pub offset: Option<i32>,
    /// Offset register, if any (mutually exclusive with `offset`).
    pub offset_reg: Option<u32>,
    /// True for pre-indexed addressing (`[Rn, #imm]!`).
    pub preindexed: bool,
    /// True for post-indexed addressing (`[Rn], #imm`).
    pub postindexed: bool,
}

/// One of the special registers addressable by `MRS`/`MSR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRegister {
    /// Application Program Status Register, with an optional mask suffix.
    Apsr(SpecialRegisterMask),
    /// Interrupt Program Status Register.
    Ipsr,
    /// Execution Program Status Register.
    Epsr,
    /// Combined xPSR.
    Xpsr(SpecialRegisterMask),
    /// IPSR + EPSR combined view.
    Iepsr,
    /// Main stack pointer.
    Msp,
    /// Process stack pointer.
    Psp,
    /// Priority mask register.
    Primask,
    /// Base priority register.
    Basepri,
    /// Base priority register, max-only write variant.
    BasepriMax,
    /// Fault mask register.
    Faultmask,
    /// Privilege/stack-select/FP-context control register.
    Control,
}

/// The `_nzcvq`/`_g`/`_nzcvqg` mask suffix on APSR/XPSR accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRegisterMask {
    /// No suffix: full register.
    None,
    /// `_nzcvq`: condition flags only.
    Nzcvq,
    /// `_g`: greater-than-or-equal flags only (DSP extension).
    G,
    /// `_nzcvqg`: both of the above.
    Nzcvqg,
}

/// The barrier option of `DMB`/`DSB`/`ISB` (`sy`, or a raw `#imm` for any
/// other encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOperand {
    /// Full system barrier (`option == 0xF`).
    Sy,
    /// Any other 4-bit option value, rendered as `#decimal`.
    Raw(u8),
}

/// One rendered operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A general-purpose register.
    Register(RegisterOperand),
    /// A register list.
    RegList(RegListOperand),
    /// An immediate value.
    Immediate(ImmediateOperand),
    /// A PC-relative label.
    Label(LabelOperand),
    /// A shift/rotate suffix.
    Shift(ShiftOperand),
    /// A memory access.
    Memory(MemoryOperand),
    /// A special register selector.
    Special(SpecialRegister),
    /// A `DMB`/`DSB`/`ISB` barrier option.
    Barrier(BarrierOperand),
    /// A condition-code mnemonic suffix used by `IT`'s operand list.
    ConditionName(&'static str),
}
