//! The decoded-instruction record threaded from the decoder tree through to
//! the formatter and the simulator.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::cpu::Cpu;
use crate::error::CmthumbError;
use crate::memory::MemoryBackend;
use crate::operand::Operand;

/// The signature every eval routine implements: reads and writes CPU and
/// memory state for one decoded instruction.
pub type EvalFn = fn(&Instruction, &mut Cpu, &mut dyn MemoryBackend) -> Result<(), CmthumbError>;

/// A fully decoded instruction: the raw encoding, its extracted named
/// fields, the operands the formatter renders, and the eval routine that
/// executes it.
#[derive(Clone)]
pub struct Instruction {
    /// Base mnemonic, e.g. `"ADD"`. Does not include a condition suffix.
    pub mnemonic: &'static str,
    /// The address this instruction was fetched from.
    pub address: u32,
    /// The raw encoding: 16 bits for narrow Thumb, 32 bits for wide Thumb-2
    /// (high halfword in bits `[31:16]`, low halfword in bits `[15:0]`).
    pub raw: u32,
    /// True for a 32-bit (Thumb-2 wide) encoding.
    pub is_wide: bool,
    /// Named bit-field values extracted by the decode handler, keyed by the
    /// field name used in the handler's spec string (e.g. `"Rd"`, `"imm5"`).
    pub fields: HashMap<String, Bitstring>,
    /// Rendered operands, in display order.
    pub operands: Vec<Operand>,
    /// The function that executes this instruction against a `Cpu`.
    pub eval: EvalFn,
}

impl Instruction {
    /// Byte length of the encoding: 2 or 4.
    pub fn len(&self) -> u32 {
        if self.is_wide { 4 } else { 2 }
    }

    /// Looks up a required named field, panicking if the handler that
    /// decoded this instruction didn't extract it (a handler bug, not a
    /// runtime condition).
    pub fn field(&self, name: &str) -> Bitstring {
        *self.fields.get(name).unwrap_or_else(|| panic!("instruction {} has no field {name:?}", self.mnemonic))
    }

    /// Looks up an optional named field.
    pub fn field_opt(&self, name: &str) -> Option<Bitstring> {
        self.fields.get(name).copied()
    }

    /// Executes this instruction against the given CPU and memory, then
    /// advances PC by [`Instruction::len`] unless the eval routine itself
    /// already changed PC (a taken branch, `BL`, a PC-writing `MOV`/`ADD`/
    /// `POP`/`LDM`, ...). Eval routines that don't touch PC never need to
    /// know their own encoding length.
    pub fn execute(&self, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
        let pc = cpu.pc();
        (self.eval)(self, cpu, mem)?;
        if cpu.pc() == pc {
            cpu.set_pc(pc.wrapping_add(self.len()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Instruction")
            .field("mnemonic", &self.mnemonic)
            .field("address", &self.address)
            .field("raw", &self.raw)
            .field("is_wide", &self.is_wide)
            .field("operands", &self.operands)
            .finish()
    }
}
