//! Miscellaneous 16-bit-instructions-group encodings: `ADR`, SP-relative
//! `ADD`, `ADD`/`SUB (SP plus immediate)`, `CPS`, hints, `BKPT`, the byte/
//! halfword reverse family, and the sign/zero-extend family.
//!
//! Grounded on the teacher's `AddRdPcImm`/`AddSubSpImm`/`Hints`/`Bkpt`/
//! `RevFamily`/`ExtendFamily` handlers (`thumbinstruction/mod.rs`). `CPS`
//! gates its PRIMASK/FAULTMASK writes on privilege, matching the
//! teacher's own privilege check on banked-register writes
//! (`hardware/cpu/mod.rs`'s mode-gated register access, generalized here
//! to ARMv7-M's `CONTROL.nPRIV`).

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::cpu::{self, Cpu};
use crate::decoder::LeafDef;
use crate::error::CmthumbError;
use crate::handlers::support::*;
use crate::instruction::Instruction;
use crate::memory::MemoryBackend;
use crate::operand::{MemoryOperand, Operand};

fn adr_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm8 = field_u32(fields, "imm8");
    vec![reg(field_u32(fields, "Rd")), Operand::Memory(MemoryOperand {
        base: 15, offset: Some((imm8 * 4) as i32), offset_reg: None, preindexed: false, postindexed: false,
    })]
}

fn eval_adr(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let imm8 = i.field("imm8").unsigned() as u32;
    let base = crate::semantics::align(cpu.pc() + 4, 4);
    cpu.write_gpr(rd, base.wrapping_add(imm8 * 4));
    Ok(())
}

fn add_sp_rd_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(13), imm(field_u32(fields, "imm8") as i64 * 4)]
}

fn eval_add_sp_rd(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let imm8 = i.field("imm8").unsigned() as u32;
    cpu.write_gpr(rd, cpu.read_gpr(cpu::SP).wrapping_add(imm8 * 4));
    Ok(())
}

fn sp_imm7_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(13), reg(13), imm(field_u32(fields, "imm7") as i64 * 4)]
}

fn eval_add_sp_imm(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let imm7 = i.field("imm7").unsigned() as u32;
    cpu.write_gpr(cpu::SP, cpu.read_gpr(cpu::SP).wrapping_add(imm7 * 4));
    Ok(())
}

fn eval_sub_sp_imm(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let imm7 = i.field("imm7").unsigned() as u32;
    cpu.write_gpr(cpu::SP, cpu.read_gpr(cpu::SP).wrapping_sub(imm7 * 4));
    Ok(())
}

fn no_operands(_fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![]
}

fn cps_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![imm(field_u32(fields, "im") as i64), imm(field_u32(fields, "AIF") as i64)]
}

fn eval_cps(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    if !cpu.is_privileged() {
        return Ok(());
    }
    let im = i.field("im").unsigned() as u32;
    let aif = i.field("AIF").unsigned() as u32;
    let i_flag = (aif >> 1) & 1 != 0;
    let f_flag = aif & 1 != 0;
    if i_flag {
        cpu.write_register(cpu::PRIMASK, im);
    }
    if f_flag {
        cpu.write_register(cpu::FAULTMASK, im);
    }
    Ok(())
}

fn eval_nop(_i: &Instruction, _cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    Ok(())
}

fn bkpt_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![imm(field_u32(fields, "imm8") as i64)]
}

fn eval_bkpt(_i: &Instruction, _cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    Ok(())
}

fn two_reg_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(field_u32(fields, "Rm"))]
}

fn eval_rev(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    cpu.write_gpr(rd, cpu.read_gpr(rm).swap_bytes());
    Ok(())
}

fn eval_rev16(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = cpu.read_gpr(rm);
    let lo = (x & 0xFFFF).swap_bytes() >> 16;
    let hi = ((x >> 16) & 0xFFFF).swap_bytes() >> 16;
    cpu.write_gpr(rd, lo | (hi << 16));
    Ok(())
}

fn eval_revsh(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = cpu.read_gpr(rm);
    let swapped = ((x & 0xFF) << 8) | ((x >> 8) & 0xFF);
    cpu.write_gpr(rd, sign_extend_i32(swapped, 16) as u32);
    Ok(())
}

fn eval_sxtb(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    cpu.write_gpr(rd, sign_extend_i32(cpu.read_gpr(rm) & 0xFF, 8) as u32);
    Ok(())
}

fn eval_sxth(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    cpu.write_gpr(rd, sign_extend_i32(cpu.read_gpr(rm) & 0xFFFF, 16) as u32);
    Ok(())
}

fn eval_uxtb(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    cpu.write_gpr(rd, cpu.read_gpr(rm) & 0xFF);
    Ok(())
}

fn eval_uxth(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    cpu.write_gpr(rd, cpu.read_gpr(rm) & 0xFFFF);
    Ok(())
}

/// All leaves contributed by this module.
pub fn leaves() -> Vec<LeafDef> {
    vec![
        LeafDef { mnemonic: "ADR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: adr_operands, eval: eval_adr }
            .with_spec("10100Rd(3)imm8(8)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: add_sp_rd_operands, eval: eval_add_sp_rd }
            .with_spec("10101Rd(3)imm8(8)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: sp_imm7_operands, eval: eval_add_sp_imm }
            .with_spec("101100000imm7(7)"),
        LeafDef { mnemonic: "SUB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: sp_imm7_operands, eval: eval_sub_sp_imm }
            .with_spec("101100001imm7(7)"),
        LeafDef { mnemonic: "CPS", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: cps_operands, eval: eval_cps }
            .with_spec("10110110011im(1)0AIF(3)"),
        LeafDef { mnemonic: "NOP", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: no_operands, eval: eval_nop }
            .with_spec("1011111100000000"),
        LeafDef { mnemonic: "YIELD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: no_operands, eval: eval_nop }
            .with_spec("1011111100010000"),
        LeafDef { mnemonic: "WFE", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: no_operands, eval: eval_nop }
            .with_spec("1011111100100000"),
        LeafDef { mnemonic: "WFI", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: no_operands, eval: eval_nop }
            .with_spec("1011111100110000"),
        LeafDef { mnemonic: "SEV", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: no_operands, eval: eval_nop }
            .with_spec("1011111101000000"),
        LeafDef { mnemonic: "BKPT", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: bkpt_operands, eval: eval_bkpt }
            .with_spec("10111110imm8(8)"),
        LeafDef { mnemonic: "SXTH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_sxth }
            .with_spec("1011001000Rm(3)Rd(3)"),
        LeafDef { mnemonic: "SXTB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_sxtb }
            .with_spec("1011001001Rm(3)Rd(3)"),
        LeafDef { mnemonic: "UXTH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_uxth }
            .with_spec("1011001010Rm(3)Rd(3)"),
        LeafDef { mnemonic: "UXTB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_uxtb }
            .with_spec("1011001011Rm(3)Rd(3)"),
        LeafDef { mnemonic: "REV", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_rev }
            .with_spec("1011101000Rm(3)Rd(3)"),
        LeafDef { mnemonic: "REV16", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_rev16 }
            .with_spec("1011101001Rm(3)Rd(3)"),
        LeafDef { mnemonic: "REVSH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: two_reg_operands, eval: eval_revsh }
            .with_spec("1011101011Rm(3)Rd(3)"),
    ]
}
