//! Thumb-2 32-bit encodings: `MRS`/`MSR`, `DSB`/`DMB`/`ISB` barriers,
//! `MOVW`/`MOVT`, wide immediate `ADD`/`SUB`/`MOV` via `ThumbExpandImm`,
//! wide `LDR`/`STR` immediate, and wide `LDM`/`STM`.
//!
//! Grounded on the teacher's `Mrs`/`Msr`/`Dmb`/`MovWide` handlers
//! (`thumbinstruction/mod.rs`) generalized to the M-profile special
//! registers from `cmdis/model.py`, and `ThumbExpandImm_C` from
//! `cmdis/helpers.py`.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::cpu::Cpu;
use crate::decoder::LeafDef;
use crate::error::CmthumbError;
use crate::handlers::support::*;
use crate::instruction::Instruction;
use crate::memory::{AccessSize, MemoryBackend};
use crate::operand::{
    BarrierOperand, MemoryOperand, Operand, SpecialRegister, SpecialRegisterMask,
};
use crate::semantics::thumb_expand_imm;

fn special_register_from_sysm(sysm: u32) -> SpecialRegister {
    match sysm {
        0..=3 => SpecialRegister::Apsr(SpecialRegisterMask::None),
        5 => SpecialRegister::Ipsr,
        6 => SpecialRegister::Epsr,
        7 => SpecialRegister::Iepsr,
        8 => SpecialRegister::Msp,
        9 => SpecialRegister::Psp,
        16 => SpecialRegister::Primask,
        17 => SpecialRegister::BasepriMax,
        18 => SpecialRegister::Basepri,
        19 => SpecialRegister::Faultmask,
        20 => SpecialRegister::Control,
        _ => SpecialRegister::Apsr(SpecialRegisterMask::None),
    }
}

fn special_register_index(reg: SpecialRegister) -> i32 {
    match reg {
        SpecialRegister::Apsr(_) | SpecialRegister::Ipsr | SpecialRegister::Epsr
        | SpecialRegister::Xpsr(_) | SpecialRegister::Iepsr => crate::cpu::XPSR,
        SpecialRegister::Msp => crate::cpu::MSP,
        SpecialRegister::Psp => crate::cpu::PSP,
        SpecialRegister::Primask => crate::cpu::PRIMASK,
        SpecialRegister::Basepri | SpecialRegister::BasepriMax => crate::cpu::BASEPRI,
        SpecialRegister::Faultmask => crate::cpu::FAULTMASK,
        SpecialRegister::Control => crate::cpu::CONTROL,
    }
}

fn mrs_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let sysm = field_u32(fields, "SYSm");
    vec![reg(field_u32(fields, "Rd")), Operand::Special(special_register_from_sysm(sysm))]
}

fn eval_mrs(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let sysm = i.field("SYSm").unsigned() as u32;
    let special = special_register_from_sysm(sysm);
    cpu.write_gpr(rd, cpu.read_register(special_register_index(special)));
    Ok(())
}

fn msr_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let sysm = field_u32(fields, "SYSm");
    vec![Operand::Special(special_register_from_sysm(sysm)), reg(field_u32(fields, "Rn"))]
}

fn eval_msr(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = i.field("Rn").unsigned() as usize;
    let sysm = i.field("SYSm").unsigned() as u32;
    let special = special_register_from_sysm(sysm);
    let value = cpu.read_gpr(rn);
    cpu.write_register(special_register_index(special), value);
    Ok(())
}

fn barrier_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let option = field_u32(fields, "option") as u8;
    vec![Operand::Barrier(if option == 0xF { BarrierOperand::Sy } else { BarrierOperand::Raw(option) })]
}

fn eval_barrier(_i: &Instruction, _cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    Ok(())
}

fn movw_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm16 = movw_imm16(fields);
    vec![reg(field_u32(fields, "Rd")), imm(imm16 as i64)]
}

fn movw_imm16(fields: &HashMap<String, Bitstring>) -> u32 {
    let i = field_u32(fields, "i");
    let imm4 = field_u32(fields, "imm4");
    let imm3 = field_u32(fields, "imm3");
    let imm8 = field_u32(fields, "imm8");
    (imm4 << 12) | (i << 11) | (imm3 << 8) | imm8
}

fn eval_movw(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    cpu.write_gpr(rd, movw_imm16(&i.fields));
    Ok(())
}

fn eval_movt(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let imm16 = movw_imm16(&i.fields);
    let lower = cpu.read_gpr(rd) & 0xFFFF;
    cpu.write_gpr(rd, (imm16 << 16) | lower);
    Ok(())
}

fn expand_imm(fields: &HashMap<String, Bitstring>) -> Bitstring {
    let i = field_u32(fields, "i");
    let imm3 = field_u32(fields, "imm3");
    let imm8 = field_u32(fields, "imm8");
    let combined = (i << 11) | (imm3 << 8) | imm8;
    thumb_expand_imm(Bitstring::new(combined as u128, 12))
}

fn rn_rd_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(field_u32(fields, "Rn")), imm(expand_imm(fields).unsigned() as i64)]
}

fn eval_add_wide_imm(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let imm32 = expand_imm(&i.fields).unsigned() as u32;
    cpu.write_gpr(rd, cpu.read_gpr(rn).wrapping_add(imm32));
    Ok(())
}

fn eval_sub_wide_imm(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let imm32 = expand_imm(&i.fields).unsigned() as u32;
    cpu.write_gpr(rd, cpu.read_gpr(rn).wrapping_sub(imm32));
    Ok(())
}

fn rd_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), imm(expand_imm(fields).unsigned() as i64)]
}

fn eval_mov_wide_imm(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    cpu.write_gpr(rd, expand_imm(&i.fields).unsigned() as u32);
    Ok(())
}

fn wide_mem_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm12 = field_u32(fields, "imm12");
    vec![
        reg(field_u32(fields, "Rt")),
        Operand::Memory(MemoryOperand { base: field_u32(fields, "Rn"), offset: Some(imm12 as i32), offset_reg: None, preindexed: false, postindexed: false }),
    ]
}

fn eval_str_wide_imm(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rt = i.field("Rt").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let imm12 = i.field("imm12").unsigned() as u32;
    let address = cpu.read_gpr(rn).wrapping_add(imm12);
    mem.write_memory(address, AccessSize::Word, cpu.read_gpr(rt));
    Ok(())
}

fn eval_ldr_wide_imm(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rt = i.field("Rt").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let imm12 = i.field("imm12").unsigned() as u32;
    let address = cpu.read_gpr(rn).wrapping_add(imm12);
    cpu.write_gpr(rt, mem.read_memory(address, AccessSize::Word));
    Ok(())
}

fn wide_ldm_stm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let m = field_u32_or(fields, "M", 0);
    let p = field_u32_or(fields, "P", 0);
    let reglist = field_u32(fields, "reglist");
    let mask = reglist | (m << 14) | (p << 15);
    vec![reg_wb(field_u32(fields, "Rn")), reglist_from_mask(mask, 16)]
}

fn eval_stm_wide(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = i.field("Rn").unsigned() as usize;
    let m = i.field_opt("M").map(|b| b.unsigned() as u32).unwrap_or(0);
    let reglist = i.field("reglist").unsigned() as u32;
    let mask = reglist | (m << 14);
    if stm_base_in_non_lowest_position(mask, rn as u32) {
        return Err(CmthumbError::Unpredictable(
            "STM with Rn in a non-lowest reglist position".into(),
        ));
    }
    let mut address = cpu.read_gpr(rn);
    for r in 0..15u32 {
        if (mask >> r) & 1 == 1 {
            mem.write_memory(address, AccessSize::Word, cpu.read_gpr(r as usize));
            address = address.wrapping_add(4);
        }
    }
    cpu.write_gpr(rn, address);
    Ok(())
}

fn eval_ldm_wide(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = i.field("Rn").unsigned() as usize;
    let p = i.field_opt("P").map(|b| b.unsigned() as u32).unwrap_or(0);
    let reglist = i.field("reglist").unsigned() as u32;
    let mask = reglist | (p << 15);
    let mut address = cpu.read_gpr(rn);
    for r in 0..16u32 {
        if (mask >> r) & 1 == 1 {
            let value = mem.read_memory(address, AccessSize::Word);
            address = address.wrapping_add(4);
            if r == 15 {
                cpu.set_pc(value & !1);
            } else {
                cpu.write_gpr(r as usize, value);
            }
        }
    }
    cpu.write_gpr(rn, address);
    Ok(())
}

/// All leaves contributed by this module.
pub fn leaves() -> Vec<LeafDef> {
    vec![
        LeafDef { mnemonic: "MRS", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: mrs_operands, eval: eval_mrs }
            .with_wide_spec("111100111110Rn(4)", "1000Rd(4)SYSm(8)"),
        LeafDef { mnemonic: "MSR", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: msr_operands, eval: eval_msr }
            .with_wide_spec("111100111000Rn(4)", "1000mask(2)00SYSm(8)"),
        LeafDef { mnemonic: "DSB", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: barrier_operands, eval: eval_barrier }
            .with_wide_spec("1111001110111111", "10001111 0100option(4)"),
        LeafDef { mnemonic: "DMB", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: barrier_operands, eval: eval_barrier }
            .with_wide_spec("1111001110111111", "10001111 0101option(4)"),
        LeafDef { mnemonic: "ISB", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: barrier_operands, eval: eval_barrier }
            .with_wide_spec("1111001110111111", "10001111 0110option(4)"),
        LeafDef { mnemonic: "MOVW", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: movw_operands, eval: eval_movw }
            .with_wide_spec("11110i(1)100100imm4(4)", "0Rd(4)imm3(3)imm8(8)"),
        LeafDef { mnemonic: "MOVT", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: movw_operands, eval: eval_movt }
            .with_wide_spec("11110i(1)101100imm4(4)", "0Rd(4)imm3(3)imm8(8)"),
        LeafDef { mnemonic: "ADD", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rn_rd_imm_operands, eval: eval_add_wide_imm }
            .with_wide_spec("11110i(1)100000Rn(4)", "0Rd(4)imm3(3)imm8(8)"),
        LeafDef { mnemonic: "SUB", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rn_rd_imm_operands, eval: eval_sub_wide_imm }
            .with_wide_spec("11110i(1)101010Rn(4)", "0Rd(4)imm3(3)imm8(8)"),
        LeafDef { mnemonic: "MOV", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rd_imm_operands, eval: eval_mov_wide_imm }
            .with_wide_spec("11110i(1)0001001111", "0Rd(4)imm3(3)imm8(8)"),
        LeafDef { mnemonic: "STR", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: wide_mem_imm_operands, eval: eval_str_wide_imm }
            .with_wide_spec("111110001100Rn(4)", "Rt(4)imm12(12)"),
        LeafDef { mnemonic: "LDR", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: wide_mem_imm_operands, eval: eval_ldr_wide_imm }
            .with_wide_spec("111110001101Rn(4)", "Rt(4)imm12(12)"),
        LeafDef { mnemonic: "STM", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: wide_ldm_stm_operands, eval: eval_stm_wide }
            .with_wide_spec("111010001010Rn(4)", "0M(1)0reglist(13)"),
        LeafDef { mnemonic: "LDM", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: wide_ldm_stm_operands, eval: eval_ldm_wide }
            .with_wide_spec("111010001001Rn(4)", "P(1)M(1)reglist(14)"),
    ]
}
