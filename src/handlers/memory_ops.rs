//! Load/store encodings: PC-relative literal load, register- and
//! immediate-offset load/store, SP-relative load/store, `PUSH`/`POP`, and
//! `LDM`/`STM`.
//!
//! Grounded on the teacher's `LdrPcImm`/`LdrStrReg`/`LdrhStrhReg`/
//! `LdrStrImm`/`LdrhStrhImm`/`LdrStrSpImm`/`PushPopRegs`/`LdmStmRegs`
//! family (`thumbinstruction/mod.rs`), with addressing semantics from
//! `cmdis/model.py`'s `read_memory`/`write_memory` contract.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::cpu::{self, Cpu};
use crate::decoder::LeafDef;
use crate::error::CmthumbError;
use crate::handlers::support::*;
use crate::instruction::Instruction;
use crate::memory::{AccessSize, MemoryBackend};
use crate::operand::{MemoryOperand, Operand};

fn pc_rel_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm8 = field_u32(fields, "imm8");
    vec![reg(field_u32(fields, "Rt")), Operand::Memory(MemoryOperand {
        base: 15, offset: Some((imm8 * 4) as i32), offset_reg: None, preindexed: false, postindexed: false,
    })]
}

fn eval_ldr_pc(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rt = i.field("Rt").unsigned() as usize;
    let imm8 = i.field("imm8").unsigned() as u32;
    let base = crate::semantics::align(cpu.pc() + 4, 4);
    let address = base.wrapping_add(imm8 * 4);
    cpu.write_gpr(rt, mem.read_memory(address, AccessSize::Word));
    Ok(())
}

fn reg_offset_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![
        reg(field_u32(fields, "Rt")),
        Operand::Memory(MemoryOperand {
            base: field_u32(fields, "Rn"),
            offset: None,
            offset_reg: Some(field_u32(fields, "Rm")),
            preindexed: false,
            postindexed: false,
        }),
    ]
}

macro_rules! reg_offset_eval {
    ($name:ident, $size:expr, $store:expr, $signed:expr) => {
        fn $name(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
            let rt = i.field("Rt").unsigned() as usize;
            let rn = i.field("Rn").unsigned() as usize;
            let rm = i.field("Rm").unsigned() as usize;
            let address = cpu.read_gpr(rn).wrapping_add(cpu.read_gpr(rm));
            if $store {
                mem.write_memory(address, $size, cpu.read_gpr(rt));
            } else {
                let raw = mem.read_memory(address, $size);
                let value = if $signed {
                    sign_extend_i32(raw, $size.bytes() as u32 * 8) as u32
                } else {
                    raw
                };
                cpu.write_gpr(rt, value);
            }
            Ok(())
        }
    };
}

reg_offset_eval!(eval_str_reg, AccessSize::Word, true, false);
reg_offset_eval!(eval_strh_reg, AccessSize::Halfword, true, false);
reg_offset_eval!(eval_strb_reg, AccessSize::Byte, true, false);
reg_offset_eval!(eval_ldrsb_reg, AccessSize::Byte, false, true);
reg_offset_eval!(eval_ldr_reg, AccessSize::Word, false, false);
reg_offset_eval!(eval_ldrh_reg, AccessSize::Halfword, false, false);
reg_offset_eval!(eval_ldrb_reg, AccessSize::Byte, false, false);
reg_offset_eval!(eval_ldrsh_reg, AccessSize::Halfword, false, true);

fn imm_offset_operands(scale: u32) -> impl Fn(&HashMap<String, Bitstring>) -> Vec<Operand> {
    move |fields| {
        let imm5 = field_u32(fields, "imm5");
        vec![
            reg(field_u32(fields, "Rt")),
            Operand::Memory(MemoryOperand {
                base: field_u32(fields, "Rn"),
                offset: Some((imm5 * scale) as i32),
                offset_reg: None,
                preindexed: false,
                postindexed: false,
            }),
        ]
    }
}

fn word_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    imm_offset_operands(4)(fields)
}
fn byte_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    imm_offset_operands(1)(fields)
}
fn half_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    imm_offset_operands(2)(fields)
}

macro_rules! imm_offset_eval {
    ($name:ident, $size:expr, $store:expr, $scale:expr) => {
        fn $name(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
            let rt = i.field("Rt").unsigned() as usize;
            let rn = i.field("Rn").unsigned() as usize;
            let imm5 = i.field("imm5").unsigned() as u32;
            let address = cpu.read_gpr(rn).wrapping_add(imm5 * $scale);
            if $store {
                mem.write_memory(address, $size, cpu.read_gpr(rt));
            } else {
                cpu.write_gpr(rt, mem.read_memory(address, $size));
            }
            Ok(())
        }
    };
}

imm_offset_eval!(eval_str_imm, AccessSize::Word, true, 4);
imm_offset_eval!(eval_ldr_imm, AccessSize::Word, false, 4);
imm_offset_eval!(eval_strb_imm, AccessSize::Byte, true, 1);
imm_offset_eval!(eval_ldrb_imm, AccessSize::Byte, false, 1);
imm_offset_eval!(eval_strh_imm, AccessSize::Halfword, true, 2);
imm_offset_eval!(eval_ldrh_imm, AccessSize::Halfword, false, 2);

fn sp_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm8 = field_u32(fields, "imm8");
    vec![
        reg(field_u32(fields, "Rt")),
        Operand::Memory(MemoryOperand { base: 13, offset: Some((imm8 * 4) as i32), offset_reg: None, preindexed: false, postindexed: false }),
    ]
}

fn eval_str_sp(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rt = i.field("Rt").unsigned() as usize;
    let imm8 = i.field("imm8").unsigned() as u32;
    let address = cpu.read_gpr(cpu::SP).wrapping_add(imm8 * 4);
    mem.write_memory(address, AccessSize::Word, cpu.read_gpr(rt));
    Ok(())
}

fn eval_ldr_sp(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rt = i.field("Rt").unsigned() as usize;
    let imm8 = i.field("imm8").unsigned() as u32;
    let address = cpu.read_gpr(cpu::SP).wrapping_add(imm8 * 4);
    cpu.write_gpr(rt, mem.read_memory(address, AccessSize::Word));
    Ok(())
}

fn push_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let m = field_u32(fields, "M");
    let reglist = field_u32(fields, "reglist");
    let mask = reglist | (m << 14);
    vec![reglist_from_mask(mask, 15)]
}

fn pop_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let p = field_u32(fields, "P");
    let reglist = field_u32(fields, "reglist");
    let mask = reglist | (p << 15);
    vec![reglist_from_mask(mask, 16)]
}

fn eval_push(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let m = i.field("M").unsigned() as u32;
    let reglist = i.field("reglist").unsigned() as u32;
    let mask = reglist | (m << 14);
    let count = mask.count_ones();
    let mut address = cpu.read_gpr(cpu::SP).wrapping_sub(count * 4);
    let start = address;
    for r in 0..15u32 {
        if (mask >> r) & 1 == 1 {
            mem.write_memory(address, AccessSize::Word, cpu.read_gpr(r as usize));
            address = address.wrapping_add(4);
        }
    }
    cpu.write_gpr(cpu::SP, start);
    Ok(())
}

fn eval_pop(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let p = i.field("P").unsigned() as u32;
    let reglist = i.field("reglist").unsigned() as u32;
    let mask = reglist | (p << 15);
    let mut address = cpu.read_gpr(cpu::SP);
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
    cpu.write_gpr(cpu::SP, address);
    Ok(())
}

fn ldm_stm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg_wb(field_u32(fields, "Rn")), reglist_from_mask(field_u32(fields, "reglist"), 8)]
}

fn eval_stm(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = i.field("Rn").unsigned() as usize;
    let mask = i.field("reglist").unsigned() as u32;
    if stm_base_in_non_lowest_position(mask, rn as u32) {
        return Err(CmthumbError::Unpredictable(
            "STM with Rn in a non-lowest reglist position".into(),
        ));
    }
    let mut address = cpu.read_gpr(rn);
    for r in 0..8u32 {
        if (mask >> r) & 1 == 1 {
            mem.write_memory(address, AccessSize::Word, cpu.read_gpr(r as usize));
            address = address.wrapping_add(4);
        }
    }
    cpu.write_gpr(rn, address);
    Ok(())
}

fn eval_ldm(i: &Instruction, cpu: &mut Cpu, mem: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = i.field("Rn").unsigned() as usize;
    let mask = i.field("reglist").unsigned() as u32;
    let mut address = cpu.read_gpr(rn);
    let writes_back = (mask >> rn) & 1 == 0;
    for r in 0..8u32 {
        if (mask >> r) & 1 == 1 {
            cpu.write_gpr(r as usize, mem.read_memory(address, AccessSize::Word));
            address = address.wrapping_add(4);
        }
    }
    if writes_back {
        cpu.write_gpr(rn, address);
    }
    Ok(())
}

/// All leaves contributed by this module.
pub fn leaves() -> Vec<LeafDef> {
    vec![
        LeafDef { mnemonic: "LDR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: pc_rel_operands, eval: eval_ldr_pc }
            .with_spec("01001Rt(3)imm8(8)"),
        LeafDef { mnemonic: "STR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_str_reg }
            .with_spec("0101000Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STRH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_strh_reg }
            .with_spec("0101001Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STRB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_strb_reg }
            .with_spec("0101010Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRSB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_ldrsb_reg }
            .with_spec("0101011Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_ldr_reg }
            .with_spec("0101100Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_ldrh_reg }
            .with_spec("0101101Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_ldrb_reg }
            .with_spec("0101110Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRSH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: reg_offset_operands, eval: eval_ldrsh_reg }
            .with_spec("0101111Rm(3)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: word_imm_operands, eval: eval_str_imm }
            .with_spec("01100imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: word_imm_operands, eval: eval_ldr_imm }
            .with_spec("01101imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STRB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: byte_imm_operands, eval: eval_strb_imm }
            .with_spec("01110imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: byte_imm_operands, eval: eval_ldrb_imm }
            .with_spec("01111imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STRH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: half_imm_operands, eval: eval_strh_imm }
            .with_spec("10000imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "LDRH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: half_imm_operands, eval: eval_ldrh_imm }
            .with_spec("10001imm5(5)Rn(3)Rt(3)"),
        LeafDef { mnemonic: "STR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: sp_operands, eval: eval_str_sp }
            .with_spec("10010Rt(3)imm8(8)"),
        LeafDef { mnemonic: "LDR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: sp_operands, eval: eval_ldr_sp }
            .with_spec("10011Rt(3)imm8(8)"),
        LeafDef { mnemonic: "PUSH", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: push_operands, eval: eval_push }
            .with_spec("1011010M(1)reglist(8)"),
        LeafDef { mnemonic: "POP", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: pop_operands, eval: eval_pop }
            .with_spec("1011110P(1)reglist(8)"),
        LeafDef { mnemonic: "STM", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: ldm_stm_operands, eval: eval_stm }
            .with_spec("11000Rn(3)reglist(8)"),
        LeafDef { mnemonic: "LDM", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: ldm_stm_operands, eval: eval_ldm }
            .with_spec("11001Rn(3)reglist(8)"),
    ]
}
