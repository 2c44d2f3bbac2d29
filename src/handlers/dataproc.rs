//! Thumb-1 data-processing encodings: the 16-entry ALU-operation group,
//! immediate/register shifts, add/subtract (register and 3-bit immediate),
//! move/compare/add/subtract with an 8-bit immediate, and the hi-register
//! operations (`ADD`/`CMP`/`MOV` across the r0-r15 range plus `BX`/`BLX`).
//!
//! Grounded on the teacher's `ThumbOpcode::DataProcessingFlags`/`AluOperation`/
//! `HiRegOpBx` family (`thumbinstruction/mod.rs`) for the field layout, and
//! on `cmdis/helpers.py` for the arithmetic itself.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::condition::Flags;
use crate::cpu::Cpu;
use crate::decoder::LeafDef;
use crate::error::CmthumbError;
use crate::handlers::support::*;
use crate::instruction::Instruction;
use crate::memory::MemoryBackend;
use crate::operand::Operand;
use crate::semantics::add_with_carry;

fn flags_from_result(value: u32, carry: Option<bool>, overflow: Option<bool>, prev: Flags) -> Flags {
    Flags {
        n: (value as i32) < 0,
        z: value == 0,
        c: carry.unwrap_or(prev.c),
        v: overflow.unwrap_or(prev.v),
    }
}

fn two_reg_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rdn")), reg(field_u32(fields, "Rm"))]
}

macro_rules! alu_leaf {
    ($mnemonic:literal, $op_bits:literal, $eval:expr) => {
        LeafDef {
            mnemonic: $mnemonic,
            is_wide: false,
            mask: 0,
            match_bits: 0,
            field_ranges: vec![],
            build_operands: two_reg_operands,
            eval: $eval,
        }
        .with_spec(concat!("010000", $op_bits, "Rm(3)Rdn(3)"))
    };
}

fn eval_and(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn) & cpu.read_gpr(rm);
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_eor(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn) ^ cpu.read_gpr(rm);
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_lsl_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let shift = (cpu.read_gpr(rm) & 0xFF).min(32);
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let (result, carry) = if shift == 0 {
        (x, cpu.carry())
    } else {
        crate::semantics::lsl_c(x, shift)
    };
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), None, cpu.flags()));
    Ok(())
}

fn eval_lsr_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let shift = (cpu.read_gpr(rm) & 0xFF).min(32);
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let (result, carry) = if shift == 0 {
        (x, cpu.carry())
    } else {
        crate::semantics::lsr_c(x, shift)
    };
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), None, cpu.flags()));
    Ok(())
}

fn eval_asr_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let shift = (cpu.read_gpr(rm) & 0xFF).min(32);
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let (result, carry) = if shift == 0 {
        (x, cpu.carry())
    } else {
        crate::semantics::asr_c(x, shift)
    };
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), None, cpu.flags()));
    Ok(())
}

fn eval_adc(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32);
    let (result, carry, overflow) = add_with_carry(x, y, cpu.carry());
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_sbc(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, cpu.carry());
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_ror_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let shift = cpu.read_gpr(rm) & 0xFF;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let m = shift % 32;
    let (result, carry) = if shift == 0 {
        (x, cpu.carry())
    } else if m == 0 {
        (x, x.bit(31).unsigned() == 1)
    } else {
        crate::semantics::ror_c(x, m)
    };
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), None, cpu.flags()));
    Ok(())
}

fn eval_tst(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn) & cpu.read_gpr(rm);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_rsb(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rm) as u128, 32).invert();
    let zero = Bitstring::new(0, 32);
    let (result, carry, overflow) = add_with_carry(x, zero, true);
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_cmp_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_cmn(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32);
    let (result, carry, overflow) = add_with_carry(x, y, false);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_orr(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn) | cpu.read_gpr(rm);
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_mul(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn).wrapping_mul(cpu.read_gpr(rm));
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_bic(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = cpu.read_gpr(rdn) & !cpu.read_gpr(rm);
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn eval_mvn(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let result = !cpu.read_gpr(rm);
    cpu.write_gpr(rdn, result);
    cpu.set_flags(flags_from_result(result, None, None, cpu.flags()));
    Ok(())
}

fn shift_imm_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(field_u32(fields, "Rm")), imm(field_u32(fields, "imm5") as i64)]
}

fn eval_shift_imm(kind: crate::semantics::ShiftType) -> impl Fn(&Instruction, &mut Cpu, &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    move |i, cpu, _m| {
        let rd = i.field("Rd").unsigned() as usize;
        let rm = i.field("Rm").unsigned() as usize;
        let imm5 = i.field("imm5");
        let (_, amount) = crate::semantics::decode_imm_shift(match kind {
            crate::semantics::ShiftType::Lsl => 0b00,
            crate::semantics::ShiftType::Lsr => 0b01,
            crate::semantics::ShiftType::Asr => 0b10,
            _ => 0b00,
        }, imm5);
        let x = Bitstring::new(cpu.read_gpr(rm) as u128, 32);
        let (result, carry) = crate::semantics::shift_c(x, kind, amount, cpu.carry());
        cpu.write_gpr(rd, result.unsigned() as u32);
        cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), None, cpu.flags()));
        Ok(())
    }
}

fn eval_lsl_imm(i: &Instruction, cpu: &mut Cpu, m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    eval_shift_imm(crate::semantics::ShiftType::Lsl)(i, cpu, m)
}
fn eval_lsr_imm(i: &Instruction, cpu: &mut Cpu, m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    eval_shift_imm(crate::semantics::ShiftType::Lsr)(i, cpu, m)
}
fn eval_asr_imm(i: &Instruction, cpu: &mut Cpu, m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    eval_shift_imm(crate::semantics::ShiftType::Asr)(i, cpu, m)
}

fn three_reg_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(field_u32(fields, "Rn")), reg(field_u32(fields, "Rm"))]
}

fn three_reg_imm3_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rd")), reg(field_u32(fields, "Rn")), imm(field_u32(fields, "imm3") as i64)]
}

fn eval_add_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32);
    let (result, carry, overflow) = add_with_carry(x, y, false);
    cpu.write_gpr(rd, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_sub_reg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rn) as u128, 32);
    let y = Bitstring::new(cpu.read_gpr(rm) as u128, 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.write_gpr(rd, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_add_imm3(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rn) as u128, 32);
    let y = Bitstring::new(i.field("imm3").unsigned(), 32);
    let (result, carry, overflow) = add_with_carry(x, y, false);
    cpu.write_gpr(rd, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_sub_imm3(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = i.field("Rd").unsigned() as usize;
    let rn = i.field("Rn").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rn) as u128, 32);
    let y = Bitstring::new(i.field("imm3").unsigned(), 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.write_gpr(rd, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn rdn_imm8_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rdn")), imm(field_u32(fields, "imm8") as i64)]
}

fn eval_mov_imm8(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let value = i.field("imm8").unsigned() as u32;
    cpu.write_gpr(rdn, value);
    cpu.set_flags(flags_from_result(value, None, None, cpu.flags()));
    Ok(())
}

fn eval_cmp_imm8(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(i.field("imm8").unsigned(), 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_add_imm8(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(i.field("imm8").unsigned(), 32);
    let (result, carry, overflow) = add_with_carry(x, y, false);
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_sub_imm8(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = i.field("Rdn").unsigned() as usize;
    let x = Bitstring::new(cpu.read_gpr(rdn) as u128, 32);
    let y = Bitstring::new(i.field("imm8").unsigned(), 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.write_gpr(rdn, result.unsigned() as u32);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn hireg_full_index(dn: u32, low3: u32) -> u32 {
    (dn << 3) | low3
}

fn hireg_add_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let rdn = hireg_full_index(field_u32(fields, "DN"), field_u32(fields, "Rdn"));
    vec![reg(rdn), reg(field_u32(fields, "Rm"))]
}

fn eval_add_hireg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rdn = hireg_full_index(i.field("DN").unsigned() as u32, i.field("Rdn").unsigned() as u32) as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let lhs = if rdn == 15 { cpu.pc() + 4 } else { cpu.read_gpr(rdn) };
    let rhs = if rm == 15 { cpu.pc() + 4 } else { cpu.read_gpr(rm) };
    let result = lhs.wrapping_add(rhs);
    if rdn == 15 {
        cpu.set_pc(result & !1);
    } else {
        cpu.write_gpr(rdn, result);
    }
    Ok(())
}

fn eval_cmp_hireg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rn = hireg_full_index(i.field("DN").unsigned() as u32, i.field("Rdn").unsigned() as u32) as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let lhs = if rn == 15 { cpu.pc() + 4 } else { cpu.read_gpr(rn) };
    let rhs = if rm == 15 { cpu.pc() + 4 } else { cpu.read_gpr(rm) };
    let x = Bitstring::new(lhs as u128, 32);
    let y = Bitstring::new(rhs as u128, 32).invert();
    let (result, carry, overflow) = add_with_carry(x, y, true);
    cpu.set_flags(flags_from_result(result.unsigned() as u32, Some(carry), Some(overflow), cpu.flags()));
    Ok(())
}

fn eval_mov_hireg(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rd = hireg_full_index(i.field("DN").unsigned() as u32, i.field("Rdn").unsigned() as u32) as usize;
    let rm = i.field("Rm").unsigned() as usize;
    let value = if rm == 15 { cpu.pc() + 4 } else { cpu.read_gpr(rm) };
    if rd == 15 {
        cpu.set_pc(value & !1);
    } else {
        cpu.write_gpr(rd, value);
    }
    Ok(())
}

fn bx_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![reg(field_u32(fields, "Rm"))]
}

fn eval_bx(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rm = i.field("Rm").unsigned() as usize;
    let target = cpu.read_gpr(rm);
    cpu.set_pc(target & !1);
    Ok(())
}

fn eval_blx(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let rm = i.field("Rm").unsigned() as usize;
    let target = cpu.read_gpr(rm);
    let return_address = cpu.pc() + 2;
    cpu.set_lr(return_address | 1);
    cpu.set_pc(target & !1);
    Ok(())
}

/// All leaves contributed by this module.
pub fn leaves() -> Vec<LeafDef> {
    vec![
        alu_leaf!("AND", "0000", eval_and),
        alu_leaf!("EOR", "0001", eval_eor),
        alu_leaf!("LSL", "0010", eval_lsl_reg),
        alu_leaf!("LSR", "0011", eval_lsr_reg),
        alu_leaf!("ASR", "0100", eval_asr_reg),
        alu_leaf!("ADC", "0101", eval_adc),
        alu_leaf!("SBC", "0110", eval_sbc),
        alu_leaf!("ROR", "0111", eval_ror_reg),
        alu_leaf!("TST", "1000", eval_tst),
        alu_leaf!("RSB", "1001", eval_rsb),
        alu_leaf!("CMP", "1010", eval_cmp_reg),
        alu_leaf!("CMN", "1011", eval_cmn),
        alu_leaf!("ORR", "1100", eval_orr),
        alu_leaf!("MUL", "1101", eval_mul),
        alu_leaf!("BIC", "1110", eval_bic),
        alu_leaf!("MVN", "1111", eval_mvn),
        LeafDef { mnemonic: "LSL", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: shift_imm_operands, eval: eval_lsl_imm }
            .with_spec("00000imm5(5)Rm(3)Rd(3)"),
        LeafDef { mnemonic: "LSR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: shift_imm_operands, eval: eval_lsr_imm }
            .with_spec("00001imm5(5)Rm(3)Rd(3)"),
        LeafDef { mnemonic: "ASR", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: shift_imm_operands, eval: eval_asr_imm }
            .with_spec("00010imm5(5)Rm(3)Rd(3)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: three_reg_operands, eval: eval_add_reg }
            .with_spec("0001100Rm(3)Rn(3)Rd(3)"),
        LeafDef { mnemonic: "SUB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: three_reg_operands, eval: eval_sub_reg }
            .with_spec("0001101Rm(3)Rn(3)Rd(3)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: three_reg_imm3_operands, eval: eval_add_imm3 }
            .with_spec("0001110imm3(3)Rn(3)Rd(3)"),
        LeafDef { mnemonic: "SUB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: three_reg_imm3_operands, eval: eval_sub_imm3 }
            .with_spec("0001111imm3(3)Rn(3)Rd(3)"),
        LeafDef { mnemonic: "MOV", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rdn_imm8_operands, eval: eval_mov_imm8 }
            .with_spec("00100Rdn(3)imm8(8)"),
        LeafDef { mnemonic: "CMP", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rdn_imm8_operands, eval: eval_cmp_imm8 }
            .with_spec("00101Rdn(3)imm8(8)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rdn_imm8_operands, eval: eval_add_imm8 }
            .with_spec("00110Rdn(3)imm8(8)"),
        LeafDef { mnemonic: "SUB", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: rdn_imm8_operands, eval: eval_sub_imm8 }
            .with_spec("00111Rdn(3)imm8(8)"),
        LeafDef { mnemonic: "ADD", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: hireg_add_operands, eval: eval_add_hireg }
            .with_spec("01000100DN(1)Rm(4)Rdn(3)"),
        LeafDef { mnemonic: "CMP", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: hireg_add_operands, eval: eval_cmp_hireg }
            .with_spec("01000101DN(1)Rm(4)Rdn(3)"),
        LeafDef { mnemonic: "MOV", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: hireg_add_operands, eval: eval_mov_hireg }
            .with_spec("01000110DN(1)Rm(4)Rdn(3)"),
        LeafDef { mnemonic: "BX", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: bx_operands, eval: eval_bx }
            .with_spec("010001110Rm(4)000"),
        LeafDef { mnemonic: "BLX", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: bx_operands, eval: eval_blx }
            .with_spec("010001111Rm(4)000"),
    ]
}
