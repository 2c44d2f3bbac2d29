//! Branch family: `UDF`, conditional branch, `SVC`, unconditional branch,
//! and the wide `BL` encoding.
//!
//! Grounded on the teacher's `B`/`Bl`/`Swi` handlers
//! (`thumbinstruction/mod.rs`), condition evaluation from
//! [`crate::condition`], and the `BL_T1` S/J1/J2/imm10/imm11 assembly from
//! `cmdis/instructions.py`. `UDF` claims the reserved `cond == 0b1110`
//! slot of the conditional-branch encoding ahead of the generic `B<c>`
//! leaf, so `Condition::decode` never actually has to reject that pattern
//! in practice.

use std::collections::HashMap;

use crate::bitstring::Bitstring;
use crate::condition::Condition;
use crate::cpu::Cpu;
use crate::decoder::LeafDef;
use crate::error::CmthumbError;
use crate::handlers::support::*;
use crate::instruction::Instruction;
use crate::memory::MemoryBackend;
use crate::operand::{LabelOperand, Operand};

fn cond_branch_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let cond = Condition::decode(fields.get("cond").unwrap()).unwrap_or(Condition::Al);
    let imm8 = fields.get("imm8").unwrap().clone().sign_extend(9);
    let offset = (imm8.unsigned() as i32) << 1;
    vec![Operand::ConditionName(cond.mnemonic()), Operand::Label(LabelOperand { offset, target: 0 })]
}

fn eval_b_cond(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let cond = Condition::decode(&i.field("cond"))?;
    if !cond.check(cpu.flags()) {
        return Ok(());
    }
    let imm8 = i.field("imm8").sign_extend(9);
    let offset = (imm8.unsigned() as i32) << 1;
    let target = (cpu.pc() + 4).wrapping_add(offset as u32);
    cpu.set_pc(target);
    Ok(())
}

fn udf_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![imm(field_u32(fields, "imm8") as i64)]
}

fn eval_udf(i: &Instruction, _cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    Err(CmthumbError::Undefined(i.raw))
}

fn svc_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    vec![imm(field_u32(fields, "imm8") as i64)]
}

fn eval_svc(i: &Instruction, _cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let _ = i.field("imm8");
    Ok(())
}

fn b_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let imm11 = fields.get("imm11").unwrap().clone().sign_extend(12);
    let offset = (imm11.unsigned() as i32) << 1;
    vec![Operand::Label(LabelOperand { offset, target: 0 })]
}

fn eval_b(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let imm11 = i.field("imm11").sign_extend(12);
    let offset = (imm11.unsigned() as i32) << 1;
    let target = (cpu.pc() + 4).wrapping_add(offset as u32);
    cpu.set_pc(target);
    Ok(())
}

fn bl_operands(fields: &HashMap<String, Bitstring>) -> Vec<Operand> {
    let offset = bl_offset(fields);
    vec![Operand::Label(LabelOperand { offset, target: 0 })]
}

fn bl_offset(fields: &HashMap<String, Bitstring>) -> i32 {
    let s = field_u32(fields, "S");
    let j1 = field_u32(fields, "J1");
    let j2 = field_u32(fields, "J2");
    let imm10 = field_u32(fields, "imm10");
    let imm11 = field_u32(fields, "imm11");
    let i1 = 1 - (j1 ^ s);
    let i2 = 1 - (j2 ^ s);
    let imm25 = (s << 24) | (i1 << 23) | (i2 << 22) | (imm10 << 12) | (imm11 << 1);
    let signed = Bitstring::new(imm25 as u128, 25).sign_extend(32);
    signed.signed() as i32
}

fn eval_bl(i: &Instruction, cpu: &mut Cpu, _m: &mut dyn MemoryBackend) -> Result<(), CmthumbError> {
    let offset = bl_offset(&i.fields);
    let next = cpu.pc() + 4;
    cpu.set_lr(next | 1);
    cpu.set_pc(next.wrapping_add(offset as u32));
    Ok(())
}

/// All leaves contributed by this module.
pub fn leaves() -> Vec<LeafDef> {
    vec![
        LeafDef { mnemonic: "UDF", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: udf_operands, eval: eval_udf }
            .with_spec("11011110imm8(8)"),
        LeafDef { mnemonic: "B", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: cond_branch_operands, eval: eval_b_cond }
            .with_spec("1101cond(4)imm8(8)"),
        LeafDef { mnemonic: "SVC", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: svc_operands, eval: eval_svc }
            .with_spec("11011111imm8(8)"),
        LeafDef { mnemonic: "B", is_wide: false, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: b_operands, eval: eval_b }
            .with_spec("11100imm11(11)"),
        LeafDef { mnemonic: "BL", is_wide: true, mask: 0, match_bits: 0, field_ranges: vec![], build_operands: bl_operands, eval: eval_bl }
            .with_wide_spec("11110S(1)imm10(10)", "11J1(1)1J2(1)imm11(11)"),
    ]
}
