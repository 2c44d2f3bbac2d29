//! Renders a decoded [`Instruction`] as disassembly text.
//!
//! Grounded on `cmdis/formatter.py`'s `Formatter.format`/`Operand.format`
//! double-dispatch shape, with the column layout and hex-bytes prefix
//! adapted from the teacher's `impl fmt::Display for ThumbInstruction`
//! (`thumbinstruction/display.rs`).

use std::fmt::Write as _;

use crate::instruction::Instruction;
use crate::operand::{BarrierOperand, Operand, SpecialRegister, SpecialRegisterMask};

/// Formats decoded instructions into disassembly lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct Formatter {
    /// When true, a leading `hex bytes` column is emitted before the
    /// mnemonic (matching `objdump`-style listings); off by default since
    /// the bytes are already implicit in `Instruction::raw`.
    pub show_bytes: bool,
}

impl Formatter {
    /// Builds a formatter with default settings (no hex-bytes column).
    pub fn new() -> Formatter {
        Formatter::default()
    }

    /// Renders one instruction as a single line, with no trailing newline.
    pub fn format(&self, instr: &Instruction) -> String {
        let mut out = String::new();

        if self.show_bytes {
            let bytes = if instr.is_wide {
                format!("{:08x}", instr.raw)
            } else {
                format!("{:04x}", instr.raw)
            };
            let _ = write!(out, "{bytes:<10}");
        }

        let operand_strs: Vec<String> = instr.operands.iter().map(|o| self.format_operand(o, instr)).collect();
        if operand_strs.is_empty() {
            let _ = write!(out, "{:<12}", instr.mnemonic);
        } else {
            let _ = write!(out, "{:<12} {:<8}", instr.mnemonic, operand_strs.join(", "));
        }

        out.trim_end().to_string()
    }

    fn format_operand(&self, operand: &Operand, _instr: &Instruction) -> String {
        match operand {
            Operand::Register(r) => {
                let name = gpr_name(r.reg);
                if r.writeback { format!("{name}!") } else { name.to_string() }
            }
            Operand::RegList(list) => format!("{{{}}}", format_reglist(&list.registers)),
            Operand::Immediate(imm) => {
                if imm.value == 0 {
                    String::new()
                } else if imm.value.unsigned_abs() > 9 {
                    format!("#{} ; {:#x}", imm.value, imm.value)
                } else {
                    format!("#{}", imm.value)
                }
            }
            Operand::Label(label) => {
                let sign = if label.offset >= 0 { "+" } else { "-" };
                format!(".{}{} ; {:#010x}", sign, label.offset.abs(), label.target)
            }
            Operand::Shift(shift) => {
                let name = match shift.kind {
                    crate::semantics::ShiftType::Lsl => "lsl",
                    crate::semantics::ShiftType::Lsr => "lsr",
                    crate::semantics::ShiftType::Asr => "asr",
                    crate::semantics::ShiftType::Ror => "ror",
                    crate::semantics::ShiftType::Rrx => "rrx",
                };
                if matches!(shift.kind, crate::semantics::ShiftType::Rrx) {
                    name.to_string()
                } else {
                    format!("{name} #{}", shift.amount)
                }
            }
            Operand::Memory(mem) => {
                let base = gpr_name(mem.base);
                if mem.postindexed {
                    let off = mem.offset.map(|o| format!("#{o}")).unwrap_or_default();
                    format!("[{base}], {off}")
                } else if let Some(off) = mem.offset {
                    if off == 0 {
                        format!("[{base}]{}", if mem.preindexed { "!" } else { "" })
                    } else {
                        format!("[{base}, #{off}]{}", if mem.preindexed { "!" } else { "" })
                    }
                } else if let Some(reg) = mem.offset_reg {
                    format!("[{base}, {}]{}", gpr_name(reg), if mem.preindexed { "!" } else { "" })
                } else {
                    format!("[{base}]")
                }
            }
            Operand::Special(reg) => format_special_register(*reg),
            Operand::Barrier(b) => match b {
                BarrierOperand::Sy => "sy".to_string(),
                BarrierOperand::Raw(v) => format!("#{v}"),
            },
            Operand::ConditionName(name) => name.to_string(),
        }
    }
}

fn gpr_name(reg: u32) -> String {
    match reg {
        13 => "sp".to_string(),
        14 => "lr".to_string(),
        15 => "pc".to_string(),
        n => format!("r{n}"),
    }
}

/// Collapses an ascending register list into comma-joined entries, with
/// contiguous runs of 3+ registers rendered as `Rm-Rn`.
fn format_reglist(registers: &[u32]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < registers.len() {
        let start = registers[i];
        let mut end = start;
        let mut j = i + 1;
        while j < registers.len() && registers[j] == end + 1 {
            end = registers[j];
            j += 1;
        }
        if end - start >= 2 {
            parts.push(format!("{}-{}", gpr_name(start), gpr_name(end)));
        } else {
            for r in start..=end {
                parts.push(gpr_name(r));
            }
        }
        i = j;
    }
    parts.join(", ")
}

fn format_special_register(reg: SpecialRegister) -> String {
    fn mask_suffix(mask: SpecialRegisterMask) -> &'static str {
        match mask {
            SpecialRegisterMask::None => "",
            SpecialRegisterMask::Nzcvq => "_nzcvq",
            SpecialRegisterMask::G => "_g",
            SpecialRegisterMask::Nzcvqg => "_nzcvqg",
        }
    }
    match reg {
        SpecialRegister::Apsr(m) => format!("apsr{}", mask_suffix(m)),
        SpecialRegister::Ipsr => "ipsr".to_string(),
        SpecialRegister::Epsr => "epsr".to_string(),
        SpecialRegister::Xpsr(m) => format!("xpsr{}", mask_suffix(m)),
        SpecialRegister::Iepsr => "iepsr".to_string(),
        SpecialRegister::Msp => "msp".to_string(),
        SpecialRegister::Psp => "psp".to_string(),
        SpecialRegister::Primask => "primask".to_string(),
        SpecialRegister::Basepri => "basepri".to_string(),
        SpecialRegister::BasepriMax => "basepri_max".to_string(),
        SpecialRegister::Faultmask => "faultmask".to_string(),
        SpecialRegister::Control => "control".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::{ImmediateOperand, RegListOperand, RegisterOperand};

    fn dummy_eval(_: &Instruction, _: &mut crate::cpu::Cpu, _: &mut dyn crate::memory::MemoryBackend) -> Result<(), crate::error::CmthumbError> {
        Ok(())
    }

    fn make(mnemonic: &'static str, operands: Vec<Operand>) -> Instruction {
        Instruction {
            mnemonic,
            address: 0,
            raw: 0,
            is_wide: false,
            fields: Default::default(),
            operands,
            eval: dummy_eval,
        }
    }

    #[test]
    fn no_operands_has_no_trailing_spaces() {
        let fmt = Formatter::new();
        let instr = make("NOP", vec![]);
        assert_eq!(fmt.format(&instr), "NOP");
    }

    #[test]
    fn register_list_collapses_contiguous_run() {
        let fmt = Formatter::new();
        let instr = make("PUSH", vec![Operand::RegList(RegListOperand { registers: vec![1, 2, 3, 4, 7] })]);
        let rendered = fmt.format(&instr);
        assert!(rendered.starts_with("PUSH"));
        assert!(rendered.trim().ends_with("{r1-r4, r7}"));
    }

    #[test]
    fn zero_immediate_is_elided() {
        let fmt = Formatter::new();
        let instr = make("ADD", vec![
            Operand::Register(RegisterOperand { reg: 0, writeback: false }),
            Operand::Immediate(ImmediateOperand { value: 0 }),
        ]);
        assert!(!fmt.format(&instr).contains('#'));
    }

    #[test]
    fn large_immediate_gets_hex_comment() {
        let fmt = Formatter::new();
        let instr = make("MOV", vec![Operand::Immediate(ImmediateOperand { value: 200 })]);
        assert!(fmt.format(&instr).contains("; 0xc8"));
    }

    #[test]
    fn special_register_apsr_nzcvq_suffix() {
        assert_eq!(format_special_register(SpecialRegister::Apsr(SpecialRegisterMask::Nzcvq)), "apsr_nzcvq");
    }
}
