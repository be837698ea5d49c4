//! Disassembler
//!
//! Turns a region of the CPU address space into one text line per
//! instruction, keyed by the address of the instruction. Memory is read with
//! [`Bus::peek`] so disassembling never disturbs the running system.

use std::collections::BTreeMap;

use crate::interfaces::Bus;
use crate::processor::instruction::{AddressingMode, Instruction};
use crate::processor::instruction_set;

/// Disassemble every instruction starting between `start` and `end`
/// (inclusive). Lines look like `$C000: LDA #$10 {IMM}`
pub fn disassemble(bus: &impl Bus, start: u16, end: u16) -> BTreeMap<u16, String> {
    let mut lines = BTreeMap::new();
    let mut address = start as u32;

    while address <= end as u32 {
        let line_address = address as u16;
        let instruction = instruction_set::instruction(bus.peek(line_address));
        let line = format_instruction(bus, line_address, instruction);
        lines.insert(line_address, line);

        address += instruction.bytes() as u32;
    }

    lines
}

/// Disassembly of the single instruction at `address`
pub fn disassemble_one(bus: &impl Bus, address: u16) -> String {
    let instruction = instruction_set::instruction(bus.peek(address));
    format_instruction(bus, address, instruction)
}

fn format_instruction(bus: &impl Bus, address: u16, instruction: &Instruction) -> String {
    let low = bus.peek(address.wrapping_add(1));
    let high = bus.peek(address.wrapping_add(2));
    let word = u16::from_le_bytes([low, high]);

    let operand = match instruction.addressing_mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Immediate => format!("#${low:02X}"),
        AddressingMode::ZeroPage => format!("${low:02X}"),
        AddressingMode::ZeroPageX => format!("${low:02X}, X"),
        AddressingMode::ZeroPageY => format!("${low:02X}, Y"),
        AddressingMode::IndirectX => format!("(${low:02X}, X)"),
        AddressingMode::IndirectY => format!("(${low:02X}), Y"),
        AddressingMode::Absolute => format!("${word:04X}"),
        AddressingMode::AbsoluteX => format!("${word:04X}, X"),
        AddressingMode::AbsoluteY => format!("${word:04X}, Y"),
        AddressingMode::Indirect => format!("(${word:04X})"),
        AddressingMode::Relative => {
            let target = address
                .wrapping_add(2)
                .wrapping_add(low as i8 as u16);
            format!("${low:02X} [${target:04X}]")
        }
    };

    let tag = instruction.addressing_mode.tag();
    if operand.is_empty() {
        format!("${address:04X}: {} {{{tag}}}", instruction.name)
    } else {
        format!("${address:04X}: {} {operand} {{{tag}}}", instruction.name)
    }
}
