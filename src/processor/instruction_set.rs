//! MOS 6502 (2A03) instruction set.
//!
//! This module holds the 256-entry decode table and the register level
//! semantics of every operation. Operations here never touch memory: the CPU
//! resolves the operand, calls the function and stores the result back when
//! needed. This keeps flag computation testable on a bare register file.

use once_cell::sync::Lazy;

use crate::processor::instruction::{AddressingMode, Instruction, Operation};
use crate::processor::internal_cpu::InternalCpu;
use crate::processor::status_register::StatusRegisterFlag;
use crate::utils::bv;

use StatusRegisterFlag::*;

/// Magic constant ORed into the accumulator by the unstable ANE and LXA
/// opcodes. Real chips vary, 0xEE is the most common value.
const UNSTABLE_MAGIC: u8 = 0xEE;

static INSTRUCTION_SET: Lazy<InstructionSet> = Lazy::new(InstructionSet::new);

/// Decoded instruction for `opcode`
pub fn instruction(opcode: u8) -> &'static Instruction {
    &INSTRUCTION_SET.instructions[opcode as usize]
}

pub struct InstructionSet {
    instructions: [Instruction; 256],
}

macro_rules! instruction {
    ($opcode:expr, $name:expr, $operation:ident, $addr_mode:ident, $cycles:expr) => {
        Instruction {
            opcode: $opcode,
            name: $name,
            operation: Operation::$operation,
            addressing_mode: AddressingMode::$addr_mode,
            cycles: $cycles,
        }
    };
}

impl InstructionSet {
    fn new() -> Self {
        // Any slot left out of the listing decodes as a single byte NOP
        let mut instructions = [instruction!(0xEA, "NOP", Nop, Implied, 2); 256];
        for (opcode, slot) in instructions.iter_mut().enumerate() {
            slot.opcode = opcode as u8;
        }

        for instruction in Self::listing() {
            instructions[instruction.opcode as usize] = instruction;
        }

        Self { instructions }
    }

    #[rustfmt::skip]
    fn listing() -> [Instruction; 256] {
        [
            // 0x00 - 0x0F
            instruction!(0x00, "BRK", Brk, Immediate, 7),
            instruction!(0x01, "ORA", Ora, IndirectX, 6),
            instruction!(0x02, "JAM", Jam, Implied, 2),
            instruction!(0x03, "SLO", Slo, IndirectX, 8),
            instruction!(0x04, "NOP", Nop, ZeroPage, 3),
            instruction!(0x05, "ORA", Ora, ZeroPage, 3),
            instruction!(0x06, "ASL", Asl, ZeroPage, 5),
            instruction!(0x07, "SLO", Slo, ZeroPage, 5),
            instruction!(0x08, "PHP", Php, Implied, 3),
            instruction!(0x09, "ORA", Ora, Immediate, 2),
            instruction!(0x0A, "ASL", Asl, Implied, 2),
            instruction!(0x0B, "ANC", Anc, Immediate, 2),
            instruction!(0x0C, "NOP", Nop, Absolute, 4),
            instruction!(0x0D, "ORA", Ora, Absolute, 4),
            instruction!(0x0E, "ASL", Asl, Absolute, 6),
            instruction!(0x0F, "SLO", Slo, Absolute, 6),

            // 0x10 - 0x1F
            instruction!(0x10, "BPL", Bpl, Relative, 2),
            instruction!(0x11, "ORA", Ora, IndirectY, 5),
            instruction!(0x12, "JAM", Jam, Implied, 2),
            instruction!(0x13, "SLO", Slo, IndirectY, 8),
            instruction!(0x14, "NOP", Nop, ZeroPageX, 4),
            instruction!(0x15, "ORA", Ora, ZeroPageX, 4),
            instruction!(0x16, "ASL", Asl, ZeroPageX, 6),
            instruction!(0x17, "SLO", Slo, ZeroPageX, 6),
            instruction!(0x18, "CLC", Clc, Implied, 2),
            instruction!(0x19, "ORA", Ora, AbsoluteY, 4),
            instruction!(0x1A, "NOP", Nop, Implied, 2),
            instruction!(0x1B, "SLO", Slo, AbsoluteY, 7),
            instruction!(0x1C, "NOP", Nop, AbsoluteX, 4),
            instruction!(0x1D, "ORA", Ora, AbsoluteX, 4),
            instruction!(0x1E, "ASL", Asl, AbsoluteX, 7),
            instruction!(0x1F, "SLO", Slo, AbsoluteX, 7),

            // 0x20 - 0x2F
            instruction!(0x20, "JSR", Jsr, Absolute, 6),
            instruction!(0x21, "AND", And, IndirectX, 6),
            instruction!(0x22, "JAM", Jam, Implied, 2),
            instruction!(0x23, "RLA", Rla, IndirectX, 8),
            instruction!(0x24, "BIT", Bit, ZeroPage, 3),
            instruction!(0x25, "AND", And, ZeroPage, 3),
            instruction!(0x26, "ROL", Rol, ZeroPage, 5),
            instruction!(0x27, "RLA", Rla, ZeroPage, 5),
            instruction!(0x28, "PLP", Plp, Implied, 4),
            instruction!(0x29, "AND", And, Immediate, 2),
            instruction!(0x2A, "ROL", Rol, Implied, 2),
            instruction!(0x2B, "ANC", Anc, Immediate, 2),
            instruction!(0x2C, "BIT", Bit, Absolute, 4),
            instruction!(0x2D, "AND", And, Absolute, 4),
            instruction!(0x2E, "ROL", Rol, Absolute, 6),
            instruction!(0x2F, "RLA", Rla, Absolute, 6),

            // 0x30 - 0x3F
            instruction!(0x30, "BMI", Bmi, Relative, 2),
            instruction!(0x31, "AND", And, IndirectY, 5),
            instruction!(0x32, "JAM", Jam, Implied, 2),
            instruction!(0x33, "RLA", Rla, IndirectY, 8),
            instruction!(0x34, "NOP", Nop, ZeroPageX, 4),
            instruction!(0x35, "AND", And, ZeroPageX, 4),
            instruction!(0x36, "ROL", Rol, ZeroPageX, 6),
            instruction!(0x37, "RLA", Rla, ZeroPageX, 6),
            instruction!(0x38, "SEC", Sec, Implied, 2),
            instruction!(0x39, "AND", And, AbsoluteY, 4),
            instruction!(0x3A, "NOP", Nop, Implied, 2),
            instruction!(0x3B, "RLA", Rla, AbsoluteY, 7),
            instruction!(0x3C, "NOP", Nop, AbsoluteX, 4),
            instruction!(0x3D, "AND", And, AbsoluteX, 4),
            instruction!(0x3E, "ROL", Rol, AbsoluteX, 7),
            instruction!(0x3F, "RLA", Rla, AbsoluteX, 7),

            // 0x40 - 0x4F
            instruction!(0x40, "RTI", Rti, Implied, 6),
            instruction!(0x41, "EOR", Eor, IndirectX, 6),
            instruction!(0x42, "JAM", Jam, Implied, 2),
            instruction!(0x43, "SRE", Sre, IndirectX, 8),
            instruction!(0x44, "NOP", Nop, ZeroPage, 3),
            instruction!(0x45, "EOR", Eor, ZeroPage, 3),
            instruction!(0x46, "LSR", Lsr, ZeroPage, 5),
            instruction!(0x47, "SRE", Sre, ZeroPage, 5),
            instruction!(0x48, "PHA", Pha, Implied, 3),
            instruction!(0x49, "EOR", Eor, Immediate, 2),
            instruction!(0x4A, "LSR", Lsr, Implied, 2),
            instruction!(0x4B, "ALR", Alr, Immediate, 2),
            instruction!(0x4C, "JMP", Jmp, Absolute, 3),
            instruction!(0x4D, "EOR", Eor, Absolute, 4),
            instruction!(0x4E, "LSR", Lsr, Absolute, 6),
            instruction!(0x4F, "SRE", Sre, Absolute, 6),

            // 0x50 - 0x5F
            instruction!(0x50, "BVC", Bvc, Relative, 2),
            instruction!(0x51, "EOR", Eor, IndirectY, 5),
            instruction!(0x52, "JAM", Jam, Implied, 2),
            instruction!(0x53, "SRE", Sre, IndirectY, 8),
            instruction!(0x54, "NOP", Nop, ZeroPageX, 4),
            instruction!(0x55, "EOR", Eor, ZeroPageX, 4),
            instruction!(0x56, "LSR", Lsr, ZeroPageX, 6),
            instruction!(0x57, "SRE", Sre, ZeroPageX, 6),
            instruction!(0x58, "CLI", Cli, Implied, 2),
            instruction!(0x59, "EOR", Eor, AbsoluteY, 4),
            instruction!(0x5A, "NOP", Nop, Implied, 2),
            instruction!(0x5B, "SRE", Sre, AbsoluteY, 7),
            instruction!(0x5C, "NOP", Nop, AbsoluteX, 4),
            instruction!(0x5D, "EOR", Eor, AbsoluteX, 4),
            instruction!(0x5E, "LSR", Lsr, AbsoluteX, 7),
            instruction!(0x5F, "SRE", Sre, AbsoluteX, 7),

            // 0x60 - 0x6F
            instruction!(0x60, "RTS", Rts, Implied, 6),
            instruction!(0x61, "ADC", Adc, IndirectX, 6),
            instruction!(0x62, "JAM", Jam, Implied, 2),
            instruction!(0x63, "RRA", Rra, IndirectX, 8),
            instruction!(0x64, "NOP", Nop, ZeroPage, 3),
            instruction!(0x65, "ADC", Adc, ZeroPage, 3),
            instruction!(0x66, "ROR", Ror, ZeroPage, 5),
            instruction!(0x67, "RRA", Rra, ZeroPage, 5),
            instruction!(0x68, "PLA", Pla, Implied, 4),
            instruction!(0x69, "ADC", Adc, Immediate, 2),
            instruction!(0x6A, "ROR", Ror, Implied, 2),
            instruction!(0x6B, "ARR", Arr, Immediate, 2),
            instruction!(0x6C, "JMP", Jmp, Indirect, 5),
            instruction!(0x6D, "ADC", Adc, Absolute, 4),
            instruction!(0x6E, "ROR", Ror, Absolute, 6),
            instruction!(0x6F, "RRA", Rra, Absolute, 6),

            // 0x70 - 0x7F
            instruction!(0x70, "BVS", Bvs, Relative, 2),
            instruction!(0x71, "ADC", Adc, IndirectY, 5),
            instruction!(0x72, "JAM", Jam, Implied, 2),
            instruction!(0x73, "RRA", Rra, IndirectY, 8),
            instruction!(0x74, "NOP", Nop, ZeroPageX, 4),
            instruction!(0x75, "ADC", Adc, ZeroPageX, 4),
            instruction!(0x76, "ROR", Ror, ZeroPageX, 6),
            instruction!(0x77, "RRA", Rra, ZeroPageX, 6),
            instruction!(0x78, "SEI", Sei, Implied, 2),
            instruction!(0x79, "ADC", Adc, AbsoluteY, 4),
            instruction!(0x7A, "NOP", Nop, Implied, 2),
            instruction!(0x7B, "RRA", Rra, AbsoluteY, 7),
            instruction!(0x7C, "NOP", Nop, AbsoluteX, 4),
            instruction!(0x7D, "ADC", Adc, AbsoluteX, 4),
            instruction!(0x7E, "ROR", Ror, AbsoluteX, 7),
            instruction!(0x7F, "RRA", Rra, AbsoluteX, 7),

            // 0x80 - 0x8F
            instruction!(0x80, "NOP", Nop, Immediate, 2),
            instruction!(0x81, "STA", Sta, IndirectX, 6),
            instruction!(0x82, "NOP", Nop, Immediate, 2),
            instruction!(0x83, "SAX", Sax, IndirectX, 6),
            instruction!(0x84, "STY", Sty, ZeroPage, 3),
            instruction!(0x85, "STA", Sta, ZeroPage, 3),
            instruction!(0x86, "STX", Stx, ZeroPage, 3),
            instruction!(0x87, "SAX", Sax, ZeroPage, 3),
            instruction!(0x88, "DEY", Dey, Implied, 2),
            instruction!(0x89, "NOP", Nop, Immediate, 2),
            instruction!(0x8A, "TXA", Txa, Implied, 2),
            instruction!(0x8B, "ANE", Ane, Immediate, 2),
            instruction!(0x8C, "STY", Sty, Absolute, 4),
            instruction!(0x8D, "STA", Sta, Absolute, 4),
            instruction!(0x8E, "STX", Stx, Absolute, 4),
            instruction!(0x8F, "SAX", Sax, Absolute, 4),

            // 0x90 - 0x9F
            instruction!(0x90, "BCC", Bcc, Relative, 2),
            instruction!(0x91, "STA", Sta, IndirectY, 6),
            instruction!(0x92, "JAM", Jam, Implied, 2),
            instruction!(0x93, "SHA", Sha, IndirectY, 6),
            instruction!(0x94, "STY", Sty, ZeroPageX, 4),
            instruction!(0x95, "STA", Sta, ZeroPageX, 4),
            instruction!(0x96, "STX", Stx, ZeroPageY, 4),
            instruction!(0x97, "SAX", Sax, ZeroPageY, 4),
            instruction!(0x98, "TYA", Tya, Implied, 2),
            instruction!(0x99, "STA", Sta, AbsoluteY, 5),
            instruction!(0x9A, "TXS", Txs, Implied, 2),
            instruction!(0x9B, "TAS", Tas, AbsoluteY, 5),
            instruction!(0x9C, "SHY", Shy, AbsoluteX, 5),
            instruction!(0x9D, "STA", Sta, AbsoluteX, 5),
            instruction!(0x9E, "SHX", Shx, AbsoluteY, 5),
            instruction!(0x9F, "SHA", Sha, AbsoluteY, 5),

            // 0xA0 - 0xAF
            instruction!(0xA0, "LDY", Ldy, Immediate, 2),
            instruction!(0xA1, "LDA", Lda, IndirectX, 6),
            instruction!(0xA2, "LDX", Ldx, Immediate, 2),
            instruction!(0xA3, "LAX", Lax, IndirectX, 6),
            instruction!(0xA4, "LDY", Ldy, ZeroPage, 3),
            instruction!(0xA5, "LDA", Lda, ZeroPage, 3),
            instruction!(0xA6, "LDX", Ldx, ZeroPage, 3),
            instruction!(0xA7, "LAX", Lax, ZeroPage, 3),
            instruction!(0xA8, "TAY", Tay, Implied, 2),
            instruction!(0xA9, "LDA", Lda, Immediate, 2),
            instruction!(0xAA, "TAX", Tax, Implied, 2),
            instruction!(0xAB, "LXA", Lxa, Immediate, 2),
            instruction!(0xAC, "LDY", Ldy, Absolute, 4),
            instruction!(0xAD, "LDA", Lda, Absolute, 4),
            instruction!(0xAE, "LDX", Ldx, Absolute, 4),
            instruction!(0xAF, "LAX", Lax, Absolute, 4),

            // 0xB0 - 0xBF
            instruction!(0xB0, "BCS", Bcs, Relative, 2),
            instruction!(0xB1, "LDA", Lda, IndirectY, 5),
            instruction!(0xB2, "JAM", Jam, Implied, 2),
            instruction!(0xB3, "LAX", Lax, IndirectY, 5),
            instruction!(0xB4, "LDY", Ldy, ZeroPageX, 4),
            instruction!(0xB5, "LDA", Lda, ZeroPageX, 4),
            instruction!(0xB6, "LDX", Ldx, ZeroPageY, 4),
            instruction!(0xB7, "LAX", Lax, ZeroPageY, 4),
            instruction!(0xB8, "CLV", Clv, Implied, 2),
            instruction!(0xB9, "LDA", Lda, AbsoluteY, 4),
            instruction!(0xBA, "TSX", Tsx, Implied, 2),
            instruction!(0xBB, "LAS", Las, AbsoluteY, 4),
            instruction!(0xBC, "LDY", Ldy, AbsoluteX, 4),
            instruction!(0xBD, "LDA", Lda, AbsoluteX, 4),
            instruction!(0xBE, "LDX", Ldx, AbsoluteY, 4),
            instruction!(0xBF, "LAX", Lax, AbsoluteY, 4),

            // 0xC0 - 0xCF
            instruction!(0xC0, "CPY", Cpy, Immediate, 2),
            instruction!(0xC1, "CMP", Cmp, IndirectX, 6),
            instruction!(0xC2, "NOP", Nop, Immediate, 2),
            instruction!(0xC3, "DCP", Dcp, IndirectX, 8),
            instruction!(0xC4, "CPY", Cpy, ZeroPage, 3),
            instruction!(0xC5, "CMP", Cmp, ZeroPage, 3),
            instruction!(0xC6, "DEC", Dec, ZeroPage, 5),
            instruction!(0xC7, "DCP", Dcp, ZeroPage, 5),
            instruction!(0xC8, "INY", Iny, Implied, 2),
            instruction!(0xC9, "CMP", Cmp, Immediate, 2),
            instruction!(0xCA, "DEX", Dex, Implied, 2),
            instruction!(0xCB, "SBX", Sbx, Immediate, 2),
            instruction!(0xCC, "CPY", Cpy, Absolute, 4),
            instruction!(0xCD, "CMP", Cmp, Absolute, 4),
            instruction!(0xCE, "DEC", Dec, Absolute, 6),
            instruction!(0xCF, "DCP", Dcp, Absolute, 6),

            // 0xD0 - 0xDF
            instruction!(0xD0, "BNE", Bne, Relative, 2),
            instruction!(0xD1, "CMP", Cmp, IndirectY, 5),
            instruction!(0xD2, "JAM", Jam, Implied, 2),
            instruction!(0xD3, "DCP", Dcp, IndirectY, 8),
            instruction!(0xD4, "NOP", Nop, ZeroPageX, 4),
            instruction!(0xD5, "CMP", Cmp, ZeroPageX, 4),
            instruction!(0xD6, "DEC", Dec, ZeroPageX, 6),
            instruction!(0xD7, "DCP", Dcp, ZeroPageX, 6),
            instruction!(0xD8, "CLD", Cld, Implied, 2),
            instruction!(0xD9, "CMP", Cmp, AbsoluteY, 4),
            instruction!(0xDA, "NOP", Nop, Implied, 2),
            instruction!(0xDB, "DCP", Dcp, AbsoluteY, 7),
            instruction!(0xDC, "NOP", Nop, AbsoluteX, 4),
            instruction!(0xDD, "CMP", Cmp, AbsoluteX, 4),
            instruction!(0xDE, "DEC", Dec, AbsoluteX, 7),
            instruction!(0xDF, "DCP", Dcp, AbsoluteX, 7),

            // 0xE0 - 0xEF
            instruction!(0xE0, "CPX", Cpx, Immediate, 2),
            instruction!(0xE1, "SBC", Sbc, IndirectX, 6),
            instruction!(0xE2, "NOP", Nop, Immediate, 2),
            instruction!(0xE3, "ISB", Isb, IndirectX, 8),
            instruction!(0xE4, "CPX", Cpx, ZeroPage, 3),
            instruction!(0xE5, "SBC", Sbc, ZeroPage, 3),
            instruction!(0xE6, "INC", Inc, ZeroPage, 5),
            instruction!(0xE7, "ISB", Isb, ZeroPage, 5),
            instruction!(0xE8, "INX", Inx, Implied, 2),
            instruction!(0xE9, "SBC", Sbc, Immediate, 2),
            instruction!(0xEA, "NOP", Nop, Implied, 2),
            instruction!(0xEB, "SBC", Sbc, Immediate, 2),
            instruction!(0xEC, "CPX", Cpx, Absolute, 4),
            instruction!(0xED, "SBC", Sbc, Absolute, 4),
            instruction!(0xEE, "INC", Inc, Absolute, 6),
            instruction!(0xEF, "ISB", Isb, Absolute, 6),

            // 0xF0 - 0xFF
            instruction!(0xF0, "BEQ", Beq, Relative, 2),
            instruction!(0xF1, "SBC", Sbc, IndirectY, 5),
            instruction!(0xF2, "JAM", Jam, Implied, 2),
            instruction!(0xF3, "ISB", Isb, IndirectY, 8),
            instruction!(0xF4, "NOP", Nop, ZeroPageX, 4),
            instruction!(0xF5, "SBC", Sbc, ZeroPageX, 4),
            instruction!(0xF6, "INC", Inc, ZeroPageX, 6),
            instruction!(0xF7, "ISB", Isb, ZeroPageX, 6),
            instruction!(0xF8, "SED", Sed, Implied, 2),
            instruction!(0xF9, "SBC", Sbc, AbsoluteY, 4),
            instruction!(0xFA, "NOP", Nop, Implied, 2),
            instruction!(0xFB, "ISB", Isb, AbsoluteY, 7),
            instruction!(0xFC, "NOP", Nop, AbsoluteX, 4),
            instruction!(0xFD, "SBC", Sbc, AbsoluteX, 4),
            instruction!(0xFE, "INC", Inc, AbsoluteX, 7),
            instruction!(0xFF, "ISB", Isb, AbsoluteX, 7),
        ]
    }
}

// Transfer instructions

/// LDA - Load Accumulator with Memory
///
/// Operation:
/// M -> A
///
/// Status Register
/// N Z C I D V
/// + + - - - -
pub fn lda(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc = operand;
    cpu.sr.set_zn(cpu.acc);
}

/// LDX - Load Index X with Memory
pub fn ldx(cpu: &mut InternalCpu, operand: u8) {
    cpu.x_reg = operand;
    cpu.sr.set_zn(cpu.x_reg);
}

/// LDY - Load Index Y with Memory
pub fn ldy(cpu: &mut InternalCpu, operand: u8) {
    cpu.y_reg = operand;
    cpu.sr.set_zn(cpu.y_reg);
}

/// STA - Store Accumulator in Memory
///
/// Operation:
/// A -> M
pub fn sta(cpu: &InternalCpu) -> u8 {
    cpu.acc
}

/// STX - Store Index X in Memory
pub fn stx(cpu: &InternalCpu) -> u8 {
    cpu.x_reg
}

/// STY - Store Index Y in Memory
pub fn sty(cpu: &InternalCpu) -> u8 {
    cpu.y_reg
}

/// TAX - Transfer Accumulator to Index X
///
/// Status Register
/// N Z C I D V
/// + + - - - -
pub fn tax(cpu: &mut InternalCpu) {
    cpu.x_reg = cpu.acc;
    cpu.sr.set_zn(cpu.x_reg);
}

/// TAY - Transfer Accumulator to Index Y
pub fn tay(cpu: &mut InternalCpu) {
    cpu.y_reg = cpu.acc;
    cpu.sr.set_zn(cpu.y_reg);
}

/// TSX - Transfer Stack Pointer to Index X
pub fn tsx(cpu: &mut InternalCpu) {
    cpu.x_reg = cpu.sp;
    cpu.sr.set_zn(cpu.x_reg);
}

/// TXA - Transfer Index X to Accumulator
pub fn txa(cpu: &mut InternalCpu) {
    cpu.acc = cpu.x_reg;
    cpu.sr.set_zn(cpu.acc);
}

/// TXS - Transfer Index X to Stack Pointer
///
/// The only transfer that doesn't touch the status register
pub fn txs(cpu: &mut InternalCpu) {
    cpu.sp = cpu.x_reg;
}

/// TYA - Transfer Index Y to Accumulator
pub fn tya(cpu: &mut InternalCpu) {
    cpu.acc = cpu.y_reg;
    cpu.sr.set_zn(cpu.acc);
}

// Decrements and increments

/// DEC - Decrement Memory by One
///
/// Operation:
/// M - 1 -> M
///
/// Status Register
/// N Z C I D V
/// + + - - - -
pub fn dec(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand.wrapping_sub(1);
    cpu.sr.set_zn(result);
    result
}

/// DEX - Decrement Index X by One
pub fn dex(cpu: &mut InternalCpu) {
    cpu.x_reg = cpu.x_reg.wrapping_sub(1);
    cpu.sr.set_zn(cpu.x_reg);
}

/// DEY - Decrement Index Y by One
pub fn dey(cpu: &mut InternalCpu) {
    cpu.y_reg = cpu.y_reg.wrapping_sub(1);
    cpu.sr.set_zn(cpu.y_reg);
}

/// INC - Increment Memory by One
pub fn inc(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand.wrapping_add(1);
    cpu.sr.set_zn(result);
    result
}

/// INX - Increment Index X by One
pub fn inx(cpu: &mut InternalCpu) {
    cpu.x_reg = cpu.x_reg.wrapping_add(1);
    cpu.sr.set_zn(cpu.x_reg);
}

/// INY - Increment Index Y by One
pub fn iny(cpu: &mut InternalCpu) {
    cpu.y_reg = cpu.y_reg.wrapping_add(1);
    cpu.sr.set_zn(cpu.y_reg);
}

// Arithmetic operations

/// ADC - Add Memory to Accumulator with Carry
///
/// Operation:
/// A + M + C -> A, C
///
/// Status Register:
/// N Z C I D V
/// + + + - - +
///
/// Overflow is set when both operands share a sign the result doesn't have
pub fn adc(cpu: &mut InternalCpu, operand: u8) {
    let carry = cpu.sr.get(Carry) as u16;
    let temp = cpu.acc as u16 + operand as u16 + carry;
    let result = temp as u8;
    let overflow = (!(cpu.acc ^ operand) & (cpu.acc ^ result)) & 0x80 != 0;

    cpu.sr.set_value(Carry, temp > 0xFF);
    cpu.sr.set_value(Overflow, overflow);
    cpu.acc = result;
    cpu.sr.set_zn(cpu.acc);
}

/// SBC - Substract Memory from Accumulator with Borrow
///
/// Operation:
/// A - M - (1 - C) -> A
///
/// Status Register:
/// N Z C I D V
/// + + + - - +
///
/// Decimal mode doesn't exist on the 2A03, so subtraction is addition of the
/// one's complement.
pub fn sbc(cpu: &mut InternalCpu, operand: u8) {
    adc(cpu, operand ^ 0xFF);
}

// Logical operations

/// AND - AND Memory with Accumulator
///
/// Operation:
/// A AND M -> A
pub fn and(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc &= operand;
    cpu.sr.set_zn(cpu.acc);
}

/// EOR - Exclusive-OR Memory with Accumulator
pub fn eor(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc ^= operand;
    cpu.sr.set_zn(cpu.acc);
}

/// ORA - OR Memory with Accumulator
pub fn ora(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc |= operand;
    cpu.sr.set_zn(cpu.acc);
}

// Shift and rotation instructions

/// ASL - Shift Left One Bit (Memory or Accumulator)
///
/// Operation:
/// C <- [76543210] <- 0
///
/// Status Register:
/// N Z C I D V
/// + + + - - -
pub fn asl(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand << 1;
    cpu.sr.set_value(Carry, bv(operand, 7) != 0);
    cpu.sr.set_zn(result);
    result
}

/// LSR - Shift One Bit Right (Memory or Accumulator)
///
/// Operation:
/// 0 -> [76543210] -> C
pub fn lsr(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand >> 1;
    cpu.sr.set_value(Carry, bv(operand, 0) != 0);
    cpu.sr.set_zn(result);
    result
}

/// ROL - Rotate One Bit Left (Memory or Accumulator)
///
/// Operation:
/// C <- [76543210] <- C
pub fn rol(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = (operand << 1) | cpu.sr.get(Carry) as u8;
    cpu.sr.set_value(Carry, bv(operand, 7) != 0);
    cpu.sr.set_zn(result);
    result
}

/// ROR - Rotate One Bit Right (Memory or Accumulator)
///
/// Operation:
/// C -> [76543210] -> C
pub fn ror(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = (operand >> 1) | ((cpu.sr.get(Carry) as u8) << 7);
    cpu.sr.set_value(Carry, bv(operand, 0) != 0);
    cpu.sr.set_zn(result);
    result
}

// Flag instructions

pub fn clc(cpu: &mut InternalCpu) {
    cpu.sr.clear(Carry);
}

/// CLD - Clear Decimal Mode. The flag exists even if the ALU ignores it
pub fn cld(cpu: &mut InternalCpu) {
    cpu.sr.clear(Decimal);
}

pub fn cli(cpu: &mut InternalCpu) {
    cpu.sr.clear(InterruptDisable);
}

pub fn clv(cpu: &mut InternalCpu) {
    cpu.sr.clear(Overflow);
}

pub fn sec(cpu: &mut InternalCpu) {
    cpu.sr.set(Carry);
}

pub fn sed(cpu: &mut InternalCpu) {
    cpu.sr.set(Decimal);
}

pub fn sei(cpu: &mut InternalCpu) {
    cpu.sr.set(InterruptDisable);
}

// Comparisons

/// Shared compare logic: Carry is set when `register >= operand`, the
/// inverse of the borrow a subtraction would produce
pub fn generic_cmp(cpu: &mut InternalCpu, register: u8, operand: u8) {
    let result = register.wrapping_sub(operand);
    cpu.sr.set_value(Carry, register >= operand);
    cpu.sr.set_zn(result);
}

/// CMP - Compare Memory with Accumulator
///
/// Operation:
/// A - M
///
/// Status Register:
/// N Z C I D V
/// + + + - - -
pub fn cmp(cpu: &mut InternalCpu, operand: u8) {
    let register = cpu.acc;
    generic_cmp(cpu, register, operand);
}

/// CPX - Compare Memory and Index X
pub fn cpx(cpu: &mut InternalCpu, operand: u8) {
    let register = cpu.x_reg;
    generic_cmp(cpu, register, operand);
}

/// CPY - Compare Memory and Index Y
pub fn cpy(cpu: &mut InternalCpu, operand: u8) {
    let register = cpu.y_reg;
    generic_cmp(cpu, register, operand);
}

// Conditional branches

/// Whether a branch operation is taken with the current status register.
/// Non branch operations never branch.
pub fn branch_taken(cpu: &InternalCpu, operation: Operation) -> bool {
    match operation {
        Operation::Bcc => !cpu.sr.get(Carry),
        Operation::Bcs => cpu.sr.get(Carry),
        Operation::Beq => cpu.sr.get(Zero),
        Operation::Bne => !cpu.sr.get(Zero),
        Operation::Bmi => cpu.sr.get(Negative),
        Operation::Bpl => !cpu.sr.get(Negative),
        Operation::Bvc => !cpu.sr.get(Overflow),
        Operation::Bvs => cpu.sr.get(Overflow),
        _ => false,
    }
}

// Other

/// BIT - Test Bits in Memory with Accumulator
///
/// bits 7 and 6 of operand are transfered to bit 7 and 6 of SR
/// (N,V); the zero-flag is set to the result of operand AND
/// accumulator.
///
/// Status Register:
///  N Z C I D V
/// M7 + - - - M6
pub fn bit(cpu: &mut InternalCpu, operand: u8) {
    let res = cpu.acc & operand;
    cpu.sr.set_value(Negative, bv(operand, 7) != 0);
    cpu.sr.set_value(Overflow, bv(operand, 6) != 0);
    cpu.sr.set_value(Zero, res == 0);
}

// Undocumented instructions

/// LAX - LDA and LDX at once
pub fn lax(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc = operand;
    cpu.x_reg = operand;
    cpu.sr.set_zn(operand);
}

/// SAX - Store A AND X, no flags
pub fn sax(cpu: &InternalCpu) -> u8 {
    cpu.acc & cpu.x_reg
}

/// DCP - DEC memory then CMP with accumulator
pub fn dcp(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand.wrapping_sub(1);
    cmp(cpu, result);
    result
}

/// ISB (ISC) - INC memory then SBC from accumulator
pub fn isb(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = operand.wrapping_add(1);
    sbc(cpu, result);
    result
}

/// SLO - ASL memory then ORA with accumulator
pub fn slo(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = asl(cpu, operand);
    ora(cpu, result);
    result
}

/// RLA - ROL memory then AND with accumulator
pub fn rla(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = rol(cpu, operand);
    and(cpu, result);
    result
}

/// SRE - LSR memory then EOR with accumulator
pub fn sre(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = lsr(cpu, operand);
    eor(cpu, result);
    result
}

/// RRA - ROR memory then ADC with accumulator. ADC consumes the carry ROR
/// just produced
pub fn rra(cpu: &mut InternalCpu, operand: u8) -> u8 {
    let result = ror(cpu, operand);
    adc(cpu, result);
    result
}

/// ANC - AND immediate, bit 7 of the result copied into Carry
pub fn anc(cpu: &mut InternalCpu, operand: u8) {
    and(cpu, operand);
    cpu.sr.set_value(Carry, cpu.sr.get(Negative));
}

/// ALR (ASR) - AND immediate then LSR accumulator
pub fn alr(cpu: &mut InternalCpu, operand: u8) {
    let value = cpu.acc & operand;
    cpu.acc = lsr(cpu, value);
}

/// ARR - AND immediate then ROR accumulator, with Carry and Overflow taken
/// from bits 6 and 5 of the result
pub fn arr(cpu: &mut InternalCpu, operand: u8) {
    let value = cpu.acc & operand;
    let result = (value >> 1) | ((cpu.sr.get(Carry) as u8) << 7);
    cpu.acc = result;
    cpu.sr.set_zn(result);
    cpu.sr.set_value(Carry, bv(result, 6) != 0);
    cpu.sr.set_value(Overflow, (bv(result, 6) ^ bv(result, 5)) != 0);
}

/// ANE (XAA) - (A OR magic) AND X AND immediate -> A
pub fn ane(cpu: &mut InternalCpu, operand: u8) {
    cpu.acc = (cpu.acc | UNSTABLE_MAGIC) & cpu.x_reg & operand;
    cpu.sr.set_zn(cpu.acc);
}

/// LXA - (A OR magic) AND immediate -> A, X
pub fn lxa(cpu: &mut InternalCpu, operand: u8) {
    let value = (cpu.acc | UNSTABLE_MAGIC) & operand;
    cpu.acc = value;
    cpu.x_reg = value;
    cpu.sr.set_zn(value);
}

/// SBX (AXS) - (A AND X) - immediate -> X, Carry like CMP
pub fn sbx(cpu: &mut InternalCpu, operand: u8) {
    let value = cpu.acc & cpu.x_reg;
    generic_cmp(cpu, value, operand);
    cpu.x_reg = value.wrapping_sub(operand);
}

/// LAS - memory AND SP -> A, X, SP
pub fn las(cpu: &mut InternalCpu, operand: u8) {
    let value = operand & cpu.sp;
    cpu.acc = value;
    cpu.x_reg = value;
    cpu.sp = value;
    cpu.sr.set_zn(value);
}
