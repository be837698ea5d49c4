pub type Opcode = u8;

/// One entry of the 256-slot decode table. Entries are plain data, the CPU
/// interprets them with a single `match` over [`Operation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub name: &'static str,
    pub operation: Operation,
    pub addressing_mode: AddressingMode,
    pub cycles: u8,
}

impl Instruction {
    /// Instruction size in bytes, opcode included
    pub fn bytes(&self) -> u16 {
        1 + self.addressing_mode.operand_bytes()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,   // Implied Addressing (accumulator operand for shifts)
    Immediate, // Immediate Addressing
    ZeroPage,  // Zero Page Addressing
    ZeroPageX, // Zero Page Indexed Addressing (X)
    ZeroPageY, // Zero Page Indexed Addressing (Y)
    Relative,  // Relative Addressing (branch operations)
    Absolute,  // Absoulute Addressing
    AbsoluteX, // Absoulute Indexed Addressing (X)
    AbsoluteY, // Absoulute Indexed Addressing (Y)
    Indirect,  // Indirect Addressing (jump operations)
    IndirectX, // Zero Page Indexed Indirect Addressing (X)
    IndirectY, // Zero Page Indirect Indexed Addressing (Y)
}

impl AddressingMode {
    pub fn operand_bytes(self) -> u16 {
        match self {
            AddressingMode::Implied => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Short tag used in disassembly listings
    pub fn tag(self) -> &'static str {
        match self {
            AddressingMode::Implied => "IMP",
            AddressingMode::Immediate => "IMM",
            AddressingMode::ZeroPage => "ZP0",
            AddressingMode::ZeroPageX => "ZPX",
            AddressingMode::ZeroPageY => "ZPY",
            AddressingMode::Relative => "REL",
            AddressingMode::Absolute => "ABS",
            AddressingMode::AbsoluteX => "ABX",
            AddressingMode::AbsoluteY => "ABY",
            AddressingMode::Indirect => "IND",
            AddressingMode::IndirectX => "IZX",
            AddressingMode::IndirectY => "IZY",
        }
    }
}

/// Every operation the 2A03 core executes, documented or not
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    // Transfer
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,

    // Stack
    Pha,
    Php,
    Pla,
    Plp,

    // Decrements and increments
    Dec,
    Dex,
    Dey,
    Inc,
    Inx,
    Iny,

    // Arithmetic
    Adc,
    Sbc,

    // Logical
    And,
    Eor,
    Ora,

    // Shift and rotation
    Asl,
    Lsr,
    Rol,
    Ror,

    // Flags
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,

    // Comparisons
    Cmp,
    Cpx,
    Cpy,

    // Branches
    Bcc,
    Bcs,
    Beq,
    Bmi,
    Bne,
    Bpl,
    Bvc,
    Bvs,

    // Jumps, subroutines and interrupts
    Jmp,
    Jsr,
    Rts,
    Brk,
    Rti,

    // Other
    Bit,
    Nop,

    // Undocumented
    Lax,
    Sax,
    Dcp,
    Isb,
    Slo,
    Rla,
    Sre,
    Rra,
    Anc,
    Alr,
    Arr,
    Ane,
    Lxa,
    Sbx,
    Sha,
    Shx,
    Shy,
    Tas,
    Las,
    Jam,
}

impl Operation {
    /// Whether the operation pays an extra cycle when its indexed operand
    /// crosses a page. Stores and read-modify-write operations always pay it
    /// and have it included in their base cycle count
    pub fn page_cross_penalty(self) -> bool {
        matches!(
            self,
            Operation::Lda
                | Operation::Ldx
                | Operation::Ldy
                | Operation::Adc
                | Operation::Sbc
                | Operation::And
                | Operation::Eor
                | Operation::Ora
                | Operation::Cmp
                | Operation::Lax
                | Operation::Las
                | Operation::Nop
        )
    }
}
