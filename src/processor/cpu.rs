#[cfg(test)]
mod tests;

use log::{trace, warn};

use crate::hardware::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, STACK_BASE};
use crate::interfaces::Bus;
use crate::processor::instruction::{AddressingMode, Instruction, Operation};
use crate::processor::instruction_set::{self, *};
use crate::processor::internal_cpu::InternalCpu;
use crate::processor::status_register::{StatusRegister, StatusRegisterFlag};

/// Cycles taken by the reset sequence
const RESET_CYCLES: u8 = 8;
const NMI_CYCLES: u8 = 8;
const IRQ_CYCLES: u8 = 7;

/// Ricoh 2A03 processor core (a MOS 6502 without decimal mode).
///
/// The CPU executes a whole instruction on the first cycle it's clocked and
/// then idles for the remaining cycles of that instruction, so the rest of
/// the system sees the instruction cost in cycles but not mid-instruction
/// bus traffic.
///
/// The CPU doesn't own its address space. Every operation that touches
/// memory receives the bus it should use.
pub struct Cpu {
    internal: InternalCpu,
    cycles: u8,
    total_cycles: u64,
    halted: bool,
}

/// Effective address computed by an addressing mode
struct Operand {
    /// `None` for implied operands (the accumulator for shifts/rotations)
    address: Option<u16>,
    /// Indexing moved the address to another page
    page_crossed: bool,
}

impl Operand {
    fn implied() -> Self {
        Self {
            address: None,
            page_crossed: false,
        }
    }

    fn at(address: u16) -> Self {
        Self {
            address: Some(address),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, index: u8) -> Self {
        let address = base.wrapping_add(index as u16);
        Self {
            address: Some(address),
            page_crossed: (base & 0xFF00) != (address & 0xFF00),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            internal: InternalCpu::default(),
            cycles: 0,
            total_cycles: 0,
            halted: false,
        }
    }

    /// Put the CPU in its documented power up/reset state and jump to the
    /// address stored at the reset vector
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.internal = InternalCpu::default();
        self.internal.sr.reset();
        self.internal.pc = read_word(bus, RESET_VECTOR);
        self.cycles = RESET_CYCLES;
        self.halted = false;
        trace!("CPU reset, PC=${:04X}", self.internal.pc);
    }

    /// Advance the CPU one cycle
    pub fn clock(&mut self, bus: &mut impl Bus) {
        if self.halted {
            return;
        }

        if self.cycles == 0 {
            let opcode = bus.read(self.internal.pc);
            self.internal.pc = self.internal.pc.wrapping_add(1);

            let instruction = instruction_set::instruction(opcode);
            let extra_cycles = self.execute(bus, instruction);
            self.cycles = instruction.cycles + extra_cycles;
        }

        self.cycles = self.cycles.saturating_sub(1);
        self.total_cycles += 1;
    }

    /// Run the CPU until the current (or next) instruction has consumed all
    /// its cycles
    pub fn step(&mut self, bus: &mut impl Bus) {
        loop {
            self.clock(bus);
            if self.complete() || self.halted {
                break;
            }
        }
    }

    /// The in-flight instruction finished all its cycles
    pub fn complete(&self) -> bool {
        self.cycles == 0
    }

    /// A halt opcode stopped the processor. Only a reset recovers it
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Maskable interrupt request. Ignored (not queued) while
    /// InterruptDisable is set. Returns whether the CPU took it
    pub fn irq(&mut self, bus: &mut impl Bus) -> bool {
        if self.halted || self.internal.sr.get(StatusRegisterFlag::InterruptDisable) {
            return false;
        }
        self.interrupt(bus, IRQ_VECTOR);
        self.cycles = IRQ_CYCLES;
        true
    }

    /// Non maskable interrupt request
    pub fn nmi(&mut self, bus: &mut impl Bus) {
        if self.halted {
            return;
        }
        self.interrupt(bus, NMI_VECTOR);
        self.cycles = NMI_CYCLES;
    }

    pub fn registers(&self) -> InternalCpu {
        self.internal
    }

    pub fn set_registers(&mut self, registers: InternalCpu) {
        self.internal = registers;
    }

    pub fn pc(&self) -> u16 {
        self.internal.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.internal.pc = pc;
    }

    /// Cycles executed since power up
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) {
        self.push_word(bus, self.internal.pc);
        self.push(bus, self.internal.sr.to_stack(false));
        self.internal.sr.set(StatusRegisterFlag::InterruptDisable);
        self.internal.pc = read_word(bus, vector);
    }

    /// Execute `instruction` and return the extra cycles it took over its
    /// base cost
    fn execute(&mut self, bus: &mut impl Bus, instruction: &Instruction) -> u8 {
        let operand = self.resolve(bus, instruction.addressing_mode);
        let address = operand.address;

        let mut extra_cycles =
            (operand.page_crossed && instruction.operation.page_cross_penalty()) as u8;

        match instruction.operation {
            // Transfer
            Operation::Lda => self.read_with(bus, address, lda),
            Operation::Ldx => self.read_with(bus, address, ldx),
            Operation::Ldy => self.read_with(bus, address, ldy),
            Operation::Sta => self.store_with(bus, address, sta),
            Operation::Stx => self.store_with(bus, address, stx),
            Operation::Sty => self.store_with(bus, address, sty),
            Operation::Tax => tax(&mut self.internal),
            Operation::Tay => tay(&mut self.internal),
            Operation::Tsx => tsx(&mut self.internal),
            Operation::Txa => txa(&mut self.internal),
            Operation::Txs => txs(&mut self.internal),
            Operation::Tya => tya(&mut self.internal),

            // Stack
            Operation::Pha => self.push(bus, self.internal.acc),
            Operation::Php => self.push(bus, self.internal.sr.to_stack(true)),
            Operation::Pla => {
                let value = self.pull(bus);
                lda(&mut self.internal, value);
            }
            Operation::Plp => {
                let value = self.pull(bus);
                self.internal.sr = StatusRegister::from_stack(value);
            }

            // Decrements and increments
            Operation::Dec => self.modify_with(bus, address, dec),
            Operation::Dex => dex(&mut self.internal),
            Operation::Dey => dey(&mut self.internal),
            Operation::Inc => self.modify_with(bus, address, inc),
            Operation::Inx => inx(&mut self.internal),
            Operation::Iny => iny(&mut self.internal),

            // Arithmetic and logical
            Operation::Adc => self.read_with(bus, address, adc),
            Operation::Sbc => self.read_with(bus, address, sbc),
            Operation::And => self.read_with(bus, address, and),
            Operation::Eor => self.read_with(bus, address, eor),
            Operation::Ora => self.read_with(bus, address, ora),

            // Shift and rotation
            Operation::Asl => self.modify_with(bus, address, asl),
            Operation::Lsr => self.modify_with(bus, address, lsr),
            Operation::Rol => self.modify_with(bus, address, rol),
            Operation::Ror => self.modify_with(bus, address, ror),

            // Flags
            Operation::Clc => clc(&mut self.internal),
            Operation::Cld => cld(&mut self.internal),
            Operation::Cli => cli(&mut self.internal),
            Operation::Clv => clv(&mut self.internal),
            Operation::Sec => sec(&mut self.internal),
            Operation::Sed => sed(&mut self.internal),
            Operation::Sei => sei(&mut self.internal),

            // Comparisons
            Operation::Cmp => self.read_with(bus, address, cmp),
            Operation::Cpx => self.read_with(bus, address, cpx),
            Operation::Cpy => self.read_with(bus, address, cpy),

            // Branches
            Operation::Bcc
            | Operation::Bcs
            | Operation::Beq
            | Operation::Bmi
            | Operation::Bne
            | Operation::Bpl
            | Operation::Bvc
            | Operation::Bvs => {
                if branch_taken(&self.internal, instruction.operation) {
                    extra_cycles = 1 + operand.page_crossed as u8;
                    if let Some(target) = address {
                        self.internal.pc = target;
                    }
                }
            }

            // Jumps, subroutines and interrupts
            Operation::Jmp => {
                if let Some(target) = address {
                    self.internal.pc = target;
                }
            }
            Operation::Jsr => {
                let return_address = self.internal.pc.wrapping_sub(1);
                self.push_word(bus, return_address);
                if let Some(target) = address {
                    self.internal.pc = target;
                }
            }
            Operation::Rts => {
                let return_address = self.pull_word(bus);
                self.internal.pc = return_address.wrapping_add(1);
            }
            Operation::Brk => {
                self.push_word(bus, self.internal.pc);
                self.push(bus, self.internal.sr.to_stack(true));
                self.internal.sr.set(StatusRegisterFlag::InterruptDisable);
                self.internal.pc = read_word(bus, IRQ_VECTOR);
            }
            Operation::Rti => {
                let status = self.pull(bus);
                self.internal.sr = StatusRegister::from_stack(status);
                self.internal.pc = self.pull_word(bus);
            }

            // Other
            Operation::Bit => self.read_with(bus, address, bit),
            Operation::Nop => {
                // Multi-byte NOPs still perform their operand read
                if let Some(address) = address {
                    bus.read(address);
                }
            }

            // Undocumented
            Operation::Lax => self.read_with(bus, address, lax),
            Operation::Sax => self.store_with(bus, address, sax),
            Operation::Dcp => self.modify_with(bus, address, dcp),
            Operation::Isb => self.modify_with(bus, address, isb),
            Operation::Slo => self.modify_with(bus, address, slo),
            Operation::Rla => self.modify_with(bus, address, rla),
            Operation::Sre => self.modify_with(bus, address, sre),
            Operation::Rra => self.modify_with(bus, address, rra),
            Operation::Anc => self.read_with(bus, address, anc),
            Operation::Alr => self.read_with(bus, address, alr),
            Operation::Arr => self.read_with(bus, address, arr),
            Operation::Ane => self.read_with(bus, address, ane),
            Operation::Lxa => self.read_with(bus, address, lxa),
            Operation::Sbx => self.read_with(bus, address, sbx),
            Operation::Las => self.read_with(bus, address, las),
            Operation::Sha => {
                let value = self.internal.acc & self.internal.x_reg;
                self.store_unstable(bus, &operand, self.internal.y_reg, value);
            }
            Operation::Shx => {
                let value = self.internal.x_reg;
                self.store_unstable(bus, &operand, self.internal.y_reg, value);
            }
            Operation::Shy => {
                let value = self.internal.y_reg;
                self.store_unstable(bus, &operand, self.internal.x_reg, value);
            }
            Operation::Tas => {
                self.internal.sp = self.internal.acc & self.internal.x_reg;
                let value = self.internal.sp;
                self.store_unstable(bus, &operand, self.internal.y_reg, value);
            }
            Operation::Jam => {
                warn!(
                    "CPU halted by opcode ${:02X} at ${:04X}",
                    instruction.opcode,
                    self.internal.pc.wrapping_sub(1)
                );
                self.halted = true;
            }
        }

        extra_cycles
    }

    /// Compute the effective address for `mode`, consuming the operand bytes
    fn resolve(&mut self, bus: &mut impl Bus, mode: AddressingMode) -> Operand {
        match mode {
            AddressingMode::Implied => Operand::implied(),
            AddressingMode::Immediate => {
                let address = self.internal.pc;
                self.internal.pc = self.internal.pc.wrapping_add(1);
                Operand::at(address)
            }
            AddressingMode::ZeroPage => {
                let address = self.fetch(bus) as u16;
                Operand::at(address)
            }
            AddressingMode::ZeroPageX => {
                // Indexing never leaves page zero
                let address = self.fetch(bus).wrapping_add(self.internal.x_reg);
                Operand::at(address as u16)
            }
            AddressingMode::ZeroPageY => {
                let address = self.fetch(bus).wrapping_add(self.internal.y_reg);
                Operand::at(address as u16)
            }
            AddressingMode::Relative => {
                let offset = self.fetch(bus) as i8;
                let target = self.internal.pc.wrapping_add(offset as u16);
                Operand {
                    address: Some(target),
                    page_crossed: (target & 0xFF00) != (self.internal.pc & 0xFF00),
                }
            }
            AddressingMode::Absolute => {
                let address = self.fetch_word(bus);
                Operand::at(address)
            }
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                Operand::indexed(base, self.internal.x_reg)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                Operand::indexed(base, self.internal.y_reg)
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch_word(bus);
                // The high byte is fetched without carrying into the pointer
                // high byte: JMP ($10FF) reads $10FF and $1000
                let high_pointer = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
                let low = bus.read(pointer) as u16;
                let high = bus.read(high_pointer) as u16;
                Operand::at((high << 8) | low)
            }
            AddressingMode::IndirectX => {
                let pointer = self.fetch(bus).wrapping_add(self.internal.x_reg);
                let address = read_zero_page_word(bus, pointer);
                Operand::at(address)
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch(bus);
                let base = read_zero_page_word(bus, pointer);
                Operand::indexed(base, self.internal.y_reg)
            }
        }
    }

    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let data = bus.read(self.internal.pc);
        self.internal.pc = self.internal.pc.wrapping_add(1);
        data
    }

    fn fetch_word(&mut self, bus: &mut impl Bus) -> u16 {
        let low = self.fetch(bus) as u16;
        let high = self.fetch(bus) as u16;
        (high << 8) | low
    }

    /// Read the operand and hand it to a register level operation
    fn read_with(
        &mut self,
        bus: &mut impl Bus,
        address: Option<u16>,
        operation: fn(&mut InternalCpu, u8),
    ) {
        let operand = match address {
            Some(address) => bus.read(address),
            None => self.internal.acc,
        };
        operation(&mut self.internal, operand);
    }

    fn store_with(
        &mut self,
        bus: &mut impl Bus,
        address: Option<u16>,
        operation: fn(&InternalCpu) -> u8,
    ) {
        let data = operation(&self.internal);
        match address {
            Some(address) => bus.write(address, data),
            None => self.internal.acc = data,
        }
    }

    /// Read-modify-write: implied operands work on the accumulator
    fn modify_with(
        &mut self,
        bus: &mut impl Bus,
        address: Option<u16>,
        operation: fn(&mut InternalCpu, u8) -> u8,
    ) {
        match address {
            Some(address) => {
                let operand = bus.read(address);
                let result = operation(&mut self.internal, operand);
                bus.write(address, result);
            }
            None => {
                let operand = self.internal.acc;
                self.internal.acc = operation(&mut self.internal, operand);
            }
        }
    }

    /// SHA/SHX/SHY/TAS store `value & (H + 1)`, H being the high byte of the
    /// unindexed address. When indexing crosses a page that same value
    /// replaces the high byte of the target address
    fn store_unstable(&mut self, bus: &mut impl Bus, operand: &Operand, index: u8, value: u8) {
        let Some(address) = operand.address else {
            return;
        };
        let base_high = (address.wrapping_sub(index as u16) >> 8) as u8;
        let data = value & base_high.wrapping_add(1);
        let target = if operand.page_crossed {
            ((data as u16) << 8) | (address & 0x00FF)
        } else {
            address
        };
        bus.write(target, data);
    }

    fn push(&mut self, bus: &mut impl Bus, data: u8) {
        bus.write(STACK_BASE | self.internal.sp as u16, data);
        self.internal.sp = self.internal.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.internal.sp = self.internal.sp.wrapping_add(1);
        bus.read(STACK_BASE | self.internal.sp as u16)
    }

    fn push_word(&mut self, bus: &mut impl Bus, data: u16) {
        self.push(bus, (data >> 8) as u8);
        self.push(bus, data as u8);
    }

    fn pull_word(&mut self, bus: &mut impl Bus) -> u16 {
        let low = self.pull(bus) as u16;
        let high = self.pull(bus) as u16;
        (high << 8) | low
    }
}

/// Little endian word at `address`
fn read_word(bus: &mut impl Bus, address: u16) -> u16 {
    let low = bus.read(address) as u16;
    let high = bus.read(address.wrapping_add(1)) as u16;
    (high << 8) | low
}

/// Little endian word whose bytes both live in page zero
fn read_zero_page_word(bus: &mut impl Bus, pointer: u8) -> u16 {
    let low = bus.read(pointer as u16) as u16;
    let high = bus.read(pointer.wrapping_add(1) as u16) as u16;
    (high << 8) | low
}
