#![allow(non_snake_case)]

use mockall::mock;
use mockall::predicate::eq;

use super::*;
use crate::processor::status_register::StatusRegisterFlag::*;

mock! {
    TestBus {}

    impl Bus for TestBus {
        fn read(&mut self, address: u16) -> u8;
        fn write(&mut self, address: u16, data: u8);
        fn peek(&self, address: u16) -> u8;
    }
}

/// Flat 64 KiB of RAM, enough to run small programs
struct FlatBus {
    memory: Vec<u8>,
}

impl FlatBus {
    fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
        }
    }

    fn load(&mut self, address: u16, program: &[u8]) {
        let start = address as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
    }

    fn set_vector(&mut self, vector: u16, address: u16) {
        self.load(vector, &address.to_le_bytes());
    }
}

impl Bus for FlatBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, data: u8) {
        self.memory[address as usize] = data;
    }

    fn peek(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }
}

const PROGRAM_START: u16 = 0x8000;

// Get a CPU and a bus with `program` loaded at the reset vector
fn test_cpu_with_program(program: &[u8]) -> (Cpu, FlatBus) {
    let mut bus = FlatBus::new();
    bus.load(PROGRAM_START, program);
    bus.set_vector(RESET_VECTOR, PROGRAM_START);

    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    // burn reset cycles
    while !cpu.complete() {
        cpu.clock(&mut bus);
    }
    (cpu, bus)
}

/// Clock one whole instruction and return the cycles it took
fn step_cycles(cpu: &mut Cpu, bus: &mut FlatBus) -> u64 {
    let before = cpu.total_cycles();
    cpu.step(bus);
    cpu.total_cycles() - before
}

//////////////////////////////////////////////////////////////////////
// RESET AND INTERRUPTS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_reset_vector() {
    let mut mock_bus = MockTestBus::new();
    mock_bus.expect_read().with(eq(0xFFFC)).return_const(0x34u8);
    mock_bus.expect_read().with(eq(0xFFFD)).return_const(0x12u8);

    let mut cpu = Cpu::new();
    cpu.reset(&mut mock_bus);

    let registers = cpu.registers();
    assert_eq!(registers.pc, 0x1234);
    assert_eq!(registers.sp, 0xFD);
    assert_eq!(registers.acc, 0);
    assert_eq!(u8::from(registers.sr), 0x24);
    assert!(!cpu.complete());
}

#[test]
fn test_reset_takes_8_cycles() {
    let mut bus = FlatBus::new();
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    for _ in 0..7 {
        cpu.clock(&mut bus);
        assert!(!cpu.complete());
    }
    cpu.clock(&mut bus);
    assert!(cpu.complete());
}

#[test]
fn test_nmi_vector_and_pushed_status() {
    let mut mock_bus = MockTestBus::new();
    mock_bus.expect_read().with(eq(0xFFFA)).return_const(0x00u8);
    mock_bus.expect_read().with(eq(0xFFFB)).return_const(0x90u8);
    mock_bus.expect_write().with(eq(0x01FD), eq(0x12)).times(1).return_const(());
    mock_bus.expect_write().with(eq(0x01FC), eq(0x34)).times(1).return_const(());
    // Break clear, Unused set, Carry from the register
    mock_bus.expect_write().with(eq(0x01FB), eq(0b0010_0001)).times(1).return_const(());

    let mut cpu = Cpu::new();
    let mut registers = cpu.registers();
    registers.pc = 0x1234;
    registers.sr.set(Carry);
    cpu.set_registers(registers);

    cpu.nmi(&mut mock_bus);

    let registers = cpu.registers();
    assert_eq!(registers.pc, 0x9000);
    assert_eq!(registers.sp, 0xFA);
    assert!(registers.sr.get(InterruptDisable));
}

#[test]
fn test_irq_vector() {
    let mut mock_bus = MockTestBus::new();
    mock_bus.expect_read().with(eq(0xFFFE)).return_const(0x00u8);
    mock_bus.expect_read().with(eq(0xFFFF)).return_const(0xA0u8);
    mock_bus.expect_write().times(3).return_const(());

    let mut cpu = Cpu::new();
    assert!(cpu.irq(&mut mock_bus));

    assert_eq!(cpu.pc(), 0xA000);
    assert!(cpu.registers().sr.get(InterruptDisable));
}

#[test]
fn test_irq_ignored_when_interrupts_disabled() {
    let mut mock_bus = MockTestBus::new();
    mock_bus.expect_read().never();
    mock_bus.expect_write().never();

    let mut cpu = Cpu::new();
    let mut registers = cpu.registers();
    registers.pc = 0x4321;
    registers.sr.set(InterruptDisable);
    cpu.set_registers(registers);

    assert!(!cpu.irq(&mut mock_bus));

    assert_eq!(cpu.pc(), 0x4321);
    assert!(cpu.complete());
}

#[test]
fn test_brk_and_rti() {
    // BRK, padding, ... handler: RTI
    let (mut cpu, mut bus) = test_cpu_with_program(&[0x00, 0xFF, 0xEA]);
    bus.set_vector(IRQ_VECTOR, 0x9000);
    bus.load(0x9000, &[0x40]);

    assert_eq!(step_cycles(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.pc(), 0x9000);
    // status copy has Break and Unused set
    assert_eq!(bus.peek(0x01FB) & 0b0011_0000, 0b0011_0000);

    assert_eq!(step_cycles(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.pc(), PROGRAM_START + 2);
    assert!(!cpu.registers().sr.get(Break));
}

//////////////////////////////////////////////////////////////////////
// PROGRAMS
//////////////////////////////////////////////////////////////////////

#[test]
fn test_load_store_program() {
    // LDA #$10; STA $00; LDA $00
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA9, 0x10, 0x85, 0x00, 0xA5, 0x00]);

    assert_eq!(step_cycles(&mut cpu, &mut bus), 2);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 3);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 3);

    let registers = cpu.registers();
    assert_eq!(registers.acc, 0x10);
    assert_eq!(bus.peek(0x0000), 0x10);
    assert!(!registers.sr.get(Zero));
    assert_eq!(registers.pc, PROGRAM_START + 6);
}

#[test]
fn test_subroutine_call_and_return() {
    // JSR $8010; NOP ... $8010: LDX #$05; RTS
    let (mut cpu, mut bus) = test_cpu_with_program(&[0x20, 0x10, 0x80, 0xEA]);
    bus.load(0x8010, &[0xA2, 0x05, 0x60]);

    assert_eq!(step_cycles(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.pc(), 0x8010);
    // return address - 1 pushed high byte first
    assert_eq!(bus.peek(0x01FD), 0x80);
    assert_eq!(bus.peek(0x01FC), 0x02);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.pc(), PROGRAM_START + 3);
    assert_eq!(cpu.registers().x_reg, 5);
    assert_eq!(cpu.registers().sp, 0xFD);
}

#[test]
fn test_stack_push_pull() {
    // LDA #$80; PHA; LDA #$00; PLA; PHP; PLP
    let (mut cpu, mut bus) =
        test_cpu_with_program(&[0xA9, 0x80, 0x48, 0xA9, 0x00, 0x68, 0x08, 0x28]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 3);
    assert_eq!(bus.peek(0x01FD), 0x80);
    cpu.step(&mut bus);
    assert!(cpu.registers().sr.get(Zero));

    assert_eq!(step_cycles(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.registers().acc, 0x80);
    assert!(cpu.registers().sr.get(Negative));
    assert!(!cpu.registers().sr.get(Zero));

    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x01FD) & 0b0011_0000, 0b0011_0000);
    cpu.step(&mut bus);
    assert!(!cpu.registers().sr.get(Break));
    assert_eq!(cpu.registers().sp, 0xFD);
}

//////////////////////////////////////////////////////////////////////
// ADDRESSING MODES AND CYCLES
//////////////////////////////////////////////////////////////////////

#[test]
fn test_absolute_x_page_cross_penalty() {
    // LDX #$01; LDA $10FF,X; LDA $1000,X
    let (mut cpu, mut bus) =
        test_cpu_with_program(&[0xA2, 0x01, 0xBD, 0xFF, 0x10, 0xBD, 0x00, 0x10]);
    bus.load(0x1100, &[0x42]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 5);
    assert_eq!(cpu.registers().acc, 0x42);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 4);
}

#[test]
fn test_stores_never_pay_page_cross() {
    // LDY #$01; STA $10FF,Y
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA0, 0x01, 0x99, 0xFF, 0x10]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 5);
}

#[test]
fn test_indirect_y_page_cross() {
    // LDY #$10; LDA ($20),Y
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA0, 0x10, 0xB1, 0x20]);
    bus.load(0x0020, &[0xF8, 0x12]);
    bus.load(0x1308, &[0x77]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.registers().acc, 0x77);
}

#[test]
fn test_indirect_x_zero_page_wrap() {
    // LDX #$01; LDA ($FE,X) -> pointer at $FF and $00
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA2, 0x01, 0xA1, 0xFE]);
    bus.load(0x00FF, &[0x34]);
    bus.load(0x0000, &[0x12]);
    bus.load(0x1234, &[0x99]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.registers().acc, 0x99);
}

#[test]
fn test_zero_page_x_wraps() {
    // LDX #$FF; LDA $80,X -> $7F
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA2, 0xFF, 0xB5, 0x80]);
    bus.load(0x007F, &[0x55]);
    bus.load(0x017F, &[0xAA]);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().acc, 0x55);
}

#[test]
fn test_indirect_jump_page_bug() {
    let mut mock_bus = MockTestBus::new();
    mock_bus.expect_read().with(eq(0xFFFC)).return_const(0x00u8);
    mock_bus.expect_read().with(eq(0xFFFD)).return_const(0x80u8);
    // JMP ($10FF)
    mock_bus.expect_read().with(eq(0x8000)).return_const(0x6Cu8);
    mock_bus.expect_read().with(eq(0x8001)).return_const(0xFFu8);
    mock_bus.expect_read().with(eq(0x8002)).return_const(0x10u8);
    mock_bus.expect_read().with(eq(0x10FF)).return_const(0x34u8);
    // high byte comes from the start of the same page
    mock_bus.expect_read().with(eq(0x1000)).return_const(0x12u8);
    mock_bus.expect_read().with(eq(0x1100)).never();

    let mut cpu = Cpu::new();
    cpu.reset(&mut mock_bus);
    while !cpu.complete() {
        cpu.clock(&mut mock_bus);
    }
    cpu.step(&mut mock_bus);

    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_branch_cycles() {
    // BEQ +2 (not taken); SEC; BCS +0 (taken, same page)
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xF0, 0x02, 0x38, 0xB0, 0x00]);

    assert_eq!(step_cycles(&mut cpu, &mut bus), 2);
    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc(), PROGRAM_START + 5);
}

#[test]
fn test_branch_page_cross_cycles() {
    let mut bus = FlatBus::new();
    // BNE -5 from $8100 lands on the previous page
    bus.load(0x8100, &[0xD0, 0xFB]);
    bus.set_vector(RESET_VECTOR, 0x8100);

    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    while !cpu.complete() {
        cpu.clock(&mut bus);
    }

    assert_eq!(step_cycles(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.pc(), 0x80FD);
}

//////////////////////////////////////////////////////////////////////
// UNDOCUMENTED OPCODES
//////////////////////////////////////////////////////////////////////

#[test]
fn test_halt_opcode() {
    // JAM; LDA #$01
    let (mut cpu, mut bus) = test_cpu_with_program(&[0x02, 0xA9, 0x01]);

    cpu.step(&mut bus);
    assert!(cpu.halted());
    let pc = cpu.pc();

    for _ in 0..10 {
        cpu.clock(&mut bus);
    }
    assert_eq!(cpu.pc(), pc);
    assert_eq!(cpu.registers().acc, 0);

    // interrupts are ignored while halted
    bus.set_vector(NMI_VECTOR, 0x9000);
    cpu.nmi(&mut bus);
    assert_eq!(cpu.pc(), pc);

    cpu.reset(&mut bus);
    assert!(!cpu.halted());
    assert_eq!(cpu.pc(), PROGRAM_START);
}

#[test]
fn test_multi_byte_nop_consumes_operand() {
    // NOP $1234,X (ABX) with page cross; NOP #$FF
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA2, 0xFF, 0x1C, 0x34, 0x12, 0x80, 0xFF]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 5);
    assert_eq!(cpu.pc(), PROGRAM_START + 5);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.pc(), PROGRAM_START + 7);
}

#[test]
fn test_undocumented_LAX_and_SAX() {
    // LAX $10; LDA #$0F; SAX $11
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA7, 0x10, 0xA9, 0x0F, 0x87, 0x11]);
    bus.load(0x0010, &[0x3C]);

    cpu.step(&mut bus);
    assert_eq!(cpu.registers().acc, 0x3C);
    assert_eq!(cpu.registers().x_reg, 0x3C);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x0011), 0x0C);
}

#[test]
fn test_undocumented_DCP_read_modify_write() {
    // LDA #$05; DCP $20
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA9, 0x05, 0xC7, 0x20]);
    bus.load(0x0020, &[0x06]);

    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 5);
    assert_eq!(bus.peek(0x0020), 0x05);
    assert!(cpu.registers().sr.get(Zero));
    assert!(cpu.registers().sr.get(Carry));
}

#[test]
fn test_undocumented_SHX_high_byte() {
    // LDX #$FF; LDY #$00; SHX $1200,Y -> stores X & $13
    let (mut cpu, mut bus) = test_cpu_with_program(&[0xA2, 0xFF, 0xA0, 0x00, 0x9E, 0x00, 0x12]);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(step_cycles(&mut cpu, &mut bus), 5);
    assert_eq!(bus.peek(0x1200), 0x13);
}

#[test]
fn test_usbc_matches_sbc() {
    // SEC; LDA #$10; SBC #$01 (0xEB)
    let (mut cpu, mut bus) = test_cpu_with_program(&[0x38, 0xA9, 0x10, 0xEB, 0x01]);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().acc, 0x0F);
    assert!(cpu.registers().sr.get(Carry));
}
