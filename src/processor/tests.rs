//! Register level checks of the operation functions. Every operation is
//! described by a table of (input registers, operand) -> (result, flags)
//! rows, flags written as letters of `NVDIZC`.

use crate::processor::instruction::Operation;
use crate::processor::instruction_set::{self as ops, branch_taken};
use crate::processor::internal_cpu::InternalCpu;
use crate::processor::status_register::StatusRegisterFlag::{self, *};

const FLAG_LETTERS: [(char, StatusRegisterFlag); 6] = [
    ('N', Negative),
    ('V', Overflow),
    ('D', Decimal),
    ('I', InterruptDisable),
    ('Z', Zero),
    ('C', Carry),
];

/// Every flag named in `checked` must be set exactly when `set` names it too
fn assert_flags(cpu: &InternalCpu, set: &str, checked: &str, row: usize) {
    for (letter, flag) in FLAG_LETTERS {
        if checked.contains(letter) {
            assert_eq!(
                cpu.sr.get(flag),
                set.contains(letter),
                "row {row}: flag {letter} in {:08b}",
                u8::from(cpu.sr)
            );
        }
    }
}

fn with_acc(acc: u8, carry: bool) -> InternalCpu {
    let mut cpu = InternalCpu {
        acc,
        ..Default::default()
    };
    cpu.sr.set_value(Carry, carry);
    cpu
}

/// (A, carry in, operand, A out, flags)
type AccumulatorRow = (u8, bool, u8, u8, &'static str);

fn check_accumulator(op: fn(&mut InternalCpu, u8), checked: &str, rows: &[AccumulatorRow]) {
    for (row, &(acc, carry, operand, result, flags)) in rows.iter().enumerate() {
        let mut cpu = with_acc(acc, carry);
        op(&mut cpu, operand);
        assert_eq!(cpu.acc, result, "row {row}");
        assert_flags(&cpu, flags, checked, row);
    }
}

/// (carry in, memory in, memory out, flags)
type ModifyRow = (bool, u8, u8, &'static str);

fn check_modify(op: fn(&mut InternalCpu, u8) -> u8, checked: &str, rows: &[ModifyRow]) {
    for (row, &(carry, operand, result, flags)) in rows.iter().enumerate() {
        let mut cpu = with_acc(0x5A, carry);
        assert_eq!(op(&mut cpu, operand), result, "row {row}");
        // shifts and increments only touch memory
        assert_eq!(cpu.acc, 0x5A);
        assert_flags(&cpu, flags, checked, row);
    }
}

mod loads_and_transfers {
    use super::*;

    #[test]
    fn test_loads_set_zero_and_negative() {
        let loads: [(fn(&mut InternalCpu, u8), fn(&InternalCpu) -> u8); 3] = [
            (ops::lda, |cpu| cpu.acc),
            (ops::ldx, |cpu| cpu.x_reg),
            (ops::ldy, |cpu| cpu.y_reg),
        ];

        for (load, register) in loads {
            let rows = [(0x00, "Z"), (0x95, "N"), (0x42, "")];
            for (row, (value, flags)) in rows.into_iter().enumerate() {
                let mut cpu = InternalCpu::default();
                load(&mut cpu, value);
                assert_eq!(register(&cpu), value);
                assert_flags(&cpu, flags, "NZ", row);
            }
        }
    }

    #[test]
    fn test_stores_return_the_register() {
        let cpu = InternalCpu {
            acc: 0x11,
            x_reg: 0x22,
            y_reg: 0x33,
            ..Default::default()
        };
        assert_eq!(ops::sta(&cpu), 0x11);
        assert_eq!(ops::stx(&cpu), 0x22);
        assert_eq!(ops::sty(&cpu), 0x33);
        assert_eq!(ops::sax(&cpu), 0x11 & 0x22);
    }

    #[test]
    fn test_transfers() {
        let cpu = InternalCpu {
            acc: 0x82,
            x_reg: 0x00,
            y_reg: 0x7F,
            sp: 0xF0,
            ..Default::default()
        };

        let mut tax = cpu;
        ops::tax(&mut tax);
        assert_eq!(tax.x_reg, 0x82);
        assert_flags(&tax, "N", "NZ", 0);

        let mut tay = cpu;
        ops::tay(&mut tay);
        assert_eq!(tay.y_reg, 0x82);
        assert_flags(&tay, "N", "NZ", 0);

        let mut txa = cpu;
        ops::txa(&mut txa);
        assert_eq!(txa.acc, 0x00);
        assert_flags(&txa, "Z", "NZ", 0);

        let mut tya = cpu;
        ops::tya(&mut tya);
        assert_eq!(tya.acc, 0x7F);
        assert_flags(&tya, "", "NZ", 0);

        let mut tsx = cpu;
        ops::tsx(&mut tsx);
        assert_eq!(tsx.x_reg, 0xF0);
        assert_flags(&tsx, "N", "NZ", 0);

        // TXS is the only transfer leaving the flags alone
        let mut txs = cpu;
        txs.sr.set(Zero);
        ops::txs(&mut txs);
        assert_eq!(txs.sp, 0x00);
        assert!(txs.sr.get(Zero));
    }
}

mod counters {
    use super::*;

    #[test]
    fn test_memory_increment_and_decrement() {
        check_modify(
            ops::inc,
            "NZ",
            &[(false, 0x7F, 0x80, "N"), (false, 0xFF, 0x00, "Z"), (false, 0x01, 0x02, "")],
        );
        check_modify(
            ops::dec,
            "NZ",
            &[(false, 0x01, 0x00, "Z"), (false, 0x00, 0xFF, "N"), (false, 0x81, 0x80, "N")],
        );
    }

    #[test]
    fn test_index_registers_wrap() {
        let mut cpu = InternalCpu {
            x_reg: 0xFF,
            y_reg: 0x00,
            ..Default::default()
        };

        ops::inx(&mut cpu);
        assert_eq!(cpu.x_reg, 0x00);
        assert_flags(&cpu, "Z", "NZ", 0);

        ops::dey(&mut cpu);
        assert_eq!(cpu.y_reg, 0xFF);
        assert_flags(&cpu, "N", "NZ", 1);

        ops::dex(&mut cpu);
        assert_eq!(cpu.x_reg, 0xFF);

        ops::iny(&mut cpu);
        assert_eq!(cpu.y_reg, 0x00);
        assert_flags(&cpu, "Z", "NZ", 2);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_with_carry() {
        check_accumulator(
            ops::adc,
            "NVZC",
            &[
                (0x05, false, 0x02, 0x07, ""),
                (0x05, true, 0x02, 0x08, ""),
                (0xFF, false, 0x01, 0x00, "ZC"),
                (0xFF, true, 0xFF, 0xFF, "NC"),
                (0x80, false, 0x80, 0x00, "VZC"),
                (0x50, false, 0x50, 0xA0, "NV"),
            ],
        );
    }

    #[test]
    fn test_subtract_with_borrow() {
        // A - M - (1 - C)
        check_accumulator(
            ops::sbc,
            "NVZC",
            &[
                (0x00, true, 0x00, 0x00, "ZC"),
                (0x00, false, 0x00, 0xFF, "N"),
                (0x05, false, 0x04, 0x00, "ZC"),
                (0x05, true, 0x02, 0x03, "C"),
                (0x00, true, 0x01, 0xFF, "N"),
                (0x80, true, 0x01, 0x7F, "VC"),
            ],
        );
    }

    #[test]
    fn test_logical_operations() {
        check_accumulator(
            ops::and,
            "NZ",
            &[
                (0xAC, false, 0xFF, 0xAC, "N"),
                (0xAC, false, 0x0F, 0x0C, ""),
                (0x0C, false, 0x00, 0x00, "Z"),
            ],
        );
        check_accumulator(
            ops::eor,
            "NZ",
            &[
                (0xEF, false, 0x88, 0x67, ""),
                (0x67, false, 0x67, 0x00, "Z"),
                (0x00, false, 0x80, 0x80, "N"),
            ],
        );
        check_accumulator(
            ops::ora,
            "NZ",
            &[
                (0x00, false, 0x00, 0x00, "Z"),
                (0x00, false, 0xAB, 0xAB, "N"),
                (0xAB, false, 0xCC, 0xEF, "N"),
            ],
        );
    }

    #[test]
    fn test_compares_leave_registers_alone() {
        let compares: [(fn(&mut InternalCpu, u8), fn(&mut InternalCpu) -> &mut u8); 3] = [
            (ops::cmp, |cpu| &mut cpu.acc),
            (ops::cpx, |cpu| &mut cpu.x_reg),
            (ops::cpy, |cpu| &mut cpu.y_reg),
        ];
        let rows = [(10, 5, "C"), (5, 5, "ZC"), (0x80, 0xA0, "N")];

        for (compare, register) in compares {
            for (row, (value, operand, flags)) in rows.into_iter().enumerate() {
                let mut cpu = InternalCpu::default();
                *register(&mut cpu) = value;
                compare(&mut cpu, operand);
                assert_eq!(*register(&mut cpu), value);
                assert_flags(&cpu, flags, "NZC", row);
            }
        }
    }

    #[test]
    fn test_bit_copies_operand_bits() {
        let mut cpu = with_acc(0x01, false);

        ops::bit(&mut cpu, 0xC0);
        assert_flags(&cpu, "NVZ", "NVZ", 0);
        assert_eq!(cpu.acc, 0x01);

        ops::bit(&mut cpu, 0x01);
        assert_flags(&cpu, "", "NVZ", 1);
    }
}

mod shifts {
    use super::*;

    #[test]
    fn test_shifts() {
        check_modify(
            ops::asl,
            "NZC",
            &[
                (false, 0x02, 0x04, ""),
                (false, 0x40, 0x80, "N"),
                (false, 0x80, 0x00, "ZC"),
                (true, 0x01, 0x02, ""),
            ],
        );
        check_modify(
            ops::lsr,
            "NZC",
            &[(false, 0x01, 0x00, "ZC"), (false, 0x40, 0x20, ""), (true, 0x80, 0x40, "")],
        );
    }

    #[test]
    fn test_rotations_go_through_carry() {
        check_modify(
            ops::rol,
            "NZC",
            &[(true, 0xF0, 0xE1, "NC"), (false, 0x80, 0x00, "ZC"), (false, 0x08, 0x10, "")],
        );
        check_modify(
            ops::ror,
            "NZC",
            &[(true, 0x0F, 0x87, "NC"), (false, 0x01, 0x00, "ZC"), (false, 0x10, 0x08, "")],
        );
    }
}

mod flags {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let clears: [(fn(&mut InternalCpu), StatusRegisterFlag); 4] = [
            (ops::clc, Carry),
            (ops::cld, Decimal),
            (ops::cli, InterruptDisable),
            (ops::clv, Overflow),
        ];
        for (clear, flag) in clears {
            let mut cpu = InternalCpu::default();
            cpu.sr.set(flag);
            clear(&mut cpu);
            assert!(!cpu.sr.get(flag), "{flag:?}");
        }

        let sets: [(fn(&mut InternalCpu), StatusRegisterFlag); 3] =
            [(ops::sec, Carry), (ops::sed, Decimal), (ops::sei, InterruptDisable)];
        for (set, flag) in sets {
            let mut cpu = InternalCpu::default();
            set(&mut cpu);
            assert!(cpu.sr.get(flag), "{flag:?}");
        }
    }

    #[test]
    fn test_branch_conditions() {
        let branches = [
            (Operation::Bcc, Carry, false),
            (Operation::Bcs, Carry, true),
            (Operation::Beq, Zero, true),
            (Operation::Bne, Zero, false),
            (Operation::Bmi, Negative, true),
            (Operation::Bpl, Negative, false),
            (Operation::Bvc, Overflow, false),
            (Operation::Bvs, Overflow, true),
        ];

        for (operation, flag, taken_when_set) in branches {
            let mut cpu = InternalCpu::default();
            cpu.sr.set(flag);
            assert_eq!(branch_taken(&cpu, operation), taken_when_set, "{operation:?}");
            cpu.sr.clear(flag);
            assert_eq!(branch_taken(&cpu, operation), !taken_when_set, "{operation:?}");
        }

        let cpu = InternalCpu::default();
        assert!(!branch_taken(&cpu, Operation::Jmp));
        assert!(!branch_taken(&cpu, Operation::Lda));
    }
}

mod undocumented {
    use super::*;

    /// (A, carry in, memory in, memory out, A out, flags)
    type ComboRow = (u8, bool, u8, u8, u8, &'static str);

    fn check_combo(op: fn(&mut InternalCpu, u8) -> u8, checked: &str, rows: &[ComboRow]) {
        for (row, &(acc, carry, operand, memory, result, flags)) in rows.iter().enumerate() {
            let mut cpu = with_acc(acc, carry);
            assert_eq!(op(&mut cpu, operand), memory, "row {row}");
            assert_eq!(cpu.acc, result, "row {row}");
            assert_flags(&cpu, flags, checked, row);
        }
    }

    #[test]
    fn test_read_modify_write_combos() {
        // INC then SBC
        check_combo(ops::isb, "ZC", &[(0x10, true, 0x0F, 0x10, 0x00, "ZC")]);
        // DEC then CMP, the accumulator is only compared
        check_combo(
            ops::dcp,
            "NZC",
            &[(0x10, false, 0x11, 0x10, 0x10, "ZC"), (0x10, false, 0x00, 0xFF, 0x10, "")],
        );
        // ASL then ORA
        check_combo(ops::slo, "C", &[(0x01, false, 0x81, 0x02, 0x03, "C")]);
        // ROL then AND
        check_combo(ops::rla, "NC", &[(0xFF, true, 0x40, 0x81, 0x81, "N")]);
        // LSR then EOR
        check_combo(ops::sre, "ZC", &[(0x01, false, 0x03, 0x01, 0x00, "ZC")]);
        // ROR then ADC with the carry ROR shifted out
        check_combo(ops::rra, "C", &[(0x10, false, 0x03, 0x01, 0x12, "")]);
    }

    #[test]
    fn test_immediate_combos() {
        check_accumulator(
            ops::anc,
            "NC",
            &[(0xF0, false, 0x80, 0x80, "NC"), (0xF0, true, 0x0F, 0x00, "")],
        );
        check_accumulator(ops::alr, "C", &[(0xFF, false, 0x03, 0x01, "C")]);
        // Carry from bit 6, Overflow from bit 6 XOR bit 5
        check_accumulator(
            ops::arr,
            "NVC",
            &[(0xFF, true, 0xC0, 0xE0, "NC"), (0xFF, false, 0x80, 0x40, "VC")],
        );
    }

    #[test]
    fn test_lax_loads_both_registers() {
        let mut cpu = InternalCpu::default();
        ops::lax(&mut cpu, 0x80);
        assert_eq!((cpu.acc, cpu.x_reg), (0x80, 0x80));
        assert_flags(&cpu, "N", "NZ", 0);
    }

    #[test]
    fn test_sbx_subtracts_from_a_and_x() {
        let mut cpu = InternalCpu {
            acc: 0x0F,
            x_reg: 0x3C,
            ..Default::default()
        };
        ops::sbx(&mut cpu, 0x02);
        assert_eq!(cpu.x_reg, 0x0A);
        assert_flags(&cpu, "C", "NZC", 0);

        ops::sbx(&mut cpu, 0x10);
        assert_eq!(cpu.x_reg, 0xFA);
        assert_flags(&cpu, "N", "NZC", 1);
    }

    #[test]
    fn test_unstable_magic_constant() {
        let mut cpu = InternalCpu {
            x_reg: 0xFF,
            ..Default::default()
        };
        ops::ane(&mut cpu, 0xFF);
        assert_eq!(cpu.acc, 0xEE);

        cpu.acc = 0x00;
        ops::lxa(&mut cpu, 0x0F);
        assert_eq!((cpu.acc, cpu.x_reg), (0x0E, 0x0E));
    }

    #[test]
    fn test_las_masks_stack_pointer() {
        let mut cpu = InternalCpu {
            sp: 0xF0,
            ..Default::default()
        };
        ops::las(&mut cpu, 0x3F);
        assert_eq!((cpu.acc, cpu.x_reg, cpu.sp), (0x30, 0x30, 0x30));
    }
}
