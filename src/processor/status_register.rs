use std::convert::From;

use crate::utils;

// Bring local enum variants to scope
use StatusRegisterFlag::*;

/// Processor status register (P).
///
/// Bit 5 is not wired to anything and always reads as 1. The Break bit only
/// exists on the stack copy pushed by PHP/BRK, it's dropped when the status
/// is pulled back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusRegister {
    sr: u8,
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRegister {
    pub fn new() -> Self {
        Self { sr: 1 << Unused as u8 }
    }

    /// Documented post-reset value: interrupts disabled
    pub fn reset(&mut self) {
        self.sr = (1 << Unused as u8) | (1 << InterruptDisable as u8);
    }

    pub fn get(&self, flag: StatusRegisterFlag) -> bool {
        utils::bv(self.sr, flag as u8) > 0
    }

    pub fn set(&mut self, flag: StatusRegisterFlag) {
        self.sr |= 1 << flag as u8;
    }

    pub fn clear(&mut self, flag: StatusRegisterFlag) {
        if flag != Unused {
            self.sr &= !(1 << flag as u8);
        }
    }

    pub fn set_value(&mut self, flag: StatusRegisterFlag, condition: bool) {
        match condition {
            true => self.set(flag),
            false => self.clear(flag),
        }
    }

    /// Update Zero and Negative flags from a result byte
    pub fn set_zn(&mut self, value: u8) {
        self.set_value(Zero, value == 0);
        self.set_value(Negative, (value as i8) < 0);
    }

    /// Value pushed to the stack. `brk` tells whether it was pushed by
    /// software (PHP, BRK) or by a hardware interrupt
    pub fn to_stack(self, brk: bool) -> u8 {
        let mut value = self.sr | (1 << Unused as u8);
        if brk {
            value |= 1 << Break as u8;
        } else {
            value &= !(1 << Break as u8);
        }
        value
    }

    /// Status pulled from the stack. Break doesn't exist in the register
    pub fn from_stack(value: u8) -> Self {
        Self {
            sr: (value | (1 << Unused as u8)) & !(1 << Break as u8),
        }
    }
}

impl From<u8> for StatusRegister {
    fn from(value: u8) -> Self {
        Self {
            sr: value | (1 << Unused as u8),
        }
    }
}

impl From<StatusRegister> for u8 {
    fn from(value: StatusRegister) -> Self {
        value.sr | (1 << Unused as u8)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusRegisterFlag {
    Negative = 7,
    Overflow = 6,
    Unused = 5,
    Break = 4,
    Decimal = 3, // unused in the NES
    InterruptDisable = 2,
    Zero = 1,
    Carry = 0,
}
