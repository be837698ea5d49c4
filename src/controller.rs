//! Standard NES controller
//!
//! The pad is a parallel-in serial-out shift register. Writing 1 to $4016
//! latches the buttons currently pressed, then every read of $4016/$4017
//! shifts one button out, A first.

use bitflags::bitflags;
use crossbeam_channel::TryRecvError;
use log::warn;

use crate::types::ButtonsReceiver;
use crate::utils;

bitflags! {
    /// Buttons pressed, in the order they are shifted out
    #[derive(Default)]
    pub struct Buttons: u8 {
        const A = 0b1000_0000;
        const B = 0b0100_0000;
        const SELECT = 0b0010_0000;
        const START = 0b0001_0000;
        const UP = 0b0000_1000;
        const DOWN = 0b0000_0100;
        const LEFT = 0b0000_0010;
        const RIGHT = 0b0000_0001;
    }
}

pub struct Controller {
    /// Buttons as the frontend reports them right now
    buttons: Buttons,
    /// Snapshot being shifted out to the CPU
    shifter: u8,
    /// While high, the shifter keeps reloading from the live buttons
    strobe: bool,
    /// Optional frontend input, one button byte per message
    input: Option<ButtonsReceiver>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            buttons: Buttons::empty(),
            shifter: 0,
            strobe: false,
            input: None,
        }
    }

    /// Controller fed by a frontend channel. Messages are drained every time
    /// the CPU strobes the pad, the last one wins
    pub fn with_input(input: ButtonsReceiver) -> Self {
        Self {
            input: Some(input),
            ..Self::new()
        }
    }

    pub fn connect(&mut self, input: ButtonsReceiver) {
        self.input = Some(input);
    }

    pub fn disconnect(&mut self) {
        self.input = None;
        self.buttons = Buttons::empty();
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    /// Strobe write. Any write latches the current buttons, bit 0 decides
    /// whether the latch stays transparent
    pub fn write(&mut self, data: u8) {
        self.poll_input();
        self.strobe = utils::bv(data, 0) == 1;
        self.shifter = self.buttons.bits();
    }

    /// Shift out the next button. Vacated bits read as not pressed
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.shifter = self.buttons.bits();
        }
        let data = utils::bv(self.shifter, 7);
        self.shifter <<= 1;
        data
    }

    /// Next bit [`Controller::read`] would return
    pub fn peek(&self) -> u8 {
        if self.strobe {
            utils::bv(self.buttons.bits(), 7)
        } else {
            utils::bv(self.shifter, 7)
        }
    }

    pub fn reset(&mut self) {
        self.shifter = 0;
        self.strobe = false;
    }

    fn poll_input(&mut self) {
        let Some(input) = &self.input else {
            return;
        };

        let disconnected = loop {
            match input.try_recv() {
                Ok(buttons) => self.buttons = Buttons::from_bits_truncate(buttons),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        if disconnected {
            warn!("Controller input channel disconnected");
            self.input = None;
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
