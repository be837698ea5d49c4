/// Address space seen by the CPU.
///
/// Reads are `&mut` as reading some devices has side effects (PPU status,
/// controllers, PPU data buffer). `peek` is the side effect free variant used
/// by debuggers and the disassembler.
pub trait Bus {
    /// Read a byte from the device attached to the specified `address`.
    fn read(&mut self, address: u16) -> u8;

    /// Writes a byte to the device attached to the specified `address`.
    fn write(&mut self, address: u16, data: u8);

    /// Read a byte without disturbing any device state
    fn peek(&self, address: u16) -> u8;
}

pub trait Memory {
    /// Read a byte from the specified `address`
    fn read(&self, address: u16) -> u8;

    /// Write a byte of `data` to the specified `address`
    fn write(&mut self, address: u16, data: u8);

    /// Memory size in bytes
    fn size(&self) -> usize;
}
