//! The NES had a primitive DMA which allowed data transfer between CPU and PPU
//! OAM and CPU and APU.
//!
//! This module encapsulate the OAM DMA logic in [`Dma`]. Writing a page
//! number to $4014 copies the 256 bytes of that CPU page into OAM while the
//! CPU is suspended:
//!
//! - one or two dummy cycles until the next odd CPU cycle, so the transfer
//!   starts aligned
//! - 256 read/write pairs: even cycles read the CPU page, odd cycles write
//!   the byte to OAMDATA
//!
//! That's 513 or 514 CPU cycles in total.

use log::debug;

/// DMA controller is responsible to manage DMA. Once DMA starts, [`Dma`] is
/// able to track the progress and indicate ending of DMA process
#[derive(Clone, Debug)]
pub struct Dma {
    /// indicate whether DMA is active or not
    transfer: bool,

    /// indicates a dummy DMA cycle when it's synchronizing
    dummy: bool,

    /// high 8-bits of main bus address for OAM DMA transfer
    page: u8,

    /// low 8-bits of main bus address for OAM DMA transfer
    addr: u8,

    /// Byte of OAM data read from the CPU to write to the PPU
    data: u8,
}

/// What the bus has to do on a DMA cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaCycle {
    /// Alignment cycle, nothing happens
    Dummy,
    /// Read this CPU address and [`Dma::latch`] the value
    Read(u16),
    /// Write this byte to OAMDATA
    Write(u8),
}

impl Dma {
    pub fn new() -> Self {
        Self {
            transfer: false,
            dummy: true,
            page: 0,
            addr: 0,
            data: 0,
        }
    }

    /// Start a transfer of CPU page `page`
    pub fn start(&mut self, page: u8) {
        debug!("OAM DMA starts for page: ${page:0>2X}");
        self.transfer = true;
        self.dummy = true;
        self.page = page;
        self.addr = 0;
    }

    pub fn active(&self) -> bool {
        self.transfer
    }

    /// Next step of the transfer for CPU cycle number `cpu_cycle`
    pub fn next_cycle(&mut self, cpu_cycle: u64) -> DmaCycle {
        if self.dummy {
            if cpu_cycle % 2 == 1 {
                self.dummy = false;
            }
            return DmaCycle::Dummy;
        }

        if cpu_cycle % 2 == 0 {
            DmaCycle::Read(((self.page as u16) << 8) | self.addr as u16)
        } else {
            let data = self.data;
            self.addr = self.addr.wrapping_add(1);

            // once we wrap around, we've done 256 read-write cycles and
            // filled the OAM with data, we can now stop DMA
            if self.addr == 0x00 {
                self.transfer = false;
                debug!("OAM DMA finished");
            }
            DmaCycle::Write(data)
        }
    }

    /// Keep the byte read on a [`DmaCycle::Read`] cycle
    pub fn latch(&mut self, data: u8) {
        self.data = data;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Dma {
    fn default() -> Self {
        Self::new()
    }
}
