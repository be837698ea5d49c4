use crate::interfaces::Memory;

/// Plain read/write memory block
#[derive(Clone)]
pub struct Ram {
    memory: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0; size],
        }
    }

    /// Load `contents` array starting on `address`.
    pub fn load(&mut self, address: u16, contents: &[u8]) {
        for (i, byte) in contents.iter().enumerate() {
            let address = address.wrapping_add(i as u16);
            self.write(address, *byte);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    pub fn clear(&mut self) {
        self.memory.fill(0);
    }
}

impl Memory for Ram {
    fn read(&self, address: u16) -> u8 {
        self.memory[address as usize % self.memory.len()]
    }

    fn write(&mut self, address: u16, data: u8) {
        let len = self.memory.len();
        self.memory[address as usize % len] = data;
    }

    fn size(&self) -> usize {
        self.memory.len()
    }
}

/// A memory chip whose address lines are partially decoded, so it appears
/// `mirrors` extra times after itself
#[derive(Clone)]
pub struct MirroredMemory<M: Memory> {
    inner: M,
    mirrors: usize,
}

impl<M: Memory> MirroredMemory<M> {
    pub fn new(inner: M, mirrors: usize) -> Self {
        Self { inner, mirrors }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    fn physical(&self, address: u16) -> u16 {
        (address as usize % self.inner.size()) as u16
    }
}

impl<M: Memory> Memory for MirroredMemory<M> {
    fn read(&self, address: u16) -> u8 {
        self.inner.read(self.physical(address))
    }

    fn write(&mut self, address: u16, data: u8) {
        let address = self.physical(address);
        self.inner.write(address, data);
    }

    fn size(&self) -> usize {
        self.inner.size() * (self.mirrors + 1)
    }
}
