/// Return the bit value for `value` at bit position `bit`
pub fn bv(value: u8, bit: u8) -> u8 {
    (value >> bit) & 1
}

/// Return the bit value for a 16-bit `value` at bit position `bit`
pub fn bv_16(value: u16, bit: u8) -> u8 {
    ((value >> bit) & 1) as u8
}

/// Return the value from `value` between bit positions `major_bit` and
/// `minor_bit`
pub fn bvs(value: u8, major_bit: u8, minor_bit: u8) -> u8 {
    (value >> minor_bit) & ((1 << (major_bit - minor_bit + 1)) - 1)
}

/// Reverse bit order of a byte, used for horizontally flipped sprites
pub fn flip_byte(value: u8) -> u8 {
    value.reverse_bits()
}

/// A word whose bits are grouped in contiguous fields. Every group is
/// described by a mask and mutating one group never touches the others.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BitGroup<T> {
    value: T,
}

impl BitGroup<u16> {
    pub fn new(value: u16) -> Self {
        Self { value }
    }

    /// Value of the group selected by `mask`, shifted down to bit 0
    pub fn get(&self, mask: u16) -> u16 {
        (self.value & mask) >> mask.trailing_zeros()
    }

    /// Replace the group selected by `mask`. Bits of `value` not fitting in
    /// the group are discarded
    pub fn set(&mut self, mask: u16, value: u16) {
        let shifted = value.checked_shl(mask.trailing_zeros()).unwrap_or(0);
        self.value = (self.value & !mask) | (shifted & mask);
    }

    pub fn toggle(&mut self, mask: u16) {
        self.value ^= mask;
    }

    /// Add `amount` to a group wrapping around inside the group width
    pub fn overflowing_add(&mut self, mask: u16, amount: u16) {
        let value = self.get(mask).wrapping_add(amount);
        self.set(mask, value);
    }
}

impl From<BitGroup<u16>> for u16 {
    fn from(value: BitGroup<u16>) -> Self {
        value.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bv() {
        assert_eq!(bv(0b0000_0000, 0), 0);
        assert_eq!(bv(0b0000_0001, 0), 1);
        assert_eq!(bv(0b0001_0000, 4), 1);
        assert_eq!(bv(0b1110_1111, 4), 0);
    }

    #[test]
    fn test_bvs() {
        assert_eq!(bvs(0b0000_0000, 1, 0), 0);
        assert_eq!(bvs(0b0000_0001, 1, 0), 1);
        assert_eq!(bvs(0b0000_0011, 1, 0), 3);
        assert_eq!(bvs(0b0001_0000, 4, 0), 16);
        assert_eq!(bvs(0b1110_1111, 4, 4), 0);
    }

    #[test]
    fn test_flip_byte() {
        assert_eq!(flip_byte(0b1000_0000), 0b0000_0001);
        assert_eq!(flip_byte(0b1100_1010), 0b0101_0011);
    }

    #[test]
    fn test_bit_group_isolation() {
        let mut group = BitGroup::new(0xFFFF);
        group.set(0b0000_0000_1111_0000, 0);
        assert_eq!(u16::from(group), 0xFF0F);

        group.overflowing_add(0b0000_0000_0000_0011, 1);
        assert_eq!(u16::from(group), 0xFF0C);

        group.toggle(0b1000_0000_0000_0000);
        assert_eq!(group.get(0b1000_0000_0000_0000), 0);
    }
}
