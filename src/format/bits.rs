// Bit-reversal transform shared by `MirrorBackRef` decoding and the
// mirrored match finder.

/// Reverse the order of the 8 bits in `byte` (bit 7 <-> bit 0, ...).
#[inline]
pub const fn reverse_bits(byte: u8) -> u8 {
    byte.reverse_bits()
}
