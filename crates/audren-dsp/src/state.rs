use bytemuck::{Pod, Zeroable};

/// Persistent delay-line registers of one biquad filter.
///
/// Layout (32 bytes, 8-byte aligned), matching the DSP register dump:
/// - `s0`: most recent input sample
/// - `s1`: input sample before `s0`
/// - `s2`: most recent output sample
/// - `s3`: output sample before `s2`
///
/// The double-precision kernels store each word as the raw bit pattern of an `f64`. The integer
/// kernel reuses `s0`/`s1` as 64-bit fixed-point accumulators and never touches `s2`/`s3`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct BiquadFilterState {
    pub s0: i64,
    pub s1: i64,
    pub s2: i64,
    pub s3: i64,
}

impl BiquadFilterState {
    pub const SIZE_BYTES: usize = core::mem::size_of::<Self>();

    /// All-zero bit pattern (every register reads back as `0.0`).
    pub const fn zeroed() -> Self {
        Self {
            s0: 0,
            s1: 0,
            s2: 0,
            s3: 0,
        }
    }

    pub const fn from_words(words: [i64; 4]) -> Self {
        Self {
            s0: words[0],
            s1: words[1],
            s2: words[2],
            s3: words[3],
        }
    }

    pub const fn words(&self) -> [i64; 4] {
        [self.s0, self.s1, self.s2, self.s3]
    }

    pub fn reset(&mut self) {
        *self = Self::zeroed();
    }

    /// Reinterpret the four registers as `f64` values.
    #[inline]
    pub fn load_f64(&self) -> [f64; 4] {
        self.words().map(|word| f64::from_bits(word as u64))
    }

    /// Store four `f64` values by bit pattern; `load_f64` returns the identical bits.
    #[inline]
    pub fn store_f64(&mut self, registers: [f64; 4]) {
        *self = Self::from_words(registers.map(|value| value.to_bits() as i64));
    }

    /// View the registers as raw bytes (native endianness).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_register_dump() {
        assert_eq!(BiquadFilterState::SIZE_BYTES, 32);
        assert_eq!(core::mem::align_of::<BiquadFilterState>(), 8);
        assert_eq!(BiquadFilterState::zeroed().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn f64_registers_round_trip_bit_exactly() {
        let values = [-0.0, f64::MIN_POSITIVE / 3.0, 1.0 / 3.0, f64::NAN];
        let mut state = BiquadFilterState::zeroed();
        state.store_f64(values);

        let loaded = state.load_f64();
        for (stored, loaded) in values.iter().zip(loaded.iter()) {
            assert_eq!(stored.to_bits(), loaded.to_bits());
        }
        assert_eq!(state.s0, (-0.0f64).to_bits() as i64);
        assert!(state.s0 < 0, "sign bit of -0.0 lands in the sign bit of s0");
    }

    #[test]
    fn reset_clears_every_register() {
        let mut state = BiquadFilterState::from_words([1, -2, 3, -4]);
        state.reset();
        assert_eq!(state, BiquadFilterState::zeroed());
        assert_eq!(state.load_f64(), [0.0; 4]);
    }
}
