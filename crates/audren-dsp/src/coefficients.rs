//! Biquad coefficient formats.
//!
//! Feedback coefficients are stored pre-negated: the kernels add `a0 * y[n-1] + a1 * y[n-2]`
//! rather than subtracting them.

use crate::fixed_point::{q14_to_f64, Q14_ONE};

/// Q14 fixed-point coefficients (every hardware revision).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BiquadFilterParameter {
    pub b: [i16; 3],
    pub a: [i16; 2],
}

impl BiquadFilterParameter {
    /// `b0 = 1.0`, everything else zero.
    pub const IDENTITY: Self = Self {
        b: [Q14_ONE as i16, 0, 0],
        a: [0, 0],
    };

    pub const fn new(b: [i16; 3], a: [i16; 2]) -> Self {
        Self { b, a }
    }
}

/// Native `f32` coefficients (revision 15 and later).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BiquadFilterParameterFloat {
    pub b: [f32; 3],
    pub a: [f32; 2],
}

impl BiquadFilterParameterFloat {
    pub const IDENTITY: Self = Self {
        b: [1.0, 0.0, 0.0],
        a: [0.0, 0.0],
    };

    pub const fn new(b: [f32; 3], a: [f32; 2]) -> Self {
        Self { b, a }
    }
}

/// Either coefficient format, as supplied by the mixing-graph builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BiquadCoefficients {
    Fixed(BiquadFilterParameter),
    Float(BiquadFilterParameterFloat),
}

impl BiquadCoefficients {
    pub fn is_float(&self) -> bool {
        matches!(self, BiquadCoefficients::Float(_))
    }

    /// Decode to the `f64` form used by the double-precision kernels.
    pub fn decode(&self) -> DecodedCoefficients {
        match self {
            BiquadCoefficients::Fixed(p) => DecodedCoefficients::from_fixed(p),
            BiquadCoefficients::Float(p) => DecodedCoefficients::from_float(p),
        }
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        BiquadCoefficients::Fixed(BiquadFilterParameter::default())
    }
}

impl From<BiquadFilterParameter> for BiquadCoefficients {
    fn from(value: BiquadFilterParameter) -> Self {
        BiquadCoefficients::Fixed(value)
    }
}

impl From<BiquadFilterParameterFloat> for BiquadCoefficients {
    fn from(value: BiquadFilterParameterFloat) -> Self {
        BiquadCoefficients::Float(value)
    }
}

/// Coefficients widened to `f64`, decoded once per kernel call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedCoefficients {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl DecodedCoefficients {
    pub fn from_fixed(p: &BiquadFilterParameter) -> Self {
        Self {
            b: p.b.map(q14_to_f64),
            a: p.a.map(q14_to_f64),
        }
    }

    pub fn from_float(p: &BiquadFilterParameterFloat) -> Self {
        Self {
            b: p.b.map(f64::from),
            a: p.a.map(f64::from),
        }
    }
}
