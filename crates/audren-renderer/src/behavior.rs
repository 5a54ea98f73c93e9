//! Renderer revision gating.
//!
//! Guests announce the renderer interface they were built against with a `REVn` magic. Features
//! that changed the parameter layout or the numeric path are gated on that revision.

/// Newest revision this renderer implements.
pub const CURRENT_REVISION: u32 = 15;

/// `b"REV0"` read as a little-endian `u32`; the revision number is added in the top byte.
pub const REVISION_MAGIC_BASE: u32 = u32::from_le_bytes(*b"REV0");

/// Build the `REVn` magic for revision `n` (`n` in `0..=9` stays printable; higher values
/// simply continue counting in the top byte).
pub const fn revision_magic(revision: u32) -> u32 {
    REVISION_MAGIC_BASE.wrapping_add(revision << 24)
}

/// Extract the revision number from a `REVn` magic. Returns `None` if the low three bytes are
/// not `b"REV"`.
pub fn revision_from_magic(magic: u32) -> Option<u32> {
    if magic & 0x00FF_FFFF != REVISION_MAGIC_BASE & 0x00FF_FFFF {
        return None;
    }
    Some(magic.wrapping_sub(REVISION_MAGIC_BASE) >> 24)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorInfo {
    user_revision: u32,
}

impl BehaviorInfo {
    pub fn new(user_revision: u32) -> Self {
        Self { user_revision }
    }

    /// Parse a guest-supplied `REVn` magic. Unknown magics fall back to revision 1.
    pub fn from_magic(magic: u32) -> Self {
        let revision = revision_from_magic(magic).unwrap_or_else(|| {
            tracing::warn!("unrecognised renderer revision magic {magic:#010x}");
            1
        });
        Self::new(revision)
    }

    pub fn user_revision(&self) -> u32 {
        self.user_revision
    }

    /// Splitter destinations carry per-destination biquad filters.
    pub fn is_splitter_biquad_filter_supported(&self) -> bool {
        self.user_revision >= 12
    }

    /// Splitter destinations carry an explicit "reset previous volume" flag.
    pub fn is_splitter_prev_volume_reset_supported(&self) -> bool {
        self.user_revision >= 13
    }

    /// Biquad coefficients may be supplied as native `f32`.
    pub fn is_biquad_filter_float_coefficient_supported(&self) -> bool {
        self.user_revision >= 15
    }
}

impl Default for BehaviorInfo {
    fn default() -> Self {
        Self::new(CURRENT_REVISION)
    }
}
