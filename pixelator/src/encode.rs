//! Packed-integer pixel encoding for the wraparound RGB metric.

use rgb::RGB8;

/// Packs a 3-component 8-bit color sample into a single integer.
///
/// Red lands in bits 16-23, green in bits 8-15, blue in bits 0-7,
/// giving a value in `[0, 16_777_215]`. This is only used for the
/// byte-style wraparound RGB metric, not as a general color
/// representation.
#[inline]
#[must_use]
pub fn pack_rgb(px: RGB8) -> u32 {
    (u32::from(px.r) << 16) | (u32::from(px.g) << 8) | u32::from(px.b)
}
