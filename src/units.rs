pub const DEFAULT_CONVERSION_FACTOR: f32 = 0.035;

/// Converts a pixel length to centimetres with a fixed scale.
#[inline]
pub fn pixels_to_cm(pixels: f32, factor: f32) -> f32 {
    pixels * factor
}
