use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Straight-alpha RGBA color.
///
/// Invariant:
/// - every channel lies in `[0, 1]`; constructors and arithmetic clamp.
///
/// Packed integer forms (`RGB565`, `RGBA4444`, `RGB888`, `RGBA8888`,
/// `ARGB8888`, `ABGR8888`) are encoded by rounding to the nearest level, so any
/// value representable in the target depth survives a decode/encode cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Color {
    pub const CLEAR: Color = Color::raw(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::raw(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::raw(1.0, 1.0, 1.0, 1.0);
    pub const GRAY: Color = Color::raw(0.5, 0.5, 0.5, 1.0);
    pub const LIGHT_GRAY: Color = Color::raw(0.75, 0.75, 0.75, 1.0);
    pub const DARK_GRAY: Color = Color::raw(0.25, 0.25, 0.25, 1.0);

    pub const RED: Color = Color::raw(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::raw(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::raw(0.0, 0.0, 1.0, 1.0);
    pub const CYAN: Color = Color::raw(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::raw(1.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::raw(1.0, 1.0, 0.0, 1.0);
    pub const ORANGE: Color = Color::raw(1.0, 0.6, 0.0, 1.0);

    pub const ROYAL_BLUE: Color = Color::from_rgb_bytes(0x41, 0x69, 0xE1);
    pub const SKY_BLUE: Color = Color::from_rgb_bytes(0x87, 0xCE, 0xEB);
    pub const CHARTREUSE: Color = Color::from_rgb_bytes(0x7F, 0xFF, 0x00);
    pub const FOREST: Color = Color::from_rgb_bytes(0x22, 0x8B, 0x22);
    pub const GOLDENROD: Color = Color::from_rgb_bytes(0xDA, 0xA5, 0x20);
    pub const FIREBRICK: Color = Color::from_rgb_bytes(0xB2, 0x22, 0x22);
    pub const CORAL: Color = Color::from_rgb_bytes(0xFF, 0x7F, 0x50);
    pub const SALMON: Color = Color::from_rgb_bytes(0xFA, 0x80, 0x72);
    pub const TOMATO: Color = Color::from_rgb_bytes(0xFF, 0x63, 0x47);
    pub const PINK: Color = Color::from_rgb_bytes(0xFF, 0xC0, 0xCB);
    pub const PURPLE: Color = Color::from_rgb_bytes(0xA0, 0x20, 0xF0);
    pub const VIOLET: Color = Color::from_rgb_bytes(0x94, 0x00, 0xD3);
    pub const PLUM: Color = Color::from_rgb_bytes(0xDD, 0xA0, 0xDD);

    /// Creates a color, clamping each channel to `[0, 1]`.
    ///
    /// NaN channels become `0`.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r: clamp01(r), g: clamp01(g), b: clamp01(b), a: clamp01(a) }
    }

    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    const fn raw(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    const fn from_rgb_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::raw(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    #[inline]
    pub fn r(self) -> f32 {
        self.r
    }

    #[inline]
    pub fn g(self) -> f32 {
        self.g
    }

    #[inline]
    pub fn b(self) -> f32 {
        self.b
    }

    #[inline]
    pub fn a(self) -> f32 {
        self.a
    }

    /// Channels as `[r, g, b, a]`, the layout written into vertex buffers.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the same color with a replaced alpha channel.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Linear interpolation towards `target`; `t` is not clamped but the
    /// result is.
    #[inline]
    pub fn lerp(self, target: Color, t: f32) -> Self {
        self.lerp_components(target.r, target.g, target.b, target.a, t)
    }

    #[inline]
    pub fn lerp_components(self, r: f32, g: f32, b: f32, a: f32, t: f32) -> Self {
        Self::new(
            self.r + t * (r - self.r),
            self.g + t * (g - self.g),
            self.b + t * (b - self.b),
            self.a + t * (a - self.a),
        )
    }

    // ── bytes ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn red_byte(self) -> u8 {
        quantize(self.r, 255) as u8
    }

    #[inline]
    pub fn green_byte(self) -> u8 {
        quantize(self.g, 255) as u8
    }

    #[inline]
    pub fn blue_byte(self) -> u8 {
        quantize(self.b, 255) as u8
    }

    #[inline]
    pub fn alpha_byte(self) -> u8 {
        quantize(self.a, 255) as u8
    }

    // ── 16-bit ────────────────────────────────────────────────────────────

    pub fn from_rgb565(rgb565: u16) -> Self {
        let v = rgb565 as u32;
        Self::new(
            ((v >> 11) & 0x1F) as f32 / 31.0,
            ((v >> 5) & 0x3F) as f32 / 63.0,
            (v & 0x1F) as f32 / 31.0,
            1.0,
        )
    }

    pub fn to_rgb565(self) -> u16 {
        ((quantize(self.r, 31) << 11) | (quantize(self.g, 63) << 5) | quantize(self.b, 31)) as u16
    }

    pub fn from_rgba4444(rgba4444: u16) -> Self {
        let v = rgba4444 as u32;
        Self::new(
            ((v >> 12) & 0xF) as f32 / 15.0,
            ((v >> 8) & 0xF) as f32 / 15.0,
            ((v >> 4) & 0xF) as f32 / 15.0,
            (v & 0xF) as f32 / 15.0,
        )
    }

    pub fn to_rgba4444(self) -> u16 {
        ((quantize(self.r, 15) << 12)
            | (quantize(self.g, 15) << 8)
            | (quantize(self.b, 15) << 4)
            | quantize(self.a, 15)) as u16
    }

    // ── 24/32-bit ─────────────────────────────────────────────────────────

    pub fn from_rgb888(rgb888: u32) -> Self {
        let [_, r, g, b] = rgb888.to_be_bytes();
        Self::new(unorm8(r), unorm8(g), unorm8(b), 1.0)
    }

    pub fn to_rgb888(self) -> u32 {
        u32::from_be_bytes([0, self.red_byte(), self.green_byte(), self.blue_byte()])
    }

    pub fn from_rgba8888(rgba8888: u32) -> Self {
        let [r, g, b, a] = rgba8888.to_be_bytes();
        Self::new(unorm8(r), unorm8(g), unorm8(b), unorm8(a))
    }

    pub fn to_rgba8888(self) -> u32 {
        u32::from_be_bytes([self.red_byte(), self.green_byte(), self.blue_byte(), self.alpha_byte()])
    }

    pub fn from_argb8888(argb8888: u32) -> Self {
        let [a, r, g, b] = argb8888.to_be_bytes();
        Self::new(unorm8(r), unorm8(g), unorm8(b), unorm8(a))
    }

    pub fn to_argb8888(self) -> u32 {
        u32::from_be_bytes([self.alpha_byte(), self.red_byte(), self.green_byte(), self.blue_byte()])
    }

    pub fn from_abgr8888(abgr8888: u32) -> Self {
        let [a, b, g, r] = abgr8888.to_be_bytes();
        Self::new(unorm8(r), unorm8(g), unorm8(b), unorm8(a))
    }

    pub fn to_abgr8888(self) -> u32 {
        u32::from_be_bytes([self.alpha_byte(), self.blue_byte(), self.green_byte(), self.red_byte()])
    }

    /// Parses `0xRRGGBBAA` (prefix optional).
    ///
    /// Malformed input yields [`Color::CLEAR`].
    pub fn from_hex_str(s: &str) -> Self {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .or_else(|| digits.strip_prefix('#'))
            .unwrap_or(digits);

        match u32::from_str_radix(digits, 16) {
            Ok(v) if digits.len() == 8 => Self::from_rgba8888(v),
            _ => {
                log::debug!("invalid color literal {s:?}; using transparent");
                Self::CLEAR
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.to_rgba8888())
    }
}

impl Mul for Color {
    type Output = Color;
    #[inline]
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    #[inline]
    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Add for Color {
    type Output = Color;
    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Sub for Color {
    type Output = Color;
    #[inline]
    fn sub(self, rhs: Color) -> Color {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

#[inline]
fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[inline]
fn unorm8(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn quantize(channel: f32, max: u32) -> u32 {
    (channel * max as f32).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── clamping ──────────────────────────────────────────────────────────

    #[test]
    fn new_clamps_out_of_range_channels() {
        let c = Color::new(-1.0, 2.0, 0.5, f32::NAN);
        assert_eq!(c.to_array(), [0.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn arithmetic_stays_clamped() {
        let c = Color::WHITE + Color::WHITE;
        assert_eq!(c, Color::WHITE);

        let d = Color::BLACK - Color::WHITE;
        assert_eq!(d.to_array(), [0.0, 0.0, 0.0, 0.0]);

        let e = Color::GRAY * 4.0;
        assert_eq!(e, Color::WHITE);
    }

    #[test]
    fn lerp_halfway() {
        let c = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(c.to_array(), [0.5, 0.5, 0.5, 1.0]);
    }

    // ── packed forms ──────────────────────────────────────────────────────

    #[test]
    fn rgba8888_red_round_trips() {
        let c = Color::from_rgba8888(0xFF0000FF);
        assert_eq!(c, Color::RED);
        assert_eq!(c.to_rgba8888(), 0xFF0000FF);
    }

    #[test]
    fn rgba8888_round_trips_arbitrary_values() {
        for v in [0x00000000u32, 0x12345678, 0x80808080, 0xFFFFFFFF, 0x01FE7F80] {
            assert_eq!(Color::from_rgba8888(v).to_rgba8888(), v, "value {v:#010X}");
        }
    }

    #[test]
    fn rgb565_round_trips_every_value() {
        for v in 0..=u16::MAX {
            assert_eq!(Color::from_rgb565(v).to_rgb565(), v, "value {v:#06X}");
        }
    }

    #[test]
    fn rgba4444_round_trips_every_value() {
        for v in 0..=u16::MAX {
            assert_eq!(Color::from_rgba4444(v).to_rgba4444(), v, "value {v:#06X}");
        }
    }

    #[test]
    fn rgb565_is_lossy_for_arbitrary_colors() {
        let c = Color::rgb(0.51, 0.0, 0.0);
        let back = Color::from_rgb565(c.to_rgb565());
        assert_ne!(back, c);
    }

    #[test]
    fn byte_orders_agree() {
        let c = Color::from_rgba8888(0x11223344);
        assert_eq!(c.to_argb8888(), 0x44112233);
        assert_eq!(c.to_abgr8888(), 0x44332211);
        assert_eq!(c.to_rgb888(), 0x00112233);
        assert_eq!(Color::from_argb8888(0x44112233), c);
        assert_eq!(Color::from_abgr8888(0x44332211), c);
        assert_eq!(Color::from_rgb888(0x112233).to_rgb888(), 0x112233);
    }

    // ── text form ─────────────────────────────────────────────────────────

    #[test]
    fn hex_string_parses_and_displays() {
        let c = Color::from_hex_str("0xFF7F50FF");
        assert_eq!(c, Color::CORAL);
        assert_eq!(c.to_string(), "0xFF7F50FF");
    }

    #[test]
    fn malformed_hex_string_is_clear() {
        assert_eq!(Color::from_hex_str("0xZZ"), Color::CLEAR);
        assert_eq!(Color::from_hex_str("0xFFF"), Color::CLEAR);
    }
}
