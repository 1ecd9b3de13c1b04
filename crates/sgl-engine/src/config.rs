//! Rendering configuration shared by devices and batches.
//!
//! Values are plain data with `Default`s; loading them from disk is left to
//! the application.

use std::fmt;
use std::str::FromStr;

use crate::paint::Color;

/// Antialiasing policy for rendered geometry.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AntialiasMode {
    #[default]
    Disabled,
    Msaa2x,
    Msaa4x,
    Msaa8x,
    /// Post-process antialiasing. Batches treat it as "enabled, not multisampled".
    Fxaa,
}

impl AntialiasMode {
    /// Sample count of the color target (1 when not multisampled).
    pub fn samples(self) -> u32 {
        match self {
            AntialiasMode::Msaa2x => 2,
            AntialiasMode::Msaa4x => 4,
            AntialiasMode::Msaa8x => 8,
            AntialiasMode::Disabled | AntialiasMode::Fxaa => 1,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != AntialiasMode::Disabled
    }

    pub fn is_multisampled(self) -> bool {
        self.samples() > 1
    }
}

impl fmt::Display for AntialiasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AntialiasMode::Disabled => "disabled",
            AntialiasMode::Msaa2x => "msaa2x",
            AntialiasMode::Msaa4x => "msaa4x",
            AntialiasMode::Msaa8x => "msaa8x",
            AntialiasMode::Fxaa => "fxaa",
        };
        f.write_str(s)
    }
}

/// Case-insensitive; unknown names parse as [`AntialiasMode::Disabled`].
impl FromStr for AntialiasMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "msaa2x" => AntialiasMode::Msaa2x,
            "msaa4x" => AntialiasMode::Msaa4x,
            "msaa8x" => AntialiasMode::Msaa8x,
            "fxaa" => AntialiasMode::Fxaa,
            _ => AntialiasMode::Disabled,
        })
    }
}

/// Texture sampling policy applied by the device sampler.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureFilterMode {
    Nearest,
    #[default]
    Bilinear,
    Trilinear,
    Anisotropic2x,
    Anisotropic4x,
    Anisotropic8x,
    Anisotropic16x,
}

impl TextureFilterMode {
    /// Anisotropy clamp (1 when anisotropic filtering is off).
    pub fn anisotropy(self) -> u16 {
        match self {
            TextureFilterMode::Anisotropic2x => 2,
            TextureFilterMode::Anisotropic4x => 4,
            TextureFilterMode::Anisotropic8x => 8,
            TextureFilterMode::Anisotropic16x => 16,
            _ => 1,
        }
    }

    pub fn is_anisotropic(self) -> bool {
        self.anisotropy() > 1
    }

    /// Whether magnification/minification interpolate between texels.
    pub fn is_linear(self) -> bool {
        self != TextureFilterMode::Nearest
    }
}

impl fmt::Display for TextureFilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Case-insensitive; unknown names fall back to the default filter.
impl FromStr for TextureFilterMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => TextureFilterMode::Nearest,
            "bilinear" => TextureFilterMode::Bilinear,
            "trilinear" => TextureFilterMode::Trilinear,
            "anisotropic2x" => TextureFilterMode::Anisotropic2x,
            "anisotropic4x" => TextureFilterMode::Anisotropic4x,
            "anisotropic8x" => TextureFilterMode::Anisotropic8x,
            "anisotropic16x" => TextureFilterMode::Anisotropic16x,
            _ => TextureFilterMode::default(),
        })
    }
}

/// Device-level rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsConfig {
    pub antialias: AntialiasMode,
    pub texture_filter: TextureFilterMode,
    /// Color the frame is cleared to before any batch draws.
    pub clear_color: Color,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            antialias: AntialiasMode::Msaa4x,
            texture_filter: TextureFilterMode::Bilinear,
            clear_color: Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_mode_classification() {
        assert!(!AntialiasMode::Disabled.is_enabled());
        assert!(AntialiasMode::Fxaa.is_enabled());
        assert!(!AntialiasMode::Fxaa.is_multisampled());
        assert!(AntialiasMode::Msaa8x.is_multisampled());
        assert_eq!(AntialiasMode::Msaa4x.samples(), 4);
    }

    #[test]
    fn antialias_mode_parses_case_insensitively() {
        assert_eq!("MSAA4x".parse::<AntialiasMode>(), Ok(AntialiasMode::Msaa4x));
        assert_eq!("fxaa".parse::<AntialiasMode>(), Ok(AntialiasMode::Fxaa));
        assert_eq!("bogus".parse::<AntialiasMode>(), Ok(AntialiasMode::Disabled));
        assert_eq!(AntialiasMode::Msaa8x.to_string(), "msaa8x");
    }

    #[test]
    fn filter_mode_parses_and_reports_anisotropy() {
        let f: TextureFilterMode = "Anisotropic16x".parse().unwrap();
        assert_eq!(f.anisotropy(), 16);
        assert!(f.is_anisotropic());
        assert!(!TextureFilterMode::Nearest.is_linear());
        assert_eq!("?".parse::<TextureFilterMode>(), Ok(TextureFilterMode::Bilinear));
    }
}
