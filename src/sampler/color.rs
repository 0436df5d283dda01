// color.rs - Pixel color, alpha compositing, luminance

use image::Rgba;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r: r as f32, g: g as f32, b: b as f32, a: 1.0 }
    }

    pub fn from_rgba(p: Rgba<u8>) -> Self {
        let [r, g, b, a] = p.0;
        Self { r: r as f32, g: g as f32, b: b as f32, a: a as f32 / 255.0 }
    }

    /// Composite this color over an opaque background
    pub fn over(self, bg: Color) -> Color {
        if self.a >= 1.0 {
            return Color { a: 1.0, ..self };
        }
        let t = self.a.clamp(0.0, 1.0);
        Color {
            r: self.r * t + bg.r * (1.0 - t),
            g: self.g * t + bg.g * (1.0 - t),
            b: self.b * t + bg.b * (1.0 - t),
            a: 1.0,
        }
    }

    /// Mean of the three color channels, 0-255
    #[inline]
    pub fn luminance(self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }
}
