//! Textures evaluated at wrapped `(u, v)` hit coordinates. BSDFs share
//! them behind `Arc`; the image variant keeps its decoded pixels in
//! linear light.

// lumiray
use crate::core::base::{clamp_t, Float, Spectrum};
use crate::core::geometry::Vector2f;
use crate::core::image::Image;

pub enum Texture {
    Constant(ConstantTexture),
    Image(ImageTexture),
}

impl Texture {
    pub fn evaluate(&self, uv: &Vector2f) -> Spectrum {
        match self {
            Texture::Constant(t) => t.evaluate(uv),
            Texture::Image(t) => t.evaluate(uv),
        }
    }
}

pub struct ConstantTexture {
    pub value: Spectrum,
}

impl ConstantTexture {
    pub fn new(value: Spectrum) -> Self {
        ConstantTexture { value }
    }
    pub fn evaluate(&self, _uv: &Vector2f) -> Spectrum {
        self.value
    }
}

/// Nearest-texel lookup; callers supply coordinates already wrapped to
/// `[0, 1)`.
pub struct ImageTexture {
    image: Image,
}

impl ImageTexture {
    pub fn new(image: Image) -> Self {
        ImageTexture { image }
    }
    pub fn evaluate(&self, uv: &Vector2f) -> Spectrum {
        let w = self.image.width();
        let h = self.image.height();
        let x = clamp_t((uv.x * w as Float) as i64, 0, w as i64 - 1) as u32;
        let y = clamp_t((uv.y * h as Float) as i64, 0, h as i64 - 1) as u32;
        self.image.get_pixel(x, y)
    }
}
