//! Linear-light RGB float buffer plus the image I/O at the system edge:
//! EXR in/out, PNG/JPG (decoded to linear with a 2.2 power), and Radiance
//! HDR for environment maps.

// std
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
// others
use anyhow::{bail, Context, Result};
use image::codecs::hdr::HdrDecoder;
// lumiray
use crate::core::base::{luminance, Float, Spectrum, PI};

const CHANNEL_NUM: usize = 3;

#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<Float>,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Image {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * CHANNEL_NUM],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (x as usize + y as usize * self.width as usize) * CHANNEL_NUM
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: Spectrum) {
        let o = self.offset(x, y);
        self.data[o] = rgb.x;
        self.data[o + 1] = rgb.y;
        self.data[o + 2] = rgb.z;
    }

    pub fn add_pixel(&mut self, x: u32, y: u32, rgb: Spectrum) {
        let o = self.offset(x, y);
        self.data[o] += rgb.x;
        self.data[o + 1] += rgb.y;
        self.data[o + 2] += rgb.z;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Spectrum {
        let o = self.offset(x, y);
        Spectrum::new(self.data[o], self.data[o + 1], self.data[o + 2])
    }

    /// Raw interleaved RGB storage; the render loop splits it into
    /// per-row chunks of `width * 3` floats for the workers.
    pub fn data_mut(&mut self) -> &mut [Float] {
        &mut self.data
    }

    pub fn data(&self) -> &[Float] {
        &self.data
    }

    pub const fn channels() -> usize {
        CHANNEL_NUM
    }

    pub fn mean(&self) -> Spectrum {
        let mut acc = Spectrum::zero();
        let n = (self.width * self.height) as Float;
        for i in (0..self.data.len()).step_by(CHANNEL_NUM) {
            acc += Spectrum::new(self.data[i], self.data[i + 1], self.data[i + 2]);
        }
        acc / n
    }

    /// Per-texel luminance organised as columns of rows for the
    /// environment-light distribution. With `sin_weight`, each texel is
    /// scaled by `sin(pi (v + 1/2) / H)` to undo the latitude stretch of
    /// the lat-long parameterization.
    pub fn get_data_for_sampling(&self, sin_weight: bool) -> Vec<Vec<Float>> {
        let mut columns = Vec::with_capacity(self.width as usize);
        for x in 0..self.width {
            let mut col = Vec::with_capacity(self.height as usize);
            for y in 0..self.height {
                let weight = if sin_weight {
                    (PI * (y as Float + 0.5) / self.height as Float).sin()
                } else {
                    1.0
                };
                col.push(luminance(&self.get_pixel(x, y)) * weight);
            }
            columns.push(col);
        }
        columns
    }

    pub fn read(path: &Path) -> Result<Image> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" => read_ldr(path),
            "hdr" => read_hdr(path),
            "exr" => read_exr(path),
            _ => bail!("unsupported image format: {}", path.display()),
        }
    }

    /// 32-bit float output, no tonemapping. OpenEXR stores channels
    /// sorted by name, so the file carries B, G, R.
    pub fn write_exr(&self, path: &Path) -> Result<()> {
        exr::prelude::write_rgb_file(
            path,
            self.width as usize,
            self.height as usize,
            |x, y| {
                let p = self.get_pixel(x as u32, y as u32);
                (p.x, p.y, p.z)
            },
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

fn read_ldr(path: &Path) -> Result<Image> {
    let decoded = image::open(path).with_context(|| format!("failed to read {}", path.display()))?;
    let rgba = decoded.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut img = Image::new(w, h);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as Float / 255.0;
        // 2.2 power decode to linear, alpha premultiplied
        let to_linear = |c: u8| (c as Float / 255.0).powf(2.2);
        img.set_pixel(
            x,
            y,
            Spectrum::new(to_linear(r), to_linear(g), to_linear(b)) * alpha,
        );
    }
    Ok(img)
}

fn read_hdr(path: &Path) -> Result<Image> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
    );
    let decoder = HdrDecoder::new(reader)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let meta = decoder.metadata();
    let pixels = decoder
        .read_image_hdr()
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let mut img = Image::new(meta.width, meta.height);
    for (i, rgb) in pixels.iter().enumerate() {
        let x = (i as u32) % meta.width;
        let y = (i as u32) / meta.width;
        img.set_pixel(x, y, Spectrum::new(rgb.0[0], rgb.0[1], rgb.0[2]));
    }
    Ok(img)
}

fn read_exr(path: &Path) -> Result<Image> {
    use exr::prelude::{read_first_rgba_layer_from_file, RgbaChannels};
    let decoded = read_first_rgba_layer_from_file(
        path,
        |resolution, _channels: &RgbaChannels| {
            Image::new(resolution.width() as u32, resolution.height() as u32)
        },
        |img: &mut Image, position, (r, g, b, _a): (f32, f32, f32, f32)| {
            img.set_pixel(position.x() as u32, position.y() as u32, Spectrum::new(r, g, b));
        },
    )
    .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(decoded.layer_data.channel_data.pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_set_get_add() {
        let mut img = Image::new(4, 2);
        img.set_pixel(3, 1, Spectrum::new(1.0, 2.0, 3.0));
        img.add_pixel(3, 1, Spectrum::new(0.5, 0.5, 0.5));
        assert_eq!(img.get_pixel(3, 1), Spectrum::new(1.5, 2.5, 3.5));
        assert_eq!(img.get_pixel(0, 0), Spectrum::zero());
    }

    #[test]
    fn sampling_data_shape_and_weights() {
        let mut img = Image::new(3, 4);
        for x in 0..3 {
            for y in 0..4 {
                img.set_pixel(x, y, Spectrum::one());
            }
        }
        let cols = img.get_data_for_sampling(true);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].len(), 4);
        // rows near the equator weigh more than rows near the poles
        assert!(cols[0][1] > cols[0][0]);
        assert!((cols[0][0] - cols[0][3]).abs() < 1e-6);

        let flat = img.get_data_for_sampling(false);
        assert!((flat[1][2] - luminance(&Spectrum::one())).abs() < 1e-6);
    }
}
