//! RGBA raster images and PNG encoding

use super::RenderError;
use std::io::{Read, Write};

/// Straight-alpha RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA pixel data
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Fully transparent image
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(idx..idx + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| self.width as f64 / self.height as f64)
    }

    /// Nearest-neighbour resample to an exact size
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Self::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }

        for dy in 0..height {
            let src_y = ((dy as f64 * self.height as f64 / height as f64) as u32).min(self.height - 1);
            for dx in 0..width {
                let src_x = ((dx as f64 * self.width as f64 / width as f64) as u32).min(self.width - 1);
                let src_idx = ((src_y * self.width + src_x) * 4) as usize;
                let dst_idx = ((dy * width + dx) * 4) as usize;
                out.data[dst_idx..dst_idx + 4].copy_from_slice(&self.data[src_idx..src_idx + 4]);
            }
        }
        out
    }

    /// Resample to `width`, keeping the aspect ratio
    pub fn scaled_to_width(&self, width: u32) -> Self {
        let height = match self.aspect_ratio() {
            Some(ratio) => (width as f64 / ratio).round().max(1.0) as u32,
            None => 0,
        };
        self.resized(width, height)
    }
}

/// Encode an image as an RGBA PNG
pub fn encode_png<W: Write>(image: &RasterImage, writer: W) -> Result<(), RenderError> {
    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| RenderError::Png(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(&image.data)
        .map_err(|e| RenderError::Png(format!("PNG write error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| RenderError::Png(format!("PNG finish error: {}", e)))?;
    Ok(())
}

/// Decode a PNG into RGBA
pub fn decode_png<R: Read>(reader: R) -> Result<RasterImage, RenderError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| RenderError::Png(format!("PNG decode error: {}", e)))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| RenderError::Png(format!("PNG frame error: {}", e)))?;

    if info.bit_depth != png::BitDepth::Eight {
        return Err(RenderError::Png(format!(
            "Unsupported PNG bit depth: {:?}",
            info.bit_depth
        )));
    }

    let raw = &buf[..info.buffer_size()];
    let data = match info.color_type {
        png::ColorType::Rgba => raw.to_vec(),
        png::ColorType::Rgb => {
            // Add alpha channel
            let mut rgba = Vec::with_capacity(raw.len() / 3 * 4);
            for chunk in raw.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity(raw.len() * 2);
            for chunk in raw.chunks(2) {
                rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity(raw.len() * 4);
            for &v in raw {
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
            rgba
        }
        other => {
            return Err(RenderError::Png(format!(
                "Unsupported PNG color type: {:?}",
                other
            )));
        }
    };

    Ok(RasterImage {
        width: info.width,
        height: info.height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip() {
        let mut image = RasterImage::filled(3, 2, [10, 20, 30, 255]);
        image.data[0..4].copy_from_slice(&[255, 0, 0, 128]);

        let mut bytes = Vec::new();
        encode_png(&image, &mut bytes).unwrap();
        let decoded = decode_png(bytes.as_slice()).unwrap();

        assert_eq!(decoded, image);
    }

    #[test]
    fn test_sixteen_bit_deck_is_stripped() {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 1, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Sixteen);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[0x12, 0x34, 0xAB, 0xCD, 0xFF, 0xFF])
                .unwrap();
        }

        let decoded = decode_png(bytes.as_slice()).unwrap();
        assert_eq!(decoded.pixel(0, 0), Some([0x12, 0xAB, 0xFF, 255]));
    }

    #[test]
    fn test_scaled_to_width_keeps_aspect() {
        let image = RasterImage::filled(400, 300, [0, 0, 0, 255]);
        let scaled = image.scaled_to_width(200);
        assert_eq!((scaled.width, scaled.height), (200, 150));
    }

    #[test]
    fn test_resized_nearest_neighbour() {
        let mut image = RasterImage::new(2, 1);
        image.data.copy_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);

        let wide = image.resized(4, 1);
        assert_eq!(wide.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(wide.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(wide.pixel(3, 0), Some([0, 0, 255, 255]));
    }
}
