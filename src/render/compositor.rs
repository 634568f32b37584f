//! Two-layer frame composition
//!
//! Base layer: slide raster or a flat placeholder. Overlay layer: strokes.

use super::raster::RasterImage;

/// Source-over blend of one straight-alpha pixel onto another
pub(crate) fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let src_a = src[3] as f32 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    if src_a >= 1.0 {
        dst[..4].copy_from_slice(&src);
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for c in 0..3 {
        let blended =
            (src[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Compose the overlay over the base (or the placeholder color).
///
/// The output has the overlay's size; a base of another size is resampled.
pub fn compose(base: Option<&RasterImage>, overlay: &RasterImage, placeholder: [u8; 4]) -> RasterImage {
    let mut frame = match base {
        Some(base) => base.resized(overlay.width, overlay.height),
        None => RasterImage::filled(overlay.width, overlay.height, placeholder),
    };

    for (dst, src) in frame.data.chunks_exact_mut(4).zip(overlay.data.chunks_exact(4)) {
        blend_over(dst, [src[0], src[1], src[2], src[3]]);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_ink_replaces_base() {
        let mut overlay = RasterImage::new(2, 1);
        overlay.data[0..4].copy_from_slice(&[255, 0, 0, 255]);

        let frame = compose(None, &overlay, [255, 255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_half_alpha_blends() {
        let mut dst = [0, 0, 0, 255];
        blend_over(&mut dst, [255, 255, 255, 128]);
        assert_eq!(dst[3], 255);
        assert!((127..=129).contains(&dst[0]));
    }

    #[test]
    fn test_base_is_resampled_to_overlay() {
        let base = RasterImage::filled(10, 10, [0, 0, 255, 255]);
        let overlay = RasterImage::new(4, 3);
        let frame = compose(Some(&base), &overlay, [0, 0, 0, 0]);
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.pixel(3, 2), Some([0, 0, 255, 255]));
    }
}
