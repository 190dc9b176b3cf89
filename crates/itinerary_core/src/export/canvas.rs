//! Scaled pixel canvas used by the built-in rasterizer.
//!
//! Callers draw in logical pixels; every primitive is multiplied by the
//! canvas scale and clipped to the image bounds.

use image::{Rgba, RgbaImage};

pub struct Canvas {
    image: RgbaImage,
    scale: u32,
}

impl Canvas {
    /// Creates a canvas of `width x height` logical pixels filled with `background`.
    pub fn new(width: u32, height: u32, scale: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width * scale, height * scale, background),
            scale,
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        let x0 = x.saturating_mul(self.scale).min(self.image.width());
        let y0 = y.saturating_mul(self.scale).min(self.image.height());
        let x1 = x
            .saturating_add(width)
            .saturating_mul(self.scale)
            .min(self.image.width());
        let y1 = y
            .saturating_add(height)
            .saturating_mul(self.scale)
            .min(self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    /// Draws a one-logical-pixel outline.
    pub fn stroke_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        if width == 0 || height == 0 {
            return;
        }
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y + height - 1, width, 1, color);
        self.fill_rect(x, y, 1, height, color);
        self.fill_rect(x + width - 1, y, 1, height, color);
    }

    pub fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Rgba<u8>) {
        let scale = i64::from(self.scale);
        let (cx, cy, r) = (
            i64::from(cx) * scale,
            i64::from(cy) * scale,
            i64::from(radius) * scale,
        );
        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());
        for py in (cy - r).max(0)..(cy + r).min(height) {
            for px in (cx - r).max(0)..(cx + r).min(width) {
                let (dx, dy) = (px - cx, py - cy);
                if dx * dx + dy * dy <= r * r {
                    // Bounds were clamped to the image size above.
                    self.image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::Canvas;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn fill_rect_scales_and_clips() {
        let mut canvas = Canvas::new(10, 10, 2, WHITE);
        canvas.fill_rect(8, 8, 5, 5, RED);
        let image = canvas.into_image();
        assert_eq!(image.dimensions(), (20, 20));
        assert_eq!(*image.get_pixel(16, 16), RED);
        assert_eq!(*image.get_pixel(19, 19), RED);
        assert_eq!(*image.get_pixel(15, 15), WHITE);
    }

    #[test]
    fn stroke_rect_leaves_interior_untouched() {
        let mut canvas = Canvas::new(10, 10, 1, WHITE);
        canvas.stroke_rect(1, 1, 6, 6, RED);
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(1, 1), RED);
        assert_eq!(*image.get_pixel(6, 6), RED);
        assert_eq!(*image.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn fill_circle_covers_center_not_corners() {
        let mut canvas = Canvas::new(20, 20, 1, WHITE);
        canvas.fill_circle(10, 10, 5, RED);
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(10, 10), RED);
        assert_eq!(*image.get_pixel(5, 5), WHITE);
    }
}
