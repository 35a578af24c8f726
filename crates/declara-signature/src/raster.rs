use crate::capture::{Point, Segment, Stroke};

/// Stroke width in pixels, matching the on-screen capture widget.
pub const STROKE_WIDTH: f32 = 2.0;

const BACKGROUND: u8 = 0xFF;
const INK: u8 = 0x00;

/// An 8-bit grayscale image, row-major, `width * height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; (width as usize) * (height as usize)],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)]
    }

    fn darken(&mut self, x: u32, y: u32, coverage: f32) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let shade = BACKGROUND as f32 + (INK as f32 - BACKGROUND as f32) * coverage;
        // min keeps overlapping strokes dark instead of washing them out
        self.pixels[idx] = self.pixels[idx].min(shade.round() as u8);
    }
}

/// Render strokes onto a white canvas as anti-aliased fixed-width black
/// lines. An empty stroke set yields a blank canvas of the same size — the
/// document composer, not this function, decides what to show instead.
pub fn rasterize(strokes: &[Stroke], width: u32, height: u32) -> RasterImage {
    let mut image = RasterImage::blank(width, height);
    for stroke in strokes {
        for segment in &stroke.segments {
            draw_segment(&mut image, segment);
        }
    }
    image
}

/// Coverage-based anti-aliasing: each pixel near the segment is shaded by
/// how far its center sits from the segment's axis, relative to the stroke
/// half-width.
fn draw_segment(image: &mut RasterImage, segment: &Segment) {
    if image.width == 0 || image.height == 0 {
        return;
    }
    let half = STROKE_WIDTH / 2.0;
    let reach = half + 1.0;

    let min_x = (segment.start.x.min(segment.end.x) - reach).floor().max(0.0) as u32;
    let min_y = (segment.start.y.min(segment.end.y) - reach).floor().max(0.0) as u32;
    let max_x = ((segment.start.x.max(segment.end.x) + reach).ceil() as u32).min(image.width - 1);
    let max_y = ((segment.start.y.max(segment.end.y) + reach).ceil() as u32).min(image.height - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let distance = distance_to_segment(center, segment);
            let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
            if coverage > 0.0 {
                image.darken(x, y, coverage);
            }
        }
    }
}

fn distance_to_segment(point: Point, segment: &Segment) -> f32 {
    let dx = segment.end.x - segment.start.x;
    let dy = segment.end.y - segment.start.y;
    let length_sq = dx * dx + dy * dy;

    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((point.x - segment.start.x) * dx + (point.y - segment.start.y) * dy) / length_sq)
            .clamp(0.0, 1.0)
    };

    let nearest_x = segment.start.x + t * dx;
    let nearest_y = segment.start.y + t * dy;
    ((point.x - nearest_x).powi(2) + (point.y - nearest_y).powi(2)).sqrt()
}
