use std::sync::Arc;

use egui::{Color32, ColorImage, Pos2, Rect};

/// How newly painted pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Normal painting: source over destination.
    SourceOver,
    /// Erasing: the source's alpha punches a transparent hole in the
    /// destination. The source color is ignored.
    DestinationOut,
}

/// A shared, immutable raster image (premultiplied sRGB pixels).
///
/// Equation actions own one of these; cloning is cheap so an action can be
/// copied around without duplicating pixel data.
#[derive(Clone)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Arc<[Color32]>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || self.pixels == other.pixels)
    }
}

impl RasterImage {
    pub fn new(size: [usize; 2], pixels: Vec<Color32>) -> Self {
        debug_assert_eq!(pixels.len(), size[0] * size[1]);
        Self {
            width: size[0],
            height: size[1],
            pixels: pixels.into(),
        }
    }

    /// Build an image from straight (unmultiplied) RGBA bytes, the layout
    /// produced by the `image` crate's RGBA8 buffers.
    pub fn from_rgba_unmultiplied(size: [usize; 2], rgba: &[u8]) -> Self {
        debug_assert_eq!(rgba.len(), size[0] * size[1] * 4);
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect::<Vec<_>>();
        Self::new(size, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color32 {
        self.pixels[y * self.width + x]
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage {
            size: [self.width, self.height],
            pixels: self.pixels.to_vec(),
        }
    }
}

/// The drawing surface: a CPU raster of premultiplied RGBA values.
///
/// The surface starts fully transparent and is a deterministic function of
/// the operations applied to it. Pixel centers sit at (x + 0.5, y + 0.5).
#[derive(Clone, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    /// Premultiplied RGBA at the given pixel.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[y * self.width + x]
    }

    /// Coverage alpha at the given pixel.
    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        self.pixel(x, y)[3]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    fn composite(&mut self, x: usize, y: usize, src: [f32; 4], mode: CompositeMode) {
        let dst = &mut self.pixels[y * self.width + x];
        let sa = src[3];
        match mode {
            CompositeMode::SourceOver => {
                for c in 0..4 {
                    dst[c] = src[c] + dst[c] * (1.0 - sa);
                }
            }
            CompositeMode::DestinationOut => {
                for c in 0..4 {
                    dst[c] *= 1.0 - sa;
                }
            }
        }
    }

    /// Paint one straight segment with round caps.
    ///
    /// Coverage is binary: a pixel is painted iff its center lies within
    /// `width / 2` of the segment, which yields round caps and joins for
    /// free when consecutive segments share an endpoint.
    pub fn stroke_segment(
        &mut self,
        a: Pos2,
        b: Pos2,
        width: f32,
        color: Color32,
        opacity: f32,
        mode: CompositeMode,
    ) {
        if width <= 0.0 || opacity <= 0.0 {
            return;
        }
        let radius = width / 2.0;
        let src = premultiply(color, opacity);

        let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as usize;
        let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as usize;
        let max_x = ((a.x.max(b.x) + radius).ceil().max(0.0) as usize).min(self.width);
        let max_y = ((a.y.max(b.y) + radius).ceil().max(0.0) as usize).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, a, b) <= radius {
                    self.composite(x, y, src, mode);
                }
            }
        }
    }

    /// Blit `image` into `rect`, scaling with nearest-neighbour sampling and
    /// compositing source-over at full opacity.
    pub fn blit(&mut self, image: &RasterImage, rect: Rect) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let min_x = rect.min.x.floor().max(0.0) as usize;
        let min_y = rect.min.y.floor().max(0.0) as usize;
        let max_x = (rect.max.x.ceil().max(0.0) as usize).min(self.width);
        let max_y = (rect.max.y.ceil().max(0.0) as usize).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let u = (x as f32 + 0.5 - rect.min.x) / rect.width();
                let v = (y as f32 + 0.5 - rect.min.y) / rect.height();
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let sx = ((u * image.width() as f32) as usize).min(image.width() - 1);
                let sy = ((v * image.height() as f32) as usize).min(image.height() - 1);
                let src = premultiply(image.pixel(sx, sy), 1.0);
                self.composite(x, y, src, CompositeMode::SourceOver);
            }
        }
    }

    /// Convert to an egui image for texture upload.
    pub fn to_color_image(&self) -> ColorImage {
        let pixels = self
            .pixels
            .iter()
            .map(|p| {
                Color32::from_rgba_premultiplied(
                    (p[0] * 255.0).round() as u8,
                    (p[1] * 255.0).round() as u8,
                    (p[2] * 255.0).round() as u8,
                    (p[3] * 255.0).round() as u8,
                )
            })
            .collect();
        ColorImage {
            size: [self.width, self.height],
            pixels,
        }
    }
}

fn premultiply(color: Color32, opacity: f32) -> [f32; 4] {
    // Color32 stores premultiplied channels; scaling every channel by the
    // extra opacity keeps the result premultiplied.
    let [r, g, b, a] = color.to_array();
    [
        r as f32 / 255.0 * opacity,
        g as f32 / 255.0 * opacity,
        b as f32 / 255.0 * opacity,
        a as f32 / 255.0 * opacity,
    ]
}

/// Distance from `pos` to the closest point of segment `a`-`b`.
pub fn distance_to_segment(pos: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return pos.distance(a);
    }
    let t = ((pos - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    pos.distance(a + ab * t)
}
