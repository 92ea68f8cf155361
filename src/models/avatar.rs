use image::imageops::FilterType;

/// Avatar edge length in source pixels. Two pixels stack into one terminal cell.
pub const AVATAR_PIXELS: u32 = 12;

pub type Rgb = [u8; 3];

/// A decoded, downscaled avatar with everything outside the inscribed circle masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    size: u32,
    pixels: Vec<Option<Rgb>>,
}

impl AvatarImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let rgb = img
            .resize_to_fill(AVATAR_PIXELS, AVATAR_PIXELS, FilterType::Triangle)
            .to_rgb8();

        let mut avatar = Self::blank(AVATAR_PIXELS);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            if inside_circle(AVATAR_PIXELS, x, y) {
                avatar.pixels[(y * AVATAR_PIXELS + x) as usize] = Some(pixel.0);
            }
        }
        Ok(avatar)
    }

    fn blank(size: u32) -> Self {
        Self {
            size,
            pixels: vec![None; (size * size) as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `None` for masked pixels and coordinates past the edge.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.pixels[(y * self.size + x) as usize]
    }
}

/// Whether the centre of pixel (x, y) falls within the circle inscribed in a `size` square.
pub fn inside_circle(size: u32, x: u32, y: u32) -> bool {
    let radius = size as f32 / 2.0;
    let dx = x as f32 + 0.5 - radius;
    let dy = y as f32 + 0.5 - radius;
    dx * dx + dy * dy <= radius * radius
}
