use std::mem;

use colorspace::ColorSpace;
use errors::*;

mod checkerboard;
mod imagemap;

pub use self::checkerboard::CheckerboardTexture;
pub use self::imagemap::ImageTexture;

/// Edge length of a texture tile, the unit of caching and eviction.
pub const TILE_SIZE: u32 = 64;

/// A tiled source of texel data. Tiles are served in whatever color space
/// the resource declares; the texture store normalizes them to linear RGB
/// on load.
pub trait Texture: Send + Sync {
    fn name(&self) -> &str;

    fn color_space(&self) -> ColorSpace;

    /// Number of tiles along the x and y axes.
    fn tile_counts(&self) -> (u32, u32);

    /// Load the raw pixel data of one tile. Failing to produce the data
    /// (missing or corrupt source) is fatal for the requesting render.
    fn load_tile(&self, tile_x: u32, tile_y: u32) -> Result<Tile>;

    /// Return a tile's payload to the resource. The default implementation
    /// simply drops it.
    fn unload_tile(&self, _tile_x: u32, _tile_y: u32, _tile: &Tile) {}
}

/// A fixed-size rectangular block of pixel data, 3 or 4 f32 channels per
/// pixel in row-major order.
pub struct Tile {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Vec<f32>,
}

impl Tile {
    pub fn new(width: u32, height: u32, channels: u32) -> Tile {
        assert!(channels == 3 || channels == 4);
        Tile {
            width,
            height,
            channels,
            pixels: vec![0.0; (width * height * channels) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channel_count(&self) -> u32 {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Bytes of pixel data this tile keeps resident.
    pub fn memory_size(&self) -> usize {
        self.pixels.len() * mem::size_of::<f32>()
    }

    pub fn pixel(&self, i: usize) -> &[f32] {
        let c = self.channels as usize;
        &self.pixels[i * c..(i + 1) * c]
    }

    pub fn pixel_mut(&mut self, i: usize) -> &mut [f32] {
        let c = self.channels as usize;
        &mut self.pixels[i * c..(i + 1) * c]
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [f32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_size_is_exact() {
        let tile = Tile::new(64, 64, 3);
        assert_eq!(tile.memory_size(), 64 * 64 * 3 * 4);
        let tile = Tile::new(16, 8, 4);
        assert_eq!(tile.memory_size(), 16 * 8 * 4 * 4);
    }

    #[test]
    fn pixel_accessors_round_trip() {
        let mut tile = Tile::new(2, 2, 4);
        tile.pixel_mut(3).copy_from_slice(&[0.1, 0.2, 0.3, 1.0]);
        assert_eq!(tile.pixel(3), &[0.1, 0.2, 0.3, 1.0]);
        assert_eq!(tile.pixel(0), &[0.0, 0.0, 0.0, 0.0]);
    }
}
