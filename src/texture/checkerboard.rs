use std::cmp;

use colorspace::ColorSpace;
use errors::*;
use spectrum::Spectrum;
use texture::{Texture, Tile, TILE_SIZE};

/// A procedural checkerboard.
///
/// Mostly useful for tests and debugging: it is deterministic, costs nothing
/// to load, and can declare an arbitrary source color space to exercise the
/// store's normalization paths.
pub struct CheckerboardTexture {
    name: String,
    width: u32,
    height: u32,
    check_size: u32,
    color_space: ColorSpace,
    on_color: Spectrum,
    off_color: Spectrum,
}

impl CheckerboardTexture {
    pub fn new(name: &str,
               width: u32,
               height: u32,
               check_size: u32,
               color_space: ColorSpace,
               on_color: Spectrum,
               off_color: Spectrum)
               -> CheckerboardTexture {
        assert!(width > 0 && height > 0 && check_size > 0);
        CheckerboardTexture {
            name: name.to_owned(),
            width,
            height,
            check_size,
            color_space,
            on_color,
            off_color,
        }
    }
}

impl Texture for CheckerboardTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    fn tile_counts(&self) -> (u32, u32) {
        ((self.width + TILE_SIZE - 1) / TILE_SIZE,
         (self.height + TILE_SIZE - 1) / TILE_SIZE)
    }

    fn load_tile(&self, tile_x: u32, tile_y: u32) -> Result<Tile> {
        let (tiles_x, tiles_y) = self.tile_counts();
        if tile_x >= tiles_x || tile_y >= tiles_y {
            bail!("tile ({}, {}) is outside texture \"{}\"",
                  tile_x,
                  tile_y,
                  self.name);
        }

        let x0 = tile_x * TILE_SIZE;
        let y0 = tile_y * TILE_SIZE;
        let tile_width = cmp::min(TILE_SIZE, self.width - x0);
        let tile_height = cmp::min(TILE_SIZE, self.height - y0);

        let mut tile = Tile::new(tile_width, tile_height, 3);
        for (ty, tx) in iproduct!(0..tile_height, 0..tile_width) {
            let on = ((x0 + tx) / self.check_size + (y0 + ty) / self.check_size) % 2 == 0;
            let c = if on { self.on_color } else { self.off_color };
            let i = (ty * tile_width + tx) as usize;
            tile.pixel_mut(i).copy_from_slice(&[c.r, c.g, c.b]);
        }
        Ok(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_at_check_boundaries() {
        let tex = CheckerboardTexture::new("checker",
                                           128,
                                           128,
                                           16,
                                           ColorSpace::LinearRgb,
                                           Spectrum::white(),
                                           Spectrum::black());
        let tile = tex.load_tile(0, 0).unwrap();
        assert_eq!(tile.pixel(0), &[1.0, 1.0, 1.0]);
        // One check to the right.
        assert_eq!(tile.pixel(16), &[0.0, 0.0, 0.0]);
        // Diagonal neighbour is back on.
        assert_eq!(tile.pixel((16 * 64 + 16) as usize), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn edge_tiles_are_partial() {
        let tex = CheckerboardTexture::new("checker",
                                           100,
                                           70,
                                           10,
                                           ColorSpace::LinearRgb,
                                           Spectrum::white(),
                                           Spectrum::black());
        assert_eq!(tex.tile_counts(), (2, 2));
        let tile = tex.load_tile(1, 1).unwrap();
        assert_eq!((tile.width(), tile.height()), (36, 6));
        assert!(tex.load_tile(2, 0).is_err());
    }
}
