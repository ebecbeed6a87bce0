use std::cmp;
use std::path::Path;

use image;

use colorspace::{srgb_u8_to_linear, ColorSpace};
use errors::*;
use texture::{Texture, Tile, TILE_SIZE};

/// A texture backed by an image file.
///
/// The image is decoded up front and its 8-bit sRGB data linearized through
/// a lookup table, so tiles are already in the working color space when the
/// store requests them.
pub struct ImageTexture {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl ImageTexture {
    pub fn new(path: &Path) -> Result<ImageTexture> {
        info!("loading texture {}", path.display());
        let buf = image::open(path)
            .map_err(|e| format_err!("failed to open texture \"{}\": {}", path.display(), e))?;
        let rgb = buf.to_rgb();
        let (width, height) = (rgb.width(), rgb.height());

        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for p in rgb.pixels() {
            pixels.push(srgb_u8_to_linear(p.data[0]));
            pixels.push(srgb_u8_to_linear(p.data[1]));
            pixels.push(srgb_u8_to_linear(p.data[2]));
        }

        Ok(ImageTexture {
               name: path.display().to_string(),
               width,
               height,
               pixels,
           })
    }
}

impl Texture for ImageTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_space(&self) -> ColorSpace {
        // Decoded at construction time.
        ColorSpace::LinearRgb
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

        // Tiles at the right and bottom edges may be partial.
        let x0 = tile_x * TILE_SIZE;
        let y0 = tile_y * TILE_SIZE;
        let tile_width = cmp::min(TILE_SIZE, self.width - x0);
        let tile_height = cmp::min(TILE_SIZE, self.height - y0);

        let mut tile = Tile::new(tile_width, tile_height, 3);
        for (ty, tx) in iproduct!(0..tile_height, 0..tile_width) {
            let src = (((y0 + ty) * self.width + x0 + tx) * 3) as usize;
            let dst = ((ty * tile_width + tx) * 3) as usize;
            tile.pixels_mut()[dst..dst + 3].copy_from_slice(&self.pixels[src..src + 3]);
        }
        Ok(tile)
    }
}
