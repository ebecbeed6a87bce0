//! Bounded-memory, concurrently-shared store of texture tiles.
//!
//! Tiles are loaded on demand, normalized to the linear working color space,
//! pinned while in use and evicted (least recently used first) once the
//! aggregate resident size exceeds the configured budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cache::{CachePin, CacheRecord, CacheSwapper, SwapCache};
use colorspace::{srgb_to_linear, ColorSpace};
use errors::*;
use paramset::ParamSet;
use scene::{Assembly, AssemblyId, Scene, TextureId};
use spectrum::Spectrum;
use stats::pretty_size;
use texture::{Texture, Tile};

/// Identifies the texture container a tile comes from: the root scene or one
/// of its assemblies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureScope {
    Root,
    Assembly(AssemblyId),
}

/// Identity of one cached tile. Two keys are equal iff all four fields
/// match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub scope: TextureScope,
    pub texture: TextureId,
    pub tile_x: u32,
    pub tile_y: u32,
}

struct TileSwapperParams {
    memory_limit: usize,
    track_tile_loading: bool,
    track_tile_unloading: bool,
    track_store_size: bool,
}

const DEFAULT_MEMORY_LIMIT: usize = 1024 * 1024 * 1024;

impl TileSwapperParams {
    fn create(ps: &mut ParamSet) -> TileSwapperParams {
        let memory_limit = ps.find_one_int("max_size", DEFAULT_MEMORY_LIMIT as i32) as usize;
        assert!(memory_limit > 0);
        TileSwapperParams {
            memory_limit,
            track_tile_loading: ps.find_one_bool("track_tile_loading", false),
            track_tile_unloading: ps.find_one_bool("track_tile_unloading", false),
            track_store_size: ps.find_one_bool("track_store_size", false),
        }
    }
}

/// Loads, normalizes and releases tiles on behalf of the tile cache, and
/// accounts for the memory they keep resident.
pub struct TileSwapper {
    scene: Arc<Scene>,
    assemblies: HashMap<AssemblyId, Arc<Assembly>>,
    params: TileSwapperParams,
    memory_size: AtomicUsize,
    peak_memory_size: AtomicUsize,
}

impl TileSwapper {
    fn new(scene: Arc<Scene>, params: TileSwapperParams) -> TileSwapper {
        let mut assemblies = HashMap::new();
        gather_assemblies(&mut assemblies, &scene.assemblies);
        TileSwapper {
            scene,
            assemblies,
            params,
            memory_size: AtomicUsize::new(0),
            peak_memory_size: AtomicUsize::new(0),
        }
    }

    /// Bytes of tile data currently resident.
    pub fn memory_size(&self) -> usize {
        self.memory_size.load(Ordering::SeqCst)
    }

    /// Highest resident size seen so far.
    pub fn peak_memory_size(&self) -> usize {
        self.peak_memory_size.load(Ordering::SeqCst)
    }

    fn resolve_texture(&self, key: &TileKey) -> Result<&Arc<Texture>> {
        let textures = match key.scope {
            TextureScope::Root => &self.scene.textures,
            TextureScope::Assembly(id) => {
                &self.assemblies
                     .get(&id)
                     .ok_or_else(|| format_err!("no assembly with id {:?}", id))?
                     .textures
            }
        };
        textures
            .get(key.texture)
            .ok_or_else(|| format_err!("no texture with id {:?} in {:?}", key.texture, key.scope))
    }
}

fn gather_assemblies(map: &mut HashMap<AssemblyId, Arc<Assembly>>,
                     assemblies: &[Arc<Assembly>]) {
    for assembly in assemblies {
        map.insert(assembly.id, Arc::clone(assembly));
        gather_assemblies(map, &assembly.assemblies);
    }
}

/// Convert a tile from the sRGB color space to linear RGB, leaving alpha (if
/// present) unmodified.
fn convert_tile_srgb_to_linear_rgb(tile: &mut Tile) {
    let channels = tile.channel_count() as usize;
    for pixel in tile.pixels_mut().chunks_mut(channels) {
        for c in pixel.iter_mut().take(3) {
            *c = srgb_to_linear(*c);
        }
    }
}

/// Convert a tile from the CIE XYZ color space to linear RGB.
fn convert_tile_ciexyz_to_linear_rgb(tile: &mut Tile) {
    let channels = tile.channel_count() as usize;
    for pixel in tile.pixels_mut().chunks_mut(channels) {
        let rgb = Spectrum::from_xyz(&[pixel[0], pixel[1], pixel[2]]);
        pixel[0] = rgb.r;
        pixel[1] = rgb.g;
        pixel[2] = rgb.b;
    }
}

impl CacheSwapper for TileSwapper {
    type Key = TileKey;
    type Payload = Tile;

    fn load(&self, key: &TileKey) -> Result<Tile> {
        let texture = self.resolve_texture(key)?;

        if self.params.track_tile_loading {
            debug!("loading tile ({}, {}) from texture \"{}\"...",
                   key.tile_x,
                   key.tile_y,
                   texture.name());
        }

        let mut tile = texture.load_tile(key.tile_x, key.tile_y)?;

        // Normalize the tile to the linear RGB working color space.
        match texture.color_space() {
            ColorSpace::LinearRgb => {}
            ColorSpace::Srgb => convert_tile_srgb_to_linear_rgb(&mut tile),
            ColorSpace::CieXyz => convert_tile_ciexyz_to_linear_rgb(&mut tile),
            ColorSpace::Spectral => {
                // Unreachable for validated resources: no tile conversion
                // was ever added for spectral data.
                panic!("no tile conversion from the {} color space",
                       ColorSpace::Spectral)
            }
        }

        let tile_size = tile.memory_size();
        let memory_size = self.memory_size.fetch_add(tile_size, Ordering::SeqCst) + tile_size;
        self.peak_memory_size.fetch_max(memory_size, Ordering::SeqCst);

        if self.params.track_store_size {
            if memory_size > self.params.memory_limit {
                debug!("texture store size is {}, exceeding capacity {} by {}",
                       pretty_size(memory_size),
                       pretty_size(self.params.memory_limit),
                       pretty_size(memory_size - self.params.memory_limit));
            } else {
                debug!("texture store size is {}, below capacity {} by {}",
                       pretty_size(memory_size),
                       pretty_size(self.params.memory_limit),
                       pretty_size(self.params.memory_limit - memory_size));
            }
        }

        Ok(tile)
    }

    fn unload(&self, key: &TileKey, record: &CacheRecord<Tile>) -> bool {
        // Cannot unload tiles that are still in use.
        if record.owners() > 0 {
            return false;
        }

        let tile = record.payload();
        self.memory_size.fetch_sub(tile.memory_size(), Ordering::SeqCst);

        // The key resolved when the tile was loaded and the scene is
        // immutable while the store exists, so it still resolves here.
        if let Ok(texture) = self.resolve_texture(key) {
            if self.params.track_tile_unloading {
                debug!("unloading tile ({}, {}) from texture \"{}\"...",
                       key.tile_x,
                       key.tile_y,
                       texture.name());
            }
            texture.unload_tile(key.tile_x, key.tile_y, tile);
        }

        true
    }

    fn teardown(&self, key: &TileKey, record: &CacheRecord<Tile>) {
        let tile = record.payload();
        self.memory_size.fetch_sub(tile.memory_size(), Ordering::SeqCst);
        if let Ok(texture) = self.resolve_texture(key) {
            texture.unload_tile(key.tile_x, key.tile_y, tile);
        }
    }

    fn is_full(&self) -> bool {
        self.memory_size.load(Ordering::SeqCst) > self.params.memory_limit
    }
}

/// Snapshot of the store's counters; reporting-only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureStoreStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub resident_bytes: usize,
    pub peak_bytes: usize,
}

/// A pinned tile. Dropping the pin releases the tile for eviction.
pub type TilePin<'a> = CachePin<'a, TileSwapper>;

/// Facade composing the tile cache and the tile swapper.
pub struct TextureStore {
    tile_cache: SwapCache<TileSwapper>,
}

impl TextureStore {
    pub fn new(scene: Arc<Scene>, params: &mut ParamSet) -> TextureStore {
        let swapper = TileSwapper::new(scene, TileSwapperParams::create(params));
        TextureStore {
            tile_cache: SwapCache::new(swapper),
        }
    }

    /// Fetch a tile, loading and normalizing it on a miss. The tile stays
    /// pinned for as long as the returned handle lives.
    pub fn get(&self, key: &TileKey) -> Result<TilePin> {
        self.tile_cache.get(key)
    }

    pub fn statistics(&self) -> TextureStoreStats {
        let swapper = self.tile_cache.swapper();
        TextureStoreStats {
            hit_count: self.tile_cache.hit_count(),
            miss_count: self.tile_cache.miss_count(),
            resident_bytes: swapper.memory_size(),
            peak_bytes: swapper.peak_memory_size(),
        }
    }
}
