//! End-to-end tests of the texture store: eviction must never touch a pinned
//! tile, byte accounting must match what the textures actually served, and
//! concurrent lookups must resolve to exactly one load per resident tile.

extern crate candela;
extern crate crossbeam;
extern crate parking_lot;
extern crate rand;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use candela::colorspace::ColorSpace;
use candela::errors::Result;
use candela::paramset::ParamSet;
use candela::scene::{Scene, TextureId};
use candela::texture::{Texture, Tile, TILE_SIZE};
use candela::texturestore::{TextureScope, TextureStore, TileKey};

const TILE_BYTES: usize = (TILE_SIZE * TILE_SIZE * 3 * 4) as usize;

/// A procedural texture that tracks which of its tiles are currently
/// resident, so tests can catch a tile being unloaded while in use or
/// loaded twice without an unload in between.
struct TrackingTexture {
    name: String,
    tiles_x: u32,
    tiles_y: u32,
    resident: Mutex<HashSet<(u32, u32)>>,
}

impl TrackingTexture {
    fn new(name: &str, tiles_x: u32, tiles_y: u32) -> TrackingTexture {
        TrackingTexture {
            name: name.to_owned(),
            tiles_x,
            tiles_y,
            resident: Mutex::new(HashSet::new()),
        }
    }
}

impl Texture for TrackingTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_space(&self) -> ColorSpace {
        ColorSpace::LinearRgb
    }

    fn tile_counts(&self) -> (u32, u32) {
        (self.tiles_x, self.tiles_y)
    }

    fn load_tile(&self, tile_x: u32, tile_y: u32) -> Result<Tile> {
        let newly_resident = self.resident.lock().insert((tile_x, tile_y));
        assert!(newly_resident,
                "tile ({}, {}) loaded twice without an unload",
                tile_x,
                tile_y);
        Ok(Tile::new(TILE_SIZE, TILE_SIZE, 3))
    }

    fn unload_tile(&self, tile_x: u32, tile_y: u32, _tile: &Tile) {
        let was_resident = self.resident.lock().remove(&(tile_x, tile_y));
        assert!(was_resident,
                "tile ({}, {}) unloaded but was never loaded",
                tile_x,
                tile_y);
    }
}

fn store_over(texture: Arc<TrackingTexture>, max_tiles: usize) -> (TextureStore, TextureId) {
    let mut scene = Scene::new();
    let id = scene.textures.insert(texture);
    let mut ps = ParamSet::default();
    ps.add_int("max_size", vec![(max_tiles * TILE_BYTES) as i32]);
    (TextureStore::new(Arc::new(scene), &mut ps), id)
}

fn key(texture: TextureId, tile_x: u32, tile_y: u32) -> TileKey {
    TileKey {
        scope: TextureScope::Root,
        texture,
        tile_x,
        tile_y,
    }
}

#[test]
fn eviction_never_touches_a_pinned_tile() {
    let texture = Arc::new(TrackingTexture::new("tracked", 4, 4));
    let (store, id) = store_over(Arc::clone(&texture), 3);

    let mut rng = StdRng::seed_from_u64(0x7ea5);
    let mut pins = Vec::new();
    for _ in 0..300 {
        if pins.is_empty() || rng.gen_bool(0.6) {
            let tile_x = rng.gen_range(0, 4);
            let tile_y = rng.gen_range(0, 4);
            let pin = store.get(&key(id, tile_x, tile_y)).unwrap();
            pins.push(((tile_x, tile_y), pin));
        } else {
            let victim = rng.gen_range(0, pins.len());
            pins.swap_remove(victim);
        }

        // Every pinned tile must still be resident in the source texture.
        let resident = texture.resident.lock();
        for &(coords, _) in &pins {
            assert!(resident.contains(&coords),
                    "pinned tile {:?} was unloaded",
                    coords);
        }
    }

    // The texture's view of residency and the store's byte accounting agree.
    let resident_tiles = texture.resident.lock().len();
    assert_eq!(store.statistics().resident_bytes, resident_tiles * TILE_BYTES);
}

#[test]
fn byte_accounting_matches_what_was_served() {
    let texture = Arc::new(TrackingTexture::new("tracked", 4, 1));
    let (store, id) = store_over(Arc::clone(&texture), 2);

    {
        let _a = store.get(&key(id, 0, 0)).unwrap();
        let _b = store.get(&key(id, 1, 0)).unwrap();
        let _c = store.get(&key(id, 2, 0)).unwrap();
        // All three are pinned; the store runs over budget rather than
        // evicting something in use.
        let stats = store.statistics();
        assert_eq!(stats.resident_bytes, 3 * TILE_BYTES);
        assert_eq!(stats.peak_bytes, 3 * TILE_BYTES);
    }

    // With the pins gone, the next load triggers eviction back to budget.
    drop(store.get(&key(id, 3, 0)).unwrap());
    let stats = store.statistics();
    assert!(stats.resident_bytes <= 2 * TILE_BYTES);
    assert_eq!(stats.peak_bytes, 4 * TILE_BYTES);
    assert_eq!(stats.resident_bytes,
               texture.resident.lock().len() * TILE_BYTES);
}

#[test]
fn concurrent_lookups_account_for_every_get() {
    let texture = Arc::new(TrackingTexture::new("tracked", 4, 4));
    let (store, id) = store_over(Arc::clone(&texture), 2);

    const THREADS: u64 = 4;
    const GETS_PER_THREAD: u64 = 200;

    crossbeam::scope(|scope| {
        for thread_index in 0..THREADS {
            let store = &store;
            scope.spawn(move |_| {
                let mut rng = StdRng::seed_from_u64(thread_index);
                for _ in 0..GETS_PER_THREAD {
                    let tile_x = rng.gen_range(0, 4);
                    let tile_y = rng.gen_range(0, 4);
                    let tile = store.get(&key(id, tile_x, tile_y)).unwrap();
                    assert_eq!(tile.memory_size(), TILE_BYTES);
                }
            });
        }
    }).unwrap();

    let stats = store.statistics();
    assert_eq!(stats.hit_count + stats.miss_count, THREADS * GETS_PER_THREAD);
    // Eviction can leave at most the budget plus whatever was pinned at the
    // time, one tile per thread.
    assert!(stats.resident_bytes <= (2 + THREADS as usize) * TILE_BYTES);
    assert_eq!(stats.resident_bytes,
               texture.resident.lock().len() * TILE_BYTES);
}
