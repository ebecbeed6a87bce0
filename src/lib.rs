//! Concurrency and caching core of a progressive, physically based renderer.
//!
//! The two halves of this crate are independent:
//!
//! * `renderer` + `film` turn a pluggable per-sample shading routine into
//!   converged pixel estimates, splitting one global low-discrepancy sequence
//!   across any number of worker threads without duplicates or gaps;
//! * `texturestore` + `cache` share a bounded-memory pool of texture tiles
//!   between rendering threads, pinning tiles while they are in use and
//!   evicting unpinned ones under memory pressure.
//!
//! The crate never installs a logger; front-ends are expected to do that.

#[cfg(test)]
#[macro_use]
extern crate approx;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate crossbeam;
extern crate image;
extern crate indicatif;
extern crate num;
extern crate num_cpus;
extern crate parking_lot;

pub mod cache;
pub mod colorspace;
pub mod errors;
pub mod film;
pub mod frame;
pub mod geometry;
pub mod paramset;
pub mod renderer;
pub mod sampler;
pub mod scene;
pub mod spectrum;
pub mod stats;
pub mod texture;
pub mod texturestore;

pub use geometry::{Point2f, Point2i, Vector2f};

pub const ONE_MINUS_EPSILON: f32 = 1.0 - ::std::f32::EPSILON * 0.5;

pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

pub fn lerp(t: f32, a: f32, b: f32) -> f32 {
    (1.0 - t) * a + t * b
}
