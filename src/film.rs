use parking_lot::Mutex;

use {clamp, Point2f, Point2i};
use spectrum::Spectrum;

/// One evaluated image sample: a position in NDC plus an RGBA color, already
/// in the linear working color space. Samples live in a generator's local
/// buffer until they are merged into a target; they are never shared between
/// threads.
#[derive(Debug, Copy, Clone)]
pub struct Sample {
    pub position: Point2f,
    pub color: [f32; 4],
}

/// The shared accumulation buffer sample generators race to commit into.
///
/// The merge must be commutative and order-independent: generators commit in
/// whatever order they win the lock, and the final image must not depend on
/// that interleaving.
pub trait SampleTarget: Send + Sync {
    /// Non-blocking commit. Fails only because another thread holds the
    /// target's lock, never because of the samples themselves.
    fn try_merge_samples(&self, samples: &[Sample]) -> bool;

    /// Blocking commit; always succeeds eventually.
    fn merge_samples(&self, samples: &[Sample]);
}

#[derive(Clone, Default)]
struct Pixel {
    color_sum: [f32; 4],
    sample_count: u64,
}

/// A pixel buffer accumulating running RGBA sums and sample counts, suitable
/// for progressive display: `develop()` can be called at any point between
/// commits to get the current estimate.
pub struct ProgressiveFilm {
    resolution: Point2i,
    pixels: Mutex<Vec<Pixel>>,
}

impl ProgressiveFilm {
    pub fn new(resolution: Point2i) -> ProgressiveFilm {
        assert!(resolution.x > 0 && resolution.y > 0);
        let pixel_count = (resolution.x * resolution.y) as usize;
        ProgressiveFilm {
            resolution,
            pixels: Mutex::new(vec![Pixel::default(); pixel_count]),
        }
    }

    pub fn resolution(&self) -> Point2i {
        self.resolution
    }

    /// Return the per-pixel mean color. Reconstruction filtering is the
    /// front-end's job; the mean is what a progressive display shows.
    pub fn develop(&self) -> Vec<Spectrum> {
        let pixels = self.pixels.lock();
        pixels
            .iter()
            .map(|p| {
                if p.sample_count == 0 {
                    Spectrum::black()
                } else {
                    let inv = 1.0 / p.sample_count as f32;
                    Spectrum::rgb(p.color_sum[0] * inv,
                                  p.color_sum[1] * inv,
                                  p.color_sum[2] * inv)
                }
            })
            .collect()
    }

    /// Total number of samples merged so far, across all pixels.
    pub fn total_sample_count(&self) -> u64 {
        let pixels = self.pixels.lock();
        pixels.iter().map(|p| p.sample_count).sum()
    }

    fn pixel_index(&self, position: Point2f) -> usize {
        let x = clamp((position.x * self.resolution.x as f32) as i32,
                      0,
                      self.resolution.x - 1);
        let y = clamp((position.y * self.resolution.y as f32) as i32,
                      0,
                      self.resolution.y - 1);
        (y * self.resolution.x + x) as usize
    }

    fn merge(&self, pixels: &mut [Pixel], samples: &[Sample]) {
        for sample in samples {
            if sample.position.has_nan() {
                warn!("sample position has NaNs, ignoring");
                continue;
            }
            let pixel = &mut pixels[self.pixel_index(sample.position)];
            for (sum, c) in pixel.color_sum.iter_mut().zip(sample.color.iter()) {
                *sum += *c;
            }
            pixel.sample_count += 1;
        }
    }
}

impl SampleTarget for ProgressiveFilm {
    fn try_merge_samples(&self, samples: &[Sample]) -> bool {
        match self.pixels.try_lock() {
            Some(mut pixels) => {
                self.merge(&mut pixels, samples);
                true
            }
            None => false,
        }
    }

    fn merge_samples(&self, samples: &[Sample]) {
        let mut pixels = self.pixels.lock();
        self.merge(&mut pixels, samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, y: f32, v: f32) -> Sample {
        Sample {
            position: Point2f::new(x, y),
            color: [v, v, v, 1.0],
        }
    }

    #[test]
    fn merge_accumulates_mean() {
        let film = ProgressiveFilm::new(Point2i::new(2, 2));
        film.merge_samples(&[sample(0.1, 0.1, 1.0), sample(0.2, 0.2, 0.0)]);
        assert!(film.try_merge_samples(&[sample(0.9, 0.9, 0.5)]));

        let image = film.develop();
        assert_eq!(image[0], Spectrum::grey(0.5));
        assert_eq!(image[3], Spectrum::grey(0.5));
        assert_eq!(film.total_sample_count(), 3);
    }

    #[test]
    fn try_merge_fails_under_contention() {
        let film = ProgressiveFilm::new(Point2i::new(1, 1));
        let _guard = film.pixels.lock();
        assert!(!film.try_merge_samples(&[sample(0.5, 0.5, 1.0)]));
    }

    #[test]
    fn positions_at_the_edge_stay_in_bounds() {
        let film = ProgressiveFilm::new(Point2i::new(4, 4));
        film.merge_samples(&[sample(0.999_999, 0.999_999, 1.0), sample(0.0, 0.0, 1.0)]);
        assert_eq!(film.total_sample_count(), 2);
    }
}
