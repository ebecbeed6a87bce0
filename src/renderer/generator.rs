use film::{Sample, SampleTarget};
use frame::Frame;
use errors::*;
use sampler::halton_2d;
use stats::{pretty_percent, pretty_uint};

use super::progressive::{AbortFlag, RenderParams};
use super::{SampleCounter, SampleRenderer, SamplingContext};

/// Number of consecutive sequence indices a generator consumes before
/// jumping over the other generators' slices.
pub const SAMPLE_BATCH_SIZE: u64 = 67;

/// Cap on the samples generated speculatively while the target lock is
/// contended, and the increments they are reserved in.
const ADDITIONAL_SAMPLE_COUNT: usize = 4096;
const ADDITIONAL_SAMPLE_BATCH_SIZE: u64 = 64;

/// Generates samples from one interleaved slice of the global Halton
/// sequence and commits them to a shared `SampleTarget`.
///
/// Generator `i` of `G` starts its cursor at `i * SAMPLE_BATCH_SIZE`,
/// advances by one per sample, and jumps by `(G - 1) * SAMPLE_BATCH_SIZE`
/// after each full batch, so the union of all generators' index sets over
/// full batches is exactly the contiguous range of integers: the merged
/// sequence is itself a valid low-discrepancy sequence, with no collisions
/// and no gaps.
pub struct SampleGenerator<'a> {
    frame: &'a Frame,
    sample_renderer: &'a SampleRenderer,
    sample_counter: &'a SampleCounter,
    generate_during_contention: bool,
    enable_logging: bool,
    stride: u64,
    sequence_index: u64,
    current_batch_size: u64,
    samples: Vec<Sample>,
    lock_acquired_immediately: u64,
    lock_acquired_after_additional_work: u64,
    lock_acquired_after_blocking: u64,
    additional_sample_count: u64,
}

impl<'a> SampleGenerator<'a> {
    pub fn new(frame: &'a Frame,
               sample_renderer: &'a SampleRenderer,
               sample_counter: &'a SampleCounter,
               generator_index: u64,
               generator_count: u64,
               params: &RenderParams)
               -> SampleGenerator<'a> {
        assert!(generator_index < generator_count);
        SampleGenerator {
            frame,
            sample_renderer,
            sample_counter,
            generate_during_contention: params.generate_during_contention,
            enable_logging: params.enable_logging,
            stride: (generator_count - 1) * SAMPLE_BATCH_SIZE,
            sequence_index: generator_index * SAMPLE_BATCH_SIZE,
            current_batch_size: 0,
            samples: Vec::new(),
            lock_acquired_immediately: 0,
            lock_acquired_after_additional_work: 0,
            lock_acquired_after_blocking: 0,
            additional_sample_count: 0,
        }
    }

    /// Keep reserving batches from the shared counter and committing them to
    /// `target` until the budget runs out or `abort` is raised. Aborts are
    /// observed at batch granularity only.
    pub fn run(&mut self, target: &SampleTarget, batch_size: u64, abort: &AbortFlag)
               -> Result<()> {
        loop {
            if abort.is_aborted() {
                return Ok(());
            }
            let granted = self.sample_counter.reserve(batch_size);
            if granted == 0 {
                return Ok(());
            }
            self.generate_samples(granted as usize, target)?;
        }
    }

    /// Generate `count` samples and commit them to `target`.
    pub fn generate_samples(&mut self, count: usize, target: &SampleTarget) -> Result<()> {
        assert!(count > 0);
        self.samples.clear();
        self.generate_sample_vector(count)?;
        self.store_samples(target)
    }

    fn generate_sample_vector(&mut self, count: usize) -> Result<()> {
        self.samples.reserve(count);
        for _ in 0..count {
            let sample = self.generate_sample()?;
            self.samples.push(sample);

            self.sequence_index += 1;
            self.current_batch_size += 1;
            if self.current_batch_size == SAMPLE_BATCH_SIZE {
                self.current_batch_size = 0;
                self.sequence_index += self.stride;
            }
        }
        Ok(())
    }

    fn generate_sample(&mut self) -> Result<Sample> {
        // Sample coordinates in [0,1)^2, then the sample position in NDC.
        let s = halton_2d(self.sequence_index);
        let position = self.frame.sample_position(s);

        // Seeding the context with the global sequence index makes sub-sample
        // decisions reproducible and independent across generators.
        let mut ctx = SamplingContext::new(self.sequence_index);
        let result = self.sample_renderer.render_sample(&mut ctx, position)?;

        Ok(Sample {
               position,
               color: result.to_linear_rgb(),
           })
    }

    fn store_samples(&mut self, target: &SampleTarget) -> Result<()> {
        // Optimistically attempt to commit without blocking.
        if target.try_merge_samples(&self.samples) {
            self.lock_acquired_immediately += 1;
            return Ok(());
        }

        if self.generate_during_contention {
            // Another generator holds the target lock. Rather than wait,
            // reserve and generate more samples, re-attempting the commit
            // after each small batch. A renderer failure in here propagates
            // without ever touching the target lock.
            let max_sample_count = self.samples.len() + ADDITIONAL_SAMPLE_COUNT;
            while self.samples.len() < max_sample_count {
                let additional = self.sample_counter.reserve(ADDITIONAL_SAMPLE_BATCH_SIZE);
                if additional == 0 {
                    break;
                }
                self.generate_sample_vector(additional as usize)?;
                self.additional_sample_count += additional;

                if target.try_merge_samples(&self.samples) {
                    self.lock_acquired_after_additional_work += 1;
                    return Ok(());
                }
            }
        }

        // Give up and block until the target lock can be acquired.
        target.merge_samples(&self.samples);
        self.lock_acquired_after_blocking += 1;
        Ok(())
    }
}

impl<'a> Drop for SampleGenerator<'a> {
    fn drop(&mut self) {
        if self.enable_logging {
            let total = self.lock_acquired_immediately +
                        self.lock_acquired_after_additional_work +
                        self.lock_acquired_after_blocking;
            debug!("sample target lock acquisition statistics:\n  \
                    acquired immediately            : {}\n  \
                    acquired after additional work  : {}\n  \
                    acquired after blocking         : {}\n  \
                    samples generated while waiting : {}",
                   pretty_percent(self.lock_acquired_immediately, total),
                   pretty_percent(self.lock_acquired_after_additional_work, total),
                   pretty_percent(self.lock_acquired_after_blocking, total),
                   pretty_uint(self.additional_sample_count));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use parking_lot::Mutex;

    use super::*;
    use Point2f;
    use colorspace::ColorSpace;
    use film::ProgressiveFilm;
    use geometry::Point2i;
    use paramset::ParamSet;
    use renderer::ShadingResult;
    use spectrum::Spectrum;

    /// Records the global sequence index of every sample it is asked to
    /// render.
    struct RecordingRenderer {
        indices: Mutex<Vec<u64>>,
    }

    impl SampleRenderer for RecordingRenderer {
        fn render_sample(&self, ctx: &mut SamplingContext, _position: Point2f)
                         -> Result<ShadingResult> {
            self.indices.lock().push(ctx.instance());
            Ok(ShadingResult {
                   color: Spectrum::black(),
                   alpha: 1.0,
                   color_space: ColorSpace::LinearRgb,
               })
        }
    }

    #[test]
    fn interleaved_generators_cover_a_contiguous_range() {
        const GENERATOR_COUNT: u64 = 3;
        const FULL_BATCHES: u64 = 4;

        let frame = Frame::new(Point2i::new(16, 16),
                               Point2f::new(0.0, 0.0),
                               Point2f::new(1.0, 1.0));
        let renderer = RecordingRenderer { indices: Mutex::new(Vec::new()) };
        let target = ProgressiveFilm::new(Point2i::new(16, 16));
        let params = RenderParams::create(&mut ParamSet::default());

        let per_generator = SAMPLE_BATCH_SIZE * FULL_BATCHES;
        for i in 0..GENERATOR_COUNT {
            // Each generator gets its own counter so it consumes exactly its
            // share of full interleave batches.
            let counter = SampleCounter::new(per_generator);
            let mut generator =
                SampleGenerator::new(&frame, &renderer, &counter, i, GENERATOR_COUNT, &params);
            generator.generate_samples(per_generator as usize, &target)
                     .unwrap();
        }

        let indices = renderer.indices.lock();
        let expected_count = (GENERATOR_COUNT * per_generator) as usize;
        assert_eq!(indices.len(), expected_count);

        let unique: HashSet<u64> = indices.iter().cloned().collect();
        assert_eq!(unique.len(), expected_count, "duplicate sequence indices");
        assert_eq!(*unique.iter().max().unwrap(), expected_count as u64 - 1,
                   "gap in sequence indices");
    }

    #[test]
    fn renderer_errors_abort_the_generator() {
        struct FailingRenderer;
        impl SampleRenderer for FailingRenderer {
            fn render_sample(&self, _ctx: &mut SamplingContext, _position: Point2f)
                             -> Result<ShadingResult> {
                bail!("defective scene")
            }
        }

        let frame = Frame::new(Point2i::new(4, 4),
                               Point2f::new(0.0, 0.0),
                               Point2f::new(1.0, 1.0));
        let counter = SampleCounter::new(100);
        let target = ProgressiveFilm::new(Point2i::new(4, 4));
        let params = RenderParams::create(&mut ParamSet::default());
        let mut generator = SampleGenerator::new(&frame, &FailingRenderer, &counter, 0, 1, &params);

        assert!(generator.generate_samples(10, &target).is_err());
        // Nothing was committed.
        assert_eq!(target.total_sample_count(), 0);
    }
}
