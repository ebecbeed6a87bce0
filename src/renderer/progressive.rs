use std::cmp;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam;
use num_cpus;

use errors::*;
use film::SampleTarget;
use frame::Frame;
use paramset::ParamSet;

use super::generator::SAMPLE_BATCH_SIZE;
use super::{SampleCounter, SampleGenerator, SampleRenderer};

/// Cooperative cancellation signal shared between the caller and the worker
/// threads. Generators observe it at batch granularity; there is no
/// preemption of an evaluation already in progress.
#[derive(Default)]
pub struct AbortFlag {
    aborted: AtomicBool,
}

impl AbortFlag {
    pub fn new() -> AbortFlag {
        AbortFlag::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}

/// Knobs for the parallel sampling driver.
pub struct RenderParams {
    /// Number of worker threads; 0 means one per logical CPU.
    pub thread_count: usize,
    /// How many sample slots a generator reserves from the shared counter at
    /// a time.
    pub batch_size: u64,
    /// Generate extra samples while the target lock is contended instead of
    /// blocking right away.
    pub generate_during_contention: bool,
    /// Log per-generator lock acquisition statistics at debug level.
    pub enable_logging: bool,
}

impl RenderParams {
    pub fn create(ps: &mut ParamSet) -> RenderParams {
        RenderParams {
            thread_count: ps.find_one_int("threads", 0) as usize,
            batch_size: ps.find_one_int("batch_size", SAMPLE_BATCH_SIZE as i32) as u64,
            generate_during_contention: ps.find_one_bool("generate_during_contention", false),
            enable_logging: ps.find_one_bool("enable_logging", false),
        }
    }
}

/// Drive a fixed pool of worker threads, one `SampleGenerator` each, until
/// the shared sample budget is exhausted or `abort` is raised.
///
/// A generator failing (a fatal sample evaluation error) does not stop the
/// others; the first error is returned once every thread has finished.
pub fn render_progressive(frame: &Frame,
                          sample_renderer: &SampleRenderer,
                          target: &SampleTarget,
                          sample_counter: &SampleCounter,
                          abort: &AbortFlag,
                          params: &RenderParams)
                          -> Result<()> {
    let thread_count = if params.thread_count == 0 {
        num_cpus::get()
    } else {
        params.thread_count
    };
    let thread_count = cmp::max(1, thread_count);
    let batch_size = cmp::max(1, params.batch_size);
    info!("generating {} samples using {} threads",
          sample_counter.remaining(),
          thread_count);

    let scope_result = crossbeam::scope(|scope| {
        let mut workers = Vec::with_capacity(thread_count);
        for generator_index in 0..thread_count {
            let mut generator = SampleGenerator::new(frame,
                                                     sample_renderer,
                                                     sample_counter,
                                                     generator_index as u64,
                                                     thread_count as u64,
                                                     params);
            workers.push(scope.spawn(move |_| generator.run(target, batch_size, abort)));
        }

        let mut result = Ok(());
        for worker in workers {
            match worker.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
                Err(_) => {
                    if result.is_ok() {
                        result = Err(format_err!("sample generator thread panicked"));
                    }
                }
            }
        }
        result
    });

    match scope_result {
        Ok(result) => result,
        Err(_) => Err(format_err!("sample generator thread panicked")),
    }
}
