//! Progressive sample generation: one shared budget of samples, split across
//! worker threads that each own an interleaved slice of a global
//! low-discrepancy sequence.

use Point2f;
use colorspace::{self, ColorSpace};
use errors::*;
use spectrum::Spectrum;

mod context;
mod counter;
mod generator;
mod progressive;

pub use self::context::SamplingContext;
pub use self::counter::SampleCounter;
pub use self::generator::SampleGenerator;
pub use self::progressive::{render_progressive, AbortFlag, RenderParams};

/// The per-sample evaluation routine plugged into the sampling machinery.
///
/// Implementations are called concurrently from many generator threads, each
/// with its own context; they must not retain or mutate shared state across
/// calls. A returned error is fatal for the calling generator and is
/// propagated, not retried.
pub trait SampleRenderer: Send + Sync {
    fn render_sample(&self, ctx: &mut SamplingContext, position: Point2f)
                     -> Result<ShadingResult>;
}

/// What a sample renderer produces for one sample: a color with alpha, tagged
/// with the color space the renderer worked in.
pub struct ShadingResult {
    pub color: Spectrum,
    pub alpha: f32,
    pub color_space: ColorSpace,
}

impl ShadingResult {
    /// Transform the result to the linear RGB working color space and return
    /// it as RGBA. Panics on a spectral result: no conversion has been added
    /// to this table, and validated renderers never produce one.
    pub fn to_linear_rgb(&self) -> [f32; 4] {
        let c = match self.color_space {
            ColorSpace::LinearRgb => self.color,
            ColorSpace::Srgb => Spectrum::rgb(colorspace::srgb_to_linear(self.color.r),
                                              colorspace::srgb_to_linear(self.color.g),
                                              colorspace::srgb_to_linear(self.color.b)),
            ColorSpace::CieXyz => {
                Spectrum::from_xyz(&[self.color.r, self.color.g, self.color.b])
            }
            ColorSpace::Spectral => {
                panic!("no color space conversion defined for spectral shading results")
            }
        };
        [c.r, c.g, c.b, self.alpha]
    }
}

/// Renders every sample with a constant color. The cheapest possible sample
/// renderer; useful as a baseline when measuring sampling throughput.
pub struct BlankRenderer {
    color: Spectrum,
    alpha: f32,
}

impl BlankRenderer {
    pub fn new(color: Spectrum, alpha: f32) -> BlankRenderer {
        BlankRenderer { color, alpha }
    }
}

impl SampleRenderer for BlankRenderer {
    fn render_sample(&self, _ctx: &mut SamplingContext, _position: Point2f)
                     -> Result<ShadingResult> {
        Ok(ShadingResult {
               color: self.color,
               alpha: self.alpha,
               color_space: ColorSpace::LinearRgb,
           })
    }
}

/// Derives the sample color from its screen position, with a small jitter
/// drawn from the sampling context. Exercises the whole sampling pipeline
/// without needing a scene.
pub struct GradientRenderer;

impl SampleRenderer for GradientRenderer {
    fn render_sample(&self, ctx: &mut SamplingContext, position: Point2f)
                     -> Result<ShadingResult> {
        let jitter = 0.01 * ctx.next_1d();
        Ok(ShadingResult {
               color: Spectrum::rgb(position.x,
                                    position.y,
                                    f32::min(1.0 - position.x + jitter, 1.0)),
               alpha: 1.0,
               color_space: ColorSpace::LinearRgb,
           })
    }
}
