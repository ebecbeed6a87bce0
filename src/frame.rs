use {clamp, lerp, Point2f, Point2i};
use paramset::ParamSet;

/// The image plane being rendered: a resolution plus a crop window in NDC.
///
/// Shared read-only across all sample generators; it carries no mutable
/// state.
pub struct Frame {
    resolution: Point2i,
    crop_min: Point2f,
    crop_max: Point2f,
}

impl Frame {
    pub fn new(resolution: Point2i, crop_min: Point2f, crop_max: Point2f) -> Frame {
        assert!(resolution.x > 0 && resolution.y > 0);
        assert!(crop_min.x < crop_max.x && crop_min.y < crop_max.y);
        info!("created frame with resolution {} and crop window {} -> {}",
              resolution,
              crop_min,
              crop_max);
        Frame {
            resolution,
            crop_min,
            crop_max,
        }
    }

    pub fn create(ps: &mut ParamSet) -> Frame {
        let xres = ps.find_one_int("xresolution", 1280);
        let yres = ps.find_one_int("yresolution", 720);
        let mut crop_min = Point2f::new(0.0, 0.0);
        let mut crop_max = Point2f::new(1.0, 1.0);
        if let Some(cr) = ps.find_float("cropwindow") {
            if cr.len() == 4 {
                crop_min.x = clamp(f32::min(cr[0], cr[1]), 0.0, 1.0);
                crop_max.x = clamp(f32::max(cr[0], cr[1]), 0.0, 1.0);
                crop_min.y = clamp(f32::min(cr[2], cr[3]), 0.0, 1.0);
                crop_max.y = clamp(f32::max(cr[2], cr[3]), 0.0, 1.0);
            } else {
                warn!("\"cropwindow\" expected 4 values");
            }
        }
        Frame::new(Point2i::new(xres, yres), crop_min, crop_max)
    }

    pub fn resolution(&self) -> Point2i {
        self.resolution
    }

    /// Map a `[0,1)^2` sequence coordinate onto the cropped NDC window.
    pub fn sample_position(&self, s: Point2f) -> Point2f {
        Point2f::new(lerp(s.x, self.crop_min.x, self.crop_max.x),
                     lerp(s.y, self.crop_min.y, self.crop_max.y))
    }
}
