//! Zoom bounds and steps

/// Zoom factor handling for page rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = 100%)
    pub factor: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT,
        }
    }
}

impl Zoom {
    pub const DEFAULT: f64 = 1.0;
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f64 = 0.25;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f64 = 4.0;
    /// Step used by zoom in/out controls
    pub const STEP: f64 = 0.25;
    /// Horizontal padding subtracted from the container when fitting to width
    pub const FIT_PADDING: f64 = 40.0;

    pub fn new(factor: f64) -> Self {
        Self {
            factor: Self::clamp_factor(factor),
        }
    }

    /// Returns the current zoom factor
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn set(&mut self, factor: f64) {
        self.factor = Self::clamp_factor(factor);
    }

    /// Zoom in by one step
    pub fn step_in(&mut self) {
        self.set(self.factor + Self::STEP);
    }

    /// Zoom out by one step
    pub fn step_out(&mut self) {
        self.set(self.factor - Self::STEP);
    }

    /// Zoom factor that fits a page of `page_width` CSS pixels (at scale 1)
    /// into a container of `container_width`
    pub fn fit_width(container_width: f64, page_width: f64) -> Option<f64> {
        if page_width.is_nan() || page_width <= 0.0 {
            return None;
        }
        Some(Self::clamp_factor(
            (container_width - Self::FIT_PADDING) / page_width,
        ))
    }

    /// Zoom as a whole percentage for display
    pub fn percent(&self) -> i64 {
        (self.factor * 100.0).round() as i64
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(factor: f64) -> f64 {
        if factor.is_nan() {
            Self::DEFAULT
        } else {
            factor.clamp(Self::MIN_SCALE, Self::MAX_SCALE)
        }
    }
}
