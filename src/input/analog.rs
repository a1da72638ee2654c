//! Continuous-control path: knobs and sliders.
//!
//! Pointer movement becomes an angular or linear value, clamped to the
//! control's declared range. Emission is change-gated, not time-debounced:
//! a value is reported only when the clamped result differs from the last
//! emitted value, so a slow drag does not flood the link while a fast drag
//! is still tracked losslessly.

/// Angle in degrees (-180 to 180) of a pointer position relative to a
/// control's center, as rotary knobs measure their drags.
fn pointer_angle(center_x: f64, center_y: f64, x: f64, y: f64) -> f64 {
    (y - center_y).atan2(x - center_x).to_degrees()
}

/// Rotary knob accumulating drag deltas into a clamped angle.
#[derive(Debug, Clone)]
pub struct KnobTracker {
    min: f64,
    max: f64,
    current: f64,
    last_emitted: Option<f64>,
}

impl KnobTracker {
    pub fn new(min: f64, max: f64, start: f64) -> Self {
        Self { min, max, current: start.clamp(min, max), last_emitted: None }
    }

    /// Full-turn knob for volume and pan, centered at zero.
    pub fn signed_angle() -> Self {
        Self::new(-180.0, 180.0, 0.0)
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    /// Apply a drag delta in degrees. Returns the new value only when the
    /// clamped result changed from the last emitted value.
    pub fn drag(&mut self, delta: f64) -> Option<f64> {
        self.current = (self.current + delta).clamp(self.min, self.max);
        self.gate()
    }

    /// Point the knob straight at an absolute pointer position relative to
    /// its center, as a rotary control tracks the cursor during a drag.
    /// Returns the new value only when the resulting angle changed.
    pub fn point_at(&mut self, center_x: f64, center_y: f64, x: f64, y: f64) -> Option<f64> {
        self.current = pointer_angle(center_x, center_y, x, y).clamp(self.min, self.max);
        self.gate()
    }

    fn gate(&mut self) -> Option<f64> {
        if self.last_emitted == Some(self.current) {
            return None;
        }
        self.last_emitted = Some(self.current);
        Some(self.current)
    }
}

/// Linear slider with an optional step quantization.
#[derive(Debug, Clone)]
pub struct SliderTracker {
    min: f64,
    max: f64,
    step: Option<f64>,
    current: f64,
    last_emitted: Option<f64>,
}

impl SliderTracker {
    pub fn new(min: f64, max: f64, step: Option<f64>, start: f64) -> Self {
        Self { min, max, step, current: start.clamp(min, max), last_emitted: None }
    }

    /// Camera zoom: 0.5x to 3.0x in 0.1 steps, starting at 1.0x.
    pub fn zoom() -> Self {
        Self::new(0.5, 3.0, Some(0.1), 1.0)
    }

    /// Percentage slider, 0 to 100.
    pub fn percent(start: f64) -> Self {
        Self::new(0.0, 100.0, Some(1.0), start)
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    /// Move the slider to an absolute position. Returns the new value only
    /// when the clamped (and quantized) result actually changed.
    pub fn set(&mut self, value: f64) -> Option<f64> {
        let mut value = value.clamp(self.min, self.max);
        if let Some(step) = self.step {
            // Quantize through an integer step index and snap to the step's
            // decimal precision; the emitted value must sit exactly on the
            // lattice, not a float-error neighbor of it.
            let index = ((value - self.min) / step).round();
            let scale = step_scale(step);
            value = ((self.min + index * step) * scale).round() / scale;
            // Re-clamp: rounding at the top of the range can overshoot.
            value = value.clamp(self.min, self.max);
        }
        self.current = value;

        if self.last_emitted == Some(self.current) {
            return None;
        }
        self.last_emitted = Some(self.current);
        Some(self.current)
    }
}

/// Smallest power of ten that makes the step integral (10 for 0.1, 1 for
/// whole-number steps). Quantized values are rounded at that precision so
/// they land exactly on representable decimals.
fn step_scale(step: f64) -> f64 {
    let mut scale = 1.0;
    while (step * scale).fract().abs() > 1e-9 && scale < 1e9 {
        scale *= 10.0;
    }
    scale
}
