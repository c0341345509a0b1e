//! Frame-indexed interpolation of fixed-size value tuples.
//!
//! An [`Interpolator`] blends `N` axes from a start tuple to an end tuple over
//! a frame interval. An optional easing curve reshapes the normalized time `t`
//! before the per-axis linear blend; without one the blend is affine in the
//! frame number.

/// Easing curve applied to normalized time in `[0, 1)`.
pub type Easing = fn(f64) -> f64;

/// Easing curves used by movement and fade instructions.
pub mod easing {
    /// Identity.
    pub fn linear(x: f64) -> f64 {
        x
    }

    /// Fast start, slow finish: `2x - x²`.
    pub fn decelerate(x: f64) -> f64 {
        2.0 * x - x * x
    }

    /// Slow start, fast finish: `x²`.
    pub fn accelerate(x: f64) -> f64 {
        x * x
    }
}

#[derive(Debug, Clone)]
pub struct Interpolator<const N: usize> {
    values: [f64; N],
    start_values: [f64; N],
    end_values: [f64; N],
    start_frame: u32,
    end_frame: u32,
    easing: Option<Easing>,
}

impl<const N: usize> Interpolator<N> {
    pub fn new(
        start_values: [f64; N],
        start_frame: u32,
        end_values: [f64; N],
        end_frame: u32,
        easing: Option<Easing>,
    ) -> Self {
        Self {
            values: start_values,
            start_values,
            end_values,
            start_frame,
            end_frame,
            easing,
        }
    }

    /// An interpolator already resting at `values`.
    pub fn at_rest(values: [f64; N], frame: u32) -> Self {
        Self::new(values, frame, values, frame, None)
    }

    /// Restart the interval at `frame` from `values`.
    pub fn set_start(&mut self, frame: u32, values: [f64; N]) {
        self.start_frame = frame;
        self.start_values = values;
        self.values = values;
    }

    /// Retarget the interval end.
    pub fn set_end(&mut self, frame: u32, values: [f64; N]) {
        self.end_frame = frame;
        self.end_values = values;
    }

    pub fn set_easing(&mut self, easing: Option<Easing>) {
        self.easing = easing;
    }

    /// Recompute `values` for `frame`.
    ///
    /// At or past the end frame the values snap to the end tuple and the
    /// interval collapses onto it, so a later retarget continues from the
    /// clamped values. Empty or inverted intervals snap immediately.
    pub fn update(&mut self, frame: u32) {
        if frame >= self.end_frame || self.end_frame <= self.start_frame {
            self.values = self.end_values;
            self.start_values = self.end_values;
            self.start_frame = self.end_frame;
            return;
        }

        let elapsed = f64::from(frame) - f64::from(self.start_frame);
        let span = f64::from(self.end_frame - self.start_frame);
        let t = elapsed / span;
        let coeff = match self.easing {
            Some(curve) => curve(t),
            None => t,
        };

        for axis in 0..N {
            let from = self.start_values[axis];
            let to = self.end_values[axis];
            self.values[axis] = from + coeff * (to - from);
        }
    }

    pub fn values(&self) -> [f64; N] {
        self.values
    }

    pub fn end_values(&self) -> [f64; N] {
        self.end_values
    }

    pub fn start_frame(&self) -> u32 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u32 {
        self.end_frame
    }

    /// True once `frame` has reached the end of the interval.
    pub fn is_finished(&self, frame: u32) -> bool {
        frame >= self.end_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snaps_at_end_frame() {
        let mut interp = Interpolator::new([0.0, 10.0], 0, [100.0, -10.0], 10, None);
        interp.update(10);
        assert_eq!(interp.values(), [100.0, -10.0]);
    }

    #[test]
    fn test_midpoint_is_linear() {
        let mut interp = Interpolator::new([0.0], 0, [100.0], 10, None);
        interp.update(5);
        assert_eq!(interp.values(), [50.0]);
    }

    #[test]
    fn test_easing_reshapes_time() {
        let mut interp = Interpolator::new([0.0], 0, [100.0], 10, Some(easing::accelerate));
        interp.update(5);
        assert_eq!(interp.values(), [25.0]);

        let mut interp = Interpolator::new([0.0], 0, [100.0], 10, Some(easing::decelerate));
        interp.update(5);
        assert_eq!(interp.values(), [75.0]);
    }

    #[test]
    fn test_zero_length_interval_snaps() {
        let mut interp = Interpolator::new([3.0], 7, [9.0], 7, None);
        interp.update(0);
        assert_eq!(interp.values(), [9.0]);
    }

    #[test]
    fn test_retarget_continues_from_clamped_value() {
        let mut interp = Interpolator::new([0.0], 0, [10.0], 4, None);
        interp.update(8);
        assert_eq!(interp.start_frame(), 4);

        interp.set_start(8, interp.values());
        interp.set_end(12, [20.0]);
        interp.update(10);
        assert_eq!(interp.values(), [15.0]);
    }
}
