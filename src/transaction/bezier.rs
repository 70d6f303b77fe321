//! Cubic Bezier easing as evaluated by CSS `cubic-bezier(x1, y1, x2, y2)`.

const EPSILON: f64 = 0.00001;
const MAX_BISECTIONS: usize = 128;

/// Easing curve through (0,0) and (1,1) with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    curves: [f64; 4],
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { curves: [x1, y1, x2, y2] }
    }

    /// Progress value at time `t`.
    ///
    /// Outside `(0, 1)` the curve continues linearly along its end tangents.
    pub fn value(&self, t: f64) -> f64 {
        let [x1, y1, x2, y2] = self.curves;

        if t <= 0.0 {
            let mut start_gradient = 0.0;
            if x1 > 0.0 {
                start_gradient = y1 / x1;
            } else if y1 == 0.0 && x2 > 0.0 {
                start_gradient = y2 / x2;
            }
            return start_gradient * t;
        }

        if t >= 1.0 {
            let mut end_gradient = 0.0;
            if x2 < 1.0 {
                end_gradient = (y2 - 1.0) / (x2 - 1.0);
            } else if x2 == 1.0 && x1 < 1.0 {
                end_gradient = (y1 - 1.0) / (x1 - 1.0);
            }
            return 1.0 + end_gradient * (t - 1.0);
        }

        let mut start = 0.0;
        let mut end = 1.0;
        let mut mid = 0.0;
        for _ in 0..MAX_BISECTIONS {
            if start >= end {
                break;
            }
            mid = (start + end) / 2.0;
            let x_estimate = calculate(x1, x2, mid);
            if (t - x_estimate).abs() < EPSILON {
                return calculate(y1, y2, mid);
            }
            if x_estimate < t {
                start = mid;
            } else {
                end = mid;
            }
        }
        calculate(y1, y2, mid)
    }
}

/// One coordinate of the Bezier polynomial at parameter `m`.
fn calculate(a: f64, b: f64, m: f64) -> f64 {
    3.0 * a * (1.0 - m) * (1.0 - m) * m + 3.0 * b * (1.0 - m) * m * m + m * m * m
}
