//! Natural cubic spline through strictly increasing knots.

#[derive(Debug, Clone)]
pub(crate) struct NaturalSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot; zero at both ends.
    m: Vec<f64>,
}

impl NaturalSpline {
    /// Fit through `(x, y)`. Requires at least two knots with strictly
    /// increasing `x`; returns `None` otherwise.
    pub(crate) fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        let n = x.len();
        if n < 2 || y.len() != n || x.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let mut m = vec![0.0; n];

        // Tridiagonal system for interior second derivatives (Thomas algorithm).
        let interior = n - 2;
        if interior > 0 {
            let mut diag = vec![0.0; interior];
            let mut upper = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];
            for k in 0..interior {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                upper[k] = h[i];
                rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
            }
            for k in 1..interior {
                let lower = h[k];
                let factor = lower / diag[k - 1];
                diag[k] -= factor * upper[k - 1];
                rhs[k] -= factor * rhs[k - 1];
            }
            let mut solution = vec![0.0; interior];
            solution[interior - 1] = rhs[interior - 1] / diag[interior - 1];
            for k in (0..interior - 1).rev() {
                solution[k] = (rhs[k] - upper[k] * solution[k + 1]) / diag[k];
            }
            m[1..=interior].copy_from_slice(&solution);
        }

        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Evaluate at `t`; outside the knot range the end pieces are extended.
    pub(crate) fn eval(&self, t: f64) -> f64 {
        let last = self.x.len() - 2;
        let k = self
            .x
            .partition_point(|&xi| xi <= t)
            .saturating_sub(1)
            .min(last);
        let (x0, x1) = (self.x[k], self.x[k + 1]);
        let (y0, y1) = (self.y[k], self.y[k + 1]);
        let (m0, m1) = (self.m[k], self.m[k + 1]);
        let h = x1 - x0;
        let a = x1 - t;
        let b = t - x0;
        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_knots() {
        let x = [0.0, 1.0, 2.0, 4.0, 5.0];
        let y = [1.0, -2.0, 0.5, 3.0, 2.0];
        let spline = NaturalSpline::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert!((spline.eval(*xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn reproduces_linear_data() {
        let x = [0.0, 1.0, 3.0, 4.0, 7.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let spline = NaturalSpline::fit(&x, &y).unwrap();
        for t in [0.5, 2.0, 5.5, 8.0, -1.0] {
            assert!((spline.eval(t) - (2.0 * t - 1.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn natural_end_conditions() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let spline = NaturalSpline::fit(&x, &y).unwrap();
        assert_eq!(spline.m[0], 0.0);
        assert_eq!(spline.m[3], 0.0);
        // Symmetric interior solution: 4 m1 + m2 = -12, m1 + 4 m2 = 12.
        assert!((spline.m[1] + 4.0).abs() < 1e-12);
        assert!((spline.m[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unordered_knots() {
        assert!(NaturalSpline::fit(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(NaturalSpline::fit(&[0.0], &[1.0]).is_none());
    }
}
