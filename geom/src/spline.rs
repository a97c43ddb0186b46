/// A natural cubic spline through (t, y) samples: second derivative is zero at both ends.
pub struct CubicSpline {
    ts: Vec<f64>,
    ys: Vec<f64>,
    // Second derivative at each knot
    m: Vec<f64>,
}

impl CubicSpline {
    /// `ts` must be strictly increasing and have the same length as `ys`, at least 2.
    pub fn new(ts: Vec<f64>, ys: Vec<f64>) -> CubicSpline {
        assert_eq!(ts.len(), ys.len());
        assert!(ts.len() >= 2, "Need at least two knots for a spline");
        assert!(
            ts.windows(2).all(|pair| pair[0] < pair[1]),
            "Spline knots must be strictly increasing"
        );

        let n = ts.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm on the interior knots.
            let h: Vec<f64> = ts.windows(2).map(|pair| pair[1] - pair[0]).collect();
            let interior = n - 2;
            let mut diag = vec![0.0; interior];
            let mut upper = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];
            for k in 0..interior {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                upper[k] = h[i];
                rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            }
            for k in 1..interior {
                // The sub-diagonal entry of row k is h[k]
                let w = h[k] / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }
            m[interior] = rhs[interior - 1] / diag[interior - 1];
            for k in (0..interior - 1).rev() {
                m[k + 1] = (rhs[k] - upper[k] * m[k + 2]) / diag[k];
            }
        }

        CubicSpline { ts, ys, m }
    }

    /// Evaluates the spline. Outside the knot range, extrapolates the first or last piece.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.ts.len();
        let i = match self
            .ts
            .binary_search_by(|x| x.partial_cmp(&t).unwrap())
        {
            Ok(idx) => idx.min(n - 2),
            Err(0) => 0,
            Err(idx) => (idx - 1).min(n - 2),
        };

        let h = self.ts[i + 1] - self.ts[i];
        let dt = t - self.ts[i];
        let b = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        let c = self.m[i] / 2.0;
        let d = (self.m[i + 1] - self.m[i]) / (6.0 * h);
        self.ys[i] + dt * (b + dt * (c + dt * d))
    }
}
