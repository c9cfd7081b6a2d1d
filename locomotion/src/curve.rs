use serde::Deserialize;

/// Scalar-to-scalar lookup used by the flight lift model.
pub trait Curve {
    fn sample(&self, x: f32) -> f32;
}

impl<F: Fn(f32) -> f32> Curve for F {
    fn sample(&self, x: f32) -> f32 {
        self(x)
    }
}

/// Piecewise-linear curve through `(x, y)` keys, clamped at both ends.
///
/// Keys are sorted by `x` on construction. An empty curve samples to 0.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<[f32; 2]>")]
pub struct SampledCurve {
    keys: Vec<[f32; 2]>,
}

impl SampledCurve {
    pub fn new(mut keys: Vec<[f32; 2]>) -> Self {
        keys.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Self { keys }
    }

    /// Single-key curve returning `y` everywhere.
    pub fn constant(y: f32) -> Self {
        Self { keys: vec![[0.0, y]] }
    }

    pub fn keys(&self) -> &[[f32; 2]] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<[f32; 2]>> for SampledCurve {
    fn from(keys: Vec<[f32; 2]>) -> Self {
        Self::new(keys)
    }
}

impl Curve for SampledCurve {
    fn sample(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if x <= first[0] {
            return first[1];
        }
        if x >= last[0] {
            return last[1];
        }
        // First key strictly to the right of x; keys are sorted so this is in 1..len.
        let upper = self.keys.partition_point(|k| k[0] <= x);
        let [x0, y0] = self.keys[upper - 1];
        let [x1, y1] = self.keys[upper];
        let span = x1 - x0;
        if span <= f32::EPSILON {
            return y1;
        }
        y0 + (y1 - y0) * (x - x0) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_between_keys_and_clamps_ends() {
        let curve = SampledCurve::new(vec![[10.0, 1.0], [0.0, 0.0], [20.0, 0.0]]);
        assert_eq!(curve.keys()[0], [0.0, 0.0]);
        assert!((curve.sample(5.0) - 0.5).abs() < 1e-6);
        assert!((curve.sample(15.0) - 0.5).abs() < 1e-6);
        assert_eq!(curve.sample(-100.0), 0.0);
        assert_eq!(curve.sample(100.0), 0.0);
        assert!((curve.sample(10.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_and_constant_curves() {
        assert_eq!(SampledCurve::default().sample(3.0), 0.0);
        assert_eq!(SampledCurve::constant(0.7).sample(-3.0), 0.7);
    }

    #[test]
    fn closures_are_curves() {
        let double = |x: f32| x * 2.0;
        assert_eq!(Curve::sample(&double, 3.0), 6.0);
    }

    #[test]
    fn deserializes_from_key_pairs() {
        #[derive(Deserialize)]
        struct Wrapper {
            curve: SampledCurve,
        }
        let w: Wrapper = toml::from_str("curve = [[1.0, 2.0], [0.0, 0.0]]").unwrap();
        assert!((w.curve.sample(0.5) - 1.0).abs() < 1e-6);
    }
}
