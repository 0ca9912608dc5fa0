use rand::Rng;

/// Source of the bounded jitter applied to estimates and confidence.
///
/// Injected so production draws real randomness while tests pin the draw
/// and assert exact outputs.
pub trait NoiseSource: Send + Sync {
    /// A value uniformly distributed in `[low, high)`.
    fn sample(&self, low: f64, high: f64) -> f64;
}

/// Production source backed by the thread-local generator.
pub struct ThreadRngNoise;

impl NoiseSource for ThreadRngNoise {
    fn sample(&self, low: f64, high: f64) -> f64 {
        rand::thread_rng().gen_range(low..high)
    }
}

/// Deterministic source for tests: interpolates the requested range at a
/// fixed position `t` in `[0, 1]`. `FixedNoise(0.5)` always returns the
/// midpoint.
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn sample(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_rng_stays_in_bounds() {
        let noise = ThreadRngNoise;
        for _ in 0..1000 {
            let v = noise.sample(0.9, 1.1);
            assert!((0.9..1.1).contains(&v));
        }
    }

    #[test]
    fn fixed_noise_interpolates() {
        assert_eq!(FixedNoise(0.0).sample(0.9, 1.1), 0.9);
        assert_eq!(FixedNoise(0.5).sample(0.9, 1.1), 1.0);
        assert!((FixedNoise(1.0).sample(0.95, 1.05) - 1.05).abs() < 1e-12);
    }
}
