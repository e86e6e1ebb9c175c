/// Draw from the standard normal distribution using the Box-Muller transform.
#[inline]
pub(crate) fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    // 1 - f64() keeps u1 in (0, 1] so the logarithm stays finite.
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (core::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_normal_is_roughly_centered() {
        let mut rng = fastrand::Rng::with_seed(42);
        let n = 10_000;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..n {
            let z = standard_normal(&mut rng);
            assert!(z.is_finite());
            sum += z;
            sum_sq += z * z;
        }
        let mean = sum / f64::from(n);
        let var = sum_sq / f64::from(n) - mean * mean;
        assert!(mean.abs() < 0.05, "mean {mean} too far from 0");
        assert!((var - 1.0).abs() < 0.1, "variance {var} too far from 1");
    }

    #[test]
    fn standard_normal_is_reproducible() {
        let mut a = fastrand::Rng::with_seed(7);
        let mut b = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            assert!((standard_normal(&mut a) - standard_normal(&mut b)).abs() < f64::EPSILON);
        }
    }
}
