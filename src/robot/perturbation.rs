use rand::Rng;

/// Draw a multiplicative noise factor `1 + u * percent / 100` with `u`
/// uniform in `[-1, 1)`.
///
/// Every call consumes exactly one draw from `rng`. With `percent == 0`
/// the factor is exactly `1.0`.
pub fn factor<R: Rng>(rng: &mut R, percent: f64) -> f64 {
    let u = rng.gen::<f64>() * 2.0 - 1.0;
    1.0 + u * percent / 100.0
}

/// Apply a fresh perturbation factor to `value`.
pub fn perturb<R: Rng>(rng: &mut R, value: f64, percent: f64) -> f64 {
    value * factor(rng, percent)
}
