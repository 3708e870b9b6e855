/// Unnormalized Gaussian kernel `exp(-x² / 2σ²)`, which is `1.0` at `x = 0`.
#[inline(always)]
pub fn gaussian(x: f64, sigma: f64) -> f64 {
    (-(x / sigma).powi(2) / 2.0).exp()
}
