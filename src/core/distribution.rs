//! Skew-normal distribution over run differentials
//!
//! CDF(x) = Φ(z) - 2·T(z, α) with z = (x - ξ) / ω, where T is Owen's T
//! function. statrs supplies Φ; T is integrated numerically.

use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

use super::error::{CoreError, ValidationError};

/// Simpson panels used for Owen's T on |a| <= 1
const OWENS_T_PANELS: usize = 128;

/// Skew-normal with shape α, location ξ and scale ω
#[derive(Debug, Clone)]
pub struct SkewNormal {
    shape: f64,
    location: f64,
    scale: f64,
    standard: Normal,
}

impl SkewNormal {
    pub fn new(shape: f64, location: f64, scale: f64) -> Result<Self, CoreError> {
        for (field, value) in [("shape", shape), ("location", location), ("scale", scale)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value }.into());
            }
        }
        if scale <= 0.0 {
            return Err(ValidationError::NonPositiveScale(scale).into());
        }
        // N(0, 1) parameters are always accepted by statrs
        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| CoreError::Oracle(format!("standard normal: {}", e)))?;

        Ok(Self {
            shape,
            location,
            scale,
            standard,
        })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// P(X <= x)
    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        let value = self.standard.cdf(z) - 2.0 * self.owens_t(z, self.shape);
        value.clamp(0.0, 1.0)
    }

    /// P(X > x)
    pub fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    /// Owen's T(h, a) = 1/(2π) ∫₀ᵃ exp(-h²(1+x²)/2) / (1+x²) dx
    fn owens_t(&self, h: f64, a: f64) -> f64 {
        if a == 0.0 {
            return 0.0;
        }
        if a < 0.0 {
            return -self.owens_t(h, -a);
        }
        let h = h.abs();
        if a <= 1.0 {
            return owens_t_simpson(h, a);
        }

        // Reflection onto a <= 1 for h >= 0
        let ah = a * h;
        let phi_h = self.standard.cdf(h);
        let phi_ah = self.standard.cdf(ah);
        0.5 * phi_h + 0.5 * phi_ah - phi_h * phi_ah - owens_t_simpson(ah, 1.0 / a)
    }
}

fn owens_t_simpson(h: f64, a: f64) -> f64 {
    let integrand = |x: f64| {
        let one_plus = 1.0 + x * x;
        (-0.5 * h * h * one_plus).exp() / one_plus
    };

    let n = OWENS_T_PANELS;
    let step = a / n as f64;
    let mut sum = integrand(0.0) + integrand(a);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * integrand(i as f64 * step);
    }

    sum * step / 3.0 / (2.0 * PI)
}
