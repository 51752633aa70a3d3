//! Forward geodesic problem on an ellipsoid of revolution.
//!
//! Uses Vincenty's iterative direct formula, which converges for every
//! distance this crate asks for (a few tens of kilometers at most).

use crate::types::GeoPoint;
use crate::Error;

const CONVERGENCE_THRESHOLD: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}
impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Semi-minor axis in meters
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.a.is_finite() || self.a <= 0.0 {
            return Err(Error::InvalidEllipsoid {
                reason: format!("semi-major axis must be positive, got {}", self.a),
            });
        }
        if !self.f.is_finite() || !(0.0..1.0).contains(&self.f) {
            return Err(Error::InvalidEllipsoid {
                reason: format!("flattening must be in [0, 1), got {}", self.f),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeodesicStepper {
    ellipsoid: Ellipsoid,
}
impl GeodesicStepper {
    pub fn new(ellipsoid: Ellipsoid) -> Result<GeodesicStepper, Error> {
        ellipsoid.validate()?;
        Ok(GeodesicStepper { ellipsoid })
    }

    pub fn wgs84() -> GeodesicStepper {
        GeodesicStepper { ellipsoid: Ellipsoid::WGS84 }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Destination reached by travelling `distance` meters from `origin` along
    /// the geodesic with initial bearing `bearing_deg` (clockwise from north).
    pub fn step(&self, origin: GeoPoint, bearing_deg: f64, distance: f64) -> GeoPoint {
        let Ellipsoid { a, f } = self.ellipsoid;
        let b = self.ellipsoid.b();

        let phi1 = origin.latitude.to_radians();
        let alpha1 = bearing_deg.to_radians();
        let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

        // reduced latitude
        let tan_u1 = (1.0 - f) * phi1.tan();
        let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
        let sin_u1 = tan_u1 * cos_u1;

        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

        let sigma0 = distance / (b * big_a);
        let mut sigma = sigma0;
        for _ in 0..MAX_ITERATIONS {
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
            let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);

            let next = sigma0 + delta_sigma;
            let converged = (next - sigma).abs() <= CONVERGENCE_THRESHOLD;
            sigma = next;
            if converged {
                break;
            }
        }

        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

        let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let phi2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
        let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let big_l = lambda
            - (1.0 - c) * f * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        GeoPoint::new(phi2.to_degrees(), normalize_longitude(origin.longitude + big_l.to_degrees()))
    }
}
impl Default for GeodesicStepper {
    fn default() -> Self {
        GeodesicStepper::wgs84()
    }
}

#[inline]
fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    big_b * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * c2)
                    - big_b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * sin_sigma * sin_sigma) * (-3.0 + 4.0 * c2)))
}

/// Wraps a longitude into [-180, 180).
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}
