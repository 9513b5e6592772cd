//! Spherical coordinates for orbiting around a centre point.

use std::f32::consts::PI;

use glam::Vec3;

const EPS: f32 = 0.000_001;

/// Radius, polar angle from +Y (`phi`) and azimuth around +Y measured from
/// +Z (`theta`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f32,
    /// Polar angle in radians, 0 at +Y.
    pub phi: f32,
    /// Azimuth in radians, 0 at +Z.
    pub theta: f32,
}

impl Spherical {
    /// Spherical coordinates of `v`.
    #[must_use]
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    /// Clamp `phi` away from the poles so `look_at` keeps a defined up.
    #[must_use]
    pub fn make_safe(mut self) -> Self {
        self.phi = self.phi.clamp(EPS, PI - EPS);
        self
    }

    /// Cartesian vector.
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let v = Vec3::new(5.0, 5.0, 10.0);
        let s = Spherical::from_vec3(v);
        assert!((s.radius - 150.0_f32.sqrt()).abs() < 1e-5);
        assert!((s.to_vec3() - v).length() < 1e-4);
    }

    #[test]
    fn axes() {
        let s = Spherical::from_vec3(Vec3::Z * 2.0);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.phi - PI / 2.0).abs() < 1e-6);

        let s = Spherical::from_vec3(Vec3::X);
        assert!((s.theta - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector() {
        let s = Spherical::from_vec3(Vec3::ZERO);
        assert_eq!(s, Spherical::default());
    }

    #[test]
    fn make_safe_clamps_poles() {
        let top = Spherical::from_vec3(Vec3::Y).make_safe();
        assert!(top.phi >= EPS);
        let below = Spherical {
            radius: 1.0,
            phi: 4.0,
            theta: 0.0,
        }
        .make_safe();
        assert!(below.phi <= PI - EPS);
        assert!(below.to_vec3().y < -0.99);
    }
}
