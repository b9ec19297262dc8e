//! Light sources.

use lensmaker_math::{convert, MatrixN, RayBatch, Scalar, VectorN};

use crate::error::{check_finite, check_positive, TraceResult};
use crate::sampling::linspace;
use crate::state::SimulationState;

/// Distance kept between the outermost rays and the beam edge.
pub const DEFAULT_MARGIN: f64 = 0.1;

fn to_radians<S: Scalar>(degrees: S) -> S {
    degrees * S::pi() / convert(180.0)
}

/// A perfect point source at infinity: a beam of parallel rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSourceAtInfinity<S: Scalar> {
    beam_diameter: S,
    /// Incidence angle in the x-y plane, degrees
    angle1: S,
    /// Incidence angle towards z (3D only), degrees
    angle2: S,
    margin: S,
}

impl<S: Scalar> PointSourceAtInfinity<S> {
    /// Beam along the principal axis.
    pub fn new(beam_diameter: S) -> TraceResult<Self> {
        check_positive("beam diameter", beam_diameter.value())?;
        Ok(Self {
            beam_diameter,
            angle1: S::zero(),
            angle2: S::zero(),
            margin: convert(DEFAULT_MARGIN),
        })
    }

    /// Set the incidence angles, in degrees.
    pub fn with_angles(mut self, angle1: S, angle2: S) -> TraceResult<Self> {
        check_finite("angle1", angle1.value())?;
        check_finite("angle2", angle2.value())?;
        self.angle1 = angle1;
        self.angle2 = angle2;
        Ok(self)
    }

    pub fn with_margin(mut self, margin: S) -> TraceResult<Self> {
        check_finite("margin", margin.value())?;
        self.margin = margin;
        Ok(self)
    }

    pub fn beam_diameter(&self) -> S {
        self.beam_diameter
    }

    pub fn angles(&self) -> (S, S) {
        (self.angle1, self.angle2)
    }

    pub fn margin(&self) -> S {
        self.margin
    }

    /// Common direction of every ray, in the source frame.
    ///
    /// The principal axis rotated by `angle2` towards z, then by `angle1`
    /// in the x-y plane.
    pub fn direction(&self, dim: usize) -> VectorN<S> {
        let axis = VectorN::along_x(dim, S::one());
        let a1 = to_radians(self.angle1);
        if dim == 2 {
            MatrixN::rotation_z(2, a1) * axis
        } else {
            let a2 = to_radians(self.angle2);
            MatrixN::rotation_z(3, a1) * (MatrixN::rotation_y(-a2) * axis)
        }
    }

    /// Ray origins on the `x = 0` plane of the source frame.
    ///
    /// A regular grid of `base` samples per transverse axis; in 3D the
    /// cartesian product with the second coordinate varying fastest.
    pub fn origins(&self, dim: usize, base: usize) -> Vec<VectorN<S>> {
        let half = self.beam_diameter / convert(2.0);
        let samples = linspace(-half + self.margin, half - self.margin, base);

        if dim == 2 {
            samples
                .iter()
                .map(|&y| VectorN::new2(S::zero(), y))
                .collect()
        } else {
            samples
                .iter()
                .flat_map(|&y| {
                    samples
                        .iter()
                        .map(move |&z| VectorN::new3(S::zero(), y, z))
                })
                .collect()
        }
    }

    /// Emit the beam at the current chain position and append it to the
    /// running ray batch.
    pub fn forward(&self, input: &SimulationState<S>) -> SimulationState<S> {
        let dim = input.dim();
        let transform = input.forward_kinematic();

        let origins = self.origins(dim, input.sampling().base);
        let direction = transform.direct_vector(&self.direction(dim)).normalize();

        let points = transform.direct_points(&origins);
        let vectors = vec![direction; points.len()];
        log::debug!("source emits {} rays", points.len());

        let rays = input.rays().concat(&RayBatch::new(dim, points, vectors));
        input.clone().with_rays(rays)
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        vec![
            ("beam_diameter", self.beam_diameter),
            ("angle1", self.angle1),
            ("angle2", self.angle2),
        ]
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        match name {
            "beam_diameter" => Some(&mut self.beam_diameter),
            "angle1" => Some(&mut self.angle1),
            "angle2" => Some(&mut self.angle2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::Sampling;
    use lensmaker_math::Transform;

    #[test]
    fn test_2d_grid() {
        let source = PointSourceAtInfinity::new(10.0_f64).unwrap();
        let origins = source.origins(2, 5);
        let ys: Vec<f64> = origins.iter().map(|p| p.get(1)).collect();
        assert_eq!(ys.len(), 5);
        assert!((ys[0] + 4.9).abs() < 1e-12);
        assert!((ys[4] - 4.9).abs() < 1e-12);
        assert!((ys[2]).abs() < 1e-12);
        assert!(origins.iter().all(|p| p.x() == 0.0));
    }

    #[test]
    fn test_single_sample_sits_at_start() {
        let source = PointSourceAtInfinity::new(2.0_f64).unwrap();
        let origins = source.origins(2, 1);
        assert_eq!(origins.len(), 1);
        assert!((origins[0].get(1) + 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_3d_grid_is_cartesian_product() {
        let source = PointSourceAtInfinity::new(4.0_f64)
            .unwrap()
            .with_margin(0.0)
            .unwrap();
        let origins = source.origins(3, 3);
        assert_eq!(origins.len(), 9);
        assert_eq!(origins[0], VectorN::new3(0.0, -2.0, -2.0));
        assert_eq!(origins[1], VectorN::new3(0.0, -2.0, 0.0));
        assert_eq!(origins[3], VectorN::new3(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_direction() {
        let source = PointSourceAtInfinity::new(1.0_f64)
            .unwrap()
            .with_angles(30.0, 0.0)
            .unwrap();
        let v = source.direction(2);
        assert!((v.x() - 3.0_f64.sqrt() / 2.0).abs() < 1e-12);
        assert!((v.get(1) - 0.5).abs() < 1e-12);

        let source = PointSourceAtInfinity::new(1.0_f64)
            .unwrap()
            .with_angles(90.0, 45.0)
            .unwrap();
        let v = source.direction(3);
        let c = 0.5_f64.sqrt();
        assert!(v.x().abs() < 1e-12);
        assert!((v.get(1) - c).abs() < 1e-12);
        assert!((v.get(2) - c).abs() < 1e-12);
    }

    #[test]
    fn test_forward_appends_at_chain_target() {
        let source = PointSourceAtInfinity::new(2.0_f64).unwrap();
        let input = SimulationState::new(Sampling::new::<f64>(2, 4))
            .extend_chain([Transform::translate(VectorN::new2(5.0, 1.0))]);

        let once = source.forward(&input);
        let twice = source.forward(&once);
        assert_eq!(once.rays().len(), 4);
        assert_eq!(twice.rays().len(), 8);
        assert!(once.rays().points().iter().all(|p| p.x() == 5.0));
        assert!((once.rays().points()[0].get(1) - 0.1).abs() < 1e-12);
        assert!(once.blocked().is_none());
        assert_eq!(once.transforms(), input.transforms());
    }

    #[test]
    fn test_invalid_beam() {
        assert!(PointSourceAtInfinity::new(0.0_f64).is_err());
        assert!(PointSourceAtInfinity::new(1.0_f64)
            .unwrap()
            .with_angles(f64::NAN, 0.0)
            .is_err());
    }
}
