//! Surfaces defined in their own local frame.
//!
//! The local frame has its origin at the surface vertex and the principal
//! axis along the first coordinate. Inside its aperture every surface is a
//! graph over the `x = 0` plane, which is what makes the plane intersection a
//! good starting point for the Newton solver.

use lensmaker_math::{convert, Scalar, VectorN};

use crate::error::{check_finite, TraceError, TraceResult};
use crate::newton::{intersect_newton, NewtonConfig};
use crate::outline::Outline;
use crate::sampling::linspace;

/// Result of colliding rays with a surface in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCollision<S: Scalar> {
    /// Ray parameter of the collision point, one per ray
    pub t: Vec<S>,
    /// Unit normals at the collision points, facing against the rays
    pub normals: Vec<VectorN<S>>,
    /// Whether each ray meets the surface inside its aperture
    pub valid: Vec<bool>,
}

/// Flip `normal` so it points against the incident direction.
pub(crate) fn face_normal<S: Scalar>(normal: VectorN<S>, direction: &VectorN<S>) -> VectorN<S> {
    if normal.dot(direction).value() > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Parameter of the intersection of `P + tV` with the `x = 0` plane.
#[inline]
fn plane_t<S: Scalar>(p: &VectorN<S>, v: &VectorN<S>) -> S {
    -p.x() / v.x()
}

fn check_batch<S: Scalar>(points: &[VectorN<S>], vectors: &[VectorN<S>]) {
    assert_eq!(
        points.len(),
        vectors.len(),
        "collision needs as many points as vectors"
    );
}

fn check_aperture(diameter: f64, radius: f64) -> TraceResult<()> {
    if radius.abs() < diameter / 2.0 {
        return Err(TraceError::ApertureExceedsCurvature { diameter, radius });
    }
    Ok(())
}

/// The `x = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    outline: Outline,
}

impl Plane {
    pub fn new(outline: Outline) -> Self {
        Self { outline }
    }

    /// Disk of the given diameter.
    pub fn circular(diameter: f64) -> TraceResult<Self> {
        Ok(Self::new(Outline::circular(diameter)?))
    }

    pub fn square(side_length: f64) -> TraceResult<Self> {
        Ok(Self::new(Outline::square(side_length)?))
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Closed-form collision: `P.x + t V.x = 0`.
    pub fn local_collide<S: Scalar>(
        &self,
        points: &[VectorN<S>],
        vectors: &[VectorN<S>],
    ) -> LocalCollision<S> {
        check_batch(points, vectors);

        let t: Vec<S> = points.iter().zip(vectors).map(|(p, v)| plane_t(p, v)).collect();

        let mut normals = Vec::with_capacity(points.len());
        let mut valid = Vec::with_capacity(points.len());
        for ((&p, &v), &t) in points.iter().zip(vectors).zip(&t) {
            let normal = VectorN::along_x(v.dim(), -S::one());
            normals.push(face_normal(normal, &v));
            valid.push(self.outline.contains_point(&(p + v * t)));
        }

        LocalCollision { t, normals, valid }
    }

    pub fn contains<S: Scalar>(&self, points: &[VectorN<S>], tol: f64) -> Vec<bool> {
        points
            .iter()
            .map(|p| self.outline.contains_point(p) && p.x().value().abs() < tol)
            .collect()
    }

    pub fn samples_2d<S: Scalar>(&self, n: usize) -> Vec<VectorN<S>> {
        linspace(S::zero(), convert(self.outline.max_radius()), n)
            .into_iter()
            .map(|r| VectorN::new2(S::zero(), r))
            .collect()
    }
}

/// Spherical cap, parameterized by curvature `K = 1 / R`.
///
/// `K = 0` is the flat case; the sign of `K` gives the side of the centre
/// of curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere<S: Scalar> {
    outline: Outline,
    curvature: S,
}

impl<S: Scalar> Sphere<S> {
    /// Sphere of the given aperture diameter and signed radius of curvature.
    pub fn new(diameter: f64, radius: S) -> TraceResult<Self> {
        let outline = Outline::circular(diameter)?;
        check_aperture(diameter, check_finite("radius", radius.value())?)?;
        Ok(Self {
            outline,
            curvature: S::one() / radius,
        })
    }

    /// Sphere from its signed curvature.
    pub fn from_curvature(diameter: f64, curvature: S) -> TraceResult<Self> {
        let outline = Outline::circular(diameter)?;
        let k = check_finite("curvature", curvature.value())?;
        if k.abs() * diameter / 2.0 > 1.0 {
            return Err(TraceError::ApertureExceedsCurvature {
                diameter,
                radius: 1.0 / k,
            });
        }
        Ok(Self { outline, curvature })
    }

    pub fn curvature(&self) -> S {
        self.curvature
    }

    pub fn radius(&self) -> S {
        S::one() / self.curvature
    }

    /// Sag form: `K r² / (1 + sqrt(1 - r² K²)) - x`.
    pub fn profile(&self, x: S, r: S) -> S {
        let k = self.curvature;
        let r2 = r * r;
        k * r2 / (S::one() + (S::one() - r2 * k * k).sqrt()) - x
    }

    pub fn profile_grad(&self, _x: S, r: S) -> (S, S) {
        let k = self.curvature;
        let denom = (S::one() - r * r * k * k).sqrt();
        (-S::one(), k * r / denom)
    }

    pub fn implicit(&self, p: &VectorN<S>) -> S {
        let k = self.curvature;
        let r2 = p.radial_squared();
        k * r2 / (S::one() + (S::one() - r2 * k * k).sqrt()) - p.x()
    }

    pub fn implicit_grad(&self, p: &VectorN<S>) -> VectorN<S> {
        let k = self.curvature;
        let denom = (S::one() - p.radial_squared() * k * k).sqrt();
        p.map(|c| k * c / denom).with_x(-S::one())
    }

    pub fn extent_x(&self) -> S {
        self.profile(S::zero(), convert(self.outline.max_radius()))
    }

    /// Samples evenly spaced in the angle seen from the centre of
    /// curvature, so strongly curved caps stay smooth near their edge.
    pub fn samples_2d(&self, n: usize) -> Vec<VectorN<S>> {
        let h: S = convert(self.outline.max_radius());
        let k = self.curvature.abs();
        if k.value() == 0.0 {
            return linspace(S::zero(), h, n)
                .into_iter()
                .map(|r| VectorN::new2(S::zero(), r))
                .collect();
        }

        linspace(S::zero(), (h * k).asin(), n)
            .into_iter()
            .map(|theta| {
                let r = (theta.sin() / k).min(h);
                VectorN::new2(self.profile(S::zero(), r), r)
            })
            .collect()
    }

    fn detach(&self) -> Self {
        Self {
            outline: self.outline,
            curvature: self.curvature.detach(),
        }
    }
}

/// Paraboloid `x = a r²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola<S: Scalar> {
    outline: Outline,
    a: S,
}

impl<S: Scalar> Parabola<S> {
    pub fn new(diameter: f64, a: S) -> TraceResult<Self> {
        let outline = Outline::circular(diameter)?;
        check_finite("a", a.value())?;
        Ok(Self { outline, a })
    }

    pub fn a(&self) -> S {
        self.a
    }

    pub fn profile(&self, x: S, r: S) -> S {
        self.a * r * r - x
    }

    pub fn profile_grad(&self, _x: S, r: S) -> (S, S) {
        (-S::one(), self.a * r * convert(2.0))
    }

    pub fn implicit(&self, p: &VectorN<S>) -> S {
        self.a * p.radial_squared() - p.x()
    }

    pub fn implicit_grad(&self, p: &VectorN<S>) -> VectorN<S> {
        let two_a = self.a * convert(2.0);
        p.map(|c| two_a * c).with_x(-S::one())
    }

    pub fn extent_x(&self) -> S {
        let h: S = convert(self.outline.max_radius());
        self.a * h * h
    }

    pub fn samples_2d(&self, n: usize) -> Vec<VectorN<S>> {
        linspace(S::zero(), convert(self.outline.max_radius()), n)
            .into_iter()
            .map(|r| VectorN::new2(self.a * r * r, r))
            .collect()
    }

    fn detach(&self) -> Self {
        Self {
            outline: self.outline,
            a: self.a.detach(),
        }
    }
}

/// Circular arc of signed radius `R`, centre on the principal axis at `x = R`.
///
/// Uses the polynomial centre form `x² - 2 R x + r² = 0`. Only the half of
/// the circle on the vertex side of the centre belongs to the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc<S: Scalar> {
    outline: Outline,
    radius: S,
}

impl<S: Scalar> CircularArc<S> {
    pub fn new(diameter: f64, radius: S) -> TraceResult<Self> {
        let outline = Outline::circular(diameter)?;
        check_aperture(diameter, check_finite("radius", radius.value())?)?;
        Ok(Self { outline, radius })
    }

    pub fn radius(&self) -> S {
        self.radius
    }

    pub fn profile(&self, x: S, r: S) -> S {
        x * x - self.radius * x * convert(2.0) + r * r
    }

    pub fn profile_grad(&self, x: S, r: S) -> (S, S) {
        let two: S = convert(2.0);
        (two * (x - self.radius), two * r)
    }

    pub fn implicit(&self, p: &VectorN<S>) -> S {
        let x = p.x();
        x * x - self.radius * x * convert(2.0) + p.radial_squared()
    }

    pub fn implicit_grad(&self, p: &VectorN<S>) -> VectorN<S> {
        let two: S = convert(2.0);
        p.map(|c| two * c).with_x(two * (p.x() - self.radius))
    }

    /// Whether `p` lies on the vertex side of the centre of curvature.
    fn in_domain(&self, p: &VectorN<S>) -> bool {
        (p.x() / self.radius).value() <= 1.0
    }

    /// Principal-axis position of the arc at distance `r` from the axis.
    fn sag(&self, r: S) -> S {
        let root = (self.radius * self.radius - r * r).sqrt();
        if self.radius.value() > 0.0 {
            self.radius - root
        } else {
            self.radius + root
        }
    }

    pub fn extent_x(&self) -> S {
        self.sag(convert(self.outline.max_radius()))
    }

    pub fn samples_2d(&self, n: usize) -> Vec<VectorN<S>> {
        linspace(S::zero(), convert(self.outline.max_radius()), n)
            .into_iter()
            .map(|r| VectorN::new2(self.sag(r), r))
            .collect()
    }

    fn detach(&self) -> Self {
        Self {
            outline: self.outline,
            radius: self.radius.detach(),
        }
    }
}

/// Surfaces given by an implicit equation `F(p) = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImplicitSurface<S: Scalar> {
    Sphere(Sphere<S>),
    Parabola(Parabola<S>),
    CircularArc(CircularArc<S>),
}

impl<S: Scalar> ImplicitSurface<S> {
    pub fn outline(&self) -> &Outline {
        match self {
            ImplicitSurface::Sphere(s) => &s.outline,
            ImplicitSurface::Parabola(s) => &s.outline,
            ImplicitSurface::CircularArc(s) => &s.outline,
        }
    }

    /// Cross-section form `f(x, r)`.
    pub fn profile(&self, x: S, r: S) -> S {
        match self {
            ImplicitSurface::Sphere(s) => s.profile(x, r),
            ImplicitSurface::Parabola(s) => s.profile(x, r),
            ImplicitSurface::CircularArc(s) => s.profile(x, r),
        }
    }

    /// Gradient of the cross-section form, `(df/dx, df/dr)`.
    pub fn profile_grad(&self, x: S, r: S) -> (S, S) {
        match self {
            ImplicitSurface::Sphere(s) => s.profile_grad(x, r),
            ImplicitSurface::Parabola(s) => s.profile_grad(x, r),
            ImplicitSurface::CircularArc(s) => s.profile_grad(x, r),
        }
    }

    /// Full-dimension form `F(p)`.
    pub fn implicit(&self, p: &VectorN<S>) -> S {
        match self {
            ImplicitSurface::Sphere(s) => s.implicit(p),
            ImplicitSurface::Parabola(s) => s.implicit(p),
            ImplicitSurface::CircularArc(s) => s.implicit(p),
        }
    }

    pub fn implicit_grad(&self, p: &VectorN<S>) -> VectorN<S> {
        match self {
            ImplicitSurface::Sphere(s) => s.implicit_grad(p),
            ImplicitSurface::Parabola(s) => s.implicit_grad(p),
            ImplicitSurface::CircularArc(s) => s.implicit_grad(p),
        }
    }

    pub fn extent_x(&self) -> S {
        match self {
            ImplicitSurface::Sphere(s) => s.extent_x(),
            ImplicitSurface::Parabola(s) => s.extent_x(),
            ImplicitSurface::CircularArc(s) => s.extent_x(),
        }
    }

    pub fn samples_2d(&self, n: usize) -> Vec<VectorN<S>> {
        match self {
            ImplicitSurface::Sphere(s) => s.samples_2d(n),
            ImplicitSurface::Parabola(s) => s.samples_2d(n),
            ImplicitSurface::CircularArc(s) => s.samples_2d(n),
        }
    }

    /// Copy of the surface whose parameters carry no derivative information.
    pub fn detach(&self) -> Self {
        match self {
            ImplicitSurface::Sphere(s) => ImplicitSurface::Sphere(s.detach()),
            ImplicitSurface::Parabola(s) => ImplicitSurface::Parabola(s.detach()),
            ImplicitSurface::CircularArc(s) => ImplicitSurface::CircularArc(s.detach()),
        }
    }

    /// Points inside the aperture with `|F(p)| < tol`.
    pub fn contains(&self, points: &[VectorN<S>], tol: f64) -> Vec<bool> {
        points
            .iter()
            .map(|p| {
                let on_surface = self.implicit(p).value().abs() < tol;
                let in_domain = match self {
                    ImplicitSurface::CircularArc(arc) => arc.in_domain(p),
                    _ => true,
                };
                on_surface && in_domain && self.outline().contains_point(p)
            })
            .collect()
    }

    /// Newton collision, starting from the `x = 0` plane intersection.
    ///
    /// Rays where Newton does not land on the surface are reported invalid
    /// by the loose containment check; nothing is raised.
    pub fn local_collide(
        &self,
        points: &[VectorN<S>],
        vectors: &[VectorN<S>],
        config: &NewtonConfig,
    ) -> LocalCollision<S> {
        check_batch(points, vectors);

        let init_t: Vec<S> = points.iter().zip(vectors).map(|(p, v)| plane_t(p, v)).collect();
        let t = intersect_newton(self, points, vectors, &init_t, config.iterations);

        let local_points: Vec<VectorN<S>> = points
            .iter()
            .zip(vectors)
            .zip(&t)
            .map(|((&p, &v), &t)| p + v * t)
            .collect();

        let normals = local_points
            .iter()
            .zip(vectors)
            .map(|(p, v)| face_normal(self.implicit_grad(p).normalize(), v))
            .collect();

        let valid = self.contains(&local_points, config.tolerance);

        LocalCollision { t, normals, valid }
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        match self {
            ImplicitSurface::Sphere(s) => vec![("K", s.curvature)],
            ImplicitSurface::Parabola(s) => vec![("a", s.a)],
            ImplicitSurface::CircularArc(s) => vec![("R", s.radius)],
        }
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        match (self, name) {
            (ImplicitSurface::Sphere(s), "K") => Some(&mut s.curvature),
            (ImplicitSurface::Parabola(s), "a") => Some(&mut s.a),
            (ImplicitSurface::CircularArc(s), "R") => Some(&mut s.radius),
            _ => None,
        }
    }
}

/// Any surface an optical element can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface<S: Scalar> {
    Plane(Plane),
    Implicit(ImplicitSurface<S>),
}

impl<S: Scalar> Surface<S> {
    pub fn outline(&self) -> &Outline {
        match self {
            Surface::Plane(plane) => plane.outline(),
            Surface::Implicit(surface) => surface.outline(),
        }
    }

    /// Collide local rays using the default Newton settings.
    pub fn local_collide(&self, points: &[VectorN<S>], vectors: &[VectorN<S>]) -> LocalCollision<S> {
        self.local_collide_with(points, vectors, &NewtonConfig::default())
    }

    pub fn local_collide_with(
        &self,
        points: &[VectorN<S>],
        vectors: &[VectorN<S>],
        config: &NewtonConfig,
    ) -> LocalCollision<S> {
        match self {
            Surface::Plane(plane) => plane.local_collide(points, vectors),
            Surface::Implicit(surface) => surface.local_collide(points, vectors, config),
        }
    }

    /// Signed principal-axis offset of the surface at the aperture edge.
    pub fn extent_x(&self) -> S {
        match self {
            Surface::Plane(_) => S::zero(),
            Surface::Implicit(surface) => surface.extent_x(),
        }
    }

    /// Extent point `(extent_x, 0[, 0])`.
    pub fn extent(&self, dim: usize) -> VectorN<S> {
        VectorN::along_x(dim, self.extent_x())
    }

    /// Local origin, where the surface vertex sits.
    pub fn zero(&self, dim: usize) -> VectorN<S> {
        VectorN::zeros(dim)
    }

    pub fn contains(&self, points: &[VectorN<S>], tol: f64) -> Vec<bool> {
        match self {
            Surface::Plane(plane) => plane.contains(points, tol),
            Surface::Implicit(surface) => surface.contains(points, tol),
        }
    }

    /// Dense samples of the profile curve for `r` in `[0, max_radius]`.
    pub fn samples_2d(&self, n: usize) -> Vec<VectorN<S>> {
        match self {
            Surface::Plane(plane) => plane.samples_2d(n),
            Surface::Implicit(surface) => surface.samples_2d(n),
        }
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        match self {
            Surface::Plane(_) => Vec::new(),
            Surface::Implicit(surface) => surface.named_parameters(),
        }
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        match self {
            Surface::Plane(_) => None,
            Surface::Implicit(surface) => surface.parameter_mut(name),
        }
    }
}

impl<S: Scalar> From<Plane> for Surface<S> {
    fn from(plane: Plane) -> Self {
        Surface::Plane(plane)
    }
}

impl<S: Scalar> From<Sphere<S>> for Surface<S> {
    fn from(sphere: Sphere<S>) -> Self {
        Surface::Implicit(ImplicitSurface::Sphere(sphere))
    }
}

impl<S: Scalar> From<Parabola<S>> for Surface<S> {
    fn from(parabola: Parabola<S>) -> Self {
        Surface::Implicit(ImplicitSurface::Parabola(parabola))
    }
}

impl<S: Scalar> From<CircularArc<S>> for Surface<S> {
    fn from(arc: CircularArc<S>) -> Self {
        Surface::Implicit(ImplicitSurface::CircularArc(arc))
    }
}
