//! Lensmaker core - sequential geometric ray tracing.
//!
//! A [`SimulationState`] flows through a [`Sequence`] of optical elements:
//!
//! - **Sources** emit ray batches at the current chain position
//! - **Surfaces** collide rays and refract or reflect them
//! - **Gaps** move the chain along the principal axis
//!
//! Every computation is generic over [`Scalar`], so an optimizer can trace
//! with a derivative-carrying number type and differentiate the output with
//! respect to any element parameter.
//!
//! # Example
//!
//! ```
//! use lensmaker_core::{
//!     Gap, OpticalSurface, PointSourceAtInfinity, Sampling, Sequence, Sphere, TraceResult,
//! };
//!
//! fn main() -> TraceResult<()> {
//!     let mut lens = Sequence::<f64>::default();
//!     lens.push(PointSourceAtInfinity::new(10.0)?);
//!     lens.push(Gap::new(5.0)?);
//!     lens.push(OpticalSurface::new(Sphere::new(15.0, 30.0)?));
//!
//!     let output = lens.trace(Sampling::default());
//!     assert_eq!(output.rays().len(), 10);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod intersect;
pub mod newton;
pub mod optics;
pub mod outline;
pub mod physics;
pub mod sampling;
pub mod sequence;
pub mod state;
pub mod surfaces;

// Re-export commonly used types
pub use error::{TraceError, TraceResult};
pub use intersect::{intersect, Intersection};
pub use newton::{intersect_newton, newton_delta, NewtonConfig};
pub use optics::{
    Anchor, Gap, Interaction, OpticalElement, OpticalSurface, PointSourceAtInfinity, DEFAULT_MARGIN,
};
pub use outline::Outline;
pub use physics::{reflect, reflection, refraction, total_internal_reflection, CriticalAnglePolicy};
pub use sampling::Sampling;
pub use sequence::{ExecutionStep, Sequence};
pub use state::SimulationState;
pub use surfaces::{CircularArc, ImplicitSurface, LocalCollision, Parabola, Plane, Sphere, Surface};

pub use lensmaker_math::{convert, Precision, RayBatch, Scalar, Transform, VectorN};
