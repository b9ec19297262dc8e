//! Lensmaker math - scalar, vector, ray batch and transform types.
//!
//! Everything here is generic over [`Scalar`] so that derivative-carrying
//! number types can flow through the tracer unchanged.

// Re-export glam for viewer-facing conversions
pub use glam;
pub use nalgebra;

mod ray;
mod scalar;
mod transform;
mod vector;

pub use nalgebra::convert;
pub use ray::{masked, RayBatch};
pub use scalar::{Precision, Scalar};
pub use transform::{forward_kinematic, Transform};
pub use vector::{MatrixN, VectorN};
