//! Linear algebra type aliases.

pub use self::vector_math::{DefaultBackend, ScalarBackend, VectorMath};
#[cfg(feature = "simd-is-enabled")]
pub use self::vector_math::GlamBackend;

mod vector_math;

/// The scalar type used throughout this crate.
pub type Real = f32;

/// The dimension of the space.
pub const DIM: usize = 3;

/// The point type.
pub type Point<N> = na::Point3<N>;

/// The vector type.
pub type Vector<N> = na::Vector3<N>;
