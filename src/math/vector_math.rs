use crate::math::Real;
use na::Vector3;

/// Lane-wise 3D vector operations used by the node compressor.
///
/// The node compressor is written only in terms of these operations so it can
/// run on a portable scalar backend or on a SIMD backend. Both backends must
/// produce bit-identical results.
pub trait VectorMath {
    /// A vector of three floats.
    type Vec3: Copy;
    /// A vector of three 32-bit unsigned integers.
    type UVec3: Copy;

    /// Loads three floats.
    fn load(v: [Real; 3]) -> Self::Vec3;
    /// Stores three floats.
    fn store(v: Self::Vec3) -> [Real; 3];
    /// A vector with all its lanes set to `s`.
    fn splat(s: Real) -> Self::Vec3;
    /// Lane-wise `a + b`.
    fn add(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3;
    /// Lane-wise `a - b`.
    fn sub(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3;
    /// Lane-wise `a * b`.
    fn mul(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3;
    /// Lane-wise absolute value.
    fn abs(a: Self::Vec3) -> Self::Vec3;
    /// Lane-wise minimum.
    fn min(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3;
    /// Lane-wise maximum.
    fn max(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3;
    /// The greatest of the three lanes.
    fn max_element(a: Self::Vec3) -> Real;
    /// Lane-wise `if a < b { if_lt } else { otherwise }`.
    fn select_lt(
        a: Self::Vec3,
        b: Self::Vec3,
        if_lt: Self::Vec3,
        otherwise: Self::Vec3,
    ) -> Self::Vec3;
    /// Lane-wise float to integer conversion, rounding toward zero.
    ///
    /// Negative and NaN lanes saturate to zero.
    fn truncate(a: Self::Vec3) -> Self::UVec3;
    /// Lane-wise integer to float conversion.
    fn convert(a: Self::UVec3) -> Self::Vec3;
    /// Reinterprets the float lanes as their bit patterns.
    fn to_bits(a: Self::Vec3) -> Self::UVec3;
    /// Reinterprets integer lanes as float bit patterns.
    fn from_bits(a: Self::UVec3) -> Self::Vec3;
    /// Loads three integers.
    fn load_bits(v: [u32; 3]) -> Self::UVec3;
    /// Stores three integers.
    fn store_bits(v: Self::UVec3) -> [u32; 3];
    /// An integer vector with all its lanes set to `s`.
    fn splat_bits(s: u32) -> Self::UVec3;
    /// Lane-wise `a & b`.
    fn and_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3;
    /// Lane-wise `a | b`.
    fn or_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3;
    /// Lane-wise `a + b` on integers.
    fn add_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3;
    /// Lane-wise minimum on integers.
    fn min_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3;
}

/// Portable backend built on nalgebra vectors.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarBackend;

impl VectorMath for ScalarBackend {
    type Vec3 = Vector3<Real>;
    type UVec3 = Vector3<u32>;

    #[inline(always)]
    fn load(v: [Real; 3]) -> Self::Vec3 {
        Vector3::from(v)
    }

    #[inline(always)]
    fn store(v: Self::Vec3) -> [Real; 3] {
        v.into()
    }

    #[inline(always)]
    fn splat(s: Real) -> Self::Vec3 {
        Vector3::repeat(s)
    }

    #[inline(always)]
    fn add(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a + b
    }

    #[inline(always)]
    fn sub(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a - b
    }

    #[inline(always)]
    fn mul(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a.component_mul(&b)
    }

    #[inline(always)]
    fn abs(a: Self::Vec3) -> Self::Vec3 {
        a.map(|x| x.abs())
    }

    #[inline(always)]
    fn min(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a.zip_map(&b, |x, y| x.min(y))
    }

    #[inline(always)]
    fn max(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a.zip_map(&b, |x, y| x.max(y))
    }

    #[inline(always)]
    fn max_element(a: Self::Vec3) -> Real {
        a.x.max(a.y).max(a.z)
    }

    #[inline(always)]
    fn select_lt(
        a: Self::Vec3,
        b: Self::Vec3,
        if_lt: Self::Vec3,
        otherwise: Self::Vec3,
    ) -> Self::Vec3 {
        Vector3::from_fn(|i, _| if a[i] < b[i] { if_lt[i] } else { otherwise[i] })
    }

    #[inline(always)]
    fn truncate(a: Self::Vec3) -> Self::UVec3 {
        a.map(|x| x as u32)
    }

    #[inline(always)]
    fn convert(a: Self::UVec3) -> Self::Vec3 {
        a.map(|x| x as Real)
    }

    #[inline(always)]
    fn to_bits(a: Self::Vec3) -> Self::UVec3 {
        a.map(Real::to_bits)
    }

    #[inline(always)]
    fn from_bits(a: Self::UVec3) -> Self::Vec3 {
        a.map(Real::from_bits)
    }

    #[inline(always)]
    fn load_bits(v: [u32; 3]) -> Self::UVec3 {
        Vector3::from(v)
    }

    #[inline(always)]
    fn store_bits(v: Self::UVec3) -> [u32; 3] {
        v.into()
    }

    #[inline(always)]
    fn splat_bits(s: u32) -> Self::UVec3 {
        Vector3::repeat(s)
    }

    #[inline(always)]
    fn and_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.zip_map(&b, |x, y| x & y)
    }

    #[inline(always)]
    fn or_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.zip_map(&b, |x, y| x | y)
    }

    #[inline(always)]
    fn add_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.zip_map(&b, u32::wrapping_add)
    }

    #[inline(always)]
    fn min_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.zip_map(&b, u32::min)
    }
}

/// SIMD backend built on glam's 16-byte aligned `Vec3A`.
#[cfg(feature = "simd-is-enabled")]
#[derive(Copy, Clone, Debug, Default)]
pub struct GlamBackend;

#[cfg(feature = "simd-is-enabled")]
impl VectorMath for GlamBackend {
    type Vec3 = glam::Vec3A;
    type UVec3 = glam::UVec3;

    #[inline(always)]
    fn load(v: [Real; 3]) -> Self::Vec3 {
        glam::Vec3A::from_array(v)
    }

    #[inline(always)]
    fn store(v: Self::Vec3) -> [Real; 3] {
        v.to_array()
    }

    #[inline(always)]
    fn splat(s: Real) -> Self::Vec3 {
        glam::Vec3A::splat(s)
    }

    #[inline(always)]
    fn add(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a + b
    }

    #[inline(always)]
    fn sub(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a - b
    }

    #[inline(always)]
    fn mul(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a * b
    }

    #[inline(always)]
    fn abs(a: Self::Vec3) -> Self::Vec3 {
        a.abs()
    }

    #[inline(always)]
    fn min(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a.min(b)
    }

    #[inline(always)]
    fn max(a: Self::Vec3, b: Self::Vec3) -> Self::Vec3 {
        a.max(b)
    }

    #[inline(always)]
    fn max_element(a: Self::Vec3) -> Real {
        a.max_element()
    }

    #[inline(always)]
    fn select_lt(
        a: Self::Vec3,
        b: Self::Vec3,
        if_lt: Self::Vec3,
        otherwise: Self::Vec3,
    ) -> Self::Vec3 {
        glam::Vec3A::select(a.cmplt(b), if_lt, otherwise)
    }

    #[inline(always)]
    fn truncate(a: Self::Vec3) -> Self::UVec3 {
        a.as_uvec3()
    }

    #[inline(always)]
    fn convert(a: Self::UVec3) -> Self::Vec3 {
        a.as_vec3a()
    }

    #[inline(always)]
    fn to_bits(a: Self::Vec3) -> Self::UVec3 {
        glam::UVec3::from_array(a.to_array().map(Real::to_bits))
    }

    #[inline(always)]
    fn from_bits(a: Self::UVec3) -> Self::Vec3 {
        glam::Vec3A::from_array(a.to_array().map(Real::from_bits))
    }

    #[inline(always)]
    fn load_bits(v: [u32; 3]) -> Self::UVec3 {
        glam::UVec3::from_array(v)
    }

    #[inline(always)]
    fn store_bits(v: Self::UVec3) -> [u32; 3] {
        v.to_array()
    }

    #[inline(always)]
    fn splat_bits(s: u32) -> Self::UVec3 {
        glam::UVec3::splat(s)
    }

    #[inline(always)]
    fn and_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a & b
    }

    #[inline(always)]
    fn or_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a | b
    }

    #[inline(always)]
    fn add_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.wrapping_add(b)
    }

    #[inline(always)]
    fn min_bits(a: Self::UVec3, b: Self::UVec3) -> Self::UVec3 {
        a.min(b)
    }
}

/// The backend used when none is requested explicitly.
#[cfg(not(feature = "simd-is-enabled"))]
pub type DefaultBackend = ScalarBackend;

/// The backend used when none is requested explicitly.
#[cfg(feature = "simd-is-enabled")]
pub type DefaultBackend = GlamBackend;
