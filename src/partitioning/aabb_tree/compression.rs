//! Conservative quantization of node bounds.
//!
//! A node stores its center as three floats whose lowest mantissa byte is replaced by an 8-bit
//! extent code, plus one shared scale whose lowest byte is always zero (24 significant bits).
//! The extent along the `i`-th axis decodes as `code[i] * scale`.
//!
//! Overwriting the low mantissa bits moves the center by at most 255 units in the last place.
//! That error, and the rounding errors of the computations, are budgeted for by inflating the
//! extents before quantizing them, and the quantized codes are always rounded up. The decoded
//! box therefore always contains the exact input box, provided that box is valid (non-negative
//! extents, no NaN) and its coordinates stay below [`MAX_COMPRESSED_MAGNITUDE`].

use crate::bounding_volume::Aabb;
#[cfg(debug_assertions)]
use crate::bounding_volume::BoundingVolume;
use crate::math::{DefaultBackend, Point, Real, Vector, VectorMath};

/// Coordinates are clamped to `[-MAX_COMPRESSED_MAGNITUDE, MAX_COMPRESSED_MAGNITUDE]` before
/// compression.
///
/// Boxes reaching beyond this range lose the conservativeness guarantee.
pub const MAX_COMPRESSED_MAGNITUDE: Real = 1.0e33;
/// The largest extent of a node is quantized on `[0, EXTENT_CODE_DIVISOR]` before rounding up.
pub const EXTENT_CODE_DIVISOR: Real = 254.999;
/// Relative and absolute inflation applied to the extents before quantization.
///
/// It must stay above `255 * 2^-23`, the relative error introduced by packing a code into the
/// low byte of a center component.
pub const COMPRESSION_EPSILON: Real = 1.0 / 16384.0;

const EXTENT_CODE_MASK: u32 = 0x0000_00ff;
const SCALE_MASK: u32 = 0xffff_ff00;
const MAX_EXTENT_CODE: u32 = 255;

/// The quantized bounds of a tree node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "bytemuck-serialize",
    derive(bytemuck::Pod, bytemuck::Zeroable)
)]
#[repr(C)]
pub struct CompressedBounds {
    /// Bit patterns of the center components. Each low byte holds the extent code of its axis.
    pub packed_center: [u32; 3],
    /// Bit pattern of the scale. Its low byte is always zero.
    pub scale: u32,
}

impl CompressedBounds {
    /// Compresses the given AABB with the default vector backend.
    #[inline]
    pub fn new(aabb: &Aabb) -> Self {
        Self::new_with::<DefaultBackend>(aabb)
    }

    /// Compresses the given AABB with the vector backend `B`.
    ///
    /// Invalid boxes (negative extents, NaN) still produce an encoding, but its decompressed
    /// box isn’t guaranteed to contain anything.
    pub fn new_with<B: VectorMath>(aabb: &Aabb) -> Self {
        let ceiling = B::splat(MAX_COMPRESSED_MAGNITUDE);
        let floor = B::splat(-MAX_COMPRESSED_MAGNITUDE);
        let mins = B::min(B::max(B::load(aabb.mins.coords.into()), floor), ceiling);
        let maxs = B::min(B::max(B::load(aabb.maxs.coords.into()), floor), ceiling);

        let half = B::splat(0.5);
        let center = B::mul(B::add(mins, maxs), half);
        let extents = B::mul(B::sub(maxs, mins), half);

        // Zero and subnormal centers would be corrupted by the packed byte.
        let min_normal = B::splat(Real::MIN_POSITIVE);
        let center = B::select_lt(B::abs(center), min_normal, min_normal, center);

        let eps = B::splat(COMPRESSION_EPSILON);
        let error = B::add(B::mul(B::add(B::abs(center), B::abs(extents)), eps), eps);
        let inflated = B::add(extents, error);

        let scale = quantize_scale(B::max_element(inflated) / EXTENT_CODE_DIVISOR);
        let inv_scale = if scale > 0.0 { 1.0 / scale } else { 0.0 };

        // +1 then truncate: the code is always strictly above the exact ratio.
        let codes = B::truncate(B::mul(inflated, B::splat(inv_scale)));
        let codes = B::min_bits(codes, B::splat_bits(MAX_EXTENT_CODE - 1));
        let codes = B::add_bits(codes, B::splat_bits(1));

        let center_bits = B::and_bits(B::to_bits(center), B::splat_bits(!EXTENT_CODE_MASK));
        let result = Self {
            packed_center: B::store_bits(B::or_bits(center_bits, codes)),
            scale: scale.to_bits(),
        };

        #[cfg(debug_assertions)]
        if aabb.is_valid() && within_compression_range(aabb) {
            debug_assert!(
                result.center().iter().all(|c| c.is_normal()),
                "denormal packed center: {:?}",
                result
            );
            debug_assert!(
                result.aabb().contains(aabb),
                "compressed bounds {:?} do not contain {:?}",
                result.aabb(),
                aabb
            );
        }

        result
    }

    /// Decompresses these bounds into a `(center, half-extents)` pair with the default backend.
    #[inline]
    pub fn decompress(&self) -> (Point<Real>, Vector<Real>) {
        self.decompress_with::<DefaultBackend>()
    }

    /// Decompresses these bounds into a `(center, half-extents)` pair with the backend `B`.
    ///
    /// The three axes are decoded at once: masking the low bytes gives the extent codes as
    /// integers, which are converted and multiplied by the broadcast scale.
    pub fn decompress_with<B: VectorMath>(&self) -> (Point<Real>, Vector<Real>) {
        let packed = B::load_bits(self.packed_center);
        let center = B::from_bits(packed);
        let codes = B::convert(B::and_bits(packed, B::splat_bits(EXTENT_CODE_MASK)));
        let extents = B::mul(codes, B::splat(self.scale_factor()));
        (Point::from(B::store(center)), Vector::from(B::store(extents)))
    }

    /// The center of these bounds, including the packed extent codes in its low bits.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from(self.packed_center.map(Real::from_bits))
    }

    /// The quantized extent code of each axis.
    #[inline]
    pub fn extent_codes(&self) -> [u8; 3] {
        self.packed_center.map(|bits| (bits & EXTENT_CODE_MASK) as u8)
    }

    /// The scale multiplying the extent codes.
    #[inline]
    pub fn scale_factor(&self) -> Real {
        Real::from_bits(self.scale)
    }

    /// The decompressed AABB.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        let (center, half_extents) = self.decompress();
        Aabb::from_half_extents(center, half_extents)
    }

    /// These bounds with their center moved by `shift`, with the default backend.
    #[inline]
    #[must_use]
    pub fn translated(&self, shift: &Vector<Real>) -> Self {
        self.translated_with::<DefaultBackend>(shift)
    }

    /// These bounds with their center moved by `shift`, with the backend `B`.
    ///
    /// The extent codes and scale are kept as-is. The translated center is re-packed, so it
    /// is subject to one packing error relative to its new magnitude.
    #[must_use]
    pub fn translated_with<B: VectorMath>(&self, shift: &Vector<Real>) -> Self {
        let packed = B::load_bits(self.packed_center);
        let codes = B::and_bits(packed, B::splat_bits(EXTENT_CODE_MASK));
        let center = B::add(B::from_bits(packed), B::load((*shift).into()));

        let min_normal = B::splat(Real::MIN_POSITIVE);
        let center = B::select_lt(B::abs(center), min_normal, min_normal, center);
        let center_bits = B::and_bits(B::to_bits(center), B::splat_bits(!EXTENT_CODE_MASK));

        Self {
            packed_center: B::store_bits(B::or_bits(center_bits, codes)),
            scale: self.scale,
        }
    }
}

/// Rounds a non-negative scale up to the next float with a zero low byte.
///
/// Negative and NaN scales become zero.
#[inline]
fn quantize_scale(scale: Real) -> Real {
    if scale.is_nan() || scale <= 0.0 {
        return 0.0;
    }

    Real::from_bits((scale.to_bits() + EXTENT_CODE_MASK) & SCALE_MASK)
}

#[cfg(debug_assertions)]
fn within_compression_range(aabb: &Aabb) -> bool {
    aabb.mins
        .iter()
        .chain(aabb.maxs.iter())
        .all(|x| x.abs() < MAX_COMPRESSED_MAGNITUDE)
}
