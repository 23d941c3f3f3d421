//! Rays and their intersection with AABBs.

use core::mem;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DIM};

/// A ray for ray-casting queries.
///
/// Points along the ray are `origin + dir * t` for `t ≥ 0`. The direction
/// doesn’t need to be normalized, in which case times of impact are scaled by
/// its norm.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }
}

impl Aabb {
    /// Computes the time of impact of a ray with this AABB, using the slab method.
    ///
    /// If `solid` is `true`, a ray starting inside of the box hits at `t = 0`.
    /// Otherwise it hits where it exits the box.
    pub fn cast_local_ray(&self, ray: &Ray, max_toi: Real, solid: bool) -> Option<Real> {
        let mut tmin: Real = 0.0;
        let mut tmax: Real = max_toi;

        for i in 0usize..DIM {
            if ray.dir[i] == 0.0 {
                if ray.origin[i] < self.mins[i] || ray.origin[i] > self.maxs[i] {
                    return None;
                }
            } else {
                let denom = 1.0 / ray.dir[i];
                let mut inter_with_near_halfspace = (self.mins[i] - ray.origin[i]) * denom;
                let mut inter_with_far_halfspace = (self.maxs[i] - ray.origin[i]) * denom;

                if inter_with_near_halfspace > inter_with_far_halfspace {
                    mem::swap(
                        &mut inter_with_near_halfspace,
                        &mut inter_with_far_halfspace,
                    )
                }

                tmin = tmin.max(inter_with_near_halfspace);
                tmax = tmax.min(inter_with_far_halfspace);

                if tmin > tmax {
                    // This covers the case where tmax is negative because tmin is
                    // initialized at zero.
                    return None;
                }
            }
        }

        if tmin == 0.0 && !solid {
            Some(tmax)
        } else {
            Some(tmin)
        }
    }

    /// Does the given ray hit this AABB before `max_toi`?
    #[inline]
    pub fn intersects_local_ray(&self, ray: &Ray, max_toi: Real) -> bool {
        self.cast_local_ray(ray, max_toi, true).is_some()
    }
}
