use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use crate::partitioning::aabb_tree::AabbTree;
use crate::query::Ray;

impl AabbTree {
    /// Reports every primitive whose leaf bounds intersect `aabb`.
    ///
    /// This is a broad phase: reported primitives may not intersect `aabb` themselves.
    pub fn intersect_aabb(&self, aabb: &Aabb, mut report: impl FnMut(u32)) {
        self.walk(|node, _| {
            if !node.aabb().intersects(aabb) {
                return false;
            }

            if node.is_leaf() {
                node.primitives(&self.indices)
                    .iter()
                    .for_each(|primitive| report(*primitive));
            }

            true
        })
    }

    /// Reports every primitive whose leaf bounds are hit by `ray` before `max_toi`, along with
    /// the time of impact of the ray on those leaf bounds.
    ///
    /// This is a broad phase: reported primitives may not be hit by the ray themselves.
    pub fn cast_ray(&self, ray: &Ray, max_toi: Real, mut report: impl FnMut(u32, Real)) {
        self.walk(|node, _| {
            let Some(toi) = node.aabb().cast_local_ray(ray, max_toi, true) else {
                return false;
            };

            if node.is_leaf() {
                node.primitives(&self.indices)
                    .iter()
                    .for_each(|primitive| report(*primitive, toi));
            }

            true
        })
    }
}
