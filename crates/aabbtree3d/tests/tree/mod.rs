use aabbtree3d::bounding_volume::Aabb;
use aabbtree3d::math::{Point, Real, Vector};
use rand::rngs::StdRng;
use rand::Rng;

mod build;
mod errors;
mod progressive_build;
mod shift_origin;

pub fn random_aabbs(rng: &mut StdRng, len: usize, range: Real) -> Vec<Aabb> {
    (0..len)
        .map(|_| {
            let center = Point::new(
                rng.gen_range(-range..range),
                rng.gen_range(-range..range),
                rng.gen_range(-range..range),
            );
            let half_extents = Vector::new(
                rng.gen_range(0.05..1.0),
                rng.gen_range(0.05..1.0),
                rng.gen_range(0.05..1.0),
            );
            Aabb::from_half_extents(center, half_extents)
        })
        .collect()
}
