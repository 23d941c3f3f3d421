//! Geometric queries used when walking the tree.

pub use self::ray::Ray;

mod ray;
