/*!
aabbtree3d
==========

**aabbtree3d** is a compressed, incrementally refittable bounding-volume
hierarchy over 3D axis-aligned bounding boxes, written with the rust
programming language.

Each tree node stores its bounds in a quantized form: the center as three
floats carrying an 8-bit extent code in their low mantissa bits, plus a
shared 24-bit scale. Decompressed bounds are always conservative: they never
get smaller than the exact boxes they were computed from.

The tree can be built in one pass, built progressively over several calls,
and refitted incrementally after a subset of its primitives moved.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![warn(unused_qualifications)]

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod math;
pub mod partitioning;
pub mod query;
pub mod utils;
