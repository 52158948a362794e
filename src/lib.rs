/*!
cleave3d
========

**cleave3d** is a plane-based mesh slicing library written with
the rust programming language. It cuts large surface meshes into
square tiles and plans level-of-detail chains for each tile.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![deny(unused_qualifications)]
#![warn(missing_docs)] // TODO: deny this
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![doc(html_root_url = "http://docs.rs/cleave3d/0.2.0")]

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod lod;
pub mod mesh;
pub mod query;
pub mod tiling;
pub mod utils;

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub type Real = f64;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub type Real = f32;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub type Point<N> = na::Point3<N>;

    /// The vector type.
    pub type Vector<N> = na::Vector3<N>;

    /// The unit vector type.
    pub type UnitVector<N> = na::UnitVector3<N>;

    /// The transformation matrix type.
    pub type Isometry<N> = na::Isometry3<N>;
}
