#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

mod conflict;
mod environment;
mod error;
mod installer;
mod marker;
mod normalize;
mod package_name;
mod registry;
mod requirement;
mod version;

pub mod constraint;
pub mod wheel;

pub use conflict::*;
pub use environment::*;
pub use error::*;
pub use installer::*;
pub use marker::*;
pub use normalize::*;
pub use package_name::*;
pub use registry::*;
pub use requirement::*;
pub use version::*;

pub use constraint::{Comparable, Constraint, Constraints, Operator};
