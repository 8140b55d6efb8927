//! # Base types for kibitz
//!
//! This is an auxiliary crate for `kibitz`, which contains the board geometry: colors, figure types,
//! positions, directions and square sets. It was split from the main crate, so everything declared
//! here can be used in the build script for `kibitz`.
//!
//! Normally you don't want to use this crate directly. Use `kibitz` instead.

pub mod geometry;
pub mod square_set;
pub mod types;
