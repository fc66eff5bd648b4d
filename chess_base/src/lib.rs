//! # Base types for arbiter
//!
//! This is an auxiliary crate for `arbiter`, which contains the plain value types: colors, piece
//! kinds, squares, board sizes, square sets and outcomes.
//!
//! Normally you don't want to use this crate directly. Use `arbiter` instead, which re-exports
//! everything declared here.

pub mod geometry;
pub mod square_set;
pub mod types;
