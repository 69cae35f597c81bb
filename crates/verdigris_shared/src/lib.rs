//! # Verdigris Shared
//!
//! Plain value types exchanged between the structure generator and
//! whatever renders its output.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - a GPU or windowing crate
//! - the generator itself
//!
//! Renderers upload these types directly, so every one of them is
//! `#[repr(C)]` and `bytemuck::Pod`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Vec2, Vec3};
