//! Core library for the Gridify 3D point visualizer.

pub mod camera;
pub mod geometry;
pub mod parse;
pub mod scene;
pub mod store;
