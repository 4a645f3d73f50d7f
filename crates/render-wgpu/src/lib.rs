//! wgpu render backend for the sandbox.
//!
//! Draws the ground grid as lines and every scene primitive as an instance of
//! a shared unit mesh, one instanced draw per mesh kind.
//!
//! # Invariants
//! - Renderer never mutates session state; it only sees a composed scene.
//! - Materials are flat, unlit colors.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
