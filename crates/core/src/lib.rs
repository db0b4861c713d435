#![deny(unsafe_code)]
//! Core types for the driftfield particle animation engine.
//!
//! Provides the [`FlowField`] (noise-driven grid of unit directions), the
//! [`Viewport`] and [`DrawSurface`]/[`Rgba`]/[`BlendMode`] host-surface
//! model, the [`Scene`] reproducibility record, the [`Xorshift64`] PRNG,
//! JSON parameter helpers, and [`SimError`].

pub mod error;
pub mod flow;
pub mod params;
pub mod prng;
pub mod scene;
pub mod surface;
pub mod viewport;

pub use error::SimError;
pub use flow::FlowField;
pub use prng::Xorshift64;
pub use scene::Scene;
pub use surface::{BlendMode, DrawSurface, NullSurface, Rgba};
pub use viewport::Viewport;
