//! Smeltery Core -- containers, handles, and world access for fuel engines.
//!
//! This crate provides the building blocks the fuel engines in
//! `smeltery-fuel` operate on: fluid stacks and the shared
//! [`fluid::ResourceContainer`] contract, plain and scaled tanks, item stacks
//! and handlers, the item/fluid registry, invalidatable capability handles,
//! and the [`level::Level`] trait through which engines discover containers
//! at block positions.
//!
//! # Key Types
//!
//! - [`fluid::ResourceContainer`] -- get/fill/drain contract shared by single
//!   tanks and aggregate views.
//! - [`tank::Tank`] -- a plain [`tank::FluidTank`] or a [`tank::ScaledTank`]
//!   that only moves whole bundles of `scale` units.
//! - [`capability::Capability`] -- a shared handle to a container that can be
//!   invalidated, with explicit listener registration.
//! - [`level::Level`] -- capability lookup by position, item dropping.
//! - [`registry::Registry`] -- immutable fluid and item definitions (burn
//!   times, crafting remainders).
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for world-space math.

pub mod capability;
pub mod fixed;
pub mod fluid;
pub mod id;
pub mod item;
pub mod level;
pub mod registry;
pub mod rng;
pub mod tank;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
