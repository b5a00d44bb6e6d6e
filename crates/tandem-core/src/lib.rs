//! Tandem Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tandem parser
//! and engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and box sides ([`geometry`] module)
//! - **Model**: The parsed graph and its style vocabulary ([`model`] module)
//! - **Source map**: Line ↔ entity lookup ([`source_map`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod model;
pub mod source_map;
