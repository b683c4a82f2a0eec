//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core pipeline
//! depends only on these traits, not on concrete implementations.

mod grid_reader;

pub use grid_reader::{DecodedGrid, GridReader};
