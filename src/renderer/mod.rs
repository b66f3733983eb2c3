//! Render-facing data
//!
//! Plain instance data for the host renderer; no graphics API lives here.

pub mod billboard;

pub use billboard::{BillboardBatch, BillboardInstance, BlendMode, Camera};
