//! # tempograph-types
//!
//! Core temporal and attribute value types for the tempograph crate.
//!
//! - **Interval types**: `Interval`, `Window`
//! - **Value types**: `AttrValue`, `ValueType`
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use tempograph_types::interval::{Interval, Window};
//!
//! let weight = Interval::new(2.0, 10.0);
//! assert!(weight.overlaps(&Window::new(1.0, 3.0)));
//! assert!(!weight.overlaps(&Window::new(10.0, 12.0)));
//! ```

pub mod interval;
pub mod value;
