//! camkit Constraints
//!
//! Defines the capture request contract handed to the device layer:
//! - **Merge:** Recursive key-by-key merge of constraint trees
//! - **Spec:** The typed constraint tree with audio/video sections
//! - **Viewport:** The caller's display size, which drives the default
//!   aspect ratio
//!
//! Trees are plain JSON mappings so that device-specific keys the core does
//! not know about pass through untouched.

pub mod merge;
pub mod spec;
pub mod viewport;

pub use merge::*;
pub use spec::*;
pub use viewport::*;
