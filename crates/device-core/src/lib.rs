//! camkit device-layer contracts.
//!
//! The capture engine never talks to hardware directly. It consumes three
//! collaborators defined here:
//! - [`DeviceAccess`] opens a [`MediaStream`] of [`MediaTrack`]s
//! - [`RasterEncoder`] draws a [`VideoFeed`] frame and encodes it
//! - [`RecorderFactory`] builds [`ChunkedRecorder`]s that report through a
//!   [`RecorderEvent`] channel
//!
//! Capability sets cross this boundary untyped; [`TrackCapabilities`] is
//! where they are validated.

pub mod capabilities;
pub mod error;
pub mod raster;
pub mod recorder;
pub mod track;

pub use capabilities::*;
pub use error::*;
pub use raster::*;
pub use recorder::*;
pub use track::*;
