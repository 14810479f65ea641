//! Synthetic camkit device layer.
//!
//! Implements every device-core contract in memory so the capture engine
//! can be driven without hardware: tests script permission failures,
//! capability sets and recorder events; the CLI uses it as its backend.

pub mod device;
pub mod feed;
pub mod raster;
pub mod recorder;

pub use device::*;
pub use feed::*;
pub use raster::*;
pub use recorder::*;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
