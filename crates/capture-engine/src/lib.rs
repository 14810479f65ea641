//! camkit Capture Engine
//!
//! Manages one camera + microphone capture session at a time and the work
//! done against it: hardware toggles, still frames, and chunked recording.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │             CaptureSessionManager                │
//! │  defaults ⊕ overrides ──► DeviceAccess           │
//! │                  │                               │
//! │                  ▼                               │
//! │            CaptureSession (tracks)               │
//! │     ┌────────────┼──────────────┐                │
//! │     ▼            ▼              ▼                │
//! │  control      StillCapture   VideoRecorder       │
//! │  torch/mute   frame → WEBP   chunks → blob       │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Only the manager stops tracks. The other components read them through a
//! [`CaptureSession`] handle and fail with `InvalidArgument` once it has
//! been closed.

pub mod control;
pub mod recorder;
pub mod session;
pub mod still;

pub use control::*;
pub use recorder::*;
pub use session::*;
pub use still::*;
