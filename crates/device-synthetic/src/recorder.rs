//! Controllable chunked recorders.
//!
//! Every recorder the factory builds is paired with a [`RecorderHandle`]
//! that lets a test (or the CLI) inject chunks and errors exactly as a real
//! encoder would emit them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use camkit_device_core::{
    ChunkedRecorder, DeviceError, MediaTrack, RecorderEvent, RecorderEventSender,
    RecorderFactory, RecorderOptions, RecorderState,
};

use crate::lock;

/// How a synthetic recorder reacts to `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBehavior {
    /// Emit [`RecorderEvent::Stop`] immediately.
    #[default]
    Immediate,
    /// Emit nothing; the handle must call [`RecorderHandle::finish`] or
    /// [`RecorderHandle::emit_error`].
    Deferred,
}

/// Factory for synthetic recorders.
#[derive(Debug)]
pub struct SyntheticRecorderFactory {
    supported: Vec<String>,
    stop_behavior: StopBehavior,
    generate_chunks: bool,
    fail_create: Option<DeviceError>,
    last: Mutex<Option<RecorderHandle>>,
    created: AtomicUsize,
}

impl Default for SyntheticRecorderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticRecorderFactory {
    /// Supports WebM with VP8/VP9 + Opus.
    pub fn new() -> Self {
        Self {
            supported: vec![
                "video/webm;codecs=vp9,opus".to_string(),
                "video/webm;codecs=vp8,opus".to_string(),
                "video/webm".to_string(),
            ],
            stop_behavior: StopBehavior::Immediate,
            generate_chunks: false,
            fail_create: None,
            last: Mutex::new(None),
            created: AtomicUsize::new(0),
        }
    }

    pub fn with_supported_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stop_behavior(mut self, behavior: StopBehavior) -> Self {
        self.stop_behavior = behavior;
        self
    }

    /// Emit a generated chunk every timeslice while recording. Requires a
    /// tokio runtime at `start()`.
    pub fn generating_chunks(mut self) -> Self {
        self.generate_chunks = true;
        self
    }

    pub fn failing_create(mut self, error: DeviceError) -> Self {
        self.fail_create = Some(error);
        self
    }

    /// Handle for the most recently created recorder.
    pub fn last_handle(&self) -> Option<RecorderHandle> {
        lock(&self.last).clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl RecorderFactory for SyntheticRecorderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|t| t == mime_type)
    }

    fn create(
        &self,
        tracks: &[Arc<dyn MediaTrack>],
        options: &RecorderOptions,
        events: RecorderEventSender,
    ) -> Result<Box<dyn ChunkedRecorder>, DeviceError> {
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }
        if !self.is_type_supported(&options.mime_type) {
            return Err(DeviceError::Other(format!(
                "unsupported container {}",
                options.mime_type
            )));
        }

        let handle = RecorderHandle {
            inner: Arc::new(HandleInner {
                events: Mutex::new(Some(events)),
                options: options.clone(),
                track_ids: tracks.iter().map(|t| t.id().to_string()).collect(),
                state: Mutex::new(RecorderState::Inactive),
                stop_calls: AtomicUsize::new(0),
            }),
        };
        *lock(&self.last) = Some(handle.clone());
        self.created.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(SyntheticRecorder {
            handle,
            stop_behavior: self.stop_behavior,
            generate_chunks: self.generate_chunks,
            generator: None,
        }))
    }
}

#[derive(Debug)]
struct HandleInner {
    /// `None` once the stream has been cut with [`RecorderHandle::disconnect`].
    events: Mutex<Option<RecorderEventSender>>,
    options: RecorderOptions,
    track_ids: Vec<String>,
    state: Mutex<RecorderState>,
    stop_calls: AtomicUsize,
}

impl HandleInner {
    fn send(&self, event: RecorderEvent) -> bool {
        lock(&self.events)
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }
}

/// Test-side control over one synthetic recorder.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    inner: Arc<HandleInner>,
}

impl RecorderHandle {
    /// Deliver a chunk. Returns false once the consumer is gone.
    pub fn emit_chunk(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.inner.send(RecorderEvent::Data(bytes.into()))
    }

    /// Report a recorder failure.
    pub fn emit_error(&self, message: impl Into<String>) -> bool {
        *lock(&self.inner.state) = RecorderState::Inactive;
        self.inner.send(RecorderEvent::Error(message.into()))
    }

    /// Deliver the terminal stop notification.
    pub fn finish(&self) -> bool {
        *lock(&self.inner.state) = RecorderState::Inactive;
        self.inner.send(RecorderEvent::Stop)
    }

    /// Close the event stream without a terminal event, as a crashed encoder
    /// would. Later emits return false.
    pub fn disconnect(&self) {
        *lock(&self.inner.state) = RecorderState::Inactive;
        lock(&self.inner.events).take();
    }

    pub fn options(&self) -> &RecorderOptions {
        &self.inner.options
    }

    pub fn track_ids(&self) -> &[String] {
        &self.inner.track_ids
    }

    pub fn state(&self) -> RecorderState {
        *lock(&self.inner.state)
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.stop_calls.load(Ordering::SeqCst)
    }
}

struct Generator {
    stop_flag: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

struct SyntheticRecorder {
    handle: RecorderHandle,
    stop_behavior: StopBehavior,
    generate_chunks: bool,
    generator: Option<Generator>,
}

impl ChunkedRecorder for SyntheticRecorder {
    fn start(&mut self, timeslice: Option<Duration>) -> Result<(), DeviceError> {
        {
            let mut state = lock(&self.handle.inner.state);
            if *state == RecorderState::Recording {
                return Err(DeviceError::Other("recorder already started".to_string()));
            }
            *state = RecorderState::Recording;
        }

        let interval = timeslice.filter(|t| !t.is_zero());
        if let (true, Some(interval)) = (self.generate_chunks, interval) {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| DeviceError::Other(format!("chunk generator needs a runtime: {e}")))?;
            let Some(events) = lock(&self.handle.inner.events).as_ref().map(|tx| tx.downgrade())
            else {
                return Err(DeviceError::Other("event stream is closed".to_string()));
            };
            let stop_flag = Arc::new(AtomicBool::new(false));
            let flag = stop_flag.clone();
            let task = runtime.spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                let mut sequence: u64 = 0;
                loop {
                    ticker.tick().await;
                    let Some(tx) = events.upgrade() else {
                        return;
                    };
                    let payload = format!("chunk-{sequence:06};").into_bytes();
                    if tx.send(RecorderEvent::Data(payload)).is_err() {
                        return;
                    }
                    sequence += 1;
                    if flag.load(Ordering::SeqCst) {
                        let _ = tx.send(RecorderEvent::Stop);
                        return;
                    }
                }
            });
            self.generator = Some(Generator { stop_flag, task });
        }

        tracing::debug!(
            mime_type = %self.handle.inner.options.mime_type,
            tracks = self.handle.inner.track_ids.len(),
            "Synthetic recorder started"
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.handle.inner.stop_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = lock(&self.handle.inner.state);
            if *state != RecorderState::Recording {
                return Err(DeviceError::Other("recorder is not recording".to_string()));
            }
            *state = RecorderState::Inactive;
        }

        if let Some(generator) = &self.generator {
            // The generator flushes one last chunk, then emits Stop.
            generator.stop_flag.store(true, Ordering::SeqCst);
            return Ok(());
        }

        if self.stop_behavior == StopBehavior::Immediate {
            self.handle.finish();
        }
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.handle.state()
    }
}

impl Drop for SyntheticRecorder {
    fn drop(&mut self) {
        if let Some(generator) = self.generator.take() {
            if !generator.stop_flag.load(Ordering::SeqCst) {
                generator.task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camkit_device_core::recorder_event_channel;

    fn options(mime: &str) -> RecorderOptions {
        RecorderOptions {
            mime_type: mime.to_string(),
            video_bits_per_second: None,
            audio_bits_per_second: None,
        }
    }

    #[test]
    fn stop_emits_terminal_event_after_injected_chunks() {
        let factory = SyntheticRecorderFactory::new();
        let (tx, mut rx) = recorder_event_channel();
        let mut recorder = factory
            .create(&[], &options("video/webm"), tx)
            .unwrap();
        recorder.start(None).unwrap();

        let handle = factory.last_handle().unwrap();
        assert!(handle.emit_chunk(b"a".to_vec()));
        recorder.stop().unwrap();

        assert_eq!(rx.try_recv().unwrap(), RecorderEvent::Data(b"a".to_vec()));
        assert_eq!(rx.try_recv().unwrap(), RecorderEvent::Stop);
        assert_eq!(recorder.state(), RecorderState::Inactive);
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let factory = SyntheticRecorderFactory::new();
        let (tx, _rx) = recorder_event_channel();
        let mut recorder = factory.create(&[], &options("video/webm"), tx).unwrap();
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn unsupported_container_is_refused() {
        let factory = SyntheticRecorderFactory::new();
        let (tx, _rx) = recorder_event_channel();
        assert!(factory.create(&[], &options("video/x-matroska"), tx).is_err());
        assert!(!factory.is_type_supported("video/mp4"));
    }

    #[tokio::test]
    async fn zero_timeslice_does_not_start_the_generator() {
        let factory = SyntheticRecorderFactory::new().generating_chunks();
        let (tx, mut rx) = recorder_event_channel();
        let mut recorder = factory.create(&[], &options("video/webm"), tx).unwrap();
        recorder.start(Some(Duration::ZERO)).unwrap();
        recorder.stop().unwrap();

        assert_eq!(rx.recv().await, Some(RecorderEvent::Stop));
    }

    #[test]
    fn disconnect_closes_the_stream_without_a_stop() {
        let factory = SyntheticRecorderFactory::new();
        let (tx, mut rx) = recorder_event_channel();
        let mut recorder = factory.create(&[], &options("video/webm"), tx).unwrap();
        recorder.start(None).unwrap();

        let handle = factory.last_handle().unwrap();
        assert!(handle.emit_chunk(b"a".to_vec()));
        handle.disconnect();

        assert!(!handle.emit_chunk(b"b".to_vec()));
        assert_eq!(rx.try_recv().unwrap(), RecorderEvent::Data(b"a".to_vec()));
        assert_eq!(
            rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn factory_keeps_only_the_latest_handle() {
        let factory = SyntheticRecorderFactory::new();
        for mime in ["video/webm", "video/webm;codecs=vp8,opus"] {
            let (tx, _rx) = recorder_event_channel();
            factory.create(&[], &options(mime), tx).unwrap();
        }

        assert_eq!(factory.created_count(), 2);
        assert_eq!(
            factory.last_handle().unwrap().options().mime_type,
            "video/webm;codecs=vp8,opus"
        );
    }

    #[tokio::test]
    async fn generator_ends_with_stop() {
        let factory = SyntheticRecorderFactory::new().generating_chunks();
        let (tx, mut rx) = recorder_event_channel();
        let mut recorder = factory.create(&[], &options("video/webm"), tx).unwrap();
        recorder.start(Some(Duration::from_millis(5))).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        recorder.stop().unwrap();

        let mut chunks = 0;
        loop {
            match rx.recv().await {
                Some(RecorderEvent::Data(_)) => chunks += 1,
                Some(RecorderEvent::Stop) => break,
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(chunks >= 1);
    }
}
