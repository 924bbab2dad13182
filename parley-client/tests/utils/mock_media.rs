use async_trait::async_trait;
use parley_client::EngineError;
use parley_client::capability::{MediaSource, MediaStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockMediaStream {
    stopped: AtomicBool,
}

impl MockMediaStream {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaStream for MockMediaStream {
    fn stop_tracks(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Media capture mock. Can be told to fail or to respond slowly, and
/// remembers every stream it handed out so tests can prove no track
/// leaked.
pub struct MockMediaSource {
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    streams: Mutex<Vec<Arc<MockMediaStream>>>,
    acquired: AtomicUsize,
}

impl MockMediaSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            streams: Mutex::new(Vec::new()),
            acquired: AtomicUsize::new(0),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn acquire_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn all_tracks_stopped(&self) -> bool {
        self.streams.lock().unwrap().iter().all(|s| s.is_stopped())
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn acquire(&self) -> Result<Arc<dyn MediaStream>, EngineError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::MediaAcquisition(
                "mock capture unavailable".to_string(),
            ));
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        let stream = Arc::new(MockMediaStream {
            stopped: AtomicBool::new(false),
        });
        self.streams.lock().unwrap().push(stream.clone());
        Ok(stream)
    }
}
