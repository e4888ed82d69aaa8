//! Bitmap-to-text boundary.
//!
//! Extraction only ever sees text. Whatever turns an image into text sits
//! behind [`TextRecognizer`] and is injected by the caller. Real engines are
//! slow to load, so [`LazyRecognizer`] builds one on first use and reuses it.

use std::sync::{Mutex, OnceLock};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("Text recognition engine initialization failed: {0}")]
    Init(String),

    #[error("Text recognition failed: {0}")]
    Failed(String),
}

/// Image bytes in, recognized text out (fragments joined by spaces).
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError> {
        (**self).recognize(image_bytes)
    }
}

/// Builds the wrapped engine at most once, on first use.
///
/// Concurrent first calls serialize on an init lock; only one runs the
/// factory. A failed build is not cached, so the next call tries again.
pub struct LazyRecognizer<R, F> {
    engine: OnceLock<R>,
    init_lock: Mutex<()>,
    factory: F,
}

impl<R, F> LazyRecognizer<R, F>
where
    R: TextRecognizer,
    F: Fn() -> Result<R, RecognitionError> + Send + Sync,
{
    pub fn new(factory: F) -> Self {
        Self {
            engine: OnceLock::new(),
            init_lock: Mutex::new(()),
            factory,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// The engine, building it if needed.
    pub fn engine(&self) -> Result<&R, RecognitionError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }

        let _guard = self
            .init_lock
            .lock()
            .map_err(|_| RecognitionError::Init("initialization lock poisoned".into()))?;

        // Another caller may have finished while we waited.
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }

        tracing::info!("Initializing text recognition engine");
        let engine = (self.factory)().inspect_err(|e| {
            tracing::warn!(error = %e, "Text recognition engine unavailable");
        })?;

        Ok(self.engine.get_or_init(|| engine))
    }
}

impl<R, F> TextRecognizer for LazyRecognizer<R, F>
where
    R: TextRecognizer,
    F: Fn() -> Result<R, RecognitionError> + Send + Sync,
{
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError> {
        self.engine()?.recognize(image_bytes)
    }
}

/// Returns fixed text (or a fixed failure) for tests and dry runs.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    outcome: Result<String, RecognitionError>,
}

impl MockRecognizer {
    pub fn new(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(RecognitionError::Failed(reason.to_string())),
        }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, RecognitionError> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn mock_returns_configured_text() {
        let engine = MockRecognizer::new("LVIDd 3,21 cm");
        assert_eq!(engine.recognize(b"fake_image_bytes").unwrap(), "LVIDd 3,21 cm");
    }

    #[test]
    fn failing_mock_reports_failure() {
        let engine = MockRecognizer::failing("unreadable");
        assert_eq!(
            engine.recognize(b"fake").unwrap_err(),
            RecognitionError::Failed("unreadable".into())
        );
    }

    #[test]
    fn lazy_engine_is_built_on_first_use() {
        let builds = AtomicUsize::new(0);
        let lazy = LazyRecognizer::new(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(MockRecognizer::new("Paciente: Rex"))
        });

        assert!(!lazy.is_initialized());
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        assert_eq!(lazy.recognize(b"a").unwrap(), "Paciente: Rex");
        assert_eq!(lazy.recognize(b"b").unwrap(), "Paciente: Rex");
        assert!(lazy.is_initialized());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_calls_build_once() {
        let builds = AtomicUsize::new(0);
        let lazy = LazyRecognizer::new(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(MockRecognizer::new("ok"))
        });

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(lazy.recognize(b"img").unwrap(), "ok"));
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_build_is_retried() {
        let attempts = AtomicUsize::new(0);
        let lazy = LazyRecognizer::new(|| {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RecognitionError::Init("model files missing".into()))
            } else {
                Ok(MockRecognizer::new("ok"))
            }
        });

        assert!(matches!(lazy.recognize(b"img"), Err(RecognitionError::Init(_))));
        assert!(!lazy.is_initialized());

        assert_eq!(lazy.recognize(b"img").unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn boxed_recognizer_delegates() {
        let engine: Box<dyn TextRecognizer> = Box::new(MockRecognizer::new("x"));
        assert_eq!(engine.recognize(b"").unwrap(), "x");
    }
}
