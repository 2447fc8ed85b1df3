use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use derive_more::Display;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;

/// Characters the recognizer is allowed to emit.
pub const CHAR_WHITELIST: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz /-:";

#[derive(Debug, Display)]
pub enum OcrError {
    #[display(fmt = "OCR {} timed out after {}ms", stage, after_ms)]
    Timeout { stage: &'static str, after_ms: u64 },

    #[display(fmt = "OCR engine unavailable: {}", _0)]
    Unavailable(String),

    #[display(fmt = "OCR engine failed: {}", _0)]
    Engine(String),
}

impl std::error::Error for OcrError {}

/// Loads recognizer workers.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn load(&self) -> Result<Box<dyn OcrWorker>, OcrError>;
}

/// One loaded recognizer. `terminate` is called after every use.
#[async_trait]
pub trait OcrWorker: Send {
    async fn recognize(&mut self, png: &[u8]) -> Result<String, OcrError>;
    async fn terminate(&mut self);
}

#[derive(Debug, Clone, Copy)]
pub struct OcrTimeouts {
    pub load: Duration,
    pub recognize: Duration,
    pub teardown: Duration,
}

impl OcrTimeouts {
    pub fn from_config(config: &Config) -> Self {
        Self {
            load: Duration::from_millis(config.ocr_import_timeout_ms),
            recognize: Duration::from_millis(config.ocr_timeout_ms),
            teardown: Duration::from_millis(config.ocr_teardown_timeout_ms),
        }
    }
}

impl Default for OcrTimeouts {
    fn default() -> Self {
        Self {
            load: Duration::from_secs(15),
            recognize: Duration::from_secs(30),
            teardown: Duration::from_secs(5),
        }
    }
}

/// Loads a worker, recognizes `png` and always tears the worker down afterwards.
pub async fn recognize_text(
    engine: &dyn OcrEngine,
    png: &[u8],
    timeouts: OcrTimeouts,
) -> Result<String, OcrError> {
    let mut worker = match timeout(timeouts.load, engine.load()).await {
        Ok(loaded) => loaded?,
        Err(_) => {
            return Err(OcrError::Timeout {
                stage: "load",
                after_ms: timeouts.load.as_millis() as u64,
            });
        }
    };

    let result = match timeout(timeouts.recognize, worker.recognize(png)).await {
        Ok(text) => text,
        Err(_) => Err(OcrError::Timeout {
            stage: "recognition",
            after_ms: timeouts.recognize.as_millis() as u64,
        }),
    };

    if timeout(timeouts.teardown, worker.terminate()).await.is_err() {
        warn!(after_ms = timeouts.teardown.as_millis() as u64, "OCR worker teardown timed out");
    }

    result
}

/// Runs the `tesseract` binary once per recognition.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn load(&self) -> Result<Box<dyn OcrWorker>, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| OcrError::Unavailable(format!("{}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(OcrError::Unavailable(format!(
                "{} --version exited with {}",
                self.binary, output.status
            )));
        }

        debug!(binary = %self.binary, "Tesseract loaded");
        Ok(Box::new(TesseractWorker { binary: self.binary.clone(), child: None }))
    }
}

struct TesseractWorker {
    binary: String,
    child: Option<Child>,
}

#[async_trait]
impl OcrWorker for TesseractWorker {
    async fn recognize(&mut self, png: &[u8]) -> Result<String, OcrError> {
        let whitelist = format!("tessedit_char_whitelist={CHAR_WHITELIST}");
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", "eng", "--psm", "3", "-c"])
            .arg(whitelist)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Engine("stdin not captured".into()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| OcrError::Engine("stdout not captured".into()))?;
        let child = self.child.insert(child);

        stdin
            .write_all(png)
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        drop(stdin);

        let mut text = String::new();
        stdout
            .read_to_string(&mut text)
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let status = child.wait().await.map_err(|e| OcrError::Engine(e.to_string()))?;
        self.child = None;

        if !status.success() {
            return Err(OcrError::Engine(format!("tesseract exited with {status}")));
        }
        Ok(text)
    }

    async fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill tesseract process");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{Behaviour, MockOcrEngine};
    use super::*;

    fn short() -> OcrTimeouts {
        OcrTimeouts {
            load: Duration::from_millis(50),
            recognize: Duration::from_millis(50),
            teardown: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn text_is_returned_and_worker_terminated() {
        let engine = MockOcrEngine::text("IFSC HDFC0001234");
        let text = recognize_text(&engine, b"png", short()).await.unwrap();
        assert_eq!(text, "IFSC HDFC0001234");
        assert_eq!(engine.terminations(), 1);
    }

    #[tokio::test]
    async fn failures_still_terminate() {
        let engine = MockOcrEngine::new(Behaviour::Fail);
        let err = recognize_text(&engine, b"png", short()).await.unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
        assert_eq!(engine.terminations(), 1);
    }

    #[tokio::test]
    async fn slow_recognition_times_out_and_terminates() {
        let engine = MockOcrEngine::new(Behaviour::Hang);
        let err = recognize_text(&engine, b"png", short()).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout { stage: "recognition", .. }));
        assert_eq!(engine.terminations(), 1);
    }

    #[tokio::test]
    async fn slow_load_times_out() {
        let engine = MockOcrEngine::new(Behaviour::HangOnLoad);
        let err = recognize_text(&engine, b"png", short()).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout { stage: "load", .. }));
        assert!(err.to_string().starts_with("OCR load timed out after"));
        assert_eq!(engine.terminations(), 0);
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let engine = TesseractCli::new("/nonexistent/tesseract-binary");
        let err = recognize_text(&engine, b"png", short()).await.unwrap_err();
        assert!(matches!(err, OcrError::Unavailable(_) | OcrError::Timeout { .. }));
    }
}
