//! Pipeline orchestration: Decode → Resample → (Sharpen) → Encode.
//!
//! A run moves strictly forward through [`Stage`]s and never revisits one:
//!
//! ```text
//! Idle → Decoding → Resampling → [Sharpening] → Encoding → Done
//!   └──────────────────────┴──────────────────────┴────→ Failed
//! ```
//!
//! The first error ends the run. Intermediate buffers are dropped and no
//! partial result is returned. A caller-supplied [`Stop`] is checked before
//! each stage starts; a stage that has started always runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use enough::{Stop, StopReason, Unstoppable};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decode::{self, DecodeError};
use crate::encode::{self, EncodeError, OutputFormat};
use crate::transform::{check_target_dimensions, resample, sharpen, target_dimensions, ResampleError};
use crate::{PipelineConfig, ProcessOptions};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Input bytes are malformed or in an unsupported format.
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Target size is zero or above the configured maximum.
    #[error("Invalid output dimensions: {0}")]
    InvalidDimensions(#[from] ResampleError),

    /// The encoder rejected the buffer or parameters.
    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// Options are not usable (e.g. NaN scale).
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The caller cancelled the run between stages.
    #[error("Processing cancelled ({0:?})")]
    Cancelled(StopReason),
}

impl From<StopReason> for ProcessingError {
    fn from(reason: StopReason) -> Self {
        ProcessingError::Cancelled(reason)
    }
}

/// Payload-free classification of a [`ProcessingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Decode,
    InvalidDimensions,
    Encode,
    InvalidOptions,
    Cancelled,
}

impl ProcessingError {
    /// The kind of failure, for callers that only need to branch.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::Decode(_) => ErrorKind::Decode,
            ProcessingError::InvalidDimensions(_) => ErrorKind::InvalidDimensions,
            ProcessingError::Encode(_) => ErrorKind::Encode,
            ProcessingError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            ProcessingError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

/// Pipeline state. Observers see every state after `Idle` exactly once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Idle,
    Decoding,
    Resampling,
    Sharpening,
    Encoding,
    Done,
    Failed,
}

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Length of `bytes`
    pub byte_length: usize,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Format of `bytes`
    pub format: OutputFormat,
}

impl ProcessResult {
    fn new(bytes: Vec<u8>, width: u32, height: u32, format: OutputFormat) -> Self {
        Self {
            byte_length: bytes.len(),
            bytes,
            width,
            height,
            format,
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Shareable cancellation flag.
///
/// Clones share state, so one clone can be handed to the run while another
/// stays with whoever may want to abandon it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Stop for CancelFlag {
    fn check(&self) -> Result<(), StopReason> {
        if self.is_cancelled() {
            Err(StopReason::Cancelled)
        } else {
            Ok(())
        }
    }

    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}

/// Runs the transform pipeline with a fixed [`PipelineConfig`].
///
/// A `Pipeline` holds no mutable state, so one instance can serve concurrent
/// runs from several threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform `bytes` according to `options`, without cancellation.
    pub fn transform(
        &self,
        bytes: &[u8],
        options: &ProcessOptions,
    ) -> Result<ProcessResult, ProcessingError> {
        self.transform_with(bytes, None, options, &Unstoppable, &mut |_| {})
    }

    /// Transform `bytes` according to `options`.
    ///
    /// * `mime_hint` - Claimed input MIME type, used when sniffing fails
    /// * `stop` - Checked before every stage; a stop request fails the run with
    ///   [`ProcessingError::Cancelled`]
    /// * `observer` - Called on every state transition, ending with `Done` or `Failed`
    pub fn transform_with(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
        options: &ProcessOptions,
        stop: &dyn Stop,
        observer: &mut dyn FnMut(Stage),
    ) -> Result<ProcessResult, ProcessingError> {
        let result = self.run(bytes, mime_hint, options, stop, observer);

        match &result {
            Ok(output) => {
                observer(Stage::Done);
                info!(
                    width = output.width,
                    height = output.height,
                    byte_length = output.byte_length,
                    format = %output.format,
                    "transform complete"
                );
            }
            Err(err) => {
                observer(Stage::Failed);
                debug!(error = %err, kind = ?err.kind(), "transform failed");
            }
        }

        result
    }

    fn run(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
        options: &ProcessOptions,
        stop: &dyn Stop,
        observer: &mut dyn FnMut(Stage),
    ) -> Result<ProcessResult, ProcessingError> {
        let options = options.validate()?;

        enter(Stage::Decoding, stop, observer)?;
        let decoded = decode::decode_with_limits(bytes, mime_hint, Some(self.config.max_dimension))?;

        let (width, height) = target_dimensions(decoded.width, decoded.height, options.scale);
        check_target_dimensions(
            width,
            height,
            self.config.max_dimension,
            self.config.max_pixels,
        )?;

        enter(Stage::Resampling, stop, observer)?;
        let resampled = resample(&decoded, width, height, self.config.filter)?;
        drop(decoded);

        let output = if options.sharpen_applies() {
            enter(Stage::Sharpening, stop, observer)?;
            sharpen(&resampled)
        } else {
            if options.sharpen {
                warn!(scale = options.scale, "sharpen requested but skipped: scale is not above 1");
            }
            resampled
        };

        enter(Stage::Encoding, stop, observer)?;
        let encoded = encode::encode(
            &output,
            options.format,
            options.quality,
            self.config.jpeg_background,
        )?;

        Ok(ProcessResult::new(encoded, width, height, options.format))
    }
}

/// Check for cancellation, then announce the next stage.
fn enter(
    stage: Stage,
    stop: &dyn Stop,
    observer: &mut dyn FnMut(Stage),
) -> Result<(), ProcessingError> {
    stop.check()?;
    debug!(?stage, "entering stage");
    observer(stage);
    Ok(())
}

/// Transform `bytes` with a default [`Pipeline`].
pub fn transform(bytes: &[u8], options: &ProcessOptions) -> Result<ProcessResult, ProcessingError> {
    Pipeline::default().transform(bytes, options)
}
