//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the transcoding contract the image jobs rely
//! on: write a bounded thumbnail and write a full-size re-encode.
//! Implementations may fail on corrupt or unreadable input; the caller decides
//! whether that is fatal.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `webp` crates.

use super::params::{EncodeParams, ThumbnailParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Fit the source inside the params' bounding box and write a JPEG.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;

    /// Re-encode the source at full size in the params' format.
    fn encode(&self, params: &EncodeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use std::path::Path;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of decoding images.
    ///
    /// Successful operations write a small placeholder to the output path so
    /// freshness checks see a real file. Sources whose filename contains one
    /// of `fail_on` produce a `ProcessingFailed` error and write nothing.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        pub fail_on: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Thumbnail {
            source: String,
            output: String,
            max_width: u32,
            max_height: u32,
            quality: u32,
        },
        Encode {
            source: String,
            output: String,
            format: OutputFormat,
            auto_orient: bool,
        },
    }

    impl RecordedOp {
        pub fn output(&self) -> &str {
            match self {
                RecordedOp::Thumbnail { output, .. } | RecordedOp::Encode { output, .. } => output,
            }
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(names: &[&str]) -> Self {
            Self {
                fail_on: names.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Output paths written so far, sorted (rayon runs items in any order).
        pub fn written_outputs(&self) -> Vec<String> {
            let mut outputs: Vec<String> = self
                .get_operations()
                .iter()
                .map(|op| op.output().to_string())
                .collect();
            outputs.sort();
            outputs
        }

        fn check_source(&self, source: &Path) -> Result<(), BackendError> {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.fail_on.iter().any(|f| name.contains(f.as_str())) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock decode failure: {name}"
                )));
            }
            Ok(())
        }

        fn write_placeholder(output: &Path) -> Result<(), BackendError> {
            std::fs::write(output, b"mock")?;
            Ok(())
        }
    }

    impl ImageBackend for MockBackend {
        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
            self.check_source(&params.source)?;
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                max_width: params.max_width,
                max_height: params.max_height,
                quality: params.quality.value(),
            });
            Self::write_placeholder(&params.output)
        }

        fn encode(&self, params: &EncodeParams) -> Result<(), BackendError> {
            self.check_source(&params.source)?;
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                format: params.format,
                auto_orient: params.auto_orient,
            });
            Self::write_placeholder(&params.output)
        }
    }

    #[test]
    fn mock_records_thumbnail_and_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("thumb_a.jpg");
        let backend = MockBackend::new();

        backend
            .thumbnail(&ThumbnailParams {
                source: "/a.jpg".into(),
                output: output.clone(),
                max_width: 300,
                max_height: 300,
                quality: Quality::new(85),
            })
            .unwrap();

        assert!(output.exists());
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Thumbnail {
                max_width: 300,
                quality: 85,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_configured_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("broken.webp");
        let backend = MockBackend::failing_on(&["broken"]);

        let result = backend.encode(&EncodeParams {
            source: "/cat/broken.jpg".into(),
            output: output.clone(),
            format: OutputFormat::WebP(Quality::new(85)),
            auto_orient: false,
        });

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
        assert!(backend.get_operations().is_empty());
    }
}
