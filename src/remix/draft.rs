//! A remix in progress: chosen video, uploaded reference images, generation.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::SessionContext;
use crate::util::catch_task_panic;

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_TITLE: &str = "Brazil Jersey in Transit";
pub const GENERATION_TIME: Duration = Duration::from_secs(2);
const PREVIEW_REF: &str =
    "https://images.unsplash.com/photo-1536440136628-849c177e76a1?w=800&h=800&fit=crop";

// ============================================================================
// Errors
// ============================================================================

/// Why an offered file was not added to the draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("{name} is larger than 10 MB")]
    TooLarge { name: String, size: u64 },

    #[error("{name} is not a PNG or JPEG image")]
    UnsupportedType { name: String },

    #[error("{name} skipped: at most 5 images")]
    LimitReached { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemixError {
    #[error("Add at least one reference image first")]
    NoImages,

    #[error("A video is already being generated")]
    AlreadyGenerating,

    #[error("Sign in to generate videos")]
    NotSignedIn,
}

// ============================================================================
// Files
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    /// Display name; also what the history remembers.
    pub name: String,
    pub size: u64,
    pub format: Option<ImageFormat>,
}

impl ReferenceFile {
    pub fn new(name: impl Into<String>, size: u64, mime: &str) -> Self {
        Self {
            name: name.into(),
            size,
            format: ImageFormat::from_mime(mime),
        }
    }

    /// Describe a file on disk; the type comes from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            size: meta.len(),
            format: ImageFormat::from_extension(path),
        })
    }
}

/// An accepted reference image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub id: u64,
    pub name: String,
    pub format: ImageFormat,
}

// ============================================================================
// Draft
// ============================================================================

/// Completion of a mock generation.
#[derive(Debug)]
pub struct RemixGenerated {
    pub generation: u64,
    pub result: Result<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
    Done { preview: String },
    Failed(String),
}

#[derive(Debug)]
pub struct RemixDraft {
    title: String,
    images: Vec<ReferenceImage>,
    next_id: u64,
    state: GenerationState,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl RemixDraft {
    /// Start a draft for `title`, or the default video when none was given.
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            images: Vec::new(),
            next_id: 1,
            state: GenerationState::Idle,
            generation: 0,
            handle: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        self.state == GenerationState::Generating
    }

    /// Accept files in order until the draft is full.
    ///
    /// Oversized, non-image and over-limit files are skipped; each skip is
    /// reported.
    pub fn add_files<I>(&mut self, files: I) -> Vec<UploadRejection>
    where
        I: IntoIterator<Item = ReferenceFile>,
    {
        let mut rejected = Vec::new();
        for file in files {
            if self.images.len() >= MAX_IMAGES {
                rejected.push(UploadRejection::LimitReached { name: file.name });
                continue;
            }
            let Some(format) = file.format else {
                rejected.push(UploadRejection::UnsupportedType { name: file.name });
                continue;
            };
            if file.size > MAX_IMAGE_BYTES {
                rejected.push(UploadRejection::TooLarge {
                    name: file.name,
                    size: file.size,
                });
                continue;
            }
            tracing::debug!(name = %file.name, "Reference image added");
            self.images.push(ReferenceImage {
                id: self.next_id,
                name: file.name,
                format,
            });
            self.next_id += 1;
        }
        if !rejected.is_empty() {
            tracing::debug!(count = rejected.len(), "Reference images rejected");
        }
        rejected
    }

    pub fn remove_image(&mut self, id: u64) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != id);
        self.images.len() != before
    }

    /// Check the preconditions for generating and mark the draft busy.
    ///
    /// Returns the generation number the result must carry.
    pub fn begin_generate(&mut self, session: &SessionContext) -> Result<u64, RemixError> {
        if !session.is_authenticated() {
            return Err(RemixError::NotSignedIn);
        }
        if self.is_generating() {
            return Err(RemixError::AlreadyGenerating);
        }
        if self.images.is_empty() {
            return Err(RemixError::NoImages);
        }
        self.generation += 1;
        self.state = GenerationState::Generating;
        tracing::info!(title = %self.title, images = self.images.len(), "Generating remix");
        Ok(self.generation)
    }

    /// `begin_generate`, then run the mock generation on a task.
    pub fn start_generate<E>(
        &mut self,
        session: &SessionContext,
        tx: &mpsc::Sender<E>,
    ) -> Result<(), RemixError>
    where
        E: From<RemixGenerated> + Send + 'static,
    {
        let generation = self.begin_generate(session)?;
        let tx = tx.clone();
        self.handle = Some(tokio::spawn(async move {
            let result = catch_task_panic(async {
                tokio::time::sleep(GENERATION_TIME).await;
                PREVIEW_REF.to_string()
            })
            .await;
            if let Err(e) = tx.send(E::from(RemixGenerated { generation, result })).await {
                tracing::warn!(error = %e, event = "RemixGenerated", "Channel send failed (receiver dropped)");
            }
        }));
        Ok(())
    }

    /// Apply a generation result.
    ///
    /// On success returns the reference names used, most recent upload first,
    /// for the history. Stale results return `None`.
    pub fn handle_generated(&mut self, done: RemixGenerated) -> Option<Vec<String>> {
        if done.generation != self.generation || !self.is_generating() {
            tracing::debug!(generation = done.generation, "Ignoring stale remix result");
            return None;
        }
        self.handle = None;
        match done.result {
            Ok(preview) => {
                self.state = GenerationState::Done { preview };
                Some(self.images.iter().rev().map(|i| i.name.clone()).collect())
            }
            Err(e) => {
                tracing::error!(error = %e, "Remix generation failed");
                self.state = GenerationState::Failed(e);
                None
            }
        }
    }
}

impl Drop for RemixDraft {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
