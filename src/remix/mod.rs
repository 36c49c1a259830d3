//! Remix workflow: reference-image draft rules and the recent-references list.

mod draft;
mod history;

pub use draft::{
    GenerationState, ImageFormat, ReferenceFile, ReferenceImage, RemixDraft, RemixError,
    RemixGenerated, UploadRejection, DEFAULT_TITLE, GENERATION_TIME, MAX_IMAGES, MAX_IMAGE_BYTES,
};
pub use history::{ReferenceHistory, HISTORY_KEY};
