//! Extraction stage: crop (optionally perspective-correct) each
//! accepted candidate out of the source raster and persist it as an
//! independent JPEG artifact.
//!
//! Failures are isolated per candidate: a corrupt region or I/O error
//! is logged and skipped, never aborting the remaining extractions.

mod crop;
mod extractor;
mod naming;
mod order;
mod warp;

pub use extractor::{save_jpeg, ExtractError, ExtractorParams, PhotoExtractor};
pub use naming::unique_output_path;
pub use order::order_corners;
