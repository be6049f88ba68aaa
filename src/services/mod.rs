//! Services module - Pure business logic for the export pipeline.
//!
//! Each service owns one stage of a run and has no dependency on how
//! the run is presented. The orchestrator wires them together:
//!
//! - [`VariantSpace`]: lazy enumeration of the configured design space
//! - [`ExportLoop`]: drives a [`ModelEngine`] across the space, skipping
//!   existing output and tallying generated/skipped counts
//! - [`AnimationAssembler`]: turns preview screenshots into looping GIFs
//! - [`ArchivePackager`]: packages meshes into per-height ZIP archives
//!   or stages the upload-worthy subset
//!
//! [`naming`] holds the file and folder name templates every stage
//! shares; stable names are what make re-runs idempotent.

pub mod animation;
pub mod archive;
pub mod engine;
pub mod export_loop;
pub mod naming;
pub mod variants;

pub use animation::{AnimationAssembler, AnimationError};
pub use archive::{ArchiveError, ArchivePackager};
pub use engine::{DetachedEngine, ModelEngine, VariantParameters};
pub use export_loop::{ExportError, ExportLoop};
pub use variants::{Variant, VariantSpace};
