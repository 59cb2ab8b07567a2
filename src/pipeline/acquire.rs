//! Image acquisition and snapshot stage.
//!
//! Prepares an image and reduces it to the snapshot the chosen differ needs.

use super::PipelineError;
use crate::diff::{DiffInput, DiffKind};
use crate::error::ErrorContext;
use crate::image::{Image, ImagePrepper};
use crate::packages::extractor_for;
use anyhow::Result;

/// Prepare one image, attributing any failure to its source.
pub fn acquire_image(prepper: &ImagePrepper, source: &str, quiet: bool) -> Result<Image> {
    if !quiet {
        tracing::info!("Preparing image: {source}");
    }
    prepper.prepare(source).map_err(|e| {
        PipelineError::AcquisitionFailed {
            image: source.to_string(),
            source: e.into(),
        }
        .into()
    })
}

/// Reduce a prepared image to the input of the differ for `kind`.
pub fn snapshot(kind: DiffKind, image: &Image) -> Result<DiffInput> {
    let label = image.source.clone();
    let input = match kind {
        DiffKind::History => DiffInput::history(label, image.history.clone()),
        DiffKind::Filesystem => DiffInput::directory(label, image.directory()?),
        DiffKind::Apt | DiffKind::Node => {
            let extractor = extractor_for(kind)
                .ok_or_else(|| anyhow::anyhow!("no package extractor for {kind}"))?;
            let packages = extractor
                .extract(image)
                .with_context(|| format!("{} packages of {}", extractor.name(), image.source))?;
            tracing::debug!(
                "Extracted {} {} packages from {}",
                packages.len(),
                extractor.name(),
                image.source
            );
            DiffInput::packages(label, packages)
        }
    };
    Ok(input)
}
