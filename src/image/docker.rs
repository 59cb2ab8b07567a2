//! Container engine CLI wrapper.

use crate::error::{AcquisitionErrorKind, ImageDiffError, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs `save` and `pull` through a docker-compatible CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Write the image to a `docker save` archive.
    pub fn save(&self, image: &str, archive: &Path) -> Result<()> {
        self.run(&[
            OsStr::new("save"),
            OsStr::new(image),
            OsStr::new("-o"),
            archive.as_os_str(),
        ])
    }

    /// Pull a registry reference into the local image store.
    pub fn pull(&self, reference: &str) -> Result<()> {
        self.run(&[OsStr::new("pull"), OsStr::new(reference)])
    }

    fn run(&self, args: &[&OsStr]) -> Result<()> {
        let command = std::iter::once(self.binary.as_str())
            .chain(args.iter().map(|a| a.to_str().unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ");
        debug!("Running `{command}`");

        let output = Command::new(&self.binary).args(args).output().map_err(|e| {
            ImageDiffError::acquisition(
                format!("starting {}", self.binary),
                AcquisitionErrorKind::CommandFailed {
                    command: command.clone(),
                    status: "no exit status".to_string(),
                    stderr: e.to_string(),
                },
            )
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ImageDiffError::acquisition(
                format!("running {}", self.binary),
                AcquisitionErrorKind::CommandFailed {
                    command,
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
            ))
        }
    }
}
