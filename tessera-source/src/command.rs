//! Subprocess descriptor source.
//!
//! Runs a command and parses its stdout as the descriptor list. The TYPO3
//! preset invokes the extbase `component:discover` command of an instance.

use std::path::{Path, PathBuf};
use std::process::Command;

use tessera_core::{ComponentDescriptor, SharedContext};

use crate::error::{io_err, SourceError};
use crate::{parse_descriptors, DescriptorSource};

/// TYPO3 CLI dispatcher, relative to the instance root.
pub const TYPO3_DISPATCHER: &str = "typo3/cli_dispatch.phpsh";

#[derive(Debug, Clone)]
pub struct CliSource {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    /// Reported as the source identity; defaults to the command line.
    location: Option<String>,
}

impl CliSource {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            working_dir: None,
            location: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// `php <root>/typo3/cli_dispatch.phpsh extbase component:discover`.
    ///
    /// Fails with [`SourceError::NotFound`] when the dispatcher script is
    /// missing. The identity is the canonicalized instance root.
    pub fn typo3(root: &Path) -> Result<Self, SourceError> {
        let dispatcher = root.join(TYPO3_DISPATCHER);
        if !dispatcher.is_file() {
            return Err(SourceError::NotFound { path: dispatcher });
        }
        let root = root.canonicalize().map_err(|e| io_err(root, e))?;
        let dispatcher = root.join(TYPO3_DISPATCHER);
        let mut source = Self::new(
            "php",
            [
                dispatcher.to_string_lossy().into_owned(),
                "extbase".to_owned(),
                "component:discover".to_owned(),
            ],
        );
        source.location = Some(root.to_string_lossy().into_owned());
        Ok(source.working_dir(root))
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl DescriptorSource for CliSource {
    fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("running `{}`", self.command_line());
        let output = cmd.output().map_err(|e| SourceError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_descriptors(&self.command_line(), &output.stdout)
    }

    fn identity(&self) -> SharedContext {
        SharedContext {
            source: self
                .location
                .clone()
                .unwrap_or_else(|| self.command_line()),
            source_kind: "cli".to_owned(),
        }
    }
}
