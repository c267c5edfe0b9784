//! # tessera-source
//!
//! Where component descriptors come from. A [`DescriptorSource`] is resolved
//! once, before a pass starts, and asked for the full descriptor list in one
//! call; nothing downstream runs until the list has been fetched and parsed.
//!
//! | Source          | Transport                                            |
//! |-----------------|------------------------------------------------------|
//! | [`CliSource`]   | subprocess, JSON array on stdout                     |
//! | [`HttpSource`]  | HTTP GET, JSON array body                            |
//! | [`FileSource`]  | JSON array read from disk                            |

pub mod command;
pub mod error;
pub mod file;
pub mod http;

use std::time::Duration;

use tessera_core::{ComponentDescriptor, SharedContext, SourceConfig};

pub use command::CliSource;
pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;

/// Capability that produces the descriptor list for one pass.
pub trait DescriptorSource {
    /// Fetch and parse every descriptor.
    fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError>;

    /// Identity recorded in the mirror's shared context file.
    fn identity(&self) -> SharedContext;
}

impl<S: DescriptorSource + ?Sized> DescriptorSource for Box<S> {
    fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
        (**self).fetch()
    }

    fn identity(&self) -> SharedContext {
        (**self).identity()
    }
}

/// Parse a raw payload that must be a JSON array of descriptors.
pub fn parse_descriptors(
    origin: &str,
    payload: &[u8],
) -> Result<Vec<ComponentDescriptor>, SourceError> {
    serde_json::from_slice(payload).map_err(|e| SourceError::Malformed {
        origin: origin.to_owned(),
        source: e,
    })
}

/// Build the configured source.
pub fn source_from_config(
    config: &SourceConfig,
) -> Result<Box<dyn DescriptorSource>, SourceError> {
    Ok(match config {
        SourceConfig::Typo3 { root } => Box::new(CliSource::typo3(root)?),
        SourceConfig::Cli {
            program,
            args,
            working_dir,
        } => {
            let mut source = CliSource::new(program, args.iter().cloned());
            if let Some(dir) = working_dir {
                source = source.working_dir(dir);
            }
            Box::new(source)
        }
        SourceConfig::Http { url, timeout_secs } => {
            let mut source = HttpSource::new(url);
            if let Some(secs) = timeout_secs {
                source = source.timeout(Duration::from_secs(*secs));
            }
            Box::new(source)
        }
        SourceConfig::File { path } => Box::new(FileSource::new(path)),
    })
}
