//! `tessera render`: render one mirrored component variant.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use tessera_core::{RenderEngineKind, SourceConfig, TesseraConfig};
use tessera_render::{
    load_component, load_shared, render_preview, CliEngine, RenderEngine, TeraEngine,
};

use super::load_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    Tera,
    Cli,
}

impl From<EngineArg> for RenderEngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Tera => RenderEngineKind::Tera,
            EngineArg::Cli => RenderEngineKind::Cli,
        }
    }
}

/// Arguments for `tessera render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Component directory, absolute or relative to the mirror root.
    pub component: PathBuf,

    /// Variant name (the default variant when omitted).
    #[arg(long)]
    pub variant: Option<String>,

    /// Rendering engine; overrides `render.engine` from the configuration.
    #[arg(long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Wrap the output in the component's preview template.
    #[arg(long)]
    pub preview: bool,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Mirror root directory.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let root = self.root.clone().or_else(|| config.mirror_root.clone());

        let dir = match &root {
            Some(root) if !self.component.is_dir() => root.join(&self.component),
            _ => self.component.clone(),
        };
        let component = load_component(&dir, self.variant.as_deref())
            .with_context(|| format!("failed to load component '{}'", dir.display()))?;

        let shared = match &root {
            Some(root) => load_shared(root).context("failed to read shared context")?,
            None => None,
        };
        let request = component.request(shared.as_ref())?;

        let kind = self
            .engine
            .map(RenderEngineKind::from)
            .unwrap_or(config.render.engine);
        let engine = build_engine(kind, &config)?;
        let mut output = engine
            .render(&request)
            .with_context(|| format!("failed to render '{}'", dir.display()))?;

        if self.preview {
            match component.preview(&config.preview_extension)? {
                Some(preview) => output = render_preview(&*engine, &preview, &output, &request)?,
                None => bail!("component '{}' has no preview template", dir.display()),
            }
        }

        println!("{output}");
        Ok(())
    }
}

fn build_engine(kind: RenderEngineKind, config: &TesseraConfig) -> Result<Box<dyn RenderEngine>> {
    Ok(match kind {
        RenderEngineKind::Tera => Box::new(TeraEngine::new()),
        RenderEngineKind::Cli => {
            if let Some(program) = &config.render.program {
                Box::new(CliEngine::new(program, config.render.args.iter().cloned()))
            } else if let Some(SourceConfig::Typo3 { root }) = &config.source {
                Box::new(CliEngine::typo3(root).context("failed to set up TYPO3 render engine")?)
            } else {
                bail!("the cli engine needs `render.program` or a typo3 source in tessera.yaml")
            }
        }
    })
}
