//! Rendering engines.
//!
//! | Engine        | How                                                             |
//! |---------------|-----------------------------------------------------------------|
//! | [`TeraEngine`] | renders the raw template string against the context in-process |
//! | [`CliEngine`]  | `<program> <args..> component:render <context.component>`       |

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tera::{Context, Tera};

use crate::error::{io_err, RenderError};

/// TYPO3 CLI dispatcher, relative to the instance root.
pub const TYPO3_DISPATCHER: &str = "typo3/cli_dispatch.phpsh";

/// Everything an engine needs to render one component variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Component path identifier, e.g. `atoms/button`.
    pub component: String,
    /// Raw template content as mirrored.
    pub template: String,
    /// Merged render context (must be a JSON object).
    pub context: Value,
}

pub trait RenderEngine {
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError>;
}

impl<E: RenderEngine + ?Sized> RenderEngine for Box<E> {
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        (**self).render(request)
    }
}

// ---------------------------------------------------------------------------
// TeraEngine
// ---------------------------------------------------------------------------

/// In-process engine: the template string is a Tera template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine {
    autoescape: bool,
}

impl TeraEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML-escape interpolated values.
    pub fn autoescape(mut self, on: bool) -> Self {
        self.autoescape = on;
        self
    }
}

impl RenderEngine for TeraEngine {
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let context = Context::from_value(request.context.clone())?;
        tracing::debug!("rendering {} with tera", request.component);
        Ok(Tera::one_off(&request.template, &context, self.autoescape)?)
    }
}

/// Wrap rendered component markup in its preview template. The preview sees
/// the same context plus `yield`, holding the rendered component.
pub fn render_preview<E: RenderEngine + ?Sized>(
    engine: &E,
    preview: &str,
    rendered: &str,
    request: &RenderRequest,
) -> Result<String, RenderError> {
    let mut context = request.context.clone();
    if let Value::Object(map) = &mut context {
        map.insert("yield".to_owned(), Value::String(rendered.to_owned()));
    }
    engine.render(&RenderRequest {
        component: format!("{}-preview", request.component),
        template: preview.to_owned(),
        context,
    })
}

// ---------------------------------------------------------------------------
// CliEngine
// ---------------------------------------------------------------------------

/// Delegates rendering to an external command. The template string is not
/// passed; the command renders the component by its identifier.
#[derive(Debug, Clone)]
pub struct CliEngine {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CliEngine {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            working_dir: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// `php <root>/typo3/cli_dispatch.phpsh extbase component:render <id>`.
    pub fn typo3(root: &Path) -> Result<Self, RenderError> {
        let root = root.canonicalize().map_err(|e| io_err(root, e))?;
        let dispatcher = root.join(TYPO3_DISPATCHER);
        if !dispatcher.is_file() {
            return Err(io_err(
                &dispatcher,
                std::io::Error::new(std::io::ErrorKind::NotFound, "dispatcher script missing"),
            ));
        }
        let engine = Self::new(
            "php",
            [
                dispatcher.to_string_lossy().into_owned(),
                "extbase".to_owned(),
            ],
        );
        Ok(engine.working_dir(root))
    }
}

impl RenderEngine for CliEngine {
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let component = request
            .context
            .get("component")
            .and_then(Value::as_str)
            .ok_or(RenderError::MissingComponent)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg("component:render").arg(component);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("rendering {} via `{}`", request.component, self.program);
        let output = cmd.output().map_err(|e| RenderError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;
        if !output.status.success() {
            return Err(RenderError::CommandFailed {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
