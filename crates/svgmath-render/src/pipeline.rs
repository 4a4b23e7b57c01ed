use crate::{
    Error, Invocation, ProcessRunner, RenderConfig, Result, SearchPath, Tool, ToolProbe,
    ToolRunner, Toolchain,
};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use svgmath_core::svgdom::fmt_number;
use svgmath_core::{DisplayMode, RenderRequest, RenderResult};

const TEX_FILE: &str = "equation.tex";
const PDF_FILE: &str = "equation.pdf";
const SVG_FILE: &str = "equation.svg";

/// Renders [`RenderRequest`]s through the external toolchain.
///
/// Every call gets its own scratch directory, removed when the call returns (on success or
/// failure), so one `Renderer` can be shared across threads.
pub struct Renderer {
    config: RenderConfig,
    toolchain: Toolchain,
    runner: Arc<dyn ToolRunner>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("toolchain", &self.toolchain)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Locates the binaries on `PATH` and runs them as child processes.
    pub fn new(config: RenderConfig) -> Result<Self> {
        Self::with_collaborators(config, &SearchPath::from_env(), Arc::new(ProcessRunner))
    }

    pub fn with_collaborators(
        config: RenderConfig,
        probe: &dyn ToolProbe,
        runner: Arc<dyn ToolRunner>,
    ) -> Result<Self> {
        let toolchain = Toolchain::resolve(&config, probe)?;
        Ok(Self {
            config,
            toolchain,
            runner,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderResult> {
        self.render_with_x_height(request, None)
    }

    /// Like [`Renderer::render`], but scales by `x_height` instead of the measured value.
    pub fn render_with_x_height(
        &self,
        request: &RenderRequest,
        x_height: Option<f64>,
    ) -> Result<RenderResult> {
        self.render_with_rng(request, x_height, &mut rand::thread_rng())
    }

    pub fn render_with_rng<R: Rng + ?Sized>(
        &self,
        request: &RenderRequest,
        x_height: Option<f64>,
        rng: &mut R,
    ) -> Result<RenderResult> {
        let svg = self.typeset(request)?;
        let result = svgmath_core::extract_with_rng(&svg, request.mode, x_height, rng)?;
        tracing::info!(
            mode = %request.mode,
            width = result.width,
            height = result.height,
            x_height = result.x_height,
            "rendered equation"
        );
        Ok(result)
    }

    /// Runs the toolchain and returns the raw, unprocessed SVG document.
    pub fn typeset(&self, request: &RenderRequest) -> Result<String> {
        let workdir = self.scratch_dir()?;
        let dir = workdir.path();
        tracing::debug!(workdir = %dir.display(), mode = %request.mode, "typesetting");

        let tex = dir.join(TEX_FILE);
        let pdf = dir.join(PDF_FILE);
        let svg = dir.join(SVG_FILE);
        std::fs::write(&tex, svgmath_core::synthesize(request))?;

        self.run(
            self.invocation(Tool::Xelatex, dir)
                .arg("-output-directory")
                .path_arg(dir)
                .arg("-halt-on-error")
                .path_arg(&tex),
        )?;
        expect_output(Tool::Xelatex, &pdf)?;

        if request.mode == DisplayMode::Display {
            self.run(
                self.invocation(Tool::Pdfcrop, dir)
                    .arg("-margins")
                    .arg(fmt_number(self.config.crop_margin))
                    .path_arg(&pdf)
                    .path_arg(&pdf),
            )?;
            expect_output(Tool::Pdfcrop, &pdf)?;
        }

        self.run(self.invocation(Tool::Pdf2svg, dir).path_arg(&pdf).path_arg(&svg))?;
        expect_output(Tool::Pdf2svg, &svg)?;

        Ok(std::fs::read_to_string(&svg)?)
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("svgmath-");
        Ok(match &self.config.workdir_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        })
    }

    fn invocation(&self, tool: Tool, workdir: &Path) -> Invocation {
        Invocation::new(tool, self.toolchain.path(tool), workdir)
    }

    fn run(&self, invocation: Invocation) -> Result<()> {
        tracing::debug!(
            tool = %invocation.tool,
            program = %invocation.program.display(),
            args = ?invocation.args,
            "running"
        );
        self.runner.run(&invocation).map_err(|source| {
            tracing::warn!(tool = %invocation.tool, error = %source, "tool failed");
            Error::RenderFailed {
                tool: invocation.tool,
                source,
            }
        })
    }
}

fn expect_output(tool: Tool, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingOutput {
            tool,
            path: PathBuf::from(path),
        })
    }
}
