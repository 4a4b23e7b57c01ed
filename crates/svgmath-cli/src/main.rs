use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use svgmath::preview::{Fragment, PreviewPage};
use svgmath::render::{RenderConfig, Renderer, Tool};
use svgmath::{DisplayMode, RenderRequest, RenderResult};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const LOG_ENV: &str = "SVGMATH_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    BadArgument(String),
    Io(std::io::Error),
    Core(svgmath::Error),
    Render(svgmath::render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::BadArgument(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::BadArgument(_) => 2,
            CliError::Render(svgmath::render::Error::Configuration { .. })
            | CliError::Render(svgmath::render::Error::Config { .. }) => 3,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<svgmath::Error> for CliError {
    fn from(value: svgmath::Error) -> Self {
        Self::Core(value)
    }
}

impl From<svgmath::render::Error> for CliError {
    fn from(value: svgmath::render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    Tex,
    Extract,
    #[default]
    Render,
    Check,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Json,
    Svg,
    Html,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "svg" => Ok(Self::Svg),
            "html" => Ok(Self::Html),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    equation: Option<String>,
    mode: DisplayMode,
    font: Option<String>,
    font_size: Option<u32>,
    preamble: Vec<String>,
    x_height: Option<f64>,
    format: OutputFormat,
    config: Option<String>,
    out: Option<String>,
    pretty: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct ToolOut<'a> {
    tool: Tool,
    program: &'a str,
    path: String,
}

fn usage() -> &'static str {
    "svgmath-cli\n\
\n\
USAGE:\n\
  svgmath-cli tex [--mode inline|display] [--font <family>] [--font-size <pt>] [--preamble <line>]... [--equation <latex>|<path>|-]\n\
  svgmath-cli extract [--mode inline|display] [--x-height <pt>] [--format json|svg] [--pretty] [--out <path>] [<path>|-]\n\
  svgmath-cli [render] [--config <path>] [--mode inline|display] [--font <family>] [--font-size <pt>] [--preamble <line>]... [--x-height <pt>] [--format json|svg|html] [--pretty] [--out <path>] [--equation <latex>|<path>|-]\n\
  svgmath-cli check [--config <path>] [--pretty]\n\
\n\
OPTIONS:\n\
  -v, --verbose   log pipeline steps to stderr (or set SVGMATH_LOG=debug)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - extract expects SVG produced by pdf2svg from a document written by `tex`.\n\
  - --x-height replaces the measured x-height; use it to put several equations on one scale.\n\
  - Exit status: 2 usage, 3 missing binaries or bad configuration, 1 anything else.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "tex" => args.command = Command::Tex,
            "extract" => args.command = Command::Extract,
            "render" => args.command = Command::Render,
            "check" => args.command = Command::Check,
            "--pretty" => args.pretty = true,
            "-v" | "--verbose" => args.verbose = true,
            "--mode" => {
                let mode = next_value(&mut it)?;
                args.mode = mode
                    .parse::<DisplayMode>()
                    .map_err(|e| CliError::BadArgument(e.to_string()))?;
            }
            "--font" => args.font = Some(next_value(&mut it)?.clone()),
            "--font-size" => {
                let size = next_value(&mut it)?;
                let size = size.parse::<u32>().map_err(|_| {
                    CliError::BadArgument(format!("--font-size expects a point size, got `{size}`"))
                })?;
                if size == 0 {
                    return Err(CliError::BadArgument(
                        "--font-size must be greater than zero".to_string(),
                    ));
                }
                args.font_size = Some(size);
            }
            "--preamble" => args.preamble.push(next_value(&mut it)?.clone()),
            "--x-height" => {
                let xh = next_value(&mut it)?;
                let xh = xh.parse::<f64>().map_err(|_| {
                    CliError::BadArgument(format!("--x-height expects a number, got `{xh}`"))
                })?;
                if !(xh.is_finite() && xh > 0.0) {
                    return Err(CliError::BadArgument(
                        "--x-height must be a positive number".to_string(),
                    ));
                }
                args.x_height = Some(xh);
            }
            "--format" => {
                args.format = next_value(&mut it)?
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--equation" | "-e" => args.equation = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.command == Command::Extract && args.format == OutputFormat::Html {
        return Err(CliError::BadArgument(
            "extract supports --format json|svg".to_string(),
        ));
    }
    if args.equation.is_some() && args.input.is_some() {
        return Err(CliError::BadArgument(
            "pass either --equation or an input path, not both".to_string(),
        ));
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_equation(args: &Args) -> Result<String, CliError> {
    let text = match &args.equation {
        Some(eq) => eq.clone(),
        None => read_input(args.input.as_deref())?,
    };
    let text = text.trim_end_matches(['\n', '\r']).to_string();
    if text.trim().is_empty() {
        return Err(CliError::BadArgument("empty equation".to_string()));
    }
    Ok(text)
}

fn build_request(args: &Args, equation: String) -> RenderRequest {
    let mut request = RenderRequest::new(equation, args.mode).with_preamble(args.preamble.clone());
    if let Some(font) = &args.font {
        request = request.with_font_family(font.clone());
    }
    if let Some(size) = args.font_size {
        request = request.with_font_size(size);
    }
    request
}

fn load_config(path: Option<&str>) -> Result<RenderConfig, CliError> {
    Ok(match path {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    })
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String, CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    Ok(text)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn format_result(
    result: &RenderResult,
    mode: DisplayMode,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => to_json(result, pretty),
        OutputFormat::Svg => Ok(format!("{}\n", result.svg_markup)),
        OutputFormat::Html => {
            let mut page = PreviewPage::new();
            match mode {
                DisplayMode::Inline => {
                    page.push_paragraph([Fragment::math(result)]);
                }
                DisplayMode::Display => {
                    page.push_display(result);
                }
            }
            Ok(page.to_html())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Tex => {
            let equation = read_equation(&args)?;
            let tex = svgmath::synthesize(&build_request(&args, equation));
            write_text(&format!("{tex}\n"), args.out.as_deref())
        }
        Command::Extract => {
            let svg = read_input(args.input.as_deref())?;
            let result = svgmath::extract(&svg, args.mode, args.x_height)?;
            let text = format_result(&result, args.mode, args.format, args.pretty)?;
            write_text(&text, args.out.as_deref())
        }
        Command::Render => {
            let config = load_config(args.config.as_deref())?;
            let renderer = Renderer::new(config)?;
            let equation = read_equation(&args)?;
            let request = build_request(&args, equation);
            let result = renderer.render_with_x_height(&request, args.x_height)?;
            let text = format_result(&result, args.mode, args.format, args.pretty)?;
            write_text(&text, args.out.as_deref())
        }
        Command::Check => {
            let config = load_config(args.config.as_deref())?;
            let renderer = Renderer::new(config)?;
            let tools: Vec<ToolOut<'_>> = Tool::ALL
                .into_iter()
                .map(|tool| ToolOut {
                    tool,
                    program: renderer.config().program(tool),
                    path: renderer.toolchain().path(tool).display().to_string(),
                })
                .collect();
            if args.pretty {
                write_text(&to_json(&tools, true)?, args.out.as_deref())
            } else {
                let text: String = tools
                    .iter()
                    .map(|t| format!("{}\t{}\n", t.tool, t.path))
                    .collect();
                write_text(&text, args.out.as_deref())
            }
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    };

    init_logging(args.verbose);

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
