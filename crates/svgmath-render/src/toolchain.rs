use crate::{Error, RenderConfig, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Xelatex,
    Pdfcrop,
    Pdf2svg,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Xelatex, Tool::Pdfcrop, Tool::Pdf2svg];

    pub fn name(self) -> &'static str {
        match self {
            Self::Xelatex => "xelatex",
            Self::Pdfcrop => "pdfcrop",
            Self::Pdf2svg => "pdf2svg",
        }
    }

    pub fn install_hint(self) -> &'static str {
        match self {
            Self::Xelatex => {
                "Please install xelatex and the standalone class (apt-get install texlive-xetex texlive-latex-extra)."
            }
            Self::Pdfcrop => "pdfcrop ships with TeX Live (apt-get install texlive-extra-utils).",
            Self::Pdf2svg => "Please install pdf2svg (apt-get/yum/brew install pdf2svg).",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Answers "where is this binary?" so that availability checks can be faked in tests.
pub trait ToolProbe {
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Looks programs up the way a shell would: paths are checked directly, bare names are searched
/// in a `PATH`-style list.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    path: Option<OsString>,
}

impl SearchPath {
    pub fn new(path: impl Into<OsString>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("PATH"),
        }
    }
}

impl ToolProbe for SearchPath {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.is_absolute() || candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }

        let path = self.path.as_ref()?;
        std::env::split_paths(path)
            .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
            .find(|p| is_executable(p))
    }
}

fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    let windows_exe = (cfg!(windows) && Path::new(program).extension().is_none())
        .then(|| format!("{program}.exe"));
    std::iter::once(program.to_string()).chain(windows_exe)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolved locations of every binary the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    xelatex: PathBuf,
    pdfcrop: PathBuf,
    pdf2svg: PathBuf,
}

impl Toolchain {
    /// Locates all three binaries, failing on the first one that is missing.
    ///
    /// `pdfcrop` is only used for display equations but is still required here, so a renderer
    /// that starts can serve both modes.
    pub fn resolve(config: &RenderConfig, probe: &dyn ToolProbe) -> Result<Self> {
        let locate = |tool: Tool| -> Result<PathBuf> {
            let program = config.program(tool);
            let found = probe.locate(program).ok_or_else(|| Error::Configuration {
                tool,
                program: program.to_string(),
                hint: tool.install_hint(),
            })?;
            tracing::debug!(tool = %tool, path = %found.display(), "located binary");
            Ok(found)
        };

        Ok(Self {
            xelatex: locate(Tool::Xelatex)?,
            pdfcrop: locate(Tool::Pdfcrop)?,
            pdf2svg: locate(Tool::Pdf2svg)?,
        })
    }

    pub fn path(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Xelatex => &self.xelatex,
            Tool::Pdfcrop => &self.pdfcrop,
            Tool::Pdf2svg => &self.pdf2svg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Only(&'static [&'static str]);

    impl ToolProbe for Only {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.0
                .iter()
                .any(|p| *p == program)
                .then(|| PathBuf::from("/fake/bin").join(program))
        }
    }

    #[test]
    fn resolve_finds_every_tool() {
        let tc = Toolchain::resolve(
            &RenderConfig::default(),
            &Only(&["xelatex", "pdfcrop", "pdf2svg"]),
        )
        .unwrap();
        assert_eq!(tc.path(Tool::Pdfcrop), Path::new("/fake/bin/pdfcrop"));
    }

    #[test]
    fn resolve_reports_the_missing_tool_with_a_hint() {
        let err = Toolchain::resolve(&RenderConfig::default(), &Only(&["xelatex", "pdfcrop"]))
            .unwrap_err();
        match &err {
            Error::Configuration { tool, program, .. } => {
                assert_eq!(*tool, Tool::Pdf2svg);
                assert_eq!(program, "pdf2svg");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("install pdf2svg"));
    }

    #[test]
    fn resolve_uses_configured_program_names() {
        let config = RenderConfig {
            xelatex: "xelatex-2024".to_string(),
            ..RenderConfig::default()
        };
        let err = Toolchain::resolve(&config, &Only(&["xelatex", "pdfcrop", "pdf2svg"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration {
                tool: Tool::Xelatex,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn search_path_finds_executables_only() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("pdf2svg");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        let plain = dir.path().join("pdfcrop");
        std::fs::write(&plain, "").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let probe = SearchPath::new(dir.path().as_os_str());
        assert_eq!(probe.locate("pdf2svg"), Some(exe.clone()));
        assert_eq!(probe.locate("pdfcrop"), None);
        assert_eq!(probe.locate("xelatex"), None);
        assert_eq!(probe.locate(exe.to_str().unwrap()), Some(exe));
    }

    #[test]
    fn search_path_without_path_finds_nothing() {
        assert_eq!(SearchPath::default().locate("xelatex"), None);
    }
}
