//! LaTeX text blocks → SVG via `latex` and `dvisvgm`.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex_lite::Regex;

use super::{ConvertError, ConvertRequest, Converter, run_tool};

/// Standalone document preamble wrapped around every text block.
pub const DEFAULT_PREAMBLE: &str = r"\documentclass[preview,12pt]{standalone}

\usepackage{amsmath,amssymb,amsthm,mathtools}
\usepackage{bm}
\usepackage{physics}

\usepackage{newtxtext,newtxmath}
\usepackage{microtype}
\linespread{1.1}

\usepackage{xcolor}
\definecolor{PandoraBlue}{HTML}{1E90FF}
\definecolor{PandoraGray}{HTML}{555555}
\definecolor{PandoraAccent}{HTML}{007ACC}

\usepackage[most]{tcolorbox}
\tcbset{
  enhanced,
  colframe=PandoraAccent!80!black,
  colback=PandoraAccent!5!white,
  boxrule=0.8pt,
  arc=2pt,
  outer arc=2pt,
  left=6pt,right=6pt,top=4pt,bottom=4pt
}

\usepackage{titlesec}
\titleformat{\section}{\large\bfseries\color{PandoraAccent}}{}{0em}{}
\titleformat{\subsection}{\normalsize\bfseries\color{PandoraBlue}}{}{0em}{}

\newtcolorbox{definitionbox}{colback=PandoraAccent!5,colframe=PandoraAccent!60!black,title=\textbf{Definition}}
\newtcolorbox{examplebox}{colback=PandoraBlue!5,colframe=PandoraBlue!70!black,title=\textbf{Example}}
\newtcolorbox{questionbox}{colback=PandoraGray!5,colframe=PandoraGray!60!black,title=\textbf{Question}}
\newtcolorbox{answerbox}{colback=green!5!white,colframe=green!60!black,title=\textbf{Answer}}

\setlength{\parskip}{4pt}
\setlength{\parindent}{0pt}

\usepackage{siunitx}
\usepackage{cancel}
\usepackage{hyperref}
\hypersetup{colorlinks=true,linkcolor=PandoraAccent,urlcolor=PandoraAccent}
";

/// Document scaffolding that a block must not carry into the template.
static SCAFFOLDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\documentclass.*|\\usepackage.*|\\begin\{document\}|\\end\{document\}").unwrap()
});

const TEX_FILE: &str = "temp.tex";
const DVI_FILE: &str = "temp.dvi";

/// Configuration for the LaTeX converter.
#[derive(Debug, Clone)]
pub struct LatexConfig {
    /// Program compiling `.tex` to `.dvi`.
    pub latex_program: String,
    /// Program converting `.dvi` to `.svg`.
    pub dvisvgm_program: String,
    /// Everything that goes before `\begin{document}`.
    pub preamble: String,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            latex_program: "latex".to_string(),
            dvisvgm_program: "dvisvgm".to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

/// Typesets one block per call into a standalone SVG.
///
/// The block is stripped of document scaffolding, wrapped in the configured
/// preamble, compiled to DVI in the request's work directory, and converted
/// with `dvisvgm -n -a` (glyphs as paths, PostScript specials enabled).
pub struct LatexConverter {
    config: LatexConfig,
}

impl LatexConverter {
    /// Create a new converter with default configuration.
    pub fn new() -> Self {
        Self {
            config: LatexConfig::default(),
        }
    }

    /// Configure the converter with custom settings.
    pub fn with_config(mut self, config: LatexConfig) -> Self {
        self.config = config;
        self
    }

    /// Full standalone document for one block.
    pub fn wrap_snippet(&self, snippet: &str) -> String {
        let body = SCAFFOLDING_RE.replace_all(snippet, "");
        format!(
            "{}\n\\begin{{document}}\n{}\n\\end{{document}}\n",
            self.config.preamble.trim_end(),
            body.trim()
        )
    }
}

impl Default for LatexConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for LatexConverter {
    fn name(&self) -> &str {
        "LaTeX"
    }

    fn convert(&self, request: &ConvertRequest<'_>) -> Result<PathBuf, ConvertError> {
        let workdir = request.workdir;
        fs::create_dir_all(workdir)?;
        fs::write(workdir.join(TEX_FILE), self.wrap_snippet(request.source))?;

        run_tool(
            &self.config.latex_program,
            &["-interaction=nonstopmode", TEX_FILE],
            workdir,
        )?;

        if let Some(parent) = request.output.parent() {
            fs::create_dir_all(parent)?;
        }
        let output = request.output.to_string_lossy();
        run_tool(
            &self.config.dvisvgm_program,
            &[DVI_FILE, "-n", "-a", "-o", &output],
            workdir,
        )?;

        if !request.output.is_file() {
            return Err(ConvertError::MissingOutput {
                tool: self.config.dvisvgm_program.clone(),
                diagnostic: String::new(),
            });
        }
        Ok(request.output.to_path_buf())
    }
}
