//! Animation blocks → video clips via Manim.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ConvertError, ConvertRequest, Converter, diagnostic_tail, run_tool};

/// Indentation of scene code inside `construct`.
const BODY_INDENT: &str = "        ";

/// Configuration for the Manim converter.
#[derive(Debug, Clone)]
pub struct ManimConfig {
    /// The `manim` executable.
    pub program: String,
    /// Quality flag passed to `manim render` (`-ql` renders fast, at 480p).
    pub quality_flag: String,
    /// Camera background color set at the top of every scene.
    pub background_color: String,
    /// Scene class names are `<prefix>_<index>`.
    pub class_prefix: String,
    /// Extension of the clip Manim writes.
    pub video_extension: String,
}

impl Default for ManimConfig {
    fn default() -> Self {
        Self {
            program: "manim".to_string(),
            quality_flag: "-ql".to_string(),
            background_color: "WHITE".to_string(),
            class_prefix: "PandoraScene".to_string(),
            video_extension: "mp4".to_string(),
        }
    }
}

/// Renders one scene per call.
///
/// Every call writes its own `scene_<index>.py` with a uniquely named scene
/// class into the request's work directory and renders it with caching
/// disabled, so no two blocks can share Manim's cache or output folders.
pub struct ManimConverter {
    config: ManimConfig,
}

impl ManimConverter {
    /// Create a new converter with default configuration.
    pub fn new() -> Self {
        Self {
            config: ManimConfig::default(),
        }
    }

    /// Configure the converter with custom settings.
    pub fn with_config(mut self, config: ManimConfig) -> Self {
        self.config = config;
        self
    }

    /// Scene class name for the block at `index`.
    pub fn class_name(&self, index: usize) -> String {
        format!("{}_{}", self.config.class_prefix, index)
    }

    /// Python module holding the scene for the block at `index`.
    pub fn scene_source(&self, index: usize, code: &str) -> String {
        let mut body: Vec<String> = code
            .trim()
            .lines()
            .map(|line| format!("{BODY_INDENT}{line}"))
            .collect();
        if body.is_empty() {
            body.push(format!("{BODY_INDENT}pass"));
        }

        format!(
            "from manim import *\n\nclass {}(Scene):\n    def construct(self):\n{BODY_INDENT}self.camera.background_color = \"{}\"\n{}\n",
            self.class_name(index),
            self.config.background_color,
            body.join("\n")
        )
    }

    /// First clip with the configured extension under `dir`, in file-name
    /// order.
    fn find_video(&self, dir: &Path) -> Option<PathBuf> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .find(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config.video_extension))
            })
    }
}

impl Default for ManimConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for ManimConverter {
    fn name(&self) -> &str {
        "Manim"
    }

    fn convert(&self, request: &ConvertRequest<'_>) -> Result<PathBuf, ConvertError> {
        let workdir = request.workdir;
        fs::create_dir_all(workdir)?;

        let scene_file = format!("scene_{}.py", request.index);
        fs::write(
            workdir.join(&scene_file),
            self.scene_source(request.index, request.source),
        )?;

        let class_name = self.class_name(request.index);
        let output_name = format!("scene_{}.{}", request.index, self.config.video_extension);
        let output = run_tool(
            &self.config.program,
            &[
                "render",
                &scene_file,
                &class_name,
                &self.config.quality_flag,
                "--disable_caching",
                "-o",
                &output_name,
            ],
            workdir,
        )?;

        self.find_video(workdir)
            .ok_or_else(|| ConvertError::MissingOutput {
                tool: self.config.program.clone(),
                diagnostic: diagnostic_tail(&output),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_source_layout() {
        let converter = ManimConverter::new();
        let source = converter.scene_source(3, "c = Circle()\nself.play(Create(c))\n");

        assert_eq!(
            source,
            "from manim import *\n\
             \n\
             class PandoraScene_3(Scene):\n    \
             def construct(self):\n        \
             self.camera.background_color = \"WHITE\"\n        \
             c = Circle()\n        \
             self.play(Create(c))\n"
        );
    }

    #[test]
    fn test_empty_scene_gets_pass() {
        let source = ManimConverter::new().scene_source(0, "   ");
        assert!(source.ends_with("\n        pass\n"));
    }

    #[test]
    fn test_class_names_are_unique_per_index() {
        let converter = ManimConverter::new().with_config(ManimConfig {
            class_prefix: "Deck".to_string(),
            ..ManimConfig::default()
        });
        assert_eq!(converter.class_name(0), "Deck_0");
        assert_ne!(converter.class_name(1), converter.class_name(10));
    }

    #[test]
    fn test_find_video_searches_recursively() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("media/videos/scene_2/480p15");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("scene_2.mp4"), b"clip").unwrap();
        fs::write(dir.path().join("scene_2.py"), b"code").unwrap();

        let found = ManimConverter::new().find_video(dir.path()).unwrap();
        assert_eq!(found, nested.join("scene_2.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_without_output_is_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let converter = ManimConverter::new().with_config(ManimConfig {
            program: "true".to_string(),
            ..ManimConfig::default()
        });
        let workdir = dir.path().join("scene_1");
        let request = ConvertRequest {
            index: 1,
            source: "self.wait()",
            workdir: &workdir,
            output: &workdir.join("scene_1.mp4"),
        };

        let err = converter.convert(&request).unwrap_err();
        assert!(matches!(err, ConvertError::MissingOutput { .. }), "{err:?}");
        assert!(workdir.join("scene_1.py").is_file());
    }
}
