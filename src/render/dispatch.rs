//! Element-by-element rendering into a staging directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::model::{Artifact, Element, MediaRef};

use super::{ConvertError, ConvertRequest, Converter};

/// Scratch area under the staging root; never bundled.
pub const WORK_DIR: &str = "work";

/// Bundle paths handed out so far, with the asset each was copied from.
/// Rendered outputs have no source.
type Claims = HashMap<String, Option<PathBuf>>;

/// Walks a document's elements in order and renders each into the staging
/// directory.
///
/// Exactly one artifact comes out per element, at the element's index. A
/// failed conversion becomes an [`Artifact::Error`] in place and the walk
/// moves on.
///
/// Every artifact gets its own bundle path. When a copied asset and a
/// rendered output (or two different assets) want the same path, the later
/// one is renamed to `<stem>_<index>.<ext>`. The same asset referenced twice
/// shares one path.
pub struct Dispatcher<'a> {
    typesetter: &'a dyn Converter,
    animator: &'a dyn Converter,
    staging: &'a Path,
    asset_root: PathBuf,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher writing artifacts below `staging`.
    ///
    /// Relative media paths are resolved against the current directory
    /// unless [`with_asset_root`](Self::with_asset_root) says otherwise.
    pub fn new(
        typesetter: &'a dyn Converter,
        animator: &'a dyn Converter,
        staging: &'a Path,
    ) -> Self {
        Self {
            typesetter,
            animator,
            staging,
            asset_root: PathBuf::from("."),
        }
    }

    /// Resolve relative media paths against `root`.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Render every element, strictly in order.
    pub fn dispatch(&self, elements: &[Element]) -> Vec<Artifact> {
        let mut claims = Claims::new();
        elements
            .iter()
            .enumerate()
            .map(|(index, element)| self.dispatch_one(index, element, &mut claims))
            .collect()
    }

    fn dispatch_one(&self, index: usize, element: &Element, claims: &mut Claims) -> Artifact {
        match element {
            Element::Text { raw } => {
                let file = claim(claims, format!("latex/block_{index}.svg"), index, None);
                let workdir = self.work_dir(&format!("latex_{index}"));
                match self.convert(self.typesetter, index, raw, &workdir, &file) {
                    Ok(()) => Artifact::Latex { file },
                    Err(err) => self.failure(self.typesetter, index, &err),
                }
            }
            Element::Animation { code } => {
                info!(index, "rendering animation");
                let workdir = self.work_dir(&format!("scene_{index}"));
                match self.render_animation(index, code, &workdir, claims) {
                    Ok(file) => Artifact::clip(file),
                    Err(err) => self.failure(self.animator, index, &err),
                }
            }
            Element::Media(media) => self.copy_media(index, media, claims),
            Element::PageBreak => Artifact::PageBreak,
        }
    }

    /// Run `converter` and make sure its product sits at `file`.
    fn convert(
        &self,
        converter: &dyn Converter,
        index: usize,
        source: &str,
        workdir: &Path,
        file: &str,
    ) -> Result<(), ConvertError> {
        let dest = self.staging.join(file);
        let request = ConvertRequest {
            index,
            source,
            workdir,
            output: &dest,
        };
        let produced = converter.convert(&request)?;
        place(&produced, &dest)?;
        debug!(index, file = %file, "rendered");
        Ok(())
    }

    /// Animations keep the extension of whatever clip the converter made.
    fn render_animation(
        &self,
        index: usize,
        code: &str,
        workdir: &Path,
        claims: &mut Claims,
    ) -> Result<String, ConvertError> {
        let hint = workdir.join(format!("scene_{index}.mp4"));
        let request = ConvertRequest {
            index,
            source: code,
            workdir,
            output: &hint,
        };
        let produced = self.animator.convert(&request)?;

        let ext = produced
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("mp4");
        let file = claim(claims, format!("videos/scene_{index}.{ext}"), index, None);
        place(&produced, &self.staging.join(&file))?;
        debug!(index, file = %file, "rendered");
        Ok(file)
    }

    /// Copy a referenced asset into the bundle layout.
    ///
    /// A missing or unreadable source is not fatal: the artifact still
    /// records the intended path and the file is simply absent.
    fn copy_media(&self, index: usize, media: &MediaRef, claims: &mut Claims) -> Artifact {
        let source = self.resolve_asset(&media.path);
        let file = claim(claims, media.bundle_path(), index, Some(&source));

        if source.is_file() {
            if let Err(err) = place(&source, &self.staging.join(&file)) {
                warn!(path = %source.display(), "failed to copy {}: {err}", media.kind.directive());
            }
        } else {
            warn!(path = %source.display(), "{} not found, leaving it out of the bundle", media.kind.directive());
        }
        Artifact::media(media, file)
    }

    fn resolve_asset(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }

    fn work_dir(&self, name: &str) -> PathBuf {
        self.staging.join(WORK_DIR).join(name)
    }

    fn failure(&self, converter: &dyn Converter, index: usize, err: &ConvertError) -> Artifact {
        warn!(index, "{} render failed for block {index}: {err}", converter.name());
        let mut text = format!("{} render failed for block {index}: {err}", converter.name());
        if let Some(diagnostic) = err.diagnostic() {
            warn!("{diagnostic}");
            text.push('\n');
            text.push_str(diagnostic);
        }
        Artifact::Error { text }
    }
}

/// Reserve `wanted` for the element at `index`, or a free variant of it.
///
/// An asset already staged from the same `source` keeps its path.
fn claim(claims: &mut Claims, wanted: String, index: usize, source: Option<&Path>) -> String {
    let file = match claims.get(&wanted) {
        None => wanted,
        Some(owner) if source.is_some() && owner.as_deref() == source => return wanted,
        Some(_) => {
            let (stem, ext) = split_extension(&wanted);
            let mut candidate = format!("{stem}_{index}{ext}");
            let mut n = 1;
            while claims.contains_key(&candidate) {
                candidate = format!("{stem}_{index}_{n}{ext}");
                n += 1;
            }
            warn!(index, wanted = %wanted, file = %candidate, "bundle path already taken, renaming");
            candidate
        }
    };
    claims.insert(file.clone(), source.map(Path::to_path_buf));
    file
}

/// Split `videos/a.mp4` into `("videos/a", ".mp4")`.
fn split_extension(file: &str) -> (&str, &str) {
    let name_start = file.rfind('/').map_or(0, |slash| slash + 1);
    match file[name_start..].rfind('.') {
        Some(dot) if dot > 0 => file.split_at(name_start + dot),
        _ => (file, ""),
    }
}

/// Copy `from` to `to` unless they are the same file, creating parents.
fn place(from: &Path, to: &Path) -> std::io::Result<()> {
    if from == to {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;
    use std::cell::RefCell;

    /// Writes the source text as the artifact, failing on `"FAIL"`.
    struct FakeConverter {
        name: &'static str,
        calls: RefCell<Vec<usize>>,
    }

    impl FakeConverter {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Converter for FakeConverter {
        fn name(&self) -> &str {
            self.name
        }

        fn convert(&self, request: &ConvertRequest<'_>) -> Result<PathBuf, ConvertError> {
            self.calls.borrow_mut().push(request.index);
            if request.source == "FAIL" {
                return Err(ConvertError::Failed {
                    tool: self.name.to_string(),
                    code: Some(1),
                    diagnostic: "boom".to_string(),
                });
            }
            fs::create_dir_all(request.workdir)?;
            let out = request.workdir.join(format!("out_{}.webm", request.index));
            fs::write(&out, request.source)?;
            Ok(out)
        }
    }

    fn text(raw: &str) -> Element {
        Element::Text {
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_one_artifact_per_element_in_order() {
        let staging = tempfile::TempDir::new().unwrap();
        let typesetter = FakeConverter::new("LaTeX");
        let animator = FakeConverter::new("Manim");
        let elements = vec![
            text("$a$"),
            Element::Animation {
                code: "self.wait()".to_string(),
            },
            Element::PageBreak,
            text("$b$"),
        ];

        let artifacts = Dispatcher::new(&typesetter, &animator, staging.path()).dispatch(&elements);

        assert_eq!(
            artifacts,
            vec![
                Artifact::Latex {
                    file: "latex/block_0.svg".to_string()
                },
                Artifact::clip("videos/scene_1.webm".to_string()),
                Artifact::PageBreak,
                Artifact::Latex {
                    file: "latex/block_3.svg".to_string()
                },
            ]
        );
        assert_eq!(*typesetter.calls.borrow(), vec![0, 3]);
        assert_eq!(*animator.calls.borrow(), vec![1]);
        assert_eq!(
            fs::read_to_string(staging.path().join("latex/block_3.svg")).unwrap(),
            "$b$"
        );
        assert_eq!(
            fs::read_to_string(staging.path().join("videos/scene_1.webm")).unwrap(),
            "self.wait()"
        );
    }

    #[test]
    fn test_failure_is_isolated() {
        let staging = tempfile::TempDir::new().unwrap();
        let typesetter = FakeConverter::new("LaTeX");
        let animator = FakeConverter::new("Manim");
        let elements = vec![
            text("$a$"),
            text("FAIL"),
            Element::Animation {
                code: "FAIL".to_string(),
            },
            text("$c$"),
        ];

        let artifacts = Dispatcher::new(&typesetter, &animator, staging.path()).dispatch(&elements);

        assert_eq!(artifacts.len(), 4);
        assert_eq!(
            artifacts[1],
            Artifact::Error {
                text: "LaTeX render failed for block 1: LaTeX exited with status 1\nboom".to_string()
            }
        );
        assert_eq!(
            artifacts[2],
            Artifact::Error {
                text: "Manim render failed for block 2: Manim exited with status 1\nboom".to_string()
            }
        );
        assert_eq!(
            artifacts[3],
            Artifact::Latex {
                file: "latex/block_3.svg".to_string()
            }
        );
        assert!(!staging.path().join("latex/block_1.svg").exists());
    }

    #[test]
    fn test_media_copied_from_asset_root() {
        let assets = tempfile::TempDir::new().unwrap();
        let staging = tempfile::TempDir::new().unwrap();
        fs::write(assets.path().join("foo.png"), b"\x89PNG").unwrap();

        let mut media = MediaRef::new(MediaKind::Image, "foo.png");
        media.width = Some("50%".to_string());
        let elements = vec![Element::Media(media)];

        let fake = FakeConverter::new("unused");
        let artifacts = Dispatcher::new(&fake, &fake, staging.path())
            .with_asset_root(assets.path())
            .dispatch(&elements);

        assert_eq!(
            artifacts,
            vec![Artifact::Image {
                file: "images/foo.png".to_string(),
                width: Some("50%".to_string()),
                height: None,
                scale: None,
            }]
        );
        assert_eq!(
            fs::read(staging.path().join("images/foo.png")).unwrap(),
            b"\x89PNG"
        );
        assert!(fake.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_media_still_recorded() {
        let staging = tempfile::TempDir::new().unwrap();
        let fake = FakeConverter::new("unused");
        let elements = vec![Element::Media(MediaRef::new(
            MediaKind::Video,
            "clips/missing.mp4",
        ))];

        let artifacts = Dispatcher::new(&fake, &fake, staging.path())
            .with_asset_root(staging.path())
            .dispatch(&elements);

        assert_eq!(
            artifacts,
            vec![Artifact::clip("videos/missing.mp4".to_string())]
        );
        assert!(!staging.path().join("videos/missing.mp4").exists());
    }

    #[test]
    fn test_media_and_clips_never_share_a_path() {
        let assets = tempfile::TempDir::new().unwrap();
        let staging = tempfile::TempDir::new().unwrap();
        fs::write(assets.path().join("scene_0.webm"), "USERCLIP").unwrap();
        fs::write(assets.path().join("scene_3.webm"), "EARLYCLIP").unwrap();

        let typesetter = FakeConverter::new("LaTeX");
        let animator = FakeConverter::new("Manim");
        let elements = vec![
            Element::Animation {
                code: "RENDERED".to_string(),
            },
            Element::Media(MediaRef::new(MediaKind::Video, "scene_0.webm")),
            Element::Media(MediaRef::new(MediaKind::Video, "scene_3.webm")),
            Element::Animation {
                code: "LATE".to_string(),
            },
        ];

        let artifacts = Dispatcher::new(&typesetter, &animator, staging.path())
            .with_asset_root(assets.path())
            .dispatch(&elements);

        assert_eq!(
            artifacts,
            vec![
                Artifact::clip("videos/scene_0.webm".to_string()),
                Artifact::clip("videos/scene_0_1.webm".to_string()),
                Artifact::clip("videos/scene_3.webm".to_string()),
                Artifact::clip("videos/scene_3_3.webm".to_string()),
            ]
        );
        let read = |file: &str| fs::read_to_string(staging.path().join(file)).unwrap();
        assert_eq!(read("videos/scene_0.webm"), "RENDERED");
        assert_eq!(read("videos/scene_0_1.webm"), "USERCLIP");
        assert_eq!(read("videos/scene_3.webm"), "EARLYCLIP");
        assert_eq!(read("videos/scene_3_3.webm"), "LATE");
    }

    #[test]
    fn test_same_basename_from_different_folders() {
        let assets = tempfile::TempDir::new().unwrap();
        let staging = tempfile::TempDir::new().unwrap();
        for dir in ["a", "b"] {
            fs::create_dir_all(assets.path().join(dir)).unwrap();
            fs::write(assets.path().join(dir).join("fig.png"), dir).unwrap();
        }

        let fake = FakeConverter::new("unused");
        let elements = vec![
            Element::Media(MediaRef::new(MediaKind::Image, "a/fig.png")),
            Element::Media(MediaRef::new(MediaKind::Image, "b/fig.png")),
            Element::Media(MediaRef::new(MediaKind::Image, "a/fig.png")),
        ];

        let artifacts = Dispatcher::new(&fake, &fake, staging.path())
            .with_asset_root(assets.path())
            .dispatch(&elements);

        let files: Vec<_> = artifacts.iter().filter_map(Artifact::file).collect();
        assert_eq!(files, vec!["images/fig.png", "images/fig_1.png", "images/fig.png"]);
        assert_eq!(
            fs::read_to_string(staging.path().join("images/fig.png")).unwrap(),
            "a"
        );
        assert_eq!(
            fs::read_to_string(staging.path().join("images/fig_1.png")).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("videos/a.mp4"), ("videos/a", ".mp4"));
        assert_eq!(split_extension("images/a.b/fig"), ("images/a.b/fig", ""));
        assert_eq!(split_extension("images/.hidden"), ("images/.hidden", ""));
        assert_eq!(split_extension("images/x.tar.gz"), ("images/x.tar", ".gz"));
    }

    #[test]
    fn test_work_dirs_are_per_element() {
        let staging = tempfile::TempDir::new().unwrap();
        let typesetter = FakeConverter::new("LaTeX");
        let animator = FakeConverter::new("Manim");
        let elements = vec![
            Element::Animation {
                code: "a".to_string(),
            },
            Element::Animation {
                code: "b".to_string(),
            },
        ];

        Dispatcher::new(&typesetter, &animator, staging.path()).dispatch(&elements);

        let work = staging.path().join(WORK_DIR);
        assert!(work.join("scene_0/out_0.webm").is_file());
        assert!(work.join("scene_1/out_1.webm").is_file());
    }
}
