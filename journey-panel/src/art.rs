//! Artwork sources and rotation.

use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// File extensions treated as artwork (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Errors while listing or opening artwork.
#[derive(Debug, thiserror::Error)]
pub enum ArtError {
    #[error("failed to read art folder {path}: {source}")]
    Folder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open {id}: {source}")]
    Open {
        id: ArtId,
        source: image::ImageError,
    },
}

/// Identifies one piece of artwork.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtId(PathBuf);

impl ArtId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Where artwork comes from.
pub trait ImageSource {
    /// All artwork currently available.
    fn list_available(&self) -> Result<Vec<ArtId>, ArtError>;

    /// Decode one piece of artwork.
    fn open(&self, id: &ArtId) -> Result<DynamicImage, ArtError>;
}

/// Artwork files in a single directory.
#[derive(Debug, Clone)]
pub struct FolderImageSource {
    folder: PathBuf,
}

impl FolderImageSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

impl ImageSource for FolderImageSource {
    fn list_available(&self) -> Result<Vec<ArtId>, ArtError> {
        let folder_error = |source| ArtError::Folder {
            path: self.folder.clone(),
            source,
        };

        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.folder).map_err(folder_error)? {
            let path = entry.map_err(folder_error)?.path();
            if path.is_file() && has_image_extension(&path) {
                found.push(ArtId::new(path));
            }
        }
        found.sort();
        Ok(found)
    }

    fn open(&self, id: &ArtId) -> Result<DynamicImage, ArtError> {
        image::open(id.path()).map_err(|source| ArtError::Open {
            id: id.clone(),
            source,
        })
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Outcome of picking the next artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtPick {
    Found(ArtId),
    Empty,
}

/// Picks artwork at random, avoiding an immediate repeat when there is a
/// choice.
#[derive(Debug)]
pub struct ArtSelector {
    current: Option<ArtId>,
    rng: StdRng,
}

impl ArtSelector {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Use a specific RNG (seeded in tests).
    pub fn with_rng(rng: StdRng) -> Self {
        Self { current: None, rng }
    }

    /// The artwork most recently shown.
    pub fn current(&self) -> Option<&ArtId> {
        self.current.as_ref()
    }

    /// Record that `id` is now on the panel.
    pub fn mark_shown(&mut self, id: ArtId) {
        self.current = Some(id);
    }

    /// Pick the next artwork from `available`.
    ///
    /// The pick only counts as shown once passed to [`mark_shown`].
    ///
    /// [`mark_shown`]: ArtSelector::mark_shown
    pub fn choose(&mut self, available: &[ArtId]) -> ArtPick {
        let fresh: Vec<&ArtId> = available
            .iter()
            .filter(|id| Some(*id) != self.current.as_ref())
            .collect();

        let picked = if fresh.is_empty() {
            available.choose(&mut self.rng)
        } else {
            fresh.choose(&mut self.rng).copied()
        };

        match picked {
            Some(id) => ArtPick::Found(id.clone()),
            None => ArtPick::Empty,
        }
    }
}

impl Default for ArtSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn ids(names: &[&str]) -> Vec<ArtId> {
        names.iter().map(ArtId::new).collect()
    }

    fn selector() -> ArtSelector {
        ArtSelector::with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn two_images_never_repeat() {
        let available = ids(&["a.png", "b.png"]);
        let mut selector = selector();

        let mut previous = None;
        for _ in 0..100 {
            let ArtPick::Found(id) = selector.choose(&available) else {
                panic!("expected artwork");
            };
            assert_ne!(Some(&id), previous.as_ref());
            selector.mark_shown(id.clone());
            previous = Some(id);
        }
    }

    #[test]
    fn unshown_pick_is_not_current() {
        let available = ids(&["a.png", "b.png"]);
        let mut selector = selector();

        let ArtPick::Found(first) = selector.choose(&available) else {
            panic!("expected artwork");
        };
        assert!(selector.current().is_none());

        selector.mark_shown(first.clone());
        assert_eq!(selector.current(), Some(&first));
        assert_ne!(selector.choose(&available), ArtPick::Found(first));
    }

    #[test]
    fn single_image_repeats() {
        let available = ids(&["only.png"]);
        let mut selector = selector();

        assert_eq!(selector.choose(&available), ArtPick::Found(ArtId::new("only.png")));
        assert_eq!(selector.choose(&available), ArtPick::Found(ArtId::new("only.png")));
    }

    #[test]
    fn nothing_available_is_empty() {
        let mut selector = selector();
        assert_eq!(selector.choose(&[]), ArtPick::Empty);
        assert!(selector.current().is_none());
    }

    #[test]
    fn folder_lists_images_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "c.jpeg", "d.bmp", "notes.txt", "noext"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let source = FolderImageSource::new(dir.path());
        let names: Vec<String> = source
            .list_available()
            .unwrap()
            .iter()
            .map(|id| id.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.jpeg", "d.bmp"]);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let source = FolderImageSource::new("/nonexistent/art/folder");
        assert!(matches!(source.list_available(), Err(ArtError::Folder { .. })));
    }

    #[test]
    fn open_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        GrayImage::from_pixel(4, 3, Luma([0])).save(&path).unwrap();

        let source = FolderImageSource::new(dir.path());
        let image = source.open(&ArtId::new(&path)).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }
}
