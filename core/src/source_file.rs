//! A translation unit's input: a path plus its decoded contents.
//!
//! A Moxie translation is single-file and process-local, so a
//! `SourceFile` here is just an `Rc`-shared value with no global table or
//! multi-file interning registry.

use std::{fmt, path::Path, rc::Rc};

#[derive(Clone)]
pub struct SourceFile {
    inner: Rc<Inner>,
}

struct Inner {
    path: Rc<Path>,
    contents: Rc<str>,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<Rc<Path>>, contents: impl Into<Rc<str>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                path: path.into(),
                contents: contents.into(),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    #[must_use]
    pub fn contents(&self) -> &str {
        &self.inner.contents
    }

    /// The `.go` path the emitter should write to: `.mx`/`.x` swapped for `.go`.
    #[must_use]
    pub fn emitted_path(&self) -> std::path::PathBuf {
        self.inner.path.with_extension("go")
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceFile({})", self.inner.path.display())
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.path.display())
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.inner.path == other.inner.path
    }
}

impl Eq for SourceFile {}

impl PartialOrd for SourceFile {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceFile {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.path.cmp(&other.inner.path)
    }
}

impl std::hash::Hash for SourceFile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.path.hash(state);
    }
}
