//! Build-time configuration threaded through the decoders.

use std::path::{Path, PathBuf};

use crate::content::ParserRegistry;

/// Configuration carried through one document build.
///
/// Builders hold no other shared state, so independent builds may run
/// concurrently over separate contexts, or share one by reference: the
/// registry is read-only once constructed.
#[derive(Debug, Default)]
pub struct BuildContext {
    /// Absolute path of the document being decoded, used to resolve
    /// feature-relative file references. When absent, resolution falls back
    /// to the process working directory.
    pub document_path: Option<PathBuf>,
    /// Content parsers available to embedded example tables.
    pub registry: ParserRegistry,
}

impl BuildContext {
    /// Construct a context with the default parser registry and no document
    /// path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path of the document being decoded.
    #[must_use]
    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }

    /// Replace the parser registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Directory of the document being decoded, when known.
    pub(crate) fn feature_dir(&self) -> Option<&Path> {
        self.document_path.as_deref().and_then(Path::parent)
    }
}
