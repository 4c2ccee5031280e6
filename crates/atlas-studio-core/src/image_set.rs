use crate::backend::ImagePayload;

/// Ordered list of source image paths and their decoded previews.
///
/// Duplicates are permitted and treated as distinct entries at their list
/// position. Previews are eventually consistent with the last `replace` or
/// `append` whose decode response was not superseded; the backend's
/// `load_images` contract is stateless, so every change re-requests decoding
/// for the entire resulting list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageSet {
    paths: Vec<String>,
    previews: Vec<ImagePayload>,
}

impl ImageSet {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn previews(&self) -> &[ImagePayload] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Discards all current references and previews, keeping `paths` in the
    /// given order.
    pub fn replace(&mut self, paths: Vec<String>) {
        self.paths = paths;
        self.previews.clear();
    }

    /// Appends `paths` after the existing entries, order preserved.
    pub fn append(&mut self, paths: Vec<String>) {
        self.paths.extend(paths);
    }

    /// Empties the list and previews. Idempotent; settings are untouched.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.previews.clear();
    }

    /// Installs decoded previews from an admitted `load_images` response.
    pub fn set_previews(&mut self, previews: Vec<ImagePayload>) {
        self.previews = previews;
    }

    /// Drops previews after a decode failure; the path list stays intact.
    pub fn clear_previews(&mut self) {
        self.previews.clear();
    }
}
