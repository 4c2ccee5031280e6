use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Packing parameters as edited by the user.
///
/// `width`/`height` are meaningful only while `auto_size` is off; they are
/// kept across toggles so switching auto sizing back off restores the last
/// fixed dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasSettings {
    /// Pixels between packed frames.
    pub padding: u32,
    /// Let the backend grow the atlas to fit all inputs.
    pub auto_size: bool,
    /// Fixed atlas width in pixels (ignored when `auto_size`).
    pub width: u32,
    /// Fixed atlas height in pixels (ignored when `auto_size`).
    pub height: u32,
    /// Pack all inputs into a single unified page.
    pub unified: bool,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            padding: 2,
            auto_size: true,
            width: 1024,
            height: 1024,
            unified: true,
        }
    }
}

/// Settings rejected by [`AtlasSettings::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("atlas dimensions must be at least 1x1 when auto sizing is off (got {width}x{height})")]
    MissingDimensions { width: u32, height: u32 },
}

/// Validated settings as sent to the backend.
///
/// Fixed dimensions are present iff auto sizing is off, so a request can
/// never carry dimensions the backend must ignore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedSettings {
    pub padding: u32,
    pub auto_size: bool,
    pub unified: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl AtlasSettings {
    /// Validates the parameters and produces the backend-facing form.
    ///
    /// Pure and total: no side effects, same input yields same output.
    /// Callers decide whether to surface the error and suppress generation.
    pub fn validate(&self) -> Result<NormalizedSettings, ValidationError> {
        if !self.auto_size && (self.width == 0 || self.height == 0) {
            return Err(ValidationError::MissingDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(NormalizedSettings {
            padding: self.padding,
            auto_size: self.auto_size,
            unified: self.unified,
            width: (!self.auto_size).then_some(self.width),
            height: (!self.auto_size).then_some(self.height),
        })
    }

    /// Create a fluent builder for `AtlasSettings`.
    pub fn builder() -> AtlasSettingsBuilder {
        AtlasSettingsBuilder::new()
    }
}

/// Builder for `AtlasSettings` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasSettingsBuilder {
    settings: AtlasSettings,
}

impl AtlasSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: AtlasSettings::default(),
        }
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.settings.padding = v;
        self
    }
    pub fn auto_size(mut self, v: bool) -> Self {
        self.settings.auto_size = v;
        self
    }
    pub fn with_dimensions(mut self, w: u32, h: u32) -> Self {
        self.settings.width = w;
        self.settings.height = h;
        self
    }
    pub fn unified(mut self, v: bool) -> Self {
        self.settings.unified = v;
        self
    }
    pub fn build(self) -> AtlasSettings {
        self.settings
    }
}
