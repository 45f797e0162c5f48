//! Options controlling how a snapshot is opened.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use snapfield_core::FormatSpec;

use crate::derived::{DerivedDefaults, GizmoDefaults};
use crate::error::{ConfigError, OpenError};

/// Builder-input for [`Snapshot::open_with`](crate::Snapshot::open_with).
///
/// ```
/// use snapfield_snapshot::OpenOptions;
///
/// let opts = OpenOptions::new().suffix(".hdf5").cache(true);
/// assert!(opts.validate().is_ok());
/// assert!(OpenOptions::new().suffix("a/b").validate().is_err());
/// ```
#[derive(Clone)]
pub struct OpenOptions {
    /// File name suffix used by path discovery. Default: `".snap"`.
    pub suffix: String,
    /// Format spec of the files. Default: [`FormatSpec::gizmo`].
    pub spec: FormatSpec,
    /// Put a read-through dataset cache in front of the files. Default: `false`.
    pub cache: bool,
    /// Register the format's default derived fields on the default
    /// selectors. Default: `true`.
    pub register_defaults: bool,
    /// Source of the default derived fields. Default: [`GizmoDefaults`].
    pub defaults: Arc<dyn DerivedDefaults>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            suffix: ".snap".to_string(),
            spec: FormatSpec::gizmo(),
            cache: false,
            register_defaults: true,
            defaults: Arc::new(GizmoDefaults),
        }
    }
}

impl OpenOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discovery suffix.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Use `spec` instead of the built-in GIZMO spec.
    pub fn spec(mut self, spec: FormatSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Load the spec from a TOML file.
    pub fn spec_file(mut self, path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let source = fs::read_to_string(path)?;
        self.spec = FormatSpec::from_toml_str(&source)?;
        Ok(self)
    }

    /// Enable or disable the dataset cache.
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Enable or disable default derived-field registration.
    pub fn register_defaults(mut self, register: bool) -> Self {
        self.register_defaults = register;
        self
    }

    /// Use another source of default derived fields.
    pub fn defaults(mut self, defaults: impl DerivedDefaults + 'static) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suffix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidSuffix {
                suffix: self.suffix.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("suffix", &self.suffix)
            .field("spec", &self.spec.name())
            .field("cache", &self.cache)
            .field("register_defaults", &self.register_defaults)
            .finish_non_exhaustive()
    }
}
