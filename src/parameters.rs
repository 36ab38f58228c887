//! Decoder parameter fragments and their composition.
//!
//! A [`ParameterFragment`] is an ordered list of `key → value` directives
//! for the external decoder (`pix_fmt → rgb48le`). Fragments compose with
//! last-writer-wins semantics: a later value replaces an earlier value of
//! the same key, and the key keeps the position where it first appeared.
//!
//! # Example
//!
//! ```
//! use framecut::ParameterFragment;
//!
//! let base = ParameterFragment::new()
//!     .with("pix_fmt", "rgb48le")
//!     .with("color_trc", "bt709");
//! let profile = ParameterFragment::new().with("color_trc", "arib-std-b67");
//!
//! let merged = base.merged(&profile);
//! assert_eq!(merged.to_args(), ["-pix_fmt", "rgb48le", "-color_trc", "arib-std-b67"]);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Ordered decoder directives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterFragment {
    entries: Vec<(String, String)>,
}

impl ParameterFragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fragment from pairs. Repeated keys follow last-writer-wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fragment = Self::new();
        for (key, value) in pairs {
            fragment.set(key, value);
        }
        fragment
    }

    /// Builder form of [`set`](ParameterFragment::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key` to `value`, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the fragment holds no directives.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Overlay `other` on top of this fragment.
    pub fn merge(&mut self, other: &ParameterFragment) {
        for (key, value) in other.iter() {
            if let Some(previous) = self.set(key, value) {
                if previous != value {
                    log::debug!("Overriding {key}={previous} with {value}");
                }
            }
        }
    }

    /// Return a new fragment with `other` overlaid on a copy of this one.
    #[must_use]
    pub fn merged(&self, other: &ParameterFragment) -> ParameterFragment {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Flatten into command-line arguments: `["-key", "value", ...]`.
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(key, value)| [format!("-{key}"), value.clone()])
            .collect()
    }
}

impl Display for ParameterFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_args().join(" "))
    }
}

/// Compose the decoder parameters for one device and profile.
///
/// The order is fixed: `base`, then `device`, then `profile`. Device tuning
/// overrides generic defaults and profile tuning overrides device defaults.
/// Keys that appear only in earlier fragments are kept.
pub fn synthesize(
    base: &ParameterFragment,
    device: &ParameterFragment,
    profile: &ParameterFragment,
) -> ParameterFragment {
    let mut parameters = base.clone();
    parameters.merge(device);
    parameters.merge(profile);
    parameters
}
