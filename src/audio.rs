//! Diving sound selection.
//!
//! The host owns audio playback. This module only filters its sound catalog
//! down to diving candidates and picks one uniformly at random per dive.

use crate::error::ConfigError;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

/// Fire-and-forget playback request sink.
pub trait SoundPlayer {
    fn play(&mut self, clip: &str);
}

impl<F: FnMut(&str)> SoundPlayer for F {
    fn play(&mut self, clip: &str) {
        self(clip)
    }
}

/// Catalog entries eligible as diving sounds.
#[derive(Clone, Debug, Default)]
pub struct DivingSounds {
    candidates: Vec<String>,
}

impl DivingSounds {
    /// Keep the catalog entries whose name matches `pattern`.
    pub fn from_catalog<I, S>(pattern: &str, catalog: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let regex = Regex::new(pattern)?;
        let candidates = catalog
            .into_iter()
            .map(Into::into)
            .filter(|name| regex.is_match(name))
            .collect();
        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Uniformly random candidate, `None` when nothing matched.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.candidates.choose(rng).map(String::as_str)
    }
}
