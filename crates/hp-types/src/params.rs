//! Run parameters: the four tunable knobs plus the output location.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::errors::HpResult;

/// The fixed, ordered input every run processes.
pub const INPUT_GREETINGS: [&str; 6] = ["Bonjour", "Ciao", "Hello", "Hola", "Namaste", "Salaam"];

/// Suffix appended to every transformed greeting.
pub const GREETING_SUFFIX: &str = " world!";

/// Text transform applied to each greeting.
///
/// Parsing is lenient: any name outside the known set becomes [`GreetingStyle::Identity`]
/// rather than an error. Optimization traces depend on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GreetingStyle {
    #[default]
    Uppercase,
    Lowercase,
    Titlecase,
    Identity,
}

impl GreetingStyle {
    /// Styles an optimizer may choose between.
    pub const SEARCHABLE: [GreetingStyle; 3] = [Self::Uppercase, Self::Lowercase, Self::Titlecase];

    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "uppercase" => Self::Uppercase,
            "lowercase" => Self::Lowercase,
            "titlecase" => Self::Titlecase,
            "identity" => Self::Identity,
            other => {
                warn!("Unrecognized greeting style '{}', using identity transform", other);
                Self::Identity
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Titlecase => "titlecase",
            Self::Identity => "identity",
        }
    }

    /// Apply the transform to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Titlecase => titlecase(text),
            Self::Identity => text.to_string(),
        }
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
fn titlecase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

impl fmt::Display for GreetingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GreetingStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for GreetingStyle {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<GreetingStyle> for String {
    fn from(value: GreetingStyle) -> Self {
        value.as_str().to_string()
    }
}

/// Immutable parameter set for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub greeting_style: GreetingStyle,
    pub batch_size: usize,
    pub repeat_count: usize,
    /// Simulated work per item, in seconds.
    pub delay: f64,
    pub outdir: PathBuf,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            greeting_style: GreetingStyle::Uppercase,
            batch_size: 2,
            repeat_count: 1,
            delay: 0.5,
            outdir: PathBuf::from("results"),
        }
    }
}

impl PipelineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting_style(mut self, style: GreetingStyle) -> Self {
        self.greeting_style = style;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_repeat_count(mut self, repeat_count: usize) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    /// Reject parameter sets that cannot produce a run.
    pub fn validate(&self) -> HpResult<()> {
        if self.batch_size < 1 {
            return Err(crate::config_error!(
                "batch_size must be at least 1, got {}",
                self.batch_size
            ));
        }
        if self.repeat_count < 1 {
            return Err(crate::config_error!(
                "repeat_count must be at least 1, got {}",
                self.repeat_count
            ));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(crate::config_error!(
                "delay must be a finite number of seconds >= 0, got {}",
                self.delay
            ));
        }
        Ok(())
    }

    /// The per-item delay as a [`Duration`].
    pub fn delay_duration(&self) -> HpResult<Duration> {
        Duration::try_from_secs_f64(self.delay)
            .map_err(|e| crate::config_error!("invalid delay {}: {}", self.delay, e))
    }
}
