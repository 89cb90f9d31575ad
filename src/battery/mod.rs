//! Battery configuration -- the declarative set of exams and notifiers.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// History bound used when the battery does not set one.
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// A battery describes a series of exams, together with configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Battery {
    /// The exams to run.
    #[serde(default)]
    pub exams: Vec<Exam>,
    /// The things that can be notified about exam results.
    #[serde(default)]
    pub notifiers: Vec<Notifier>,
    /// Maximum history size for any given exam. Zero or absent means
    /// [`DEFAULT_HISTORY_LEN`].
    #[serde(default)]
    pub history_len: usize,
}

impl Battery {
    /// Load a battery from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read battery config {}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Parse a battery from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse battery config")
    }

    /// The effective history bound.
    pub fn history_len(&self) -> usize {
        if self.history_len == 0 {
            DEFAULT_HISTORY_LEN
        } else {
            self.history_len
        }
    }

    /// Look up a declared notifier by name.
    pub fn notifier(&self, name: &str) -> Option<&Notifier> {
        self.notifiers.iter().find(|n| n.name == name)
    }
}

/// An exam describes a named check and its operational parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Exam {
    /// Name of the check this exam runs. Unique within the battery.
    pub name: String,
    /// How frequently this exam runs, as a duration string.
    ///
    /// Examples:
    ///
    /// ```text
    /// 10s: run every ten seconds.
    /// 3h10m: run every three hours and ten minutes.
    /// ```
    pub interval: String,
    /// Names of exams this one depends on. Validated for existence at
    /// preflight; informational at run time.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Notifiers alerted when this exam's outcome changes.
    #[serde(default)]
    pub notify: Vec<String>,
    /// What to actually run. Optional so that embedders can register
    /// checks programmatically instead.
    #[serde(default)]
    pub check: Option<CheckSpec>,
}

impl Exam {
    /// Parse the interval string into a strictly positive duration.
    pub fn duration(&self) -> Result<Duration> {
        let d = humantime::parse_duration(&self.interval)
            .with_context(|| format!("invalid interval '{}'", self.interval))?;
        anyhow::ensure!(!d.is_zero(), "interval '{}' must be positive", self.interval);
        Ok(d)
    }
}

/// Declarative description of a built-in check executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckSpec {
    /// HTTP GET against `target`; passes on a 2xx status.
    Http {
        target: String,
        /// Request timeout, duration string. Defaults to 5s.
        #[serde(default)]
        timeout: Option<String>,
    },
    /// TCP connect to `target` (host:port); passes when the connection
    /// opens within the timeout.
    Tcp {
        target: String,
        #[serde(default)]
        timeout: Option<String>,
    },
}

/// A service or thing that can be notified of an exam's outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct Notifier {
    pub name: String,
    /// Opaque notifier-specific settings. The `kind` key selects the
    /// implementation; everything else belongs to it.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
history_len = 25

[[exams]]
name = "registry-http"
interval = "30s"
notify = ["ops"]
check = { kind = "http", target = "http://localhost:5000/v2/" }

[[exams]]
name = "etcd-tcp"
interval = "3h10m"
depends = ["registry-http"]
check = { kind = "tcp", target = "127.0.0.1:2379", timeout = "2s" }

[[notifiers]]
name = "ops"
config = { kind = "log" }
"#;

    #[test]
    fn parses_sample_config() {
        let b = Battery::from_toml(SAMPLE).unwrap();
        assert_eq!(b.exams.len(), 2);
        assert_eq!(b.notifiers.len(), 1);
        assert_eq!(b.history_len(), 25);
        assert_eq!(b.exams[1].depends, vec!["registry-http"]);
        assert!(b.notifier("ops").is_some());
        assert!(b.notifier("nobody").is_none());
    }

    #[test]
    fn history_len_defaults_when_unset() {
        let b = Battery::from_toml("").unwrap();
        assert_eq!(b.history_len(), DEFAULT_HISTORY_LEN);

        let b = Battery::from_toml("history_len = 0").unwrap();
        assert_eq!(b.history_len(), DEFAULT_HISTORY_LEN);
    }

    #[test]
    fn interval_parses_compound_durations() {
        let b = Battery::from_toml(SAMPLE).unwrap();
        assert_eq!(b.exams[0].duration().unwrap(), Duration::from_secs(30));
        assert_eq!(
            b.exams[1].duration().unwrap(),
            Duration::from_secs(3 * 3600 + 10 * 60)
        );
    }

    #[test]
    fn zero_or_garbage_intervals_are_rejected() {
        let zero = Exam {
            name: "z".into(),
            interval: "0s".into(),
            depends: vec![],
            notify: vec![],
            check: None,
        };
        assert!(zero.duration().is_err());

        let garbage = Exam {
            interval: "whenever".into(),
            ..zero
        };
        assert!(garbage.duration().is_err());
    }
}
