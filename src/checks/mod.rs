//! Check executors -- the runnable side of an exam.
//!
//! The scheduler never knows what a check does; it looks the exam's name
//! up in a [`CheckRegistry`] and interprets `Ok` as pass, `Err` as fail.

pub mod http;
pub mod tcp;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::battery::{Battery, CheckSpec};

const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A runnable check.
///
/// Implementations report pass by returning `Ok(())` and fail by
/// returning an error whose text becomes the recorded result message.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    async fn run(&self) -> Result<()>;
}

/// Registry of runnable checks, keyed by exam name.
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn Check>>,
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check under an exam name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, check: Arc<dyn Check>) {
        self.checks.insert(name.into(), check);
    }

    /// Whether a runnable check exists for this name.
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Check>> {
        self.checks.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Build a registry from the check specs declared in a battery.
    ///
    /// Exams without a `check` spec are skipped here; preflight rejects
    /// them unless the embedder registered something under that name.
    pub fn from_battery(battery: &Battery) -> Result<Self> {
        let mut registry = Self::new();
        for exam in &battery.exams {
            if let Some(spec) = &exam.check {
                let check = build_check(spec)
                    .with_context(|| format!("exam '{}'", exam.name))?;
                registry.register(&exam.name, check);
            }
        }
        Ok(registry)
    }
}

fn build_check(spec: &CheckSpec) -> Result<Arc<dyn Check>> {
    Ok(match spec {
        CheckSpec::Http { target, timeout } => {
            Arc::new(http::HttpCheck::new(target, parse_timeout(timeout.as_deref())?)?)
        }
        CheckSpec::Tcp { target, timeout } => {
            Arc::new(tcp::TcpCheck::new(target, parse_timeout(timeout.as_deref())?))
        }
    })
}

fn parse_timeout(raw: Option<&str>) -> Result<Duration> {
    match raw {
        None => Ok(DEFAULT_CHECK_TIMEOUT),
        Some(s) => {
            humantime::parse_duration(s).with_context(|| format!("invalid timeout '{s}'"))
        }
    }
}

/// Adapts a plain async closure into a [`Check`]. Handy for embedders
/// and tests.
pub struct FnCheck<F>(F);

impl<F, Fut> FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F, Fut> Check for FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn run(&self) -> Result<()> {
        (self.0)().await
    }
}
