//! Bounded, thread-safe result history, keyed by exam name.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The tri-state outcome of one exam run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The exam passed.
    Pass,
    /// The exam failed.
    Fail,
    /// The exam is in an unknown state, possibly never run.
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message recorded for an exam that is scheduled but has not run yet.
pub const NOT_RUN_MESSAGE: &str = "Exam loaded, but not run yet.";

/// One immutable record of an exam run.
#[derive(Debug, Clone, Serialize)]
pub struct ExamResult {
    /// Name of the exam.
    pub exam: String,
    /// When this exam was run.
    pub date: DateTime<Utc>,
    /// What happened.
    pub outcome: Outcome,
    /// Optional text, such as why the exam failed.
    pub message: String,
}

impl ExamResult {
    pub fn new(
        exam: impl Into<String>,
        date: DateTime<Utc>,
        outcome: Outcome,
        message: impl Into<String>,
    ) -> Self {
        Self {
            exam: exam.into(),
            date,
            outcome,
            message: message.into(),
        }
    }

    /// The seed record written when an exam is scheduled but has not run.
    pub fn not_run_yet(exam: impl Into<String>) -> Self {
        Self::new(exam, Utc::now(), Outcome::Unknown, NOT_RUN_MESSAGE)
    }
}

/// Thread-safe bounded storage of exam results.
///
/// Histories are created lazily on first write. Each history is ordered
/// most-recent-first and never exceeds the bound; the oldest entry is
/// evicted once it would. A single map-level lock is enough at the write
/// rates exams run at (seconds to hours between ticks).
pub struct HistoryStore {
    max: usize,
    inner: RwLock<HashMap<String, VecDeque<ExamResult>>>,
}

impl HistoryStore {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Record a result at the front of its exam's history.
    pub fn add(&self, result: ExamResult) {
        let mut inner = self.inner.write().expect("history lock poisoned");
        let history = inner.entry(result.exam.clone()).or_default();
        history.push_front(result);
        history.truncate(self.max);
    }

    /// All recorded results for an exam, most recent first. Empty when the
    /// exam has no history.
    pub fn list(&self, exam: &str) -> Vec<ExamResult> {
        let inner = self.inner.read().expect("history lock poisoned");
        inner
            .get(exam)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent result for an exam, or `None` when nothing has been
    /// recorded.
    pub fn last(&self, exam: &str) -> Option<ExamResult> {
        let inner = self.inner.read().expect("history lock poisoned");
        inner.get(exam).and_then(|h| h.front()).cloned()
    }

    /// How many results are recorded for an exam.
    pub fn len(&self, exam: &str) -> usize {
        let inner = self.inner.read().expect("history lock poisoned");
        inner.get(exam).map_or(0, VecDeque::len)
    }

    /// Discard all history for an exam.
    pub fn empty(&self, exam: &str) {
        let mut inner = self.inner.write().expect("history lock poisoned");
        inner.remove(exam);
    }

    /// Every exam with recorded history, mapped to its most recent
    /// outcome. An entry that is somehow present but empty reports
    /// Unknown rather than failing.
    pub fn exams(&self) -> HashMap<String, Outcome> {
        let inner = self.inner.read().expect("history lock poisoned");
        inner
            .iter()
            .map(|(name, h)| {
                let outcome = h.front().map_or(Outcome::Unknown, |r| r.outcome);
                (name.clone(), outcome)
            })
            .collect()
    }
}
