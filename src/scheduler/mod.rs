//! Exam scheduling -- preflight validation, per-exam timer loops, and the
//! bounded result history they write into.

pub mod engine;
pub mod history;
pub mod preflight;

pub use self::engine::Scheduler;
pub use self::history::{ExamResult, HistoryStore, Outcome, NOT_RUN_MESSAGE};
pub use self::preflight::{preflight, PreflightError};
