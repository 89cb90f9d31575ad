//! Preflight validation -- static consistency checks over a battery.

use thiserror::Error;

use crate::battery::Battery;
use crate::checks::CheckRegistry;

/// A battery inconsistency found before any scheduling started.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// The exam names a check nothing in the registry can run.
    #[error("no exam named '{exam}' found")]
    UnknownExam { exam: String },
    /// A dependency names a check nothing in the registry can run.
    #[error("exam '{exam}': no dependency named '{dependency}' found")]
    UnknownDependency { exam: String, dependency: String },
    /// The interval is unparsable or not strictly positive.
    #[error("exam '{exam}': interval '{interval}' is not a valid duration: {reason}")]
    BadInterval {
        exam: String,
        interval: String,
        reason: String,
    },
    /// A notify target names no declared notifier.
    #[error("exam '{exam}': notifier '{notifier}' not found")]
    UnknownNotifier { exam: String, notifier: String },
}

/// Check that a battery is actually runnable.
///
/// Exams are visited in declaration order and the first violation wins.
/// Purely a precondition check; no scheduling state is touched. A failure
/// here must keep the scheduler from starting any loop.
pub fn preflight(battery: &Battery, registry: &CheckRegistry) -> Result<(), PreflightError> {
    for exam in &battery.exams {
        if !registry.contains(&exam.name) {
            return Err(PreflightError::UnknownExam {
                exam: exam.name.clone(),
            });
        }

        for dependency in &exam.depends {
            if !registry.contains(dependency) {
                return Err(PreflightError::UnknownDependency {
                    exam: exam.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }

        if let Err(e) = exam.duration() {
            return Err(PreflightError::BadInterval {
                exam: exam.name.clone(),
                interval: exam.interval.clone(),
                reason: format!("{e:#}"),
            });
        }

        for target in &exam.notify {
            if battery.notifier(target).is_none() {
                return Err(PreflightError::UnknownNotifier {
                    exam: exam.name.clone(),
                    notifier: target.clone(),
                });
            }
        }
    }

    Ok(())
}
