//! Notifier dispatch -- alerts raised when an exam's outcome changes.
//!
//! Delivery is strictly best-effort: a notifier that errors is logged and
//! forgotten, and the scheduler never learns about it.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::battery::Battery;
use crate::scheduler::Outcome;

/// An outcome transition for one exam.
#[derive(Debug, Clone)]
pub struct OutcomeChange {
    pub exam: String,
    pub from: Outcome,
    pub to: Outcome,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// A delivery target for outcome changes.
#[async_trait::async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, change: &OutcomeChange) -> Result<()>;
}

/// Fans an outcome change out to the notifiers an exam names.
#[derive(Default, Clone)]
pub struct Dispatcher {
    targets: HashMap<String, Arc<dyn Notify>>,
}

impl Dispatcher {
    /// Build a dispatcher covering every notifier a battery declares.
    ///
    /// The `kind` config key selects the implementation. Only `log` is
    /// built in; an unrecognized kind falls back to it with a warning.
    pub fn from_battery(battery: &Battery) -> Self {
        let mut dispatcher = Self::default();
        for notifier in &battery.notifiers {
            let kind = notifier
                .config
                .get("kind")
                .map(String::as_str)
                .unwrap_or("log");
            if kind != "log" {
                warn!(notifier = %notifier.name, %kind, "Unknown notifier kind, using log");
            }
            dispatcher.register(
                &notifier.name,
                Arc::new(LogNotifier {
                    name: notifier.name.clone(),
                }),
            );
        }
        dispatcher
    }

    /// Register a delivery target under a notifier name.
    pub fn register(&mut self, name: impl Into<String>, target: Arc<dyn Notify>) {
        self.targets.insert(name.into(), target);
    }

    /// Deliver a change to each named notifier, swallowing failures.
    pub async fn dispatch(&self, names: &[String], change: &OutcomeChange) {
        for name in names {
            match self.targets.get(name) {
                Some(target) => {
                    if let Err(e) = target.notify(change).await {
                        warn!(
                            notifier = %name,
                            exam = %change.exam,
                            error = %e,
                            "Notification delivery failed"
                        );
                    }
                }
                None => warn!(notifier = %name, exam = %change.exam, "No such notifier"),
            }
        }
    }
}

/// Notifier that records outcome changes in the process log.
pub struct LogNotifier {
    name: String,
}

#[async_trait::async_trait]
impl Notify for LogNotifier {
    async fn notify(&self, change: &OutcomeChange) -> Result<()> {
        warn!(
            notifier = %self.name,
            exam = %change.exam,
            from = %change.from,
            to = %change.to,
            message = %change.message,
            "Exam outcome changed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<OutcomeChange>>);

    #[async_trait::async_trait]
    impl Notify for Recorder {
        async fn notify(&self, change: &OutcomeChange) -> Result<()> {
            self.0.lock().unwrap().push(change.clone());
            Ok(())
        }
    }

    fn change() -> OutcomeChange {
        OutcomeChange {
            exam: "test1".into(),
            from: Outcome::Unknown,
            to: Outcome::Fail,
            message: "boom".into(),
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_named_target() {
        let recorder = Arc::new(Recorder(Mutex::new(vec![])));
        let mut dispatcher = Dispatcher::default();
        dispatcher.register("group1", recorder.clone());
        dispatcher.register("group2", recorder.clone());

        dispatcher
            .dispatch(&["group1".into(), "group2".into()], &change())
            .await;

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].to, Outcome::Fail);
    }

    #[tokio::test]
    async fn missing_targets_and_failures_are_swallowed() {
        struct Exploder;
        #[async_trait::async_trait]
        impl Notify for Exploder {
            async fn notify(&self, _: &OutcomeChange) -> Result<()> {
                Err(anyhow::anyhow!("delivery exploded"))
            }
        }

        let mut dispatcher = Dispatcher::default();
        dispatcher.register("flaky", Arc::new(Exploder));

        // Neither the failing target nor the unknown one panics or errors.
        dispatcher
            .dispatch(&["flaky".into(), "nobody".into()], &change())
            .await;
    }

    #[test]
    fn from_battery_covers_declared_notifiers() {
        let battery = crate::battery::Battery::from_toml(
            r#"
[[notifiers]]
name = "ops"
config = { kind = "log" }

[[notifiers]]
name = "pager"
config = { kind = "carrier-pigeon" }
"#,
        )
        .unwrap();

        let dispatcher = Dispatcher::from_battery(&battery);
        assert!(dispatcher.targets.contains_key("ops"));
        assert!(dispatcher.targets.contains_key("pager"));
    }
}
