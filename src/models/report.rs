//! Run outcome accounting and daily log rendering.

/// One logged occurrence during a run, in URL order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// First sighting of a URL; baseline stored, no diff.
    Added { filename: String },

    /// Content change detected; archive and diff artifact produced.
    Changed { filename: String },

    /// Per-URL failure; the run continued with the next URL.
    Failed { filename: String, message: String },
}

/// Outcome of the publish step, when one was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed,
    Failed,
}

/// Summary of one watch run.
///
/// The date stamp is captured once at run start so archive
/// directories, artifact names and the daily log all agree even when
/// a run straddles midnight.
#[derive(Debug)]
pub struct RunReport {
    pub date: String,
    events: Vec<RunEvent>,
    no_changes: bool,
    publish: Option<PublishOutcome>,
}

impl RunReport {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            events: Vec::new(),
            no_changes: false,
            publish: None,
        }
    }

    /// Append an event in processing order.
    pub fn record(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Whether any diff artifact was produced this run.
    pub fn files_changed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, RunEvent::Changed { .. }))
    }

    pub fn added_count(&self) -> usize {
        self.count(|e| matches!(e, RunEvent::Added { .. }))
    }

    pub fn changed_count(&self) -> usize {
        self.count(|e| matches!(e, RunEvent::Changed { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|e| matches!(e, RunEvent::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RunEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Note that the metadata store ended the run unchanged.
    pub fn mark_no_changes(&mut self) {
        self.no_changes = true;
    }

    /// Note the publish attempt's outcome.
    pub fn mark_publish(&mut self, outcome: PublishOutcome) {
        self.publish = Some(outcome);
    }

    pub fn publish_outcome(&self) -> Option<PublishOutcome> {
        self.publish
    }

    /// Render the daily log body. One line per event in order, then
    /// the no-changes marker, then the publish marker.
    pub fn log_text(&self) -> String {
        let mut text = String::new();
        for event in &self.events {
            match event {
                RunEvent::Added { filename } => {
                    text.push_str(&format!("Added: {filename}\n"));
                }
                RunEvent::Changed { filename } => {
                    text.push_str(&format!("Change: {filename}\n"));
                }
                RunEvent::Failed { filename, .. } => {
                    text.push_str(&format!("### ERROR: {}\n", filename.to_uppercase()));
                }
            }
        }
        if self.no_changes {
            text.push_str("No changes detected.\n");
        }
        match self.publish {
            Some(PublishOutcome::Pushed) => text.push_str("Git: Successfully pushed.\n"),
            Some(PublishOutcome::Failed) => text.push_str("### ERROR: GIT FAILED\n"),
            None => {}
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_follow_event_order() {
        let mut report = RunReport::new("2023-01-02");
        report.record(RunEvent::Added {
            filename: "a.html".into(),
        });
        report.record(RunEvent::Failed {
            filename: "b.pdf".into(),
            message: "HTTP error: 404".into(),
        });
        report.record(RunEvent::Changed {
            filename: "c.html".into(),
        });

        assert_eq!(
            report.log_text(),
            "Added: a.html\n### ERROR: B.PDF\nChange: c.html\n"
        );
    }

    #[test]
    fn no_changes_marker_only_when_set() {
        let mut report = RunReport::new("2023-01-02");
        assert_eq!(report.log_text(), "");

        report.mark_no_changes();
        assert_eq!(report.log_text(), "No changes detected.\n");
    }

    #[test]
    fn publish_markers() {
        let mut report = RunReport::new("2023-01-02");
        report.record(RunEvent::Changed {
            filename: "a.html".into(),
        });
        report.mark_publish(PublishOutcome::Pushed);
        assert_eq!(report.log_text(), "Change: a.html\nGit: Successfully pushed.\n");

        let mut failed = RunReport::new("2023-01-02");
        failed.record(RunEvent::Changed {
            filename: "a.html".into(),
        });
        failed.mark_publish(PublishOutcome::Failed);
        assert_eq!(failed.log_text(), "Change: a.html\n### ERROR: GIT FAILED\n");
    }

    #[test]
    fn files_changed_needs_a_changed_event() {
        let mut report = RunReport::new("2023-01-02");
        report.record(RunEvent::Added {
            filename: "a.html".into(),
        });
        assert!(!report.files_changed());

        report.record(RunEvent::Changed {
            filename: "b.html".into(),
        });
        assert!(report.files_changed());
        assert_eq!(report.added_count(), 1);
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.failed_count(), 0);
    }
}
