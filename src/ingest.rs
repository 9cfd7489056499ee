use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use anyhow::Result;
use thiserror::Error;

use crate::layout::Item;
use crate::source::{ItemSource, Status};

/// Lifecycle of one dataset ingest.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    /// Created, not started
    Queued,
    /// Loading; progress in percent, never decreasing
    Uploading { progress: f32 },
    /// Loaded successfully
    Completed { items: usize },
    /// Loading failed
    Failed { message: String },
}

/// Input driving a [`TaskState`] transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Start,
    Progress(f32),
    Finish { items: usize },
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("illegal task transition: {event} while {from}")]
    IllegalTransition {
        from: &'static str,
        event: &'static str,
    },
}

impl TaskState {
    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Uploading { .. } => "uploading",
            TaskState::Completed { .. } => "completed",
            TaskState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed { .. } | TaskState::Failed { .. })
    }

    /// The state after `event`, or an error if `event` is not allowed here.
    pub fn apply(&self, event: TaskEvent) -> std::result::Result<TaskState, TaskError> {
        match (self, event) {
            (TaskState::Queued, TaskEvent::Start) => Ok(TaskState::Uploading { progress: 0.0 }),
            (TaskState::Uploading { progress }, TaskEvent::Progress(p)) => Ok(TaskState::Uploading {
                // f32::max ignores NaN, so a NaN report leaves progress unchanged
                progress: progress.max(p.clamp(0.0, 100.0)),
            }),
            (TaskState::Uploading { .. }, TaskEvent::Finish { items }) => {
                Ok(TaskState::Completed { items })
            }
            (TaskState::Queued | TaskState::Uploading { .. }, TaskEvent::Fail(message)) => {
                Ok(TaskState::Failed { message })
            }
            (from, event) => Err(TaskError::IllegalTransition {
                from: from.name(),
                event: event.name(),
            }),
        }
    }
}

impl TaskEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::Start => "start",
            TaskEvent::Progress(_) => "progress",
            TaskEvent::Finish { .. } => "finish",
            TaskEvent::Fail(_) => "fail",
        }
    }
}

/// Sent on every state change of an [`IngestTask`].
#[derive(Debug, Clone, PartialEq)]
pub struct IngestUpdate {
    pub task_id: u64,
    pub state: TaskState,
}

/// Loads items from a source while publishing its [`TaskState`].
pub struct IngestTask {
    id: u64,
    source: Box<dyn ItemSource + Send>,
    state: TaskState,
}

impl IngestTask {
    pub fn new(id: u64, source: Box<dyn ItemSource + Send>) -> Self {
        Self {
            id,
            source,
            state: TaskState::Queued,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Run the load on the current thread. Progress is published in whole-percent steps.
    pub fn run(&mut self, updates: &Sender<IngestUpdate>) -> Result<Vec<Item<Status>>> {
        tracing::info!("Ingest task {} started: {}", self.id, self.source.describe());
        advance(self.id, &mut self.state, TaskEvent::Start, updates)?;

        let id = self.id;
        let state = &mut self.state;
        let mut last_sent = 0.0f32;
        let loaded = self.source.load(&mut |p| {
            if p < last_sent + 1.0 && p < 100.0 {
                return;
            }
            if let TaskState::Uploading { progress } = &*state {
                if p <= *progress {
                    return;
                }
            }
            last_sent = p;
            if let Err(e) = advance(id, state, TaskEvent::Progress(p), updates) {
                tracing::warn!("Ingest task {}: {}", id, e);
            }
        });

        match loaded {
            Ok(items) => {
                advance(
                    self.id,
                    &mut self.state,
                    TaskEvent::Finish { items: items.len() },
                    updates,
                )?;
                tracing::info!("Ingest task {} completed: {} items", self.id, items.len());
                Ok(items)
            }
            Err(e) => {
                tracing::error!("Ingest task {} failed: {:#}", self.id, e);
                advance(
                    self.id,
                    &mut self.state,
                    TaskEvent::Fail(format!("{:#}", e)),
                    updates,
                )?;
                Err(e)
            }
        }
    }

    /// Run the load on a background thread.
    pub fn spawn(mut self, updates: Sender<IngestUpdate>) -> JoinHandle<Result<Vec<Item<Status>>>> {
        std::thread::spawn(move || self.run(&updates))
    }
}

fn advance(
    task_id: u64,
    state: &mut TaskState,
    event: TaskEvent,
    updates: &Sender<IngestUpdate>,
) -> std::result::Result<(), TaskError> {
    *state = state.apply(event)?;
    // Nobody listening is fine; the task still runs to completion.
    let _ = updates.send(IngestUpdate {
        task_id,
        state: state.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use std::sync::mpsc;

    struct BrokenSource;

    impl ItemSource for BrokenSource {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn load(&self, progress: &mut dyn FnMut(f32)) -> Result<Vec<Item<Status>>> {
            progress(40.0);
            anyhow::bail!("camera 3 not responding")
        }
    }

    struct SteppedSource;

    impl ItemSource for SteppedSource {
        fn describe(&self) -> String {
            "stepped".to_string()
        }

        fn load(&self, progress: &mut dyn FnMut(f32)) -> Result<Vec<Item<Status>>> {
            for p in [10.0, 10.4, 5.0, 55.0, 100.0] {
                progress(p);
            }
            Ok(vec![Item::new("Cod", 1.0, Status::Native)])
        }
    }

    fn states(rx: &mpsc::Receiver<IngestUpdate>) -> Vec<TaskState> {
        rx.try_iter().map(|u| u.state).collect()
    }

    #[test]
    fn legal_path() {
        let s = TaskState::Queued;
        let s = s.apply(TaskEvent::Start).unwrap();
        let s = s.apply(TaskEvent::Progress(67.0)).unwrap();
        assert_eq!(s, TaskState::Uploading { progress: 67.0 });
        let s = s.apply(TaskEvent::Finish { items: 5 }).unwrap();
        assert_eq!(s, TaskState::Completed { items: 5 });
        assert!(s.is_terminal());
    }

    #[test]
    fn progress_never_regresses_and_is_clamped() {
        let s = TaskState::Uploading { progress: 50.0 };
        assert_eq!(
            s.apply(TaskEvent::Progress(20.0)).unwrap(),
            TaskState::Uploading { progress: 50.0 }
        );
        assert_eq!(
            s.apply(TaskEvent::Progress(250.0)).unwrap(),
            TaskState::Uploading { progress: 100.0 }
        );
        assert_eq!(
            s.apply(TaskEvent::Progress(f32::NAN)).unwrap(),
            TaskState::Uploading { progress: 50.0 }
        );
    }

    #[test]
    fn illegal_transitions_rejected() {
        let err = TaskState::Queued
            .apply(TaskEvent::Finish { items: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::IllegalTransition {
                from: "queued",
                event: "finish"
            }
        );
        let done = TaskState::Completed { items: 1 };
        assert!(done.apply(TaskEvent::Fail("late".into())).is_err());
        assert!(done.apply(TaskEvent::Start).is_err());
        assert!(TaskState::Uploading { progress: 0.0 }
            .apply(TaskEvent::Start)
            .is_err());
    }

    #[test]
    fn queued_task_can_fail() {
        let s = TaskState::Queued.apply(TaskEvent::Fail("cancelled".into())).unwrap();
        assert_eq!(s.name(), "failed");
    }

    #[test]
    fn run_publishes_every_transition() {
        let (tx, rx) = mpsc::channel();
        let mut task = IngestTask::new(7, Box::new(StaticSource::species_sample()));
        let items = task.run(&tx).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(task.state(), &TaskState::Completed { items: 5 });
        assert_eq!(
            states(&rx),
            vec![
                TaskState::Uploading { progress: 0.0 },
                TaskState::Uploading { progress: 100.0 },
                TaskState::Completed { items: 5 },
            ]
        );
    }

    #[test]
    fn small_and_backward_steps_are_not_published() {
        let (tx, rx) = mpsc::channel();
        let mut task = IngestTask::new(1, Box::new(SteppedSource));
        task.run(&tx).unwrap();
        let progress: Vec<f32> = states(&rx)
            .into_iter()
            .filter_map(|s| match s {
                TaskState::Uploading { progress } => Some(progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![0.0, 10.0, 55.0, 100.0]);
    }

    #[test]
    fn failed_load_ends_in_failed_state() {
        let (tx, rx) = mpsc::channel();
        let handle = IngestTask::new(2, Box::new(BrokenSource)).spawn(tx);
        let err = handle.join().unwrap().unwrap_err();
        assert!(err.to_string().contains("camera 3"));
        let last = states(&rx).pop().unwrap();
        assert_eq!(
            last,
            TaskState::Failed {
                message: "camera 3 not responding".to_string()
            }
        );
    }
}
