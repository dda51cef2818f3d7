use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use flowdag::task::{Inputs, Payload, Task, TaskOutput};

/// Start or end of one task body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Shared, ordered record of what the recording tasks did.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(name) => Some(name),
                Event::Finished(_) => None,
            })
            .collect()
    }

    /// How many times each task body was entered.
    pub fn run_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for name in self.started() {
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }

    pub fn index_of(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// `true` if `first` finished before `second` started.
    pub fn finished_before_started(&self, first: &str, second: &str) -> bool {
        match (
            self.index_of(&Event::Finished(first.to_string())),
            self.index_of(&Event::Started(second.to_string())),
        ) {
            (Some(f), Some(s)) => f < s,
            _ => false,
        }
    }
}

/// `"name(dep1,dep2)"`, with `-` for an absent input.
fn describe(name: &str, inputs: &Inputs) -> String {
    let parts: Vec<String> = inputs
        .iter()
        .map(|(_, p)| {
            p.and_then(|p| p.as_text())
                .map(str::to_string)
                .unwrap_or_else(|| "-".to_string())
        })
        .collect();
    format!("{name}({})", parts.join(","))
}

/// Async task that logs its start and end and sleeps `delay` in between.
///
/// Its result text names itself and echoes its inputs in the order they were
/// delivered.
pub fn recording_task(name: &str, deps: &[&str], log: &ExecutionLog, delay: Duration) -> Task {
    let task_name = name.to_string();
    let log = log.clone();

    Task::concurrent(name, move |inputs| {
        let name = task_name.clone();
        let log = log.clone();
        async move {
            log.record(Event::Started(name.clone()));
            tokio::time::sleep(delay).await;
            let text = describe(&name, &inputs);
            log.record(Event::Finished(name));
            Ok::<_, anyhow::Error>(TaskOutput::new(Payload::Text(text), 1, 0))
        }
    })
    .after(deps.iter().copied())
}

/// Like [`recording_task`] but runs on a blocking worker thread.
pub fn blocking_recording_task(
    name: &str,
    deps: &[&str],
    log: &ExecutionLog,
    delay: Duration,
) -> Task {
    let task_name = name.to_string();
    let log = log.clone();

    Task::blocking(name, move |inputs| {
        log.record(Event::Started(task_name.clone()));
        std::thread::sleep(delay);
        let text = describe(&task_name, &inputs);
        log.record(Event::Finished(task_name.clone()));
        Ok(TaskOutput::new(Payload::Text(text), 1, 0))
    })
    .after(deps.iter().copied())
}

/// Task whose body always returns an error after logging its start.
pub fn failing_task(name: &str, deps: &[&str], log: &ExecutionLog) -> Task {
    let task_name = name.to_string();
    let log = log.clone();

    Task::blocking(name, move |_| {
        log.record(Event::Started(task_name.clone()));
        bail!("{task_name} failed on purpose")
    })
    .after(deps.iter().copied())
}
