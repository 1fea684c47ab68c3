#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    /// Pair comparisons done so far, out of `total`, and edges emitted so far.
    Comparisons { processed: u64, total: u64, edges: u64 },
    /// Unlabeled nodes evaluated so far, out of `total`, and predictions emitted so far.
    Voting {
        processed: u64,
        total: u64,
        predictions: u64,
    },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseFinish);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Comparisons { processed, .. } = event {
                seen.lock().unwrap().push(processed);
            }
        }));
        reporter.report(Progress::Comparisons {
            processed: 10,
            total: 20,
            edges: 1,
        });
        reporter.report(Progress::Message("ignored".to_string()));
        drop(reporter);
        assert_eq!(seen.into_inner().unwrap(), vec![10]);
    }
}
