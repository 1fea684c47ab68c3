use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use enzprop::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_steps } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(total_steps);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::Comparisons {
                    processed,
                    total,
                    edges,
                } => {
                    pb_guard.set_length(total);
                    pb_guard.set_position(processed);
                    pb_guard.set_message(format!("{} edges", edges));
                }
                Progress::Voting {
                    processed,
                    total,
                    predictions,
                } => {
                    pb_guard.set_length(total);
                    pb_guard.set_position(processed);
                    pb_guard.set_message(format!("{} predicted", predictions));
                }
                Progress::TaskFinish => {
                    if pb_guard.position() < pb_guard.length().unwrap_or(0) {
                        pb_guard.set_position(pb_guard.length().unwrap_or(0));
                    }
                    pb_guard.finish();
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    // The template engine writes into a String buffer, which cannot fail.
                    write!(w, "{:.1}s", state.eta().as_secs_f64()).ok();
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn comparison_events_move_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Comparing Proteins",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Comparing Proteins");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 6 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(6));
            assert_eq!(pb.position(), 0);
        }

        callback(Progress::Comparisons {
            processed: 4,
            total: 6,
            edges: 2,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.position(), 4);
            assert_eq!(pb.message(), "2 edges");
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 6);
        }

        callback(Progress::PhaseFinish);
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.message(), "✓ Done");
    }

    #[test]
    fn voting_events_report_prediction_counts() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::TaskStart { total_steps: 10 });
        callback(Progress::Voting {
            processed: 3,
            total: 10,
            predictions: 1,
        });
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.message(), "1 predicted");
    }

    #[test]
    fn bar_style_renders_the_eta_key() {
        let pb = ProgressBar::hidden().with_style(CliProgressHandler::bar_style());
        pb.set_length(10);
        pb.set_position(5);
        assert_eq!(pb.position(), 5);
        pb.finish();
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Thread Test",
            });
            callback(Progress::Voting {
                processed: 1,
                total: 2,
                predictions: 0,
            });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }
}
