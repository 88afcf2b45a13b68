//! Progress bars for downloads and dataset reads

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::borrow::Cow;

/// Progress report of ongoing dataset operations
///
/// To avoid corrupted terminal output, nothing should be written to stdout or
/// stderr while a report is being displayed. Use logs instead.
#[derive(Clone, Debug, Default)]
pub struct ProgressReport(MultiProgress);
//
impl ProgressReport {
    /// Report progress on the terminal
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that tracks progress without drawing anything
    ///
    /// Meant for library users who have no terminal to draw on, and tests.
    pub fn hidden() -> Self {
        Self(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    /// Start tracking an operation
    ///
    /// Operations of unknown size (zero work) are tracked, but not displayed.
    pub fn add(&self, what: impl Into<Cow<'static, str>>, config: ProgressConfig) -> ProgressTracker {
        let ProgressConfig { work, show_rate } = config;
        let trailer = match (work, show_rate) {
            (Work::Steps(_), false) => "{pos}/{len}",
            (Work::Steps(_), true) => "{pos}/{len} ({per_sec}, ~{eta} left)",
            (Work::Bytes(_), false) => "{decimal_bytes}/{decimal_total_bytes}",
            (Work::Bytes(_), true) => {
                "{decimal_bytes}/{decimal_total_bytes} ({decimal_bytes_per_sec})"
            }
        };
        let bar = ProgressBar::new(work.amount())
            .with_prefix(what.into())
            .with_style(
                ProgressStyle::with_template(&format!("{{prefix}} {{wide_bar}} {trailer}"))
                    .expect("all styles above should be valid indicatif styles"),
            );
        let displayed = work.amount() > 0;
        if displayed {
            self.0.add(bar.clone());
        }
        ProgressTracker {
            bar,
            report: self.0.clone(),
            displayed,
        }
    }
}

/// Progress bar configuration
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProgressConfig {
    /// Amount of work to be done
    work: Work,

    /// Show the completion rate
    show_rate: bool,
}
//
impl ProgressConfig {
    /// Default configuration for some amount of work
    pub fn new(work: Work) -> Self {
        Self {
            work,
            show_rate: true,
        }
    }

    /// Disable display of the completion rate
    pub fn dont_show_rate(self) -> Self {
        Self {
            show_rate: false,
            ..self
        }
    }
}

/// Work whose progression can be tracked
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Work {
    /// Steps to be taken, e.g. product files from a review archive
    Steps(u64),

    /// Bytes to be downloaded or read
    Bytes(u64),
}
//
impl Work {
    /// Length of the progress bar
    fn amount(self) -> u64 {
        match self {
            Work::Steps(amount) | Work::Bytes(amount) => amount,
        }
    }
}

/// Progress bar of one operation
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    bar: ProgressBar,
    report: MultiProgress,

    /// Truth that the bar was added to the report
    displayed: bool,
}
//
impl ProgressTracker {
    /// Show that a certain amount of progress has been made
    pub fn make_progress(&self, progress: u64) {
        self.bar.inc(progress);
    }

    /// Hide the progress bar, whether or not all work was done
    ///
    /// The amount of work may be an estimate, e.g. the compressed size of a
    /// gzipped file, so bars are not hidden automatically once full.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        if self.displayed {
            self.report.remove(&self.bar);
        }
    }
}
