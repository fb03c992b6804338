use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use updraft_fetch::{FetchPhase, Progress};

const PB_STYLE: &str = "{spinner:.blue} {msg:.cyan} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Progress bar fed by the fetcher's progress callback.
#[derive(Clone)]
pub struct ProgressTracker {
    pb:   ProgressBar,
    name: String,
}

impl ProgressTracker {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let pb = ProgressBar::no_length();

        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        let pb = pb.with_message(name.clone());

        ProgressTracker { pb, name }
    }

    pub fn update(&self, progress: &Progress) {
        if let Some(total) = progress.total_bytes {
            self.pb.set_length(total);
        }

        match progress.phase {
            FetchPhase::Connecting => self.pb.set_message(format!("connecting {}", self.name)),
            FetchPhase::Downloading => {
                self.pb.set_message(self.name.clone());
                self.pb.set_position(progress.bytes_downloaded);
            }
            FetchPhase::Verifying => self.pb.set_message(format!("verifying {}", self.name)),
            FetchPhase::Committing | FetchPhase::Completed => self.pb.set_position(progress.bytes_downloaded),
        }
    }

    pub fn finish(&self, msg: Option<String>) {
        if let Some(msg) = msg {
            self.pb.finish_with_message(msg);
        }
        self.pb.finish();
    }

    pub fn abandon(&self) { self.pb.abandon(); }
}
