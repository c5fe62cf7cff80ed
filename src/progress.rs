//! Cosmetic "still working" spinner shown while ffmpeg runs.
//!
//! The spinner carries no real progress information. Its ticker thread belongs to
//! the [`ProgressIndicator`] guard and is joined when the guard is finished or
//! dropped, so nothing keeps ticking after the awaited process has exited.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub const GLYPHS: [&str; 4] = ["▌", "▀", "▐", "▄"];

// indicatif shows the last tick string once the spinner is finished.
const FINISHED_GLYPH: &str = "■";

pub struct ProgressIndicator {
    bar: ProgressBar,
    stop_tx: Option<Sender<()>>,
    ticker: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl ProgressIndicator {
    /// Starts a spinner drawn on stderr with `label` as its static suffix.
    pub fn start(label: impl Into<String>) -> Self {
        Self::start_with(ProgressBar::new_spinner(), label.into())
    }

    /// Same ticking behaviour, nothing drawn.
    pub fn start_hidden(label: impl Into<String>) -> Self {
        Self::start_with(ProgressBar::hidden(), label.into())
    }

    fn start_with(bar: ProgressBar, label: String) -> Self {
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&tick_strings());
        bar.set_style(style);
        bar.set_message(label);

        let ticks = Arc::new(AtomicU64::new(0));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let ticker_bar = bar.clone();
        let ticker_ticks = ticks.clone();
        let ticker = thread::spawn(move || loop {
            ticker_bar.tick();
            ticker_ticks.fetch_add(1, Ordering::SeqCst);
            match stop_rx.recv_timeout(TICK_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => continue,
                // Explicit stop or the guard went away.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            bar,
            stop_tx: Some(stop_tx),
            ticker: Some(ticker),
            ticks,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Stops the ticker, clears the spinner line and returns the number of ticks drawn.
    pub fn finish(mut self) -> u64 {
        self.stop();
        self.ticks()
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
            self.bar.finish_and_clear();
        }
    }
}

fn tick_strings() -> Vec<&'static str> {
    GLYPHS.iter().copied().chain([FINISHED_GLYPH]).collect()
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}
