//! Page engagement observers.
//!
//! These watch scroll position and time on page and turn threshold crossings
//! into tracking events. They know nothing about the cart. Each threshold
//! fires at most once per observer.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::tracking::{Tracker, TrackingEvent};

/// Scroll-depth thresholds, in percent of the scrollable height.
pub const SCROLL_THRESHOLDS: [u8; 4] = [25, 50, 75, 100];

/// How often dwell time is sampled.
pub const DWELL_TICK: Duration = Duration::from_secs(10);

/// Dwell thresholds and the label reported for each.
pub const DWELL_THRESHOLDS: [(Duration, &str); 2] = [
    (Duration::from_secs(30), "30_seconds"),
    (Duration::from_secs(60), "1_minute"),
];

/// Emits a `ScrollDepth` event the first time each threshold is reached.
#[derive(Debug, Default)]
pub struct ScrollDepthObserver {
    reached: [bool; SCROLL_THRESHOLDS.len()],
}

impl ScrollDepthObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a scroll position and return the thresholds newly crossed.
    ///
    /// `scroll_y` is the top of the viewport, `document_height` the full page
    /// height and `viewport_height` the visible height, all in pixels. A page
    /// that does not scroll counts as fully read.
    pub fn observe(
        &mut self,
        scroll_y: f64,
        document_height: f64,
        viewport_height: f64,
    ) -> Vec<TrackingEvent> {
        let scrollable = document_height - viewport_height;
        let percent = if scrollable <= 0.0 {
            100.0
        } else {
            (scroll_y / scrollable) * 100.0
        };

        SCROLL_THRESHOLDS
            .iter()
            .zip(self.reached.iter_mut())
            .filter_map(|(&threshold, reached)| {
                if *reached || percent < f64::from(threshold) {
                    return None;
                }
                *reached = true;
                Some(TrackingEvent::ScrollDepth { percent: threshold })
            })
            .collect()
    }

    /// Like [`observe`](Self::observe), recording the events on `tracker`.
    pub fn observe_and_track(
        &mut self,
        tracker: &Tracker,
        scroll_y: f64,
        document_height: f64,
        viewport_height: f64,
    ) {
        for event in self.observe(scroll_y, document_height, viewport_height) {
            tracker.record(&event);
        }
    }
}

/// Emits `EngagementTime` events as time on page accumulates.
#[derive(Debug, Default)]
pub struct DwellTimeObserver {
    elapsed: Duration,
    fired: [bool; DWELL_THRESHOLDS.len()],
}

impl DwellTimeObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every threshold has fired.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.fired.iter().all(|&fired| fired)
    }

    /// Advance the clock by one tick and return the thresholds newly reached.
    pub fn tick(&mut self, step: Duration) -> Vec<TrackingEvent> {
        self.elapsed += step;
        let elapsed = self.elapsed;

        DWELL_THRESHOLDS
            .iter()
            .zip(self.fired.iter_mut())
            .filter_map(|(&(threshold, label), fired)| {
                if *fired || elapsed < threshold {
                    return None;
                }
                *fired = true;
                Some(TrackingEvent::EngagementTime { label })
            })
            .collect()
    }

    /// Spawn a task that ticks every [`DWELL_TICK`] and records events on
    /// `tracker`, ending once every threshold has fired.
    ///
    /// Must be called from within a tokio runtime. Aborting the handle stops
    /// tracking; thresholds not yet reached are never reported.
    #[must_use]
    pub fn spawn(tracker: Tracker) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut observer = Self::new();
            let mut interval = tokio::time::interval(DWELL_TICK);
            // The first tick completes immediately.
            interval.tick().await;
            while !observer.is_done() {
                interval.tick().await;
                for event in observer.tick(DWELL_TICK) {
                    tracker.record(&event);
                }
            }
            tracing::debug!("Dwell-time tracking finished");
        })
    }
}
