use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use crossbeam_channel::{Receiver, Sender};
use metrics::{counter, describe_counter, describe_histogram, Unit};
use thiserror::Error;
use crate::feature::{Feature, FeatureIter, FeatureSource, FeatureTrack};
use crate::genome::Genome;
use crate::search::window::{advance, SearchWindow, WindowStep, DEFAULT_SEARCH_WINDOW_SIZE};
use crate::utils::stat;

const METRIC_QUERY: &str = "FeatureSearcher: query";
const METRIC_WINDOWS: &str = "FeatureSearcher: windows scanned";

/// Why a search stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TerminalReason {
    Found,
    /// No chromosome left to scan.
    Exhausted,
    Cancelled,
    /// The feature source failed. The error has been logged.
    Failed,
}

impl Display for TerminalReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            TerminalReason::Found => "feature found",
            TerminalReason::Exhausted => "search space exhausted",
            TerminalReason::Cancelled => "cancelled",
            TerminalReason::Failed => "feature source failed",
        };
        write!(f, "{}", str)
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum SearchError {
    #[error("Window size must be positive, got {0}")]
    InvalidWindowSize(i32),
}

/// What a finished search leaves behind.
pub struct SearchOutcome<F> {
    reason: TerminalReason,
    window: SearchWindow,
    features: Option<FeatureIter<F>>,
}

impl<F> SearchOutcome<F> {
    pub fn reason(&self) -> TerminalReason {
        self.reason
    }

    /// The window the search stopped at. Exhausted searches end with both
    /// bounds set to [crate::search::window::EXHAUSTED].
    pub fn window(&self) -> &SearchWindow {
        &self.window
    }

    pub fn is_found(&self) -> bool {
        self.features.is_some()
    }

    /// Features of the first non-empty window, `None` unless the reason is
    /// [TerminalReason::Found].
    pub fn features(self) -> Option<FeatureIter<F>> {
        self.features
    }
}

impl<F> Debug for SearchOutcome<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOutcome")
            .field("reason", &self.reason)
            .field("window", &self.window)
            .field("found", &self.is_found())
            .finish()
    }
}

#[derive(Debug)]
struct SearchState {
    running: AtomicBool,
    cancelled: AtomicBool,
    window_size: AtomicI32,
}

impl SearchState {
    fn new(window_size: i32) -> Self {
        SearchState {
            running: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            window_size: AtomicI32::new(window_size),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release)
    }

    fn window_size(&self) -> i32 {
        self.window_size.load(Ordering::Acquire)
    }

    fn set_window_size(&self, window_size: i32) -> Result<(), SearchError> {
        if window_size <= 0 {
            return Err(SearchError::InvalidWindowSize(window_size));
        }
        self.window_size.store(window_size, Ordering::Release);
        Ok(())
    }
}

/// Resets the running flag even if a feature source panics.
struct RunningGuard<'a>(&'a SearchState);

impl<'a> RunningGuard<'a> {
    fn new(state: &'a SearchState) -> Self {
        state.set_running(true);
        RunningGuard(state)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set_running(false);
    }
}

/// Caller's side of a [FeatureSearcher]. Can be cloned and moved to other
/// threads.
pub struct SearchHandle<F> {
    state: Arc<SearchState>,
    outcome: Receiver<SearchOutcome<F>>,
}

impl<F> Clone for SearchHandle<F> {
    fn clone(&self) -> Self {
        SearchHandle {
            state: Arc::clone(&self.state),
            outcome: self.outcome.clone(),
        }
    }
}

impl<F> SearchHandle<F> {
    /// Requests a cooperative stop. A query that is already in flight is not
    /// interrupted; the search stops before issuing the next one. Calling it
    /// after the search has finished has no effect.
    pub fn cancel(&self) {
        log::debug!("Feature search cancellation requested");
        self.state.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    pub fn window_size(&self) -> i32 {
        self.state.window_size()
    }

    /// Takes effect before the next query of a running search.
    pub fn set_window_size(&self, window_size: i32) -> Result<(), SearchError> {
        self.state.set_window_size(window_size)
    }

    /// `None` while the search is running or before it has started. Once the
    /// search has finished, the outcome is handed out exactly once (across all
    /// clones of the handle).
    pub fn result(&self) -> Option<SearchOutcome<F>> {
        if self.is_running() {
            return None;
        }
        self.outcome.try_recv().ok()
    }
}

/// Searches for the next feature by querying a feature source over stepped
/// windows until something is found.
///
/// Windows are scanned strictly forward: by position within a chromosome, then
/// in the genome's chromosome order. Without a genome only the starting
/// chromosome is scanned.
///
/// A searcher runs once: [FeatureSearcher::run] consumes it. Observe and
/// control a running search through a [SearchHandle].
pub struct FeatureSearcher<F> {
    track: Option<Arc<dyn FeatureTrack<F>>>,
    source: Option<Arc<dyn FeatureSource<F>>>,
    genome: Option<Arc<dyn Genome>>,
    window: SearchWindow,
    window_size: i32,
    state: Arc<SearchState>,
    outcome_sender: Sender<SearchOutcome<F>>,
    outcome_receiver: Receiver<SearchOutcome<F>>,
}

impl<F> FeatureSearcher<F>
where
    F: Feature + Send + 'static,
{
    pub fn new<S: Into<String>>(
        source: Arc<dyn FeatureSource<F>>,
        genome: Option<Arc<dyn Genome>>,
        chr: S,
        start: i32,
    ) -> Self {
        Self::create(None, Some(source), genome, chr.into(), start)
    }

    pub fn for_track<S: Into<String>>(
        track: Arc<dyn FeatureTrack<F>>,
        genome: Option<Arc<dyn Genome>>,
        chr: S,
        start: i32,
    ) -> Self {
        Self::create(Some(track), None, genome, chr.into(), start)
    }

    fn create(
        track: Option<Arc<dyn FeatureTrack<F>>>,
        source: Option<Arc<dyn FeatureSource<F>>>,
        genome: Option<Arc<dyn Genome>>,
        chr: String,
        start: i32,
    ) -> Self {
        describe_histogram!(METRIC_QUERY, Unit::Microseconds, "Duration of a single feature query");
        describe_counter!(METRIC_WINDOWS, "Number of windows handed to feature sources");
        let window_size = DEFAULT_SEARCH_WINDOW_SIZE;
        let window = clip_to_chromosome(SearchWindow::new(chr, start, window_size), genome.as_deref());
        let (outcome_sender, outcome_receiver) = crossbeam_channel::bounded(1);
        FeatureSearcher {
            track,
            source,
            genome,
            window,
            window_size,
            state: Arc::new(SearchState::new(window_size)),
            outcome_sender,
            outcome_receiver,
        }
    }

    /// A track takes precedence over a source when both are present.
    pub fn with_track(mut self, track: Arc<dyn FeatureTrack<F>>) -> Self {
        self.track.replace(track);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn FeatureSource<F>>) -> Self {
        self.source.replace(source);
        self
    }

    pub fn genome(&self) -> Option<&Arc<dyn Genome>> {
        self.genome.as_ref()
    }

    /// The window that will be queried next.
    pub fn window(&self) -> &SearchWindow {
        &self.window
    }

    pub fn window_size(&self) -> i32 {
        self.window_size
    }

    /// Changes the scan granularity. The end of the current window is
    /// recomputed from its start right away and kept within the chromosome.
    pub fn set_window_size(&mut self, window_size: i32) -> Result<(), SearchError> {
        self.state.set_window_size(window_size)?;
        self.window_size = window_size;
        self.window = clip_to_chromosome(self.window.resized(window_size), self.genome.as_deref());
        Ok(())
    }

    pub fn handle(&self) -> SearchHandle<F> {
        SearchHandle {
            state: Arc::clone(&self.state),
            outcome: self.outcome_receiver.clone(),
        }
    }

    pub fn run(self) -> TerminalReason {
        self.run_with(|| false, |_| {})
    }

    /// Runs the search on the current thread.
    ///
    /// `is_interrupted` is consulted together with the cancellation flag before
    /// every query. `window_scanned` sees every window right before it is
    /// queried. The outcome is published to the handles before the running
    /// flag drops.
    pub fn run_with<I, W>(mut self, is_interrupted: I, mut window_scanned: W) -> TerminalReason
    where
        I: Fn() -> bool,
        W: FnMut(&SearchWindow),
    {
        let state = Arc::clone(&self.state);
        let _running = RunningGuard::new(&state);
        log::debug!("Searching for next feature starting at {}", self.window);

        let (reason, features) = self.scan(&is_interrupted, &mut window_scanned);
        let outcome = SearchOutcome {
            reason,
            window: self.window.clone(),
            features,
        };
        if let Err(err) = self.outcome_sender.try_send(outcome) {
            log::warn!("Search outcome could not be published: {}", err);
        }
        reason
    }

    fn scan<I, W>(&mut self, is_interrupted: &I, window_scanned: &mut W) -> (TerminalReason, Option<FeatureIter<F>>)
    where
        I: Fn() -> bool,
        W: FnMut(&SearchWindow),
    {
        loop {
            if self.state.is_cancelled() || is_interrupted() {
                self.state.cancel();
                log::info!("Search for next feature cancelled at {}", self.window);
                return (TerminalReason::Cancelled, None);
            }
            self.apply_requested_window_size();

            window_scanned(&self.window);
            counter!(METRIC_WINDOWS).increment(1);
            match self.query() {
                Ok(Some(features)) => {
                    log::info!("Found features in {}", self.window);
                    return (TerminalReason::Found, Some(features));
                }
                Ok(None) => log::trace!("Nothing in {}", self.window),
                Err(err) => {
                    log::error!("Error searching for feature in {}: {}", self.window, err);
                    return (TerminalReason::Failed, None);
                }
            }

            self.window_size = self.state.window_size();
            match advance(&self.window, self.window_size, self.genome.as_deref()) {
                WindowStep::Next(next) => self.window = next,
                WindowStep::Exhausted => {
                    log::info!("No feature after {}, nothing left to search", self.window);
                    self.window = SearchWindow::exhausted(self.window.chr.clone());
                    self.state.cancel();
                    return (TerminalReason::Exhausted, None);
                }
            }
        }
    }

    fn apply_requested_window_size(&mut self) {
        let requested = self.state.window_size();
        if requested != self.window_size {
            log::debug!("Window size changed from {} to {}", self.window_size, requested);
            self.window_size = requested;
            self.window = clip_to_chromosome(self.window.resized(requested), self.genome.as_deref());
        }
    }

    /// Features of the current window, `None` if there are none.
    fn query(&self) -> std::io::Result<Option<FeatureIter<F>>> {
        let features = stat(METRIC_QUERY, &Unit::Microseconds, || self.get_features())?;
        Ok(features.and_then(|features| {
            let mut features = features.peekable();
            let first = features.peek()?;
            log::debug!("First feature {}:{}-{}", first.chr(), first.start(), first.end());
            Some(Box::new(features) as FeatureIter<F>)
        }))
    }

    fn get_features(&self) -> std::io::Result<Option<FeatureIter<F>>> {
        let SearchWindow { chr, start, end } = &self.window;
        if let Some(track) = &self.track {
            let features: FeatureIter<F> = Box::new(track.get_features(chr, *start, *end)?.into_iter());
            return Ok(Some(features));
        }
        if let Some(source) = &self.source {
            return source.get_features(chr, *start, *end);
        }
        panic!("Have no feature track or feature source from which to get features")
    }
}

fn clip_to_chromosome(window: SearchWindow, genome: Option<&dyn Genome>) -> SearchWindow {
    match genome.and_then(|g| g.chromosome_length(&window.chr)) {
        Some(length) => window.clipped(length),
        None => window,
    }
}

#[cfg(test)]
#[path = "./feature_searcher_tests.rs"]
mod feature_searcher_tests;
