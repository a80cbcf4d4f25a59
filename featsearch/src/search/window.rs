use std::fmt::{Display, Formatter};
use crate::genome::Genome;

/// Window size over which to search, in base pairs.
pub const DEFAULT_SEARCH_WINDOW_SIZE: i32 = 100_000;

/// Marks both bounds of a window once there is nothing left to scan.
pub const EXHAUSTED: i32 = -1;

/// Half-open range `[start, end)` on a chromosome.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SearchWindow {
    pub chr: String,
    pub start: i32,
    pub end: i32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WindowStep {
    Next(SearchWindow),
    Exhausted,
}

impl SearchWindow {
    pub fn new<S: Into<String>>(chr: S, start: i32, window_size: i32) -> Self {
        SearchWindow {
            chr: chr.into(),
            start,
            end: start.saturating_add(window_size),
        }
    }

    pub fn exhausted<S: Into<String>>(chr: S) -> Self {
        SearchWindow {
            chr: chr.into(),
            start: EXHAUSTED,
            end: EXHAUSTED,
        }
    }

    /// Same start, `end` recomputed from `window_size` without clipping.
    pub fn resized(&self, window_size: i32) -> Self {
        Self::new(self.chr.clone(), self.start, window_size)
    }

    /// Clips `end` to `length`, never below `start`.
    pub fn clipped(mut self, length: i32) -> Self {
        self.end = self.end.min(length.max(self.start));
        self
    }

    /// Percent of a chromosome of `length` that lies before this window.
    pub fn progress(&self, length: i32) -> u8 {
        if length <= 0 {
            return 100;
        }
        (i64::from(self.start.max(0)) * 100 / i64::from(length)).min(100) as u8
    }

    pub fn is_exhausted(&self) -> bool {
        self.start == EXHAUSTED && self.end == EXHAUSTED
    }
}

impl Display for SearchWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}

/// Upper bound for window starts on `chr`: the chromosome length when the
/// genome knows it, otherwise a ceiling that keeps `start + window_size` from
/// overflowing.
pub fn max_coord(chr: &str, window_size: i32, genome: Option<&dyn Genome>) -> i32 {
    genome
        .and_then(|g| g.chromosome_length(chr))
        .unwrap_or(i32::MAX - window_size)
}

/// Computes the window that follows `window`.
///
/// The start moves forward by `window_size`. When it reaches the end of the
/// chromosome the scan continues from position 0 of the next chromosome in the
/// genome's order. Without a genome, or after the last chromosome, the search
/// space is exhausted.
pub fn advance(window: &SearchWindow, window_size: i32, genome: Option<&dyn Genome>) -> WindowStep {
    let mut chr = window.chr.clone();
    let mut start = window.start.saturating_add(window_size);
    let mut max = max_coord(&chr, window_size, genome);

    if start >= max {
        match genome.and_then(|g| g.next_chromosome_name(&chr)) {
            None => return WindowStep::Exhausted,
            Some(next) => {
                start = 0;
                max = max_coord(&next, window_size, genome);
                chr = next;
            }
        }
    }

    let end = start.saturating_add(window_size).min(max);
    WindowStep::Next(SearchWindow { chr, start, end })
}

#[cfg(test)]
#[path = "./window_tests.rs"]
mod window_tests;
