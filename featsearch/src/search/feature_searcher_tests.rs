use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex};
use std::thread;
use crossbeam_channel::{Receiver, Sender};
use spectral::prelude::*;
use crate::feature::{BasicFeature, FeatureIter, FeatureSource, InMemoryFeatureSource};
use crate::genome::{ChromosomeList, Genome};
use crate::search::feature_searcher::{FeatureSearcher, SearchError, TerminalReason};
use crate::search::window::{SearchWindow, EXHAUSTED};

type Response = std::io::Result<Option<Vec<BasicFeature>>>;

/// Answers every query with `respond` and remembers the queried windows.
struct ScriptedSource<Q> {
    queries: Mutex<Vec<SearchWindow>>,
    respond: Q,
}

impl<Q> ScriptedSource<Q>
where
    Q: Fn(&SearchWindow) -> Response + Send + Sync,
{
    fn new(respond: Q) -> Arc<Self> {
        Arc::new(ScriptedSource {
            queries: Mutex::new(vec![]),
            respond,
        })
    }

    fn queries(&self) -> Vec<SearchWindow> {
        self.queries.lock().unwrap().clone()
    }
}

impl<Q> FeatureSource<BasicFeature> for ScriptedSource<Q>
where
    Q: Fn(&SearchWindow) -> Response + Send + Sync,
{
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Option<FeatureIter<BasicFeature>>> {
        let window = SearchWindow { chr: chr.to_string(), start, end };
        self.queries.lock().unwrap().push(window.clone());
        let features = (self.respond)(&window)?;
        Ok(features.map(|v| Box::new(v.into_iter()) as FeatureIter<BasicFeature>))
    }
}

/// Reports each query on `started` and blocks until the test sends the answer
/// on `release`.
struct BlockingSource {
    started: Sender<SearchWindow>,
    release: Receiver<Response>,
}

impl FeatureSource<BasicFeature> for BlockingSource {
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Option<FeatureIter<BasicFeature>>> {
        self.started.send(SearchWindow { chr: chr.to_string(), start, end }).unwrap();
        let features = self.release.recv().unwrap()?;
        Ok(features.map(|v| Box::new(v.into_iter()) as FeatureIter<BasicFeature>))
    }
}

fn blocking_source() -> (Arc<BlockingSource>, Receiver<SearchWindow>, Sender<Response>) {
    let (started, started_receiver) = crossbeam_channel::unbounded();
    let (release_sender, release) = crossbeam_channel::unbounded();
    (Arc::new(BlockingSource { started, release }), started_receiver, release_sender)
}

fn two_chromosomes() -> Option<Arc<dyn Genome>> {
    Some(Arc::new(ChromosomeList::new()
        .with("chr1", 500_000)
        .with("chr2", 300_000)))
}

fn window(chr: &str, start: i32, end: i32) -> SearchWindow {
    SearchWindow { chr: chr.to_string(), start, end }
}

#[test]
fn test_finds_feature_on_next_chromosome() {
    let hit = BasicFeature::new("chr2", 150_000, 150_100).with_name("hit");
    let expected = hit.clone();
    let source = ScriptedSource::new(move |w| {
        if *w == window("chr2", 100_000, 200_000) {
            Ok(Some(vec![hit.clone()]))
        } else {
            Ok(Some(vec![]))
        }
    });
    let searcher = FeatureSearcher::new(source.clone(), two_chromosomes(), "chr1", 450_000);
    let handle = searcher.handle();

    let reason = searcher.run();

    assert_that(&reason).is_equal_to(TerminalReason::Found);
    assert_that(&source.queries()).is_equal_to(vec![
        window("chr1", 450_000, 500_000),
        window("chr2", 0, 100_000),
        window("chr2", 100_000, 200_000),
    ]);
    assert_that(&handle.is_running()).is_false();
    let outcome = handle.result().unwrap();
    assert_that(&outcome.reason()).is_equal_to(TerminalReason::Found);
    assert_that(outcome.window()).is_equal_to(&window("chr2", 100_000, 200_000));
    let features: Vec<BasicFeature> = outcome.features().unwrap().collect();
    assert_that(&features).is_equal_to(vec![expected]);
}

#[test]
fn test_finds_insertion_on_window_boundary() {
    let source = Arc::new(InMemoryFeatureSource::from_bed("chr1\t100000\t100000\tins\n".as_bytes()).unwrap());
    let searcher = FeatureSearcher::new(source, two_chromosomes(), "chr1", 0);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Found);
    let outcome = handle.result().unwrap();
    assert_that(outcome.window()).is_equal_to(&window("chr1", 100_000, 200_000));
    let features: Vec<BasicFeature> = outcome.features().unwrap().collect();
    assert_that(&features).is_equal_to(vec![BasicFeature::new("chr1", 100_000, 100_000).with_name("ins")]);
}

#[test]
fn test_null_result_is_treated_as_empty() {
    let source = ScriptedSource::new(|w| {
        if w.start == 0 {
            Ok(None)
        } else {
            Ok(Some(vec![BasicFeature::new(w.chr.clone(), w.start, w.start + 1)]))
        }
    });
    let searcher = FeatureSearcher::new(source.clone(), None, "chr1", 0);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Found);
    assert_that(&source.queries()).has_length(2);
    assert_that(&handle.result().map(|o| o.window().clone())).is_some().is_equal_to(window("chr1", 100_000, 200_000));
}

#[test]
fn test_exhausts_all_chromosomes() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let searcher = FeatureSearcher::new(source.clone(), two_chromosomes(), "chr1", 450_000);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Exhausted);
    assert_that(&source.queries()).is_equal_to(vec![
        window("chr1", 450_000, 500_000),
        window("chr2", 0, 100_000),
        window("chr2", 100_000, 200_000),
        window("chr2", 200_000, 300_000),
    ]);
    assert_that(&handle.is_running()).is_false();
    assert_that(&handle.is_cancelled()).is_true();
    let outcome = handle.result().unwrap();
    assert_that(&outcome.is_found()).is_false();
    assert_that(&outcome.window().is_exhausted()).is_true();
    assert_that(&outcome.features().is_none()).is_true();
}

#[test]
fn test_exhausts_coordinate_space_without_genome() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let searcher = FeatureSearcher::new(source.clone(), None, "chr1", 0);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Exhausted);

    let queries = source.queries();
    let ceiling = i32::MAX - 100_000;
    let expected_count = (ceiling as usize).div_ceil(100_000);
    assert_that(&queries).has_length(expected_count);
    assert_that(queries.last().unwrap()).is_equal_to(&window("chr1", (expected_count as i32 - 1) * 100_000, ceiling));
    assert_that(&queries.windows(2).all(|w| w[1].start - w[0].start == 100_000)).is_true();

    let outcome = handle.result().unwrap();
    assert_that(&outcome.reason()).is_equal_to(TerminalReason::Exhausted);
    assert_that(&outcome.window().start).is_equal_to(EXHAUSTED);
    assert_that(&outcome.window().end).is_equal_to(EXHAUSTED);
}

#[test]
fn test_io_error_stops_search() {
    let source = ScriptedSource::new(|_| Err(Error::new(ErrorKind::Other, "disk on fire")));
    let searcher = FeatureSearcher::new(source.clone(), two_chromosomes(), "chr1", 0);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Failed);
    assert_that(&source.queries()).has_length(1);
    assert_that(&handle.is_running()).is_false();
    let outcome = handle.result().unwrap();
    assert_that(&outcome.reason()).is_equal_to(TerminalReason::Failed);
    assert_that(&outcome.features().is_none()).is_true();
}

#[test]
fn test_track_takes_precedence_over_source() {
    let source = Arc::new(InMemoryFeatureSource::new(vec![BasicFeature::new("chr1", 10, 20).with_name("source")]));
    let track = Arc::new(InMemoryFeatureSource::new(vec![BasicFeature::new("chr1", 30, 40).with_name("track")]));
    let searcher = FeatureSearcher::new(source, None, "chr1", 0).with_track(track);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Found);
    let names: Vec<String> = handle.result().unwrap().features().unwrap()
        .filter_map(|f| f.name().map(String::from))
        .collect();
    assert_that(&names).is_equal_to(vec!["track".to_string()]);
}

#[test]
fn test_track_only() {
    let track = Arc::new(InMemoryFeatureSource::new(vec![BasicFeature::new("chr2", 5, 6)]));
    let searcher = FeatureSearcher::for_track(track, two_chromosomes(), "chr1", 0);
    let handle = searcher.handle();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Found);
    assert_that(handle.result().unwrap().window()).is_equal_to(&window("chr2", 0, 100_000));
}

#[test]
fn test_cancel_before_run() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let searcher = FeatureSearcher::new(source.clone(), None, "chr1", 0);
    let handle = searcher.handle();
    handle.cancel();

    assert_that(&searcher.run()).is_equal_to(TerminalReason::Cancelled);
    assert_that(&source.queries()).is_empty();
    let outcome = handle.result().unwrap();
    assert_that(&outcome.reason()).is_equal_to(TerminalReason::Cancelled);
    assert_that(outcome.window()).is_equal_to(&window("chr1", 0, 100_000));
}

#[test]
fn test_external_interruption_cancels() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let searcher = FeatureSearcher::new(source.clone(), None, "chr1", 0);
    let handle = searcher.handle();
    let scanned = Mutex::new(vec![]);

    let reason = searcher.run_with(
        || scanned.lock().unwrap().len() >= 3,
        |w| scanned.lock().unwrap().push(w.clone()),
    );

    assert_that(&reason).is_equal_to(TerminalReason::Cancelled);
    assert_that(&handle.is_cancelled()).is_true();
    assert_that(&source.queries()).is_equal_to(scanned.into_inner().unwrap());
    assert_that(&source.queries()).has_length(3);
}

#[test]
fn test_cancel_during_query_waits_for_query_to_finish() {
    let (source, started, release) = blocking_source();
    let searcher = FeatureSearcher::new(source, two_chromosomes(), "chr1", 0);
    let handle = searcher.handle();
    let worker = thread::spawn(move || searcher.run());

    let first = started.recv().unwrap();
    assert_that(&first).is_equal_to(window("chr1", 0, 100_000));
    assert_that(&handle.is_running()).is_true();
    assert_that(&handle.result().is_none()).is_true();

    handle.cancel();
    assert_that(&handle.is_running()).is_true();
    release.send(Ok(Some(vec![]))).unwrap();

    assert_that(&worker.join().unwrap()).is_equal_to(TerminalReason::Cancelled);
    assert_that(&started.try_recv().is_err()).is_true();
    assert_that(&handle.is_running()).is_false();
    assert_that(&handle.result().map(|o| o.reason())).is_some().is_equal_to(TerminalReason::Cancelled);
}

#[test]
fn test_window_size_change_while_running() {
    let (source, started, release) = blocking_source();
    let searcher = FeatureSearcher::new(source, two_chromosomes(), "chr1", 0);
    let handle = searcher.handle();
    let worker = thread::spawn(move || searcher.run());

    assert_that(&started.recv().unwrap()).is_equal_to(window("chr1", 0, 100_000));
    handle.set_window_size(50_000).unwrap();
    release.send(Ok(Some(vec![]))).unwrap();

    assert_that(&started.recv().unwrap()).is_equal_to(window("chr1", 50_000, 100_000));
    release.send(Ok(Some(vec![BasicFeature::new("chr1", 60_000, 60_001)]))).unwrap();

    assert_that(&worker.join().unwrap()).is_equal_to(TerminalReason::Found);
    assert_that(&handle.window_size()).is_equal_to(50_000);
}

#[test]
fn test_window_size_change_before_run() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let mut searcher = FeatureSearcher::new(source.clone(), None, "chr1", 1_000);
    searcher.set_window_size(10).unwrap();
    assert_that(searcher.window()).is_equal_to(&window("chr1", 1_000, 1_010));
    assert_that(&searcher.window_size()).is_equal_to(10);

    let handle = searcher.handle();
    handle.set_window_size(25).unwrap();
    handle.cancel();
    searcher.run();
    // cancelled before the first query, the pending size never reaches the window
    assert_that(handle.result().unwrap().window()).is_equal_to(&window("chr1", 1_000, 1_010));
}

#[test]
fn test_handle_window_size_applies_to_first_query() {
    let source = ScriptedSource::new(|w| Ok(Some(vec![BasicFeature::new(w.chr.clone(), w.start, w.end)])));
    let searcher = FeatureSearcher::new(source.clone(), None, "chr1", 1_000);
    let handle = searcher.handle();
    handle.set_window_size(25).unwrap();

    searcher.run();
    assert_that(&source.queries()).is_equal_to(vec![window("chr1", 1_000, 1_025)]);
}

#[test]
fn test_invalid_window_size() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let mut searcher = FeatureSearcher::new(source, None, "chr1", 0);
    assert_that(&searcher.set_window_size(0)).is_err_containing(SearchError::InvalidWindowSize(0));
    assert_that(&searcher.handle().set_window_size(-5)).is_err_containing(SearchError::InvalidWindowSize(-5));
    assert_that(&searcher.window_size()).is_equal_to(100_000);
    assert_that(&searcher.handle().window_size()).is_equal_to(100_000);
}

#[test]
fn test_result_is_handed_out_once_and_cancel_after_completion_is_noop() {
    let source = ScriptedSource::new(|w| Ok(Some(vec![BasicFeature::new(w.chr.clone(), w.start, w.end)])));
    let searcher = FeatureSearcher::new(source, None, "chr1", 0);
    let handle = searcher.handle();
    let other = handle.clone();
    assert_that(&handle.result().is_none()).is_true();

    searcher.run();
    handle.cancel();

    assert_that(&other.result().map(|o| o.reason())).is_some().is_equal_to(TerminalReason::Found);
    assert_that(&handle.result().is_none()).is_true();
    assert_that(&handle.is_running()).is_false();
}

#[test]
fn test_initial_window_is_clipped_to_chromosome() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let searcher = FeatureSearcher::new(source, two_chromosomes(), "chr2", 250_000);
    assert_that(searcher.window()).is_equal_to(&window("chr2", 250_000, 300_000));
}

#[test]
fn test_window_size_change_keeps_window_within_chromosome() {
    let source = ScriptedSource::new(|_| Ok(Some(vec![])));
    let mut searcher = FeatureSearcher::new(source, two_chromosomes(), "chr1", 450_000);
    searcher.set_window_size(100_000).unwrap();
    assert_that(searcher.window()).is_equal_to(&window("chr1", 450_000, 500_000));
    searcher.set_window_size(20_000).unwrap();
    assert_that(searcher.window()).is_equal_to(&window("chr1", 450_000, 470_000));
}
