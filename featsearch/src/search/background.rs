use uuid::Uuid;
use crate::background_process::background_process_builder::BackgroundProcessBuilderError;
use crate::background_process::background_process_handler::BackgroundProcessHandler;
use crate::background_process::run_in_background::RunInBackground;
use crate::background_process::signal::Signal;
use crate::background_process::task_context::TaskContext;
use crate::feature::Feature;
use crate::search::feature_searcher::{FeatureSearcher, TerminalReason};
use crate::search::window::SearchWindow;

pub type SearchSignal = Signal<SearchWindow, TerminalReason>;

/// Runs `searcher` as a background process of `runner`.
///
/// Interrupting the returned handler cancels the search. The listener gets a
/// `Custom` signal for every window before it is queried and `Complete` with
/// the terminal reason at the end. When the genome knows the chromosome being
/// scanned, `Progress` reports how much of it lies behind the window. Features
/// of a successful search are taken from the searcher's
/// [crate::search::SearchHandle].
pub fn search_in_background<F, H, L>(
    searcher: FeatureSearcher<F>,
    runner: &mut H,
    listener: L,
) -> Result<BackgroundProcessHandler, BackgroundProcessBuilderError>
where
    F: Feature + Send + 'static,
    H: RunInBackground,
    L: FnMut(SearchSignal, &Uuid) + 'static,
{
    let description = format!("Searching for next feature from {}", searcher.window());
    let genome = searcher.genome().cloned();
    runner.background_process_builder()
        .with_title("Feature search")
        .with_description(description)
        .with_task(move |ctx: &mut TaskContext<SearchWindow, TerminalReason>| {
            let ctx: &TaskContext<_, _> = ctx;
            searcher.run_with(
                || ctx.interrupted(),
                |window| {
                    if ctx.send_message(window.clone()).is_err() {
                        log::trace!("Nobody listens to search {} anymore", ctx.get_id());
                        return;
                    }
                    if let Some(length) = genome.as_ref().and_then(|g| g.chromosome_length(&window.chr)) {
                        if ctx.update_progress(window.progress(length)).is_err() {
                            log::trace!("Progress of search {} not delivered", ctx.get_id());
                        }
                    }
                },
            )
        })
        .with_listener(listener)
        .run()
}
