pub mod window;
pub mod feature_searcher;
pub mod background;

pub use feature_searcher::{FeatureSearcher, SearchError, SearchHandle, SearchOutcome, TerminalReason};
pub use window::{SearchWindow, WindowStep, DEFAULT_SEARCH_WINDOW_SIZE};
