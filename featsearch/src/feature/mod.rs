use std::fmt::{Display, Formatter};

pub mod bed;
pub mod in_memory_source;

pub use in_memory_source::InMemoryFeatureSource;

/// Lazy sequence of features as handed out by a [FeatureSource].
pub type FeatureIter<F> = Box<dyn Iterator<Item = F> + Send>;

/// Anything located on a chromosome, half-open `[start, end)`.
pub trait Feature {
    fn chr(&self) -> &str;

    fn start(&self) -> i32;

    fn end(&self) -> i32;

    /// A zero-length feature (an insertion point) overlaps the windows that
    /// contain its position.
    fn overlaps(&self, start: i32, end: i32) -> bool {
        if self.start() == self.end() {
            return start <= self.start() && self.start() < end;
        }
        self.start() < end && self.end() > start
    }
}

/// Produces the features overlapping `[start, end)` of `chr`.
///
/// `Ok(None)` and an empty iterator both mean "nothing here". Errors are
/// I/O-class failures of the underlying storage.
pub trait FeatureSource<F>: Send + Sync {
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Option<FeatureIter<F>>>;
}

/// A displayed track. Unlike [FeatureSource] it hands out fully materialized
/// lists.
pub trait FeatureTrack<F>: Send + Sync {
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Vec<F>>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BasicFeature {
    chr: String,
    start: i32,
    end: i32,
    name: Option<String>,
}

impl BasicFeature {
    pub fn new<S: Into<String>>(chr: S, start: i32, end: i32) -> Self {
        BasicFeature {
            chr: chr.into(),
            start,
            end,
            name: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name.replace(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Feature for BasicFeature {
    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> i32 {
        self.start
    }

    fn end(&self) -> i32 {
        self.end
    }
}

impl Display for BasicFeature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)?;
        if let Some(name) = &self.name {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}
