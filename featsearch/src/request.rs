use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use derive_builder::Builder;
use thiserror::Error;
use crate::feature::bed::BedError;
use crate::feature::{BasicFeature, InMemoryFeatureSource};
use crate::genome::{ChromSizesError, ChromosomeList, Genome};
use crate::search::{FeatureSearcher, SearchError, DEFAULT_SEARCH_WINDOW_SIZE};
use crate::utils::measure;

/// Everything needed to set up a search from files on disk.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
pub struct SearchRequest {
    /// BED file with the features to search.
    features: PathBuf,
    /// `chrom.sizes` file. Without it only the starting chromosome is scanned.
    #[builder(default)]
    genome: Option<PathBuf>,
    chr: String,
    #[builder(default)]
    start: i32,
    #[builder(default = "DEFAULT_SEARCH_WINDOW_SIZE")]
    window_size: i32,
}

#[derive(Error, Debug)]
pub enum SearchRequestError {
    #[error("Cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Bad features file: {0}")]
    Features(#[from] BedError),
    #[error("Bad genome file: {0}")]
    Genome(#[from] ChromSizesError),
    #[error("Start position must not be negative, got {0}")]
    NegativeStart(i32),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl SearchRequest {
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    pub fn construct_searcher(&self) -> Result<FeatureSearcher<BasicFeature>, SearchRequestError> {
        if self.start < 0 {
            return Err(SearchRequestError::NegativeStart(self.start));
        }
        let reader = open(&self.features)?;
        let source = measure("Features loaded in", || InMemoryFeatureSource::from_bed(reader))?;
        let genome = match &self.genome {
            Some(path) => {
                let chromosomes = ChromosomeList::from_chrom_sizes(open(path)?)?;
                if let Some(last) = chromosomes.chromosomes().last() {
                    log::debug!("Genome has {} chromosomes, last is {}", chromosomes.len(), last.name);
                }
                let genome: Arc<dyn Genome> = Arc::new(chromosomes);
                Some(genome)
            }
            None => None,
        };
        let mut searcher = FeatureSearcher::new(Arc::new(source), genome, self.chr.clone(), self.start);
        searcher.set_window_size(self.window_size)?;
        log::info!("Search: {}", self);
        Ok(searcher)
    }
}

fn open(path: &PathBuf) -> Result<BufReader<File>, SearchRequestError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SearchRequestError::Open {
            path: path.clone(),
            source,
        })
}

impl Display for SearchRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "features of {:?} from {}:{} in windows of {}", self.features, self.chr, self.start, self.window_size)?;
        if let Some(genome) = &self.genome {
            write!(f, " (genome {:?})", genome)?;
        }
        Ok(())
    }
}
