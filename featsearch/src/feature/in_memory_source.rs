use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use crate::feature::bed::{read_bed, BedError};
use crate::feature::{BasicFeature, Feature, FeatureIter, FeatureSource, FeatureTrack};

/// Features held in memory, grouped by chromosome and ordered by start.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFeatureSource {
    features: HashMap<String, Arc<Vec<BasicFeature>>>,
}

impl InMemoryFeatureSource {
    pub fn new<I: IntoIterator<Item = BasicFeature>>(features: I) -> Self {
        let mut grouped: HashMap<String, Vec<BasicFeature>> = HashMap::new();
        for feature in features {
            grouped.entry(feature.chr().to_string()).or_default().push(feature);
        }
        let features = grouped.into_iter()
            .map(|(chr, mut v)| {
                v.sort_by_key(|f| (f.start(), f.end()));
                (chr, Arc::new(v))
            })
            .collect();
        InMemoryFeatureSource { features }
    }

    pub fn from_bed<R: BufRead>(reader: R) -> Result<Self, BedError> {
        let features = read_bed(reader)?;
        log::debug!("Loaded {} features", features.len());
        Ok(Self::new(features))
    }

    pub fn len(&self) -> usize {
        self.features.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn overlapping(&self, chr: &str, start: i32, end: i32) -> Option<FeatureIter<BasicFeature>> {
        let features = Arc::clone(self.features.get(chr)?);
        let n = features.len();
        let iter = (0..n)
            .map(move |i| features[i].clone())
            .take_while(move |f| f.start() < end)
            .filter(move |f| f.overlaps(start, end));
        Some(Box::new(iter))
    }
}

impl FeatureSource<BasicFeature> for InMemoryFeatureSource {
    /// Unknown chromosomes yield `Ok(None)`.
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Option<FeatureIter<BasicFeature>>> {
        Ok(self.overlapping(chr, start, end))
    }
}

impl FeatureTrack<BasicFeature> for InMemoryFeatureSource {
    fn get_features(&self, chr: &str, start: i32, end: i32) -> std::io::Result<Vec<BasicFeature>> {
        Ok(self.overlapping(chr, start, end)
            .map(|iter| iter.collect())
            .unwrap_or_default())
    }
}
