//! Cancellable search for the next genomic feature.
//!
//! A [search::FeatureSearcher] walks forward through fixed-size windows of a
//! genome, asking a [feature::FeatureSource] for features in each window,
//! until it finds some, runs out of chromosomes, or is cancelled.

pub mod background_process;
pub mod feature;
pub mod genome;
pub mod request;
pub mod search;
pub mod utils;

#[cfg(test)]
mod test_extensions;
