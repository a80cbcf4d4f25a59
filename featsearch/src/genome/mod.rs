//! Chromosome coordinate space: chromosome lengths and the order in which
//! chromosomes are visited.

use std::collections::HashMap;
use std::io::BufRead;
use thiserror::Error;

/// Supplies chromosome lengths and chromosome iteration order.
pub trait Genome: Send + Sync {
    /// Length of the chromosome in bases, `None` if the chromosome is unknown.
    fn chromosome_length(&self, chr: &str) -> Option<i32>;

    /// The chromosome following `chr`, `None` for the last (or an unknown) one.
    fn next_chromosome_name(&self, chr: &str) -> Option<String>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chromosome {
    pub name: String,
    pub length: i32,
}

/// In-memory genome. Chromosomes are visited in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct ChromosomeList {
    chromosomes: Vec<Chromosome>,
    index: HashMap<String, usize>,
}

#[derive(Error, Debug)]
pub enum ChromSizesError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Line {line}: expected '<name> <length>', got {content:?}")]
    Malformed {
        line: usize,
        content: String,
    },
    #[error("Line {line}: invalid chromosome length {value:?}")]
    InvalidLength {
        line: usize,
        value: String,
    },
}

impl ChromosomeList {
    pub fn new() -> Self {
        ChromosomeList::default()
    }

    /// Adds a chromosome to the end of the iteration order. Re-adding a known
    /// chromosome only updates its length.
    pub fn add<S: Into<String>>(&mut self, name: S, length: i32) {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            self.chromosomes[i].length = length;
        } else {
            self.index.insert(name.clone(), self.chromosomes.len());
            self.chromosomes.push(Chromosome { name, length });
        }
    }

    pub fn with<S: Into<String>>(mut self, name: S, length: i32) -> Self {
        self.add(name, length);
        self
    }

    pub fn get(&self, chr: &str) -> Option<&Chromosome> {
        self.index.get(chr).map(|&i| &self.chromosomes[i])
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Reads a UCSC `chrom.sizes` file: one `name<whitespace>length` pair per
    /// line. Blank lines and lines starting with `#` are skipped, extra columns
    /// are ignored.
    pub fn from_chrom_sizes<R: BufRead>(reader: R) -> Result<Self, ChromSizesError> {
        let mut list = ChromosomeList::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut columns = trimmed.split_whitespace();
            let (Some(name), Some(length)) = (columns.next(), columns.next()) else {
                return Err(ChromSizesError::Malformed {
                    line: line_number,
                    content: line.clone(),
                });
            };
            let length = length.parse::<i32>()
                .ok()
                .filter(|l| *l >= 0)
                .ok_or_else(|| ChromSizesError::InvalidLength {
                    line: line_number,
                    value: length.to_string(),
                })?;
            list.add(name, length);
        }
        log::debug!("Loaded {} chromosomes", list.len());
        Ok(list)
    }
}

impl Genome for ChromosomeList {
    fn chromosome_length(&self, chr: &str) -> Option<i32> {
        self.get(chr).map(|c| c.length)
    }

    fn next_chromosome_name(&self, chr: &str) -> Option<String> {
        self.index.get(chr)
            .and_then(|&i| self.chromosomes.get(i + 1))
            .map(|c| c.name.clone())
    }
}
