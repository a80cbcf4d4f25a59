use std::io::BufRead;
use thiserror::Error;
use crate::feature::BasicFeature;

#[derive(Error, Debug)]
pub enum BedError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Line {line}: expected at least 3 columns, got {columns}")]
    TooFewColumns {
        line: usize,
        columns: usize,
    },
    #[error("Line {line}: invalid coordinate {value:?}")]
    InvalidCoordinate {
        line: usize,
        value: String,
    },
    #[error("Line {line}: end {end} is less than start {start}")]
    InvertedInterval {
        line: usize,
        start: i32,
        end: i32,
    },
}

/// Reads BED records: `chrom start end [name ...]`, tab or space separated,
/// zero-based half-open coordinates. `#`, `track` and `browser` lines are
/// skipped.
pub fn read_bed<R: BufRead>(reader: R) -> Result<Vec<BasicFeature>, BedError> {
    let mut features = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(feature) = parse_line(&line, i + 1)? {
            features.push(feature);
        }
    }
    Ok(features)
}

fn parse_line(line: &str, line_number: usize) -> Result<Option<BasicFeature>, BedError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_header(trimmed) {
        return Ok(None);
    }
    let columns: Vec<&str> = trimmed.split_whitespace().collect();
    if columns.len() < 3 {
        return Err(BedError::TooFewColumns {
            line: line_number,
            columns: columns.len(),
        });
    }
    let start = parse_coordinate(columns[1], line_number)?;
    let end = parse_coordinate(columns[2], line_number)?;
    if end < start {
        return Err(BedError::InvertedInterval {
            line: line_number,
            start,
            end,
        });
    }
    let feature = BasicFeature::new(columns[0], start, end);
    Ok(Some(match columns.get(3) {
        Some(name) => feature.with_name(*name),
        None => feature,
    }))
}

fn is_header(line: &str) -> bool {
    line.starts_with('#') || matches!(line.split_whitespace().next(), Some("track" | "browser"))
}

fn parse_coordinate(value: &str, line_number: usize) -> Result<i32, BedError> {
    value.parse::<i32>()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| BedError::InvalidCoordinate {
            line: line_number,
            value: value.to_string(),
        })
}
