use std::path::PathBuf;
use clap::Parser;
use log::LevelFilter;
use featsearch::request::{SearchRequest, SearchRequestBuilderError};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[arg(short, long, help = "BED file with features to search")]
    pub features: PathBuf,

    #[arg(short, long, help = "chrom.sizes file defining chromosome lengths and order. Only the starting chromosome is searched, if not specified.")]
    pub genome: Option<PathBuf>,

    #[arg(short, long, help = "Chromosome to start from")]
    pub chr: String,

    #[arg(short, long, default_value_t = 0, help = "Position to start from (0-based)")]
    pub start: i32,

    #[arg(short, long = "window-size", help = "Window size in bases, 100000 by default")]
    pub window_size: Option<i32>,

    #[arg(short, long = "timeout-ms", help = "Cancel the search after this many milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(short='L', long="loglevel", help="One of \"OFF\", \"ERROR\", \"WARN\", \"INFO\", \"DEBUG\", \"TRACE\". Case-insensitive.")]
    pub log_level: Option<LevelFilter>,

    #[arg(long = "log-file", default_value = "./featsearch.log")]
    pub log_file: PathBuf,
}

impl Args {
    pub fn to_request(&self) -> Result<SearchRequest, SearchRequestBuilderError> {
        let mut builder = SearchRequest::builder()
            .features(self.features.clone())
            .genome(self.genome.clone())
            .chr(self.chr.clone())
            .start(self.start);
        if let Some(window_size) = self.window_size {
            builder = builder.window_size(window_size);
        }
        builder.build()
    }
}
