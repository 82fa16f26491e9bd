use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::io::Read;

/// One accepted-chunk event as replayed from CSV.
///
/// The amount stays a string here; lossless parsing and validation are the
/// intake's job.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ChunkRecord {
    pub destination: String,
    pub amount: String,
}

/// Reads accepted-chunk events from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<ChunkRecord>`.
/// Whitespace trimming and flexible record lengths are handled
/// automatically.
pub struct ChunkReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ChunkReader<R> {
    /// Creates a new `ChunkReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes chunk records,
    /// so large replay files stream without loading into memory.
    pub fn chunks(self) -> impl Iterator<Item = Result<ChunkRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
