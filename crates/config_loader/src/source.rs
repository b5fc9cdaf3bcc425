//! Streaming job source over a JSON record stream
//!
//! Reads one record per `next_job` call. Records are validated as they are
//! read; the first malformed record ends the source with an error.

use std::io::Read;

use contracts::{ContractError, JobDescriptor, JobRecord, JobSource};
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;

use crate::parser::record_error;
use crate::validator::validate_record;

/// Job source reading JSON job records from any reader
pub struct RecordStreamSource<R: Read> {
    records: StreamDeserializer<'static, IoRead<R>, JobRecord>,
    position: usize,
}

impl<R: Read> RecordStreamSource<R> {
    /// Create a source over `reader`
    pub fn new(reader: R) -> Self {
        Self {
            records: serde_json::Deserializer::from_reader(reader).into_iter(),
            position: 0,
        }
    }
}

impl<R: Read> JobSource for RecordStreamSource<R> {
    fn next_job(&mut self) -> Result<Option<JobDescriptor>, ContractError> {
        let Some(next) = self.records.next() else {
            return Ok(None);
        };

        let idx = self.position;
        self.position += 1;

        let record = next.map_err(|e| record_error(idx, e))?;
        validate_record(idx, &record)?;
        Ok(Some(record.into()))
    }
}
