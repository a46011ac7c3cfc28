// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! External partition buffer
//!
//! Holds the rows of one partition with random positional access. Rows stay
//! in memory until the byte budget is used up; every row after that is
//! appended to a temporary spill file and read back a page at a time.
//!
//! Spill record layout:
//!
//! ```text
//! +-----------+----------------------+-----------+
//! | len (u32) | encoded row (len B)  | crc32 u32 |
//! +-----------+----------------------+-----------+
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::codec;
use super::config::OverAggregateConfig;
use crate::core::{Error, Result, Row};

/// Decoded spill pages kept around for re-reads
const MAX_CACHED_PAGES: usize = 4;

/// Length prefix plus checksum
const RECORD_OVERHEAD: usize = 8;

/// Rows written past the memory budget
struct SpillFile {
    file: NamedTempFile,
    writer: BufWriter<File>,
    /// Start offset of every record
    offsets: Vec<u64>,
    /// Bytes written so far
    end: u64,
    /// Writer holds bytes the reader cannot see yet
    dirty: bool,
    pages: VecDeque<(usize, Arc<[Row]>)>,
    scratch: Vec<u8>,
}

impl SpillFile {
    fn create(dir: Option<&PathBuf>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("overframe-spill-").suffix(".bin");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let writer = BufWriter::new(file.reopen()?);
        Ok(Self {
            file,
            writer,
            offsets: Vec::new(),
            end: 0,
            dirty: false,
            pages: VecDeque::with_capacity(MAX_CACHED_PAGES),
            scratch: Vec::new(),
        })
    }

    fn append(&mut self, row: &Row) -> Result<()> {
        self.scratch.clear();
        codec::write_row(&mut self.scratch, row);
        let len = u32::try_from(self.scratch.len())
            .map_err(|_| Error::internal("row too large to spill"))?;
        let crc = crc32fast::hash(&self.scratch);

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&self.scratch)?;
        self.writer.write_all(&crc.to_le_bytes())?;

        self.offsets.push(self.end);
        self.end += (self.scratch.len() + RECORD_OVERHEAD) as u64;
        self.dirty = true;
        Ok(())
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Decode spilled rows `[first, last)`; `base` maps them to buffer positions
    fn read_page(&mut self, first: usize, last: usize, base: usize) -> Result<Arc<[Row]>> {
        if self.dirty {
            self.writer.flush()?;
            self.dirty = false;
        }

        let from = self.offsets[first];
        let to = self.offsets.get(last).copied().unwrap_or(self.end);
        let mut bytes = vec![0u8; (to - from) as usize];
        let mut reader = self.file.as_file();
        reader.seek(SeekFrom::Start(from))?;
        reader.read_exact(&mut bytes)?;

        let mut rows = Vec::with_capacity(last - first);
        let mut pos = 0usize;
        for k in 0..(last - first) {
            let row_index = base + first + k;
            let truncated = || Error::SpillCorrupted {
                row: row_index,
                stored: 0,
                computed: 0,
            };
            let header = bytes.get(pos..pos + 4).ok_or_else(truncated)?;
            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let payload = bytes.get(pos + 4..pos + 4 + len).ok_or_else(truncated)?;
            let tail = bytes
                .get(pos + 4 + len..pos + RECORD_OVERHEAD + len)
                .ok_or_else(truncated)?;
            let stored = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
            let computed = crc32fast::hash(payload);
            if stored != computed {
                return Err(Error::SpillCorrupted {
                    row: row_index,
                    stored,
                    computed,
                });
            }
            rows.push(codec::read_row(payload)?.into_shared());
            pos += len + RECORD_OVERHEAD;
        }
        Ok(Arc::from(rows))
    }
}

/// Partition-scoped row buffer with transparent disk spill
pub struct ExternalBuffer {
    memory_limit: usize,
    spill_dir: Option<PathBuf>,
    page_rows: usize,
    rows: Vec<Row>,
    memory_used: usize,
    spill: Option<SpillFile>,
}

impl ExternalBuffer {
    /// Create an empty buffer using the operator configuration
    pub fn new(config: &OverAggregateConfig) -> Self {
        Self {
            memory_limit: config.external_buffer_memory,
            spill_dir: config.spill_dir.clone(),
            page_rows: config.spill_page_rows.max(1),
            rows: Vec::new(),
            memory_used: 0,
            spill: None,
        }
    }

    /// Append a row at the end of the partition
    pub fn append(&mut self, row: Row) -> Result<()> {
        let size = row.estimated_size();
        if self.spill.is_none() && self.memory_used + size <= self.memory_limit {
            self.memory_used += size;
            self.rows.push(row.into_shared());
            return Ok(());
        }

        if self.spill.is_none() {
            debug!(
                rows = self.rows.len(),
                bytes = self.memory_used,
                limit = self.memory_limit,
                "partition buffer spilling to disk"
            );
            self.spill = Some(SpillFile::create(self.spill_dir.as_ref())?);
        }
        match self.spill.as_mut() {
            Some(spill) => spill.append(&row),
            None => Err(Error::internal("spill file missing after creation")),
        }
    }

    /// Read the row at `index`
    pub fn get(&mut self, index: usize) -> Result<Row> {
        if let Some(row) = self.rows.get(index) {
            return Ok(row.clone());
        }

        let base = self.rows.len();
        let len = self.len();
        let spill = self
            .spill
            .as_mut()
            .filter(|s| index - base < s.len())
            .ok_or_else(|| {
                Error::internal(format!("buffer row {} out of range (len={})", index, len))
            })?;

        let spilled = index - base;
        let page = spilled / self.page_rows;
        let slot = spilled % self.page_rows;
        if let Some(pos) = spill.pages.iter().position(|(p, _)| *p == page) {
            if let Some(row) = spill.pages[pos].1.get(slot) {
                return Ok(row.clone());
            }
            // Page was decoded before later appends reached this slot
            spill.pages.retain(|(p, _)| *p != page);
        }

        let first = page * self.page_rows;
        let last = (first + self.page_rows).min(spill.len());
        let rows = spill.read_page(first, last, base)?;
        let row = rows
            .get(slot)
            .cloned()
            .ok_or_else(|| Error::internal(format!("spill page {} misses row {}", page, index)))?;
        if spill.pages.len() == MAX_CACHED_PAGES {
            spill.pages.pop_front();
        }
        spill.pages.push_back((page, rows));
        Ok(row)
    }

    /// Number of rows in the buffer
    pub fn len(&self) -> usize {
        self.rows.len() + self.spill.as_ref().map_or(0, SpillFile::len)
    }

    /// Returns true if no rows are buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if some rows live on disk
    pub fn is_spilled(&self) -> bool {
        self.spill.is_some()
    }

    /// Bytes of rows held in memory
    pub fn memory_used(&self) -> usize {
        self.memory_used
    }

    /// Drop all rows and remove the spill file, keeping the buffer reusable
    pub fn release(&mut self) {
        self.rows.clear();
        self.memory_used = 0;
        if let Some(spill) = self.spill.take() {
            let SpillFile { file, writer, .. } = spill;
            drop(writer);
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                warn!(path = %path.display(), error = %e, "failed to remove spill file");
            }
        }
    }
}

impl Drop for ExternalBuffer {
    fn drop(&mut self) {
        self.release();
    }
}
