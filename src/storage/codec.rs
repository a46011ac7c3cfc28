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

//! Binary row codec for spill pages
//!
//! Value layout (little endian), one type tag byte followed by:
//!
//! | tag | value     | payload                      |
//! |-----|-----------|------------------------------|
//! | 0   | NULL      | data type byte               |
//! | 1   | BOOLEAN   | 1 byte                       |
//! | 2   | INTEGER   | i64                          |
//! | 3   | FLOAT     | f64                          |
//! | 4   | TEXT      | u32 length + UTF-8 bytes     |
//! | 6   | JSON      | u32 length + UTF-8 bytes     |
//! | 8   | TIMESTAMP | i64 seconds + u32 nanos      |
//!
//! A row is a u32 value count followed by its values.

use std::sync::Arc;

use chrono::DateTime;

use crate::core::{DataType, Error, Result, Row, Value};

/// Append the encoding of a value to `buf`
pub fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null(dt) => {
            buf.push(0);
            buf.push(dt.as_u8());
        }
        Value::Boolean(b) => {
            buf.push(1);
            buf.push(u8::from(*b));
        }
        Value::Integer(i) => {
            buf.push(2);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(f) => {
            buf.push(3);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::Text(s) => {
            buf.push(4);
            buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Timestamp(ts) => {
            buf.push(8);
            buf.extend_from_slice(&ts.timestamp().to_le_bytes());
            buf.extend_from_slice(&ts.timestamp_subsec_nanos().to_le_bytes());
        }
        Value::Json(j) => {
            buf.push(6);
            buf.extend_from_slice(&(j.len() as u32).to_le_bytes());
            buf.extend_from_slice(j.as_bytes());
        }
    }
}

/// Append the encoding of a row to `buf`
pub fn write_row(buf: &mut Vec<u8>, row: &Row) {
    buf.extend_from_slice(&(row.len() as u32).to_le_bytes());
    for value in row.iter() {
        write_value(buf, value);
    }
}

/// Spilled bytes that do not decode; the disk copy is damaged
fn corrupt(message: impl std::fmt::Display) -> Error {
    Error::io(format!("corrupt spill record: {}", message))
}

/// Cursor over an encoded byte slice
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| corrupt(format!("missing {}", what)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    fn str(&mut self, what: &str) -> Result<Arc<str>> {
        let len = self.u32(what)? as usize;
        let raw = self.bytes(len, what)?;
        let s = std::str::from_utf8(raw)
            .map_err(|e| corrupt(format!("invalid {}: {}", what, e)))?;
        Ok(Arc::from(s))
    }

    fn value(&mut self) -> Result<Value> {
        match self.u8("type tag")? {
            0 => {
                let dt = DataType::from_u8(self.u8("null type")?).unwrap_or(DataType::Null);
                Ok(Value::Null(dt))
            }
            1 => Ok(Value::Boolean(self.u8("boolean value")? != 0)),
            2 => Ok(Value::Integer(i64::from_le_bytes(
                self.array("integer value")?,
            ))),
            3 => Ok(Value::Float(f64::from_le_bytes(self.array("float value")?))),
            4 => Ok(Value::Text(self.str("text data")?)),
            6 => Ok(Value::Json(self.str("json data")?)),
            8 => {
                let secs = i64::from_le_bytes(self.array("timestamp seconds")?);
                let nsecs = self.u32("timestamp nanos")?;
                let ts = DateTime::from_timestamp(secs, nsecs)
                    .ok_or_else(|| corrupt("invalid timestamp"))?;
                Ok(Value::Timestamp(ts))
            }
            tag => Err(corrupt(format!("unknown value tag {}", tag))),
        }
    }
}

/// Decode one row that occupies the whole slice
pub fn read_row(data: &[u8]) -> Result<Row> {
    let mut reader = Reader::new(data);
    let count = reader.u32("value count")? as usize;
    // Every value takes at least two bytes
    let mut values = Vec::with_capacity(count.min(data.len() / 2));
    for _ in 0..count {
        values.push(reader.value()?);
    }
    if reader.pos != data.len() {
        return Err(corrupt(format!(
            "{} trailing bytes after row",
            data.len() - reader.pos
        )));
    }
    Ok(Row::from_values(values))
}
