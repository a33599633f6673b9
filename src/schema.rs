//! Column metadata and row batches.
//!
//! A [`Schema`] is an ordered list of named columns parsed once from a column
//! list such as `"Col1 Decimal(77, 10), Col2 Nullable(Decimal(80, 10))"`.
//! Rows are laid out column after column, row after row, with no framing.

use std::fmt;

use bytes::BytesMut;
use tracing::debug;

use crate::composite::CompositeCodec;
use crate::config::CodecConfig;
use crate::error::{WireError, WireResult};
use crate::types::parser::parse_column_list;
use crate::types::{ColumnType, TypeFactory};
use crate::value::Value;
use crate::wire::{BuiltinLeaves, LeafCodec};

/// A named column and its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Declared precision of a `Decimal` or `Nullable(Decimal)` column.
    pub fn precision(&self) -> Option<u32> {
        self.ty.decimal_spec().map(|s| s.precision())
    }

    /// Declared scale of a `Decimal` or `Nullable(Decimal)` column.
    pub fn scale(&self) -> Option<u32> {
        self.ty.decimal_spec().map(|s| s.scale())
    }

    pub fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)
    }
}

/// Ordered columns plus the codec that moves their rows on and off the wire.
#[derive(Debug, Clone)]
pub struct Schema<L: LeafCodec = BuiltinLeaves> {
    columns: Vec<Column>,
    codec: CompositeCodec<L>,
}

impl Schema<BuiltinLeaves> {
    /// Parse a column list with the default configuration.
    pub fn parse(input: &str) -> WireResult<Self> {
        Self::parse_with(input, &CodecConfig::default())
    }

    pub fn parse_with(input: &str, config: &CodecConfig) -> WireResult<Self> {
        let factory = TypeFactory::new(config);
        let columns = parse_column_list(input, config.max_type_depth)?
            .into_iter()
            .map(|(name, descriptor)| -> WireResult<Column> {
                Ok(Column::new(name, factory.build(&descriptor)?))
            })
            .collect::<WireResult<Vec<_>>>()?;
        debug!(columns = columns.len(), "parsed schema");
        Ok(Self::new(columns, CompositeCodec::with_config(config)))
    }
}

impl<L: LeafCodec> Schema<L> {
    pub fn new(columns: Vec<Column>, codec: CompositeCodec<L>) -> Self {
        Self { columns, codec }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Encode a batch of rows. Either every row is appended or `buf` is left
    /// untouched; errors carry the failing row and column.
    pub fn encode_rows(&self, rows: &[Vec<Value>], buf: &mut BytesMut) -> WireResult<()> {
        let start = buf.len();
        let result = rows
            .iter()
            .enumerate()
            .try_for_each(|(i, row)| self.encode_row(i, row, buf));
        match result {
            Ok(()) => {
                debug!(rows = rows.len(), bytes = buf.len() - start, "encoded batch");
                Ok(())
            }
            Err(e) => {
                buf.truncate(start);
                Err(e)
            }
        }
    }

    fn encode_row(&self, index: usize, row: &[Value], buf: &mut BytesMut) -> WireResult<()> {
        if row.len() != self.columns.len() {
            return Err(WireError::ArityMismatch {
                expected: self.columns.len(),
                found: row.len(),
            }
            .at_row(index, "*"));
        }
        for (column, value) in self.columns.iter().zip(row) {
            self.codec
                .encode(&column.ty, value, buf)
                .map_err(|e| e.at_row(index, &column.name))?;
        }
        Ok(())
    }

    /// Decode one row from the front of `buf`.
    pub fn decode_row(&self, buf: &mut &[u8]) -> WireResult<Vec<Value>> {
        self.decode_row_at(0, buf)
    }

    fn decode_row_at(&self, index: usize, buf: &mut &[u8]) -> WireResult<Vec<Value>> {
        self.columns
            .iter()
            .map(|column| {
                self.codec
                    .decode(&column.ty, buf)
                    .map_err(|e| e.at_row(index, &column.name))
            })
            .collect()
    }

    /// Decode rows until `bytes` is exhausted.
    pub fn decode_rows(&self, bytes: &[u8]) -> WireResult<Vec<Vec<Value>>> {
        let mut buf = bytes;
        let mut rows = Vec::new();
        while !buf.is_empty() {
            let remaining = buf.len();
            let row = self.decode_row_at(rows.len(), &mut buf)?;
            if buf.len() == remaining {
                return Err(WireError::Corrupted(format!(
                    "row {} consumed no bytes with {} left",
                    rows.len(),
                    remaining
                )));
            }
            rows.push(row);
        }
        debug!(rows = rows.len(), bytes = bytes.len(), "decoded batch");
        Ok(rows)
    }
}
