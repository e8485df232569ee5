// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compressed sparse row (CSR) tables.
//!
//! [`GrowableTable`] is the append-only builder used while faces are being
//! discovered. Its storage grows geometrically (at least 1.5x) through
//! fallible reservations, so a whole build copies `O(n)` entries in total and
//! an allocation failure surfaces as [`Error::Capacity`] instead of an abort.
//! [`SparseTable`] is the frozen, read-only result.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Immutable CSR table: row `r` is `data[ptr[r]..ptr[r + 1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseTable<T> {
    ptr: Vec<usize>,
    data: Vec<T>,
}

impl<T> SparseTable<T> {
    /// Builds a table from a row-pointer array and flat data.
    ///
    /// `ptr` must start at 0, be non-decreasing and end at `data.len()`.
    pub fn from_parts(ptr: Vec<usize>, data: Vec<T>) -> Result<Self> {
        if ptr.first() != Some(&0) {
            return Err(Error::Inconsistent("row pointer must start at 0".into()));
        }
        if ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::Inconsistent("row pointer is decreasing".into()));
        }
        if ptr.last() != Some(&data.len()) {
            return Err(Error::Inconsistent(format!(
                "row pointer ends at {:?}, data has {} entries",
                ptr.last(),
                data.len()
            )));
        }
        Ok(Self { ptr, data })
    }

    /// Wraps a row pointer the caller built from `data` itself.
    pub(crate) fn new_unchecked(ptr: Vec<usize>, data: Vec<T>) -> Self {
        debug_assert_eq!(ptr.last(), Some(&data.len()));
        Self { ptr, data }
    }

    /// Builds a table from a list of rows.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
    {
        let mut ptr = vec![0];
        let mut data = Vec::new();
        for row in rows {
            data.extend(row);
            ptr.push(data.len());
        }
        Self { ptr, data }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.ptr.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of row `r`.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[self.ptr[r]..self.ptr[r + 1]]
    }

    /// Row pointer array, `len() + 1` entries.
    #[inline]
    pub fn ptr(&self) -> &[usize] {
        &self.ptr
    }

    /// Flat entry array.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.ptr.windows(2).map(move |w| &self.data[w[0]..w[1]])
    }
}

/// Append-only CSR builder with amortized geometric growth.
#[derive(Debug, Clone)]
pub struct GrowableTable<T> {
    ptr: Vec<usize>,
    data: Vec<T>,
}

impl<T> Default for GrowableTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableTable<T> {
    /// Creates an empty table with no open row entries.
    pub fn new() -> Self {
        Self {
            ptr: vec![0],
            data: Vec::new(),
        }
    }

    /// Creates an empty table with room for `rows` rows and `entries` entries.
    pub fn with_capacity(rows: usize, entries: usize) -> Result<Self> {
        let mut table = Self::new();
        table.ensure_capacity(rows, entries)?;
        Ok(table)
    }

    /// Makes sure `rows` more rows holding `entries` more entries fit without
    /// reallocating. Growth is at least 1.5x the current capacity; storage is
    /// never shrunk.
    pub fn ensure_capacity(&mut self, rows: usize, entries: usize) -> Result<()> {
        grow(&mut self.ptr, rows).map_err(|_| Error::Capacity { rows, entries })?;
        grow(&mut self.data, entries).map_err(|_| Error::Capacity { rows, entries })?;
        Ok(())
    }

    /// Appends one entry to the row currently being built.
    #[inline]
    pub fn push_entry(&mut self, value: T) {
        self.data.push(value);
    }

    /// Closes the row currently being built and returns its index.
    #[inline]
    pub fn finish_row(&mut self) -> usize {
        self.ptr.push(self.data.len());
        self.ptr.len() - 2
    }

    /// Appends a complete row, reserving room for it first.
    pub fn push_row<I>(&mut self, row: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let row = row.into_iter();
        self.ensure_capacity(1, row.len())?;
        self.data.extend(row);
        Ok(self.finish_row())
    }

    /// Number of finished rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.ptr.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries, including those of an unfinished row.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.data.len()
    }

    /// Current `(rows, entries)` capacity.
    pub fn capacity(&self) -> (usize, usize) {
        (self.ptr.capacity().saturating_sub(1), self.data.capacity())
    }

    /// Freezes the table. Entries of an unfinished row are dropped.
    pub fn freeze(mut self) -> SparseTable<T> {
        let end = self.ptr[self.ptr.len() - 1];
        self.data.truncate(end);
        self.ptr.shrink_to_fit();
        self.data.shrink_to_fit();
        SparseTable {
            ptr: self.ptr,
            data: self.data,
        }
    }
}

/// Reserves room for `additional` more elements, growing by at least half the
/// current capacity.
fn grow<T>(
    v: &mut Vec<T>,
    additional: usize,
) -> std::result::Result<(), std::collections::TryReserveError> {
    let needed = v.len() + additional;
    if needed <= v.capacity() {
        return Ok(());
    }
    let target = needed.max(v.capacity() + v.capacity() / 2);
    v.try_reserve_exact(target - v.len())
}
