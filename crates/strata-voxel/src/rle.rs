//! Run-length encoding used by frozen chunk storage.
//!
//! A run is a `(value, start)` pair: a new run begins whenever a cell's value
//! differs from the previous cell in linear order, and it extends to the next
//! run's start (or the end of the array). Values are compared by bit pattern,
//! so decoding reproduces the input exactly, `-0.0` and NaN payloads included.

/// Element types that can be run-length encoded.
pub trait RunValue: Copy {
    /// Returns `true` if `self` and `other` belong to the same run.
    fn same_run(&self, other: &Self) -> bool;
}

impl RunValue for f32 {
    fn same_run(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl RunValue for u8 {
    fn same_run(&self, other: &Self) -> bool {
        self == other
    }
}

/// Errors that can occur during RLE decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RleError {
    /// The runs do not describe an array of the expected length.
    #[error("RLE length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Number of elements the runs can describe.
        actual: usize,
    },
    /// Run starts are not strictly increasing from zero.
    #[error("RLE run {run} starts at {start}, which is out of order")]
    StartOutOfOrder {
        /// Index of the offending run.
        run: usize,
        /// Its start offset.
        start: u16,
    },
}

/// Run-length encoded array: parallel `values` and `starts`, one entry per run.
///
/// Both buffers are allocated at exactly the run count, so a frozen array's
/// footprint is proportional to its number of runs rather than its length.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenRuns<T> {
    values: Vec<T>,
    starts: Vec<u16>,
}

impl<T: RunValue> FrozenRuns<T> {
    /// Encodes `data` into runs.
    ///
    /// `data.len()` must not exceed `u16::MAX + 1` so every start fits in a `u16`.
    pub fn encode(data: &[T]) -> Self {
        debug_assert!(data.len() <= u16::MAX as usize + 1);

        // Count first so both buffers are allocated once at their final size.
        let run_count = Self::count_runs(data);
        let mut values = Vec::with_capacity(run_count);
        let mut starts = Vec::with_capacity(run_count);

        let mut previous: Option<T> = None;
        for (i, &value) in data.iter().enumerate() {
            if previous.is_none_or(|p| !p.same_run(&value)) {
                values.push(value);
                starts.push(i as u16);
                previous = Some(value);
            }
        }

        Self { values, starts }
    }

    /// Decodes the runs into a freshly allocated array of `len` elements.
    pub fn decode(&self, len: usize) -> Result<Vec<T>, RleError> {
        self.validate(len)?;
        let mut out = Vec::with_capacity(len);
        for (run, &value) in self.values.iter().enumerate() {
            let end = self.run_end(run, len);
            let start = self.starts[run] as usize;
            out.extend(std::iter::repeat_n(value, end - start));
        }
        Ok(out)
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.values.len()
    }

    /// Heap bytes held by the encoding.
    pub fn byte_len(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<T>()
            + self.starts.capacity() * std::mem::size_of::<u16>()
    }

    /// Returns the value of the run covering `index`, without decoding.
    pub fn value_at(&self, index: usize) -> Option<T> {
        let run = self.starts.partition_point(|&s| s as usize <= index);
        run.checked_sub(1).map(|r| self.values[r])
    }

    fn count_runs(data: &[T]) -> usize {
        let mut count = 0;
        let mut previous: Option<T> = None;
        for &value in data {
            if previous.is_none_or(|p| !p.same_run(&value)) {
                count += 1;
                previous = Some(value);
            }
        }
        count
    }

    fn run_end(&self, run: usize, len: usize) -> usize {
        self.starts
            .get(run + 1)
            .map_or(len, |&next| next as usize)
    }

    fn validate(&self, len: usize) -> Result<(), RleError> {
        if self.values.len() != self.starts.len() {
            return Err(RleError::LengthMismatch {
                expected: self.starts.len(),
                actual: self.values.len(),
            });
        }
        if self.starts.is_empty() {
            return if len == 0 {
                Ok(())
            } else {
                Err(RleError::LengthMismatch {
                    expected: len,
                    actual: 0,
                })
            };
        }
        for (run, window) in self.starts.windows(2).enumerate() {
            if window[1] <= window[0] {
                return Err(RleError::StartOutOfOrder {
                    run: run + 1,
                    start: window[1],
                });
            }
        }
        if self.starts[0] != 0 {
            return Err(RleError::StartOutOfOrder {
                run: 0,
                start: self.starts[0],
            });
        }
        let last = *self.starts.last().unwrap_or(&0) as usize;
        if last >= len {
            return Err(RleError::LengthMismatch {
                expected: len,
                actual: last + 1,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
