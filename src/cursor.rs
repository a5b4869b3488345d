use std::ops::Range;

/// Monotone offset into a positive-row sequence.
///
/// The offset saturates at the sequence length; it is never rewound. Once it
/// reaches the end every further slice is empty, which is how callers detect
/// the end of an epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    len: usize,
    offset: usize,
    steps: usize,
}

impl Cursor {
    /// Cursor at offset 0 over `len` rows.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            offset: 0,
            steps: 0,
        }
    }

    /// Current row offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of times the cursor was advanced, including past the end.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rows not yet covered by a slice.
    pub fn remaining(&self) -> usize {
        self.len - self.offset
    }

    /// `true` once every further slice is empty.
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.len
    }

    /// Rows the next advance of `width` would cover, clamped to the end.
    pub fn peek(&self, width: usize) -> Range<usize> {
        let end = self.offset.saturating_add(width).min(self.len);
        self.offset..end
    }

    /// Move past the rows `peek(width)` returned.
    pub fn advance(&mut self, width: usize) {
        self.offset = self.offset.saturating_add(width).min(self.len);
        self.steps += 1;
    }

    /// Restore a checkpointed position.
    pub(crate) fn seek(&mut self, offset: usize, steps: usize) {
        self.offset = offset.min(self.len);
        self.steps = steps;
    }
}
