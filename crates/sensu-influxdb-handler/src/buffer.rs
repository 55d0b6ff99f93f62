// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching buffer for Line Protocol lines.
//!
//! Accumulates lines and hands back a full batch once `max_size` is
//! reached. There is no time-based flushing: a handler invocation lives
//! for a single event, so the caller drains the remainder explicitly.

/// A size-bounded batch of Line Protocol strings.
pub struct BatchBuffer {
    lines: Vec<String>,
    max_size: usize,
}

impl BatchBuffer {
    /// Create a new batch buffer holding up to `max_size` lines.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            lines: Vec::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Add a line to the buffer.
    ///
    /// Returns `Some(batch)` if the buffer is now full and should be sent,
    /// or `None` if there is still room.
    pub fn add(&mut self, line: String) -> Option<Vec<String>> {
        self.lines.push(line);
        if self.lines.len() >= self.max_size {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Take all accumulated lines.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Get the current number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_buffer_returns_none_until_full() {
        let mut buf = BatchBuffer::new(3);

        assert!(buf.add("line1".to_string()).is_none());
        assert!(buf.add("line2".to_string()).is_none());
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_batch_buffer_returns_batch_when_full() {
        let mut buf = BatchBuffer::new(3);

        buf.add("line1".to_string());
        buf.add("line2".to_string());

        let batch = buf.add("line3".to_string()).expect("full batch");
        assert_eq!(batch, vec!["line1", "line2", "line3"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_batch_buffer_manual_drain() {
        let mut buf = BatchBuffer::new(100);

        buf.add("a".to_string());
        buf.add("b".to_string());

        assert_eq!(buf.drain().len(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_batch_buffer_zero_size_sends_every_line() {
        let mut buf = BatchBuffer::new(0);
        assert_eq!(buf.add("a".to_string()), Some(vec!["a".to_string()]));
    }
}
