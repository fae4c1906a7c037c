//! Byte-level tracking of JSON nesting and string state.

/// Incremental scanner that follows container depth and string literals.
///
/// The scanner does not validate JSON; it only knows enough to tell whether a
/// byte sits at the top level of the text fed so far.
#[derive(Debug, Default, Clone)]
pub(crate) struct Scanner {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scanner {
    /// Current container depth.
    pub(crate) const fn depth(&self) -> usize {
        self.depth
    }

    /// `true` when the next byte is outside any container and string.
    pub(crate) const fn at_top_level(&self) -> bool {
        self.depth == 0 && !self.in_string
    }

    /// Advance the scanner over one byte.
    pub(crate) fn feed(&mut self, byte: u8) {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return;
        }
        match byte {
            b'"' => self.in_string = true,
            b'[' | b'{' => self.depth += 1,
            b']' | b'}' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }
}

/// Deepest container nesting found in `bytes`.
pub(crate) fn max_depth(bytes: &[u8]) -> usize {
    let mut scanner = Scanner::default();
    let mut deepest = 0;
    for &byte in bytes {
        scanner.feed(byte);
        deepest = deepest.max(scanner.depth());
    }
    deepest
}
