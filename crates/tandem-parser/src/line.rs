//! Source lines.

/// One line of DSL text.
///
/// The trimmed text is what classification and parsing look at; the raw
/// text is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'src> {
    index: usize,
    raw: &'src str,
}

impl<'src> SourceLine<'src> {
    pub fn new(index: usize, raw: &'src str) -> Self {
        Self { index, raw }
    }

    /// 0-based line index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &'src str {
        self.raw
    }

    pub fn trimmed(&self) -> &'src str {
        self.raw.trim()
    }
}

/// Splits source text into lines on `\n`.
///
/// A trailing `\r` stays in the raw text and disappears when trimmed.
/// Empty input yields a single empty line, matching how editors count.
pub fn lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .map(|(index, raw)| SourceLine::new(index, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_indices_and_trim() {
        let collected: Vec<_> = lines("A > B\r\n  // note\n\nC").collect();

        assert_eq!(collected.len(), 4);
        assert_eq!(collected[0].trimmed(), "A > B");
        assert_eq!(collected[0].raw(), "A > B\r");
        assert_eq!(collected[1].index(), 1);
        assert_eq!(collected[1].trimmed(), "// note");
        assert_eq!(collected[2].trimmed(), "");
        assert_eq!(collected[3].trimmed(), "C");
    }

    #[test]
    fn test_empty_source_is_one_line() {
        let collected: Vec<_> = lines("").collect();
        assert_eq!(collected, vec![SourceLine::new(0, "")]);
    }
}
