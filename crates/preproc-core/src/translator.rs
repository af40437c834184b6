//! Maps a line in the expanded output back to its originating file and line.
//!
//! A new entry is appended every time the processor enters a file — the
//! root file, and every `#include` target — recording the output line the
//! entry starts at and the offset between output and source line numbers.
//! Entries are appended in encounter order, which keeps `start_line`
//! non-decreasing: search is a linear scan for the last entry that still
//! applies.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatorEntry {
    pub file: String,
    pub start_line: u32,
    pub offset: u32,
}

#[derive(Clone, Debug, Default)]
pub struct LineNumberTranslator {
    entries: Vec<TranslatorEntry>,
}

impl LineNumberTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line_range(&mut self, file: impl Into<String>, start_line: u32, offset: u32) {
        self.entries.push(TranslatorEntry { file: file.into(), start_line, offset });
    }

    pub fn entries(&self) -> &[TranslatorEntry] {
        &self.entries
    }

    /// Returns the entry governing output line `line`: the last one whose
    /// `start_line <= line`, or the final entry if `line` precedes every
    /// recorded start (the source always belongs to some block).
    pub fn search(&self, line: u32) -> Option<&TranslatorEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let mut best = &self.entries[0];
        for entry in &self.entries {
            if entry.start_line <= line {
                best = entry;
            }
        }
        Some(best)
    }

    pub fn resolve_original_file(&self, line: u32) -> Option<&str> {
        self.search(line).map(|e| e.file.as_str())
    }

    pub fn resolve_original_line(&self, line: u32) -> Option<u32> {
        self.search(line).map(|e| line.saturating_sub(e.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_returns_last_applicable_entry() {
        let mut lnt = LineNumberTranslator::new();
        lnt.add_line_range("a.c", 0, 0);
        lnt.add_line_range("b.h", 2, 2);
        lnt.add_line_range("a.c", 3, 0);

        assert_eq!(lnt.search(0).unwrap().file, "a.c");
        assert_eq!(lnt.search(2).unwrap().file, "b.h");
        assert_eq!(lnt.search(10).unwrap().file, "a.c");
    }

    #[test]
    fn resolve_original_line_subtracts_offset() {
        let mut lnt = LineNumberTranslator::new();
        lnt.add_line_range("a.c", 0, 0);
        lnt.add_line_range("b.h", 2, 2);
        assert_eq!(lnt.resolve_original_line(5), Some(3));
        assert_eq!(lnt.resolve_original_file(5), Some("b.h"));
    }

    #[test]
    fn empty_translator_resolves_to_none() {
        let lnt = LineNumberTranslator::new();
        assert_eq!(lnt.search(0), None);
    }
}
