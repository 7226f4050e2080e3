//! Source files and the reverse map used for error reporting.

use rustc_hash::FxHashMap;

use crate::span::{Location, SourceId, Span};

/// A single source file: stable id, path, and full text.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: SourceId,
    pub path: String,
    pub contents: String,
}

impl Source {
    pub fn new(id: SourceId, path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// The set of sources in a compilation, indexed by [`SourceId`].
///
/// Used by diagnostic rendering to recover file paths, source lines, and
/// byte offsets from spans. Line start tables are built once per source on
/// insertion.
#[derive(Debug, Default)]
pub struct SourceSet {
    sources: Vec<Source>,
    by_id: FxHashMap<SourceId, usize>,
    line_starts: Vec<Vec<usize>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source. The source's id must be unique within the set.
    pub fn insert(&mut self, source: Source) {
        let starts = line_starts(&source.contents);
        self.by_id.insert(source.id, self.sources.len());
        self.sources.push(source);
        self.line_starts.push(starts);
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.by_id.get(&id).map(|&i| &self.sources[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The text of a 1-based line in the given source, without its newline.
    pub fn line_text(&self, id: SourceId, line: u32) -> Option<&str> {
        let idx = *self.by_id.get(&id)?;
        let starts = &self.line_starts[idx];
        let contents = &self.sources[idx].contents;
        let line = line.checked_sub(1)? as usize;
        let start = *starts.get(line)?;
        let end = starts.get(line + 1).map_or(contents.len(), |&e| e);
        Some(contents[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Convert a location to a byte offset into its source's contents.
    ///
    /// Returns `None` for synthetic locations or out-of-range lines.
    pub fn offset(&self, id: SourceId, loc: Location) -> Option<usize> {
        if loc.is_synthetic() {
            return None;
        }
        let idx = *self.by_id.get(&id)?;
        let starts = &self.line_starts[idx];
        let line_start = *starts.get((loc.line - 1) as usize)?;
        Some(line_start + (loc.column - 1) as usize)
    }

    /// Convert a span to a byte range, clamped to the source length.
    pub fn byte_range(&self, span: Span) -> Option<std::ops::Range<usize>> {
        let len = self.get(span.source)?.contents.len();
        let start = self.offset(span.source, span.start)?.min(len);
        let end = self.offset(span.source, span.end).unwrap_or(start).min(len);
        Some(start..end.max(start))
    }
}

/// Byte offset of the start of each line. The first entry is always 0.
fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(contents: &str) -> SourceSet {
        let mut set = SourceSet::new();
        set.insert(Source::new(SourceId(0), "main.esc", contents));
        set
    }

    #[test]
    fn line_text_lookup() {
        let set = set_with("val x = 5\nval y = x\n");
        assert_eq!(set.line_text(SourceId(0), 1), Some("val x = 5"));
        assert_eq!(set.line_text(SourceId(0), 2), Some("val y = x"));
        assert_eq!(set.line_text(SourceId(0), 9), None);
    }

    #[test]
    fn offsets_are_1_based() {
        let set = set_with("ab\ncd");
        assert_eq!(set.offset(SourceId(0), Location::new(1, 1)), Some(0));
        assert_eq!(set.offset(SourceId(0), Location::new(2, 1)), Some(3));
        assert_eq!(set.offset(SourceId(0), Location::new(2, 2)), Some(4));
    }

    #[test]
    fn synthetic_location_has_no_offset() {
        let set = set_with("ab");
        assert_eq!(set.offset(SourceId(0), Location::synthetic()), None);
    }

    #[test]
    fn byte_range_spans_lines() {
        let set = set_with("val x = 5\nval y = x\n");
        let span = Span::new(Location::new(1, 5), Location::new(1, 6), SourceId(0));
        assert_eq!(set.byte_range(span), Some(4..5));
    }
}
