//! Source Map v3 generation.
//!
//! Mappings are encoded as VLQ-base64 segments with five fields each:
//! generated column, source index, original line, original column, and
//! (optionally) name index. All fields are relative to the previous
//! segment, per the v3 specification.

use serde::Serialize;

/// Base64 VLQ encoding of signed integers.
pub mod vlq {
    const BASE64: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    /// Encode one signed value. The sign bit goes into the lowest bit;
    /// the remainder is emitted in 5-bit groups, least significant first,
    /// with the continuation bit set on all but the final group.
    pub fn encode(value: i64) -> String {
        let mut vlq: u64 = if value < 0 {
            (((-value) as u64) << 1) | 1
        } else {
            (value as u64) << 1
        };
        let mut out = String::new();
        loop {
            let mut digit = (vlq & 0b11111) as u8;
            vlq >>= 5;
            if vlq > 0 {
                digit |= 0b100000;
            }
            out.push(BASE64[digit as usize] as char);
            if vlq == 0 {
                break;
            }
        }
        out
    }
}

/// The JSON shape of a v3 source map.
#[derive(Debug, Serialize)]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent", skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

#[derive(Debug, Clone, Copy)]
struct Mapping {
    gen_line: u32,
    gen_col: u32,
    source: u32,
    src_line: u32,
    src_col: u32,
    name: Option<u32>,
}

/// Accumulates mappings while the printer runs, then renders the v3 JSON.
#[derive(Debug)]
pub struct SourceMapGenerator {
    file: String,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapGenerator {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            sources: Vec::new(),
            sources_content: Vec::new(),
            names: Vec::new(),
            mappings: Vec::new(),
        }
    }

    /// Register a source path, returning its index.
    pub fn add_source(&mut self, path: impl Into<String>) -> u32 {
        self.sources.push(path.into());
        self.sources_content.push(None);
        (self.sources.len() - 1) as u32
    }

    /// Register a source path along with its full text.
    pub fn add_source_with_content(
        &mut self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> u32 {
        self.sources.push(path.into());
        self.sources_content.push(Some(content.into()));
        (self.sources.len() - 1) as u32
    }

    /// Register a name, returning its index.
    pub fn add_name(&mut self, name: impl Into<String>) -> u32 {
        self.names.push(name.into());
        (self.names.len() - 1) as u32
    }

    /// Add a mapping. All positions are 0-based.
    pub fn add_mapping(
        &mut self,
        gen_line: u32,
        gen_col: u32,
        source: u32,
        src_line: u32,
        src_col: u32,
        name: Option<u32>,
    ) {
        self.mappings.push(Mapping { gen_line, gen_col, source, src_line, src_col, name });
    }

    /// Add a mapping with no name index.
    pub fn add_simple_mapping(
        &mut self,
        gen_line: u32,
        gen_col: u32,
        source: u32,
        src_line: u32,
        src_col: u32,
    ) {
        self.add_mapping(gen_line, gen_col, source, src_line, src_col, None);
    }

    /// Render the accumulated mappings as a v3 source map.
    pub fn generate(mut self) -> SourceMap {
        self.mappings
            .sort_by_key(|m| (m.gen_line, m.gen_col, m.source, m.src_line, m.src_col));

        let mut mappings = String::new();
        let mut prev_gen_line = 0u32;
        let mut prev_gen_col = 0i64;
        let mut prev_source = 0i64;
        let mut prev_src_line = 0i64;
        let mut prev_src_col = 0i64;
        let mut prev_name = 0i64;
        let mut first_on_line = true;

        for mapping in &self.mappings {
            while prev_gen_line < mapping.gen_line {
                mappings.push(';');
                prev_gen_line += 1;
                prev_gen_col = 0;
                first_on_line = true;
            }
            if !first_on_line {
                mappings.push(',');
            }
            first_on_line = false;

            mappings.push_str(&vlq::encode(mapping.gen_col as i64 - prev_gen_col));
            prev_gen_col = mapping.gen_col as i64;
            mappings.push_str(&vlq::encode(mapping.source as i64 - prev_source));
            prev_source = mapping.source as i64;
            mappings.push_str(&vlq::encode(mapping.src_line as i64 - prev_src_line));
            prev_src_line = mapping.src_line as i64;
            mappings.push_str(&vlq::encode(mapping.src_col as i64 - prev_src_col));
            prev_src_col = mapping.src_col as i64;
            if let Some(name) = mapping.name {
                mappings.push_str(&vlq::encode(name as i64 - prev_name));
                prev_name = name as i64;
            }
        }

        let sources_content = if self.sources_content.iter().any(|c| c.is_some()) {
            Some(
                self.sources_content
                    .iter()
                    .map(|c| c.clone().unwrap_or_default())
                    .collect(),
            )
        } else {
            None
        };

        SourceMap {
            version: 3,
            file: self.file,
            sources: self.sources,
            sources_content,
            names: self.names,
            mappings,
        }
    }

    /// Render directly to the JSON string written to `.js.map` files.
    pub fn generate_json(self) -> String {
        serde_json::to_string(&self.generate()).expect("source maps serialize to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vlq_encode_known_values() {
        assert_eq!(vlq::encode(0), "A");
        assert_eq!(vlq::encode(1), "C");
        assert_eq!(vlq::encode(-1), "D");
        assert_eq!(vlq::encode(15), "e");
        assert_eq!(vlq::encode(16), "gB");
        assert_eq!(vlq::encode(-16), "hB");
    }

    #[test]
    fn simple_source_map_shape() {
        let mut generator = SourceMapGenerator::new("output.js");
        let src = generator.add_source("input.esc");
        generator.add_simple_mapping(0, 0, src, 0, 0);
        generator.add_simple_mapping(0, 4, src, 0, 4);
        generator.add_simple_mapping(1, 0, src, 1, 0);

        let map = generator.generate();
        assert_eq!(map.version, 3);
        assert_eq!(map.file, "output.js");
        assert_eq!(map.sources, vec!["input.esc"]);
        assert!(!map.mappings.is_empty());
        // One line separator between the two generated lines.
        assert_eq!(map.mappings.matches(';').count(), 1);
    }

    #[test]
    fn first_segment_encodes_absolute_values() {
        let mut generator = SourceMapGenerator::new("out.js");
        let src = generator.add_source("in.esc");
        generator.add_simple_mapping(0, 0, src, 0, 0);
        let map = generator.generate();
        assert_eq!(map.mappings, "AAAA");
    }

    #[test]
    fn names_are_indexed() {
        let mut generator = SourceMapGenerator::new("out.js");
        let src = generator.add_source("in.esc");
        let name = generator.add_name("myFunction");
        generator.add_mapping(0, 0, src, 0, 0, Some(name));
        let map = generator.generate();
        assert_eq!(map.names, vec!["myFunction"]);
        assert_eq!(map.mappings, "AAAAA");
    }

    #[test]
    fn source_content_round_trips() {
        let mut generator = SourceMapGenerator::new("out.js");
        generator.add_source_with_content("in.esc", "val x = 1");
        let map = generator.generate();
        assert_eq!(map.sources_content.unwrap(), vec!["val x = 1"]);
    }

    #[test]
    fn json_has_v3_fields() {
        let mut generator = SourceMapGenerator::new("out.js");
        let src = generator.add_source("in.esc");
        generator.add_simple_mapping(0, 0, src, 0, 0);
        let json = generator.generate_json();
        assert!(json.contains("\"version\":3"));
        assert!(json.contains("\"mappings\":\"AAAA\""));
    }
}
