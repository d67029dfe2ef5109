//! Content-type dispatch for embedded example-table text.
//!
//! A [`ParserRegistry`] maps content-type labels to tabular parsers. The
//! registry is an explicit value injected through the build context rather
//! than process-global state, so a build shares one registry and independent
//! builds may configure their own. The built-in parser handles `text/csv`
//! with RFC-4180-like defaults, every option overridable per table through
//! its `ContentMeta` mapping.

use hashbrown::HashMap;
use serde_yaml::{Mapping, Value};

use crate::error::BuildError;

/// Raw tabular content as produced by a content parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// Header names from the first record.
    pub headers: Vec<String>,
    /// Data records, possibly ragged when the parser is not strict.
    pub rows: Vec<Vec<String>>,
}

/// A parser turning raw text into tabular content.
pub trait ContentParser: Send + Sync {
    /// Parse `text` into headers and rows, honouring per-table `meta`
    /// options.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedTable`] when the text has no header
    /// line, when a row is rejected, or when a meta option is invalid.
    fn parse(&self, text: &str, meta: &Mapping) -> Result<ParsedTable, BuildError>;
}

/// Content-type label of the built-in CSV parser, and the default applied
/// when an embedded declaration names none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/csv";

/// Registry of content parsers keyed by content-type label.
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn ContentParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut registry = Self {
            parsers: HashMap::new(),
        };
        registry.register(DEFAULT_CONTENT_TYPE, CsvParser);
        registry
    }
}

impl ParserRegistry {
    /// Construct a registry with the built-in parsers registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser` under `content_type`, replacing any previous entry.
    pub fn register(&mut self, content_type: impl Into<String>, parser: impl ContentParser + 'static) {
        self.parsers.insert(content_type.into(), Box::new(parser));
    }

    /// Look up the parser registered for `content_type`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedContentType`] for unknown labels.
    pub fn get(&self, content_type: &str) -> Result<&dyn ContentParser, BuildError> {
        self.parsers
            .get(content_type)
            .map(Box::as_ref)
            .ok_or_else(|| BuildError::UnsupportedContentType {
                content_type: content_type.to_owned(),
            })
    }

    /// Parse `text` with the parser registered for `content_type`.
    ///
    /// # Errors
    ///
    /// Propagates lookup and parse failures.
    pub fn parse(
        &self,
        content_type: &str,
        text: &str,
        meta: &Mapping,
    ) -> Result<ParsedTable, BuildError> {
        self.get(content_type)?.parse(text, meta)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut labels: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        labels.sort_unstable();
        f.debug_struct("ParserRegistry")
            .field("content_types", &labels)
            .finish()
    }
}

/// The built-in delimited-text parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

struct CsvOptions {
    delimiter: u8,
    quote: u8,
    double_quote: bool,
    escape: Option<u8>,
    terminator: csv::Terminator,
    skip_initial_space: bool,
    strict: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            double_quote: true,
            escape: None,
            terminator: csv::Terminator::CRLF,
            skip_initial_space: true,
            strict: true,
        }
    }
}

impl CsvOptions {
    fn from_meta(meta: &Mapping) -> Result<Self, BuildError> {
        let mut options = Self::default();
        if let Some(byte) = meta_byte(meta, "Delimiter")? {
            options.delimiter = byte;
        }
        if let Some(byte) = meta_byte(meta, "QuoteChar")? {
            options.quote = byte;
        }
        if let Some(flag) = meta_bool(meta, "Doublequote")? {
            options.double_quote = flag;
        }
        options.escape = meta_byte(meta, "EscapeChar")?.or(options.escape);
        if let Some(value) = meta.get("LineTerminator") {
            options.terminator = terminator_from(value)?;
        }
        if let Some(flag) = meta_bool(meta, "SkipInitialSpace")? {
            options.skip_initial_space = flag;
        }
        if let Some(flag) = meta_bool(meta, "Strict")? {
            options.strict = flag;
        }
        Ok(options)
    }
}

fn meta_byte(meta: &Mapping, key: &str) -> Result<Option<u8>, BuildError> {
    let Some(value) = meta.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_str()
        .and_then(single_byte)
        .map(Some)
        .ok_or_else(|| BuildError::MalformedTable {
            detail: format!("meta option '{key}' must be a single ASCII character"),
        })
}

fn meta_bool(meta: &Mapping, key: &str) -> Result<Option<bool>, BuildError> {
    let Some(value) = meta.get(key) else {
        return Ok(None);
    };
    value
        .as_bool()
        .map(Some)
        .ok_or_else(|| BuildError::MalformedTable {
            detail: format!("meta option '{key}' must be a boolean"),
        })
}

fn terminator_from(value: &Value) -> Result<csv::Terminator, BuildError> {
    match value.as_str() {
        Some("\r\n") => Ok(csv::Terminator::CRLF),
        Some(text) => single_byte(text)
            .map(csv::Terminator::Any)
            .ok_or_else(|| BuildError::MalformedTable {
                detail: "meta option 'LineTerminator' must be CRLF or a single ASCII character"
                    .to_owned(),
            }),
        None => Err(BuildError::MalformedTable {
            detail: "meta option 'LineTerminator' must be a string".to_owned(),
        }),
    }
}

fn single_byte(text: &str) -> Option<u8> {
    let mut bytes = text.bytes();
    match (bytes.next(), bytes.next()) {
        (Some(byte), None) => Some(byte),
        _ => None,
    }
}

impl ContentParser for CsvParser {
    fn parse(&self, text: &str, meta: &Mapping) -> Result<ParsedTable, BuildError> {
        let options = CsvOptions::from_meta(meta)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(!options.strict)
            .delimiter(options.delimiter)
            .quote(options.quote)
            .double_quote(options.double_quote)
            .escape(options.escape)
            .terminator(options.terminator)
            .trim(if options.skip_initial_space {
                csv::Trim::Fields
            } else {
                csv::Trim::None
            })
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let headers = match records.next() {
            Some(record) => record_fields(record)?,
            None => {
                return Err(BuildError::MalformedTable {
                    detail: "content has no header line".to_owned(),
                });
            }
        };
        let rows = records.map(record_fields).collect::<Result<Vec<_>, _>>()?;
        Ok(ParsedTable { headers, rows })
    }
}

fn record_fields(record: Result<csv::StringRecord, csv::Error>) -> Result<Vec<String>, BuildError> {
    record
        .map(|fields| fields.iter().map(str::to_owned).collect())
        .map_err(|err| BuildError::MalformedTable {
            detail: err.to_string(),
        })
}
