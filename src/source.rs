//! The example-table loader.
//!
//! One classification step turns an example-table declaration into an
//! [`ExampleSource`] variant; one normalization path consumes it. Whatever
//! the source — inline structured content, embedded text, a file reference,
//! or a remote URI — the result funnels through the content-parser registry
//! and the data-table assembler into a [`DataTable`].

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::content::DEFAULT_CONTENT_TYPE;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::keyword::{self, PathRoot};
use crate::model::DataTable;
use crate::resolve::find;

/// The classified source of one example-table declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExampleSource<'a> {
    /// Inline structured content: a mapping with `Headers` plus `Rows` or
    /// `Columns`.
    Structured(&'a Value),
    /// Inline raw text in a registered content format.
    Embedded(&'a str),
    /// A reference to a file on disk; the value is the raw `Path` entry.
    File(&'a Value),
    /// A reference to a remote resource; the value is the raw `URI` entry.
    Uri(&'a Value),
}

impl<'a> ExampleSource<'a> {
    /// Classify a declaration by which key group it carries, in fixed
    /// priority: embedded content, file reference, URI reference.
    ///
    /// Returns `Ok(None)` when no group matches; the caller drops the
    /// declaration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedExampleTable`] when the `Content`
    /// value is neither a mapping nor a string.
    pub fn classify(payload: &'a Value) -> Result<Option<Self>, BuildError> {
        if let Some(content) = find(payload, &keyword::CONTENT) {
            return if content.value.is_mapping() {
                Ok(Some(Self::Structured(content.value)))
            } else if let Some(text) = content.value.as_str() {
                Ok(Some(Self::Embedded(text)))
            } else {
                Err(BuildError::MalformedExampleTable {
                    detail: "'Content' must be a mapping or a string".to_owned(),
                })
            };
        }
        if let Some(path) = find(payload, &keyword::PATH) {
            return Ok(Some(Self::File(path.value)));
        }
        if let Some(uri) = find(payload, &keyword::URI) {
            return Ok(Some(Self::Uri(uri.value)));
        }
        Ok(None)
    }
}

/// Load one example-table declaration into a normalized table.
///
/// Returns `Ok(None)` when the declaration matches no source group; that
/// declaration is simply omitted from the collection being built.
///
/// # Errors
///
/// Propagates classification, I/O, fetch, parse, and assembly failures.
pub(crate) fn load_example(
    payload: &Value,
    ctx: &BuildContext,
) -> Result<Option<DataTable>, BuildError> {
    let Some(source) = ExampleSource::classify(payload)? else {
        return Ok(None);
    };
    let table = match source {
        ExampleSource::Structured(content) => DataTable::from_structured(content)?,
        ExampleSource::Embedded(text) => parse_embedded(text, payload, ctx)?,
        ExampleSource::File(spec) => {
            let text = read_file(spec, ctx)?;
            parse_embedded(text.trim(), payload, ctx)?
        }
        ExampleSource::Uri(spec) => {
            let text = fetch_uri(spec)?;
            parse_embedded(&text, payload, ctx)?
        }
    };
    Ok(Some(table))
}

fn parse_embedded(
    text: &str,
    payload: &Value,
    ctx: &BuildContext,
) -> Result<DataTable, BuildError> {
    let content_type = match find(payload, &keyword::CONTENT_TYPE) {
        Some(keyed) => keyed
            .value
            .as_str()
            .ok_or_else(|| BuildError::MalformedExampleTable {
                detail: "'ContentType' must be a string".to_owned(),
            })?,
        None => DEFAULT_CONTENT_TYPE,
    };
    let empty = Mapping::new();
    let meta = match find(payload, &keyword::CONTENT_META) {
        Some(keyed) => keyed
            .value
            .as_mapping()
            .ok_or_else(|| BuildError::MalformedExampleTable {
                detail: "'ContentMeta' must be a mapping".to_owned(),
            })?,
        None => &empty,
    };
    let parsed = ctx.registry.parse(content_type, text, meta)?;
    Ok(DataTable::from_parsed(parsed))
}

fn read_file(spec: &Value, ctx: &BuildContext) -> Result<String, BuildError> {
    let (path, root) = match spec {
        Value::String(path) => (PathBuf::from(path), PathRoot::default()),
        Value::Mapping(_) => {
            let path = find(spec, &keyword::PATH)
                .and_then(|keyed| keyed.value.as_str())
                .ok_or_else(|| BuildError::MalformedExampleTable {
                    detail: "file reference mapping requires a 'Path' string".to_owned(),
                })?;
            let root = find(spec, &keyword::PATH_TYPE)
                .and_then(|keyed| keyed.value.as_str())
                .map_or_else(PathRoot::default, PathRoot::from_alias);
            (PathBuf::from(path), root)
        }
        _ => {
            return Err(BuildError::MalformedExampleTable {
                detail: "'Path' must be a string or a mapping".to_owned(),
            });
        }
    };

    let root_dir = match root {
        PathRoot::Cwd => current_dir()?,
        PathRoot::FeatureRelative => match ctx.feature_dir() {
            Some(dir) => dir.to_path_buf(),
            None => current_dir()?,
        },
    };
    let resolved = root_dir.join(path);
    std::fs::read_to_string(&resolved).map_err(|source| BuildError::Io {
        path: resolved,
        source,
    })
}

fn current_dir() -> Result<PathBuf, BuildError> {
    std::env::current_dir().map_err(|source| BuildError::Io {
        path: PathBuf::from("."),
        source,
    })
}

fn fetch_uri(spec: &Value) -> Result<String, BuildError> {
    let (uri, params) = match spec {
        Value::String(uri) => (uri.as_str(), Vec::new()),
        Value::Mapping(_) => {
            let uri = find(spec, &keyword::PATH)
                .and_then(|keyed| keyed.value.as_str())
                .ok_or_else(|| BuildError::MalformedExampleTable {
                    detail: "URI reference mapping requires a 'Path' string".to_owned(),
                })?;
            (uri, request_params(spec)?)
        }
        _ => {
            return Err(BuildError::MalformedExampleTable {
                detail: "'URI' must be a string or a mapping".to_owned(),
            });
        }
    };

    let fetch_error = |source: reqwest::Error| BuildError::Fetch {
        uri: uri.to_owned(),
        source,
    };
    let response = reqwest::blocking::Client::new()
        .get(uri)
        .query(&params)
        .send()
        .map_err(fetch_error)?;
    response.text().map_err(fetch_error)
}

fn request_params(spec: &Value) -> Result<Vec<(String, String)>, BuildError> {
    let Some(keyed) = find(spec, &keyword::REQUEST_PARAMS) else {
        return Ok(Vec::new());
    };
    if keyed.value.is_null() {
        return Ok(Vec::new());
    }
    let mapping = keyed
        .value
        .as_mapping()
        .ok_or_else(|| BuildError::MalformedExampleTable {
            detail: "'RequestParams' must be a mapping".to_owned(),
        })?;
    mapping
        .iter()
        .map(|(key, value)| {
            let key = key
                .as_str()
                .ok_or_else(|| BuildError::MalformedExampleTable {
                    detail: "'RequestParams' keys must be strings".to_owned(),
                })?;
            Ok((
                key.to_owned(),
                crate::model::DataCell::new(value.clone()).text(),
            ))
        })
        .collect()
}
