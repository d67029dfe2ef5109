//! Decoders from generic document values into the feature model.
//!
//! [`build_document`] is the top-level entry: it resolves the `Feature` key
//! of every section and recurses through the composite, scenario, and step
//! decoders. All decoding is synchronous and single-pass; file and URI
//! example sources are read inline as they are encountered.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::keyword::{self, StepKeyword};
use crate::model::{
    Composite, ExampleTable, GherkinDocument, Scenario, ScenarioNode, Step, StepParameter, Tag,
};
use crate::resolve::{Keyed, find, require};
use crate::source::load_example;

/// Decode a sequence of raw document sections into a [`GherkinDocument`].
///
/// Every section must carry a `Feature` key; there is no per-feature
/// recovery, so one unrecognizable section fails the whole build.
///
/// # Errors
///
/// Propagates any decode failure from the sections, in input order.
pub fn build_document(
    sections: &[Value],
    ctx: &BuildContext,
) -> Result<GherkinDocument, BuildError> {
    let mut features = Vec::with_capacity(sections.len());
    for section in sections {
        let keyed = require(section, &keyword::FEATURE, "document section")?;
        features.push(build_composite(&keyed, ctx)?);
    }
    Ok(GherkinDocument { features })
}

/// Decode a `Feature` or `Rule` payload into a [`Composite`].
fn build_composite(keyed: &Keyed<'_>, ctx: &BuildContext) -> Result<Composite, BuildError> {
    let payload = keyed.value;
    Ok(Composite {
        keyword: keyed.keyword.to_owned(),
        name: require_name(payload, keyed.keyword)?,
        description: build_description(payload)?,
        tags: build_tags(find(payload, &keyword::TAGS))?,
        backgrounds: build_backgrounds(find(payload, &keyword::BACKGROUNDS), ctx)?,
        children: build_children(find(payload, &keyword::SCENARIOS), ctx)?,
        examples: build_examples(find(payload, &keyword::EXAMPLES), ctx)?,
    })
}

/// Decode a scenario or background payload into a [`Scenario`].
fn build_scenario(keyed: &Keyed<'_>, ctx: &BuildContext) -> Result<Scenario, BuildError> {
    let payload = keyed.value;
    Ok(Scenario {
        keyword: keyed.keyword.to_owned(),
        name: require_name(payload, keyed.keyword)?,
        description: build_description(payload)?,
        tags: build_tags(find(payload, &keyword::TAGS))?,
        steps: build_steps(find(payload, &keyword::STEPS), ctx)?,
        examples: build_examples(find(payload, &keyword::EXAMPLES), ctx)?,
    })
}

fn require_name(payload: &Value, node: &str) -> Result<String, BuildError> {
    let keyed = find(payload, &keyword::NAME).ok_or_else(|| BuildError::MissingName {
        node: node.to_owned(),
    })?;
    keyed
        .value
        .as_str()
        .map(str::to_owned)
        .ok_or(BuildError::UnexpectedShape {
            key: "Name".to_owned(),
            expected: "string",
        })
}

fn build_description(payload: &Value) -> Result<Option<String>, BuildError> {
    find(payload, &keyword::DESCRIPTION)
        .map(|keyed| {
            keyed
                .value
                .as_str()
                .map(str::to_owned)
                .ok_or(BuildError::UnexpectedShape {
                    key: "Description".to_owned(),
                    expected: "string",
                })
        })
        .transpose()
}

fn build_tags(collection: Option<Keyed<'_>>) -> Result<Vec<Tag>, BuildError> {
    let Some(keyed) = collection else {
        return Ok(Vec::new());
    };
    let entries = keyed
        .value
        .as_sequence()
        .ok_or(BuildError::UnexpectedShape {
            key: keyed.keyword.to_owned(),
            expected: "sequence",
        })?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .filter(|name| !name.is_empty())
                .map(Tag::new)
                .ok_or(BuildError::InvalidTag)
        })
        .collect()
}

fn build_backgrounds(
    collection: Option<Keyed<'_>>,
    ctx: &BuildContext,
) -> Result<Vec<Scenario>, BuildError> {
    let Some(keyed) = collection else {
        return Ok(Vec::new());
    };
    let entries = keyed
        .value
        .as_sequence()
        .ok_or(BuildError::UnexpectedShape {
            key: keyed.keyword.to_owned(),
            expected: "sequence",
        })?;
    let mut backgrounds = Vec::new();
    for entry in entries {
        if let Some(scenario) = find(entry, &keyword::SCENARIO) {
            backgrounds.push(build_scenario(&scenario, ctx)?);
        } else if find(entry, &keyword::RULE).is_some() {
            // Backgrounds are scenario-shaped; rules cannot nest here.
            log::warn!("'Rule' entries are not allowed inside 'Backgrounds'; dropping the entry");
        } else {
            log::debug!("background entry matches no known node kind; dropping it");
        }
    }
    Ok(backgrounds)
}

fn build_children(
    collection: Option<Keyed<'_>>,
    ctx: &BuildContext,
) -> Result<Vec<ScenarioNode>, BuildError> {
    let Some(keyed) = collection else {
        return Ok(Vec::new());
    };
    let entries = keyed
        .value
        .as_sequence()
        .ok_or(BuildError::UnexpectedShape {
            key: keyed.keyword.to_owned(),
            expected: "sequence",
        })?;
    let mut children = Vec::new();
    for entry in entries {
        if let Some(scenario) = find(entry, &keyword::SCENARIO) {
            children.push(ScenarioNode::Scenario(build_scenario(&scenario, ctx)?));
        } else if let Some(rule) = find(entry, &keyword::RULE) {
            children.push(ScenarioNode::Rule(build_composite(&rule, ctx)?));
        } else {
            log::debug!("scenario entry matches no known node kind; dropping it");
        }
    }
    Ok(children)
}

fn build_steps(
    collection: Option<Keyed<'_>>,
    ctx: &BuildContext,
) -> Result<Vec<Step>, BuildError> {
    let Some(keyed) = collection else {
        return Ok(Vec::new());
    };
    let entries = keyed
        .value
        .as_sequence()
        .ok_or(BuildError::UnexpectedShape {
            key: keyed.keyword.to_owned(),
            expected: "sequence",
        })?;
    entries.iter().map(|entry| build_step(entry, ctx)).collect()
}

/// Decode one step line.
///
/// A step is either a bare string (keyword `And`), or a mapping keyed by one
/// of the six step keywords whose value is the step text or a mapping with a
/// `Step` text field and optional `DataTables`.
fn build_step(entry: &Value, ctx: &BuildContext) -> Result<Step, BuildError> {
    let (keyword, text, datatables) = match entry {
        Value::String(text) => (StepKeyword::And, text.clone(), Vec::new()),
        Value::Mapping(_) => {
            let (step_keyword, payload) = step_key(entry)?;
            match payload {
                Value::String(text) => (step_keyword, text.clone(), Vec::new()),
                Value::Mapping(_) => {
                    let text = require(payload, &keyword::STEP, "step mapping")?
                        .value
                        .as_str()
                        .ok_or(BuildError::UnexpectedShape {
                            key: "Step".to_owned(),
                            expected: "string",
                        })?
                        .to_owned();
                    let datatables = build_examples(find(payload, &keyword::DATA_TABLES), ctx)?;
                    (step_keyword, text, datatables)
                }
                _ => {
                    return Err(BuildError::UnexpectedShape {
                        key: step_keyword.as_str().to_owned(),
                        expected: "string or mapping",
                    });
                }
            }
        }
        _ => {
            return Err(BuildError::UnexpectedShape {
                key: "Steps".to_owned(),
                expected: "string or mapping entries",
            });
        }
    };
    let parameters = extract_parameters(&text);
    Ok(Step {
        keyword,
        text,
        parameters,
        datatables,
    })
}

fn step_key(entry: &Value) -> Result<(StepKeyword, &Value), BuildError> {
    StepKeyword::ALL
        .into_iter()
        .find_map(|keyword| {
            entry
                .get(keyword.as_str())
                .map(|payload| (keyword, payload))
        })
        .ok_or_else(|| BuildError::MissingKey {
            aliases: &["Given", "When", "Then", "And", "But", "*"],
            node: "step entry".to_owned(),
        })
}

static STEP_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.+?)>").expect("placeholder pattern is valid"));

/// Extract `<name>` placeholders from step text, left to right.
///
/// Duplicates are retained here; deduplication happens only when a scenario
/// flow collects its parameter set.
#[must_use]
pub fn extract_parameters(text: &str) -> Vec<StepParameter> {
    STEP_PARAM_RE
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| StepParameter {
            name: name.as_str().to_owned(),
        })
        .collect()
}

fn build_examples(
    collection: Option<Keyed<'_>>,
    ctx: &BuildContext,
) -> Result<Vec<ExampleTable>, BuildError> {
    let Some(keyed) = collection else {
        return Ok(Vec::new());
    };
    let entries = keyed
        .value
        .as_sequence()
        .ok_or(BuildError::UnexpectedShape {
            key: keyed.keyword.to_owned(),
            expected: "sequence",
        })?;
    let mut tables = Vec::new();
    for entry in entries {
        let Some(table) = find(entry, &keyword::TABLE) else {
            log::debug!("entry under '{}' has no 'Table' key; dropping it", keyed.keyword);
            continue;
        };
        let tags = build_tags(find(entry, &keyword::TAGS))?;
        match load_example(table.value, ctx)? {
            Some(datatable) => tables.push(ExampleTable {
                keyword: keyed.keyword.to_owned(),
                tags,
                datatable,
            }),
            None => {
                log::warn!(
                    "example table under '{}' matches no source group; dropping it",
                    keyed.keyword
                );
            }
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap_or_else(|err| panic!("fixture must parse: {err}"))
    }

    fn step(text: &str) -> Step {
        build_step(&yaml(text), &BuildContext::new()).unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn bare_string_steps_decode_as_and() {
        let step = step("'the lights are on'");
        assert_eq!(step.keyword, StepKeyword::And);
        assert_eq!(step.text, "the lights are on");
        assert!(step.datatables.is_empty());
    }

    #[test]
    fn keyed_steps_retain_their_keyword() {
        let step = step("{When: 'the switch is flipped'}");
        assert_eq!(step.keyword, StepKeyword::When);
        assert_eq!(step.text, "the switch is flipped");
    }

    #[test]
    fn expanded_steps_carry_inline_datatables() {
        let step = step(
            "{Given: {Step: 'a table', DataTables: [{Table: {Content: {Headers: [a], Rows: [[1]]}}}]}}",
        );
        assert_eq!(step.keyword, StepKeyword::Given);
        assert_eq!(step.datatables.len(), 1);
        assert_eq!(step.datatables[0].keyword, "DataTables");
    }

    #[test]
    fn expanded_steps_require_a_step_text() {
        let err = build_step(&yaml("{Then: {DataTables: []}}"), &BuildContext::new())
            .expect_err("the Step field is required");
        assert!(matches!(err, BuildError::MissingKey { .. }));
    }

    #[test]
    fn unkeyed_step_mappings_are_rejected() {
        let err = build_step(&yaml("{Perhaps: text}"), &BuildContext::new())
            .expect_err("only the six step keywords are accepted");
        assert!(matches!(err, BuildError::MissingKey { .. }));
    }

    #[test]
    fn placeholders_are_extracted_in_order_with_duplicates() {
        let parameters = extract_parameters("given <a> and <b> then <a>");
        let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "a"]);
    }

    #[test]
    fn placeholder_matching_is_non_greedy() {
        let parameters = extract_parameters("<a> eats <b>");
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "a");
    }

    #[test]
    fn tags_must_be_non_empty_strings() {
        let err = build_tags(find(&yaml("{Tags: [ok, 17]}"), &keyword::TAGS))
            .expect_err("numeric tags are invalid");
        assert!(matches!(err, BuildError::InvalidTag));
    }
}
