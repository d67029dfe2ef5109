//! Behavioural tests for the executable plan pass.

use gherkin_plan::{BuildContext, build_document, expand_feature, expand_scenario};
use serde_yaml::Value;
use std::collections::BTreeSet;

fn feature(text: &str) -> gherkin_plan::Composite {
    let section: Value =
        serde_yaml::from_str(text).unwrap_or_else(|err| panic!("fixture must parse: {err}"));
    let document = build_document(std::slice::from_ref(&section), &BuildContext::new())
        .unwrap_or_else(|err| panic!("document must build: {err}"));
    document
        .features
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("one feature was declared"))
}

#[test]
fn backgrounded_scenario_with_examples_merges_into_one_instance() {
    let feature = feature(
        "
Feature:
  Name: Cross product
  Backgrounds:
    - Scenario:
        Name: BG
        Steps:
          - Given: the base is <a>
        Examples:
          - Table:
              Content:
                Headers: [a]
                Rows: [[1], [2]]
  Scenarios:
    - Scenario:
        Name: S
        Steps:
          - When: the case is <b>
        Examples:
          - Table:
              Content:
                Headers: [b]
                Rows: [[x], [y], [z]]
",
    );
    let plan = expand_feature(&feature);
    assert_eq!(plan.len(), 1);

    let instance = &plan[0];
    let table = instance
        .combined_parameters_table
        .as_ref()
        .unwrap_or_else(|| panic!("both levels declared examples"));
    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.row_count(), 6);
    assert_eq!(instance.executions().len(), 6);

    // Background steps precede scenario steps.
    assert_eq!(instance.flow.steps.len(), 2);
    assert_eq!(instance.flow.steps[0].text, "the base is <a>");
    assert_eq!(instance.flow.steps[1].text, "the case is <b>");

    instance
        .validate_parameters()
        .unwrap_or_else(|err| panic!("a and b are both closed: {err}"));
}

#[test]
fn scenarios_without_examples_yield_one_tableless_instance() {
    let feature = feature(
        "
Feature:
  Name: Plain
  Scenarios:
    - Scenario:
        Name: S
        Steps:
          - Given: a fixed step
",
    );
    let plan = expand_feature(&feature);
    assert_eq!(plan.len(), 1);
    assert!(plan[0].combined_parameters_table.is_none());
    assert_eq!(plan[0].executions().len(), 1);
    assert_eq!(plan[0].flow.name.as_deref(), Some("S"));
}

#[test]
fn one_instance_per_scenario_example_table() {
    let feature = feature(
        "
Feature:
  Name: Multi
  Scenarios:
    - Scenario:
        Name: S
        Steps:
          - Given: value <p>
        Examples:
          - Table:
              Content:
                Headers: [p]
                Rows: [[1]]
          - Table:
              Content:
                Headers: [p]
                Rows: [[2], [3]]
",
    );
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("one scenario was declared"));
    let instances = expand_scenario(scenario);
    assert_eq!(instances.len(), 2);
    assert_eq!(
        instances[0]
            .combined_parameters_table
            .as_ref()
            .map(gherkin_plan::CombinedParametersTable::row_count),
        Some(1)
    );
    assert_eq!(
        instances[1]
            .combined_parameters_table
            .as_ref()
            .map(gherkin_plan::CombinedParametersTable::row_count),
        Some(2)
    );
}

#[test]
fn overlapping_column_names_skip_the_combination_without_failing() {
    let feature = feature(
        "
Feature:
  Name: Overlap
  Backgrounds:
    - Scenario:
        Name: BG
        Examples:
          - Table:
              Content:
                Headers: [shared]
                Rows: [[1]]
  Scenarios:
    - Scenario:
        Name: Colliding
        Steps:
          - Given: uses <shared>
        Examples:
          - Table:
              Content:
                Headers: [shared]
                Rows: [[2]]
    - Scenario:
        Name: Disjoint
        Steps:
          - Given: uses <shared> and <other>
        Examples:
          - Table:
              Content:
                Headers: [other]
                Rows: [[3]]
",
    );
    let plan = expand_feature(&feature);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].flow.name.as_deref(), Some("Disjoint"));
}

#[test]
fn feature_level_examples_merge_last_with_their_tags() {
    let feature = feature(
        "
Feature:
  Name: Levelled
  Tags: [feature-tag]
  Backgrounds:
    - Scenario:
        Name: BG
        Steps:
          - Given: base <a>
        Examples:
          - Table:
              Content:
                Headers: [a]
                Rows: [[1]]
  Scenarios:
    - Scenario:
        Name: S
        Tags: [scenario-tag]
        Steps:
          - When: case <b> of <c>
        Examples:
          - Table:
              Content:
                Headers: [b]
                Rows: [[2]]
  Examples:
    - Tags: [example-tag]
      Table:
        Content:
          Headers: [c]
          Rows: [[3], [4]]
",
    );
    let plan = expand_feature(&feature);
    assert_eq!(plan.len(), 1);

    let instance = &plan[0];
    let table = instance
        .combined_parameters_table
        .as_ref()
        .unwrap_or_else(|| panic!("every level declared examples"));
    // Merge order is background, scenario, then the feature-level table.
    assert_eq!(
        table
            .columns
            .iter()
            .map(gherkin_plan::DataColumn::header_name)
            .collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
    assert_eq!(table.row_count(), 2);

    let table_tags: Vec<&str> = table.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert!(table_tags.contains(&"example-tag"));
    assert!(table_tags.contains(&"feature-tag"));

    let flow_tags: Vec<&str> = instance
        .flow
        .tags
        .iter()
        .map(|tag| tag.name.as_str())
        .collect();
    assert_eq!(flow_tags, vec!["scenario-tag", "feature-tag"]);

    instance
        .validate_parameters()
        .unwrap_or_else(|err| panic!("a, b, and c are closed: {err}"));
}

#[test]
fn rules_expand_recursively_and_combine_with_the_outer_level() {
    let feature = feature(
        "
Feature:
  Name: Ruled
  Backgrounds:
    - Scenario:
        Name: Outer BG
        Steps:
          - Given: outer <a>
        Examples:
          - Table:
              Content:
                Headers: [a]
                Rows: [[1], [2]]
  Scenarios:
    - Rule:
        Name: Inner
        Backgrounds:
          - Scenario:
              Name: Inner BG
              Steps:
                - Given: inner <b>
              Examples:
                - Table:
                    Content:
                      Headers: [b]
                      Rows: [[3], [4]]
        Scenarios:
          - Scenario:
              Name: Leaf
              Steps:
                - When: leaf <c>
              Examples:
                - Table:
                    Content:
                      Headers: [c]
                      Rows: [[5], [6]]
",
    );
    let plan = expand_feature(&feature);
    assert_eq!(plan.len(), 1);

    let table = plan[0]
        .combined_parameters_table
        .as_ref()
        .unwrap_or_else(|| panic!("every level declared examples"));
    assert_eq!(table.columns.len(), 3);
    assert_eq!(table.row_count(), 8);
    assert_eq!(plan[0].flow.steps.len(), 3);
    assert_eq!(plan[0].flow.steps[0].text, "outer <a>");
    assert_eq!(plan[0].flow.steps[1].text, "inner <b>");
    assert_eq!(plan[0].flow.steps[2].text, "leaf <c>");
}

#[test]
fn backgrounds_without_scenarios_produce_an_empty_plan() {
    let feature = feature(
        "
Feature:
  Name: Background only
  Backgrounds:
    - Scenario:
        Name: BG
        Steps:
          - Given: ground state
",
    );
    assert!(expand_feature(&feature).is_empty());
}

#[test]
fn closure_validation_reports_every_open_name() {
    let feature = feature(
        "
Feature:
  Name: Open
  Scenarios:
    - Scenario:
        Name: S
        Steps:
          - Given: uses <x> and <y>
        Examples:
          - Table:
              Content:
                Headers: [y, z]
                Rows: [[1, 2]]
",
    );
    let plan = expand_feature(&feature);
    let err = plan[0]
        .validate_parameters()
        .expect_err("x is flow-open and z is table-open");
    assert_eq!(err.open, BTreeSet::from(["x".to_owned(), "z".to_owned()]));
}

#[test]
fn expanding_the_same_feature_twice_yields_equal_plans() {
    let feature = feature(
        "
Feature:
  Name: Stable
  Backgrounds:
    - Scenario:
        Name: BG
        Steps:
          - Given: base <a>
        Examples:
          - Table:
              Content:
                Headers: [a]
                Rows: [[1], [2]]
  Scenarios:
    - Scenario:
        Name: S
        Steps:
          - When: case <b>
        Examples:
          - Table:
              Content:
                Headers: [b]
                Rows: [[3]]
",
    );
    assert_eq!(expand_feature(&feature), expand_feature(&feature));
}
