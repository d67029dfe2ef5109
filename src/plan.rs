//! The executable plan builder.
//!
//! Consumes a decoded feature in a second, independent pass and produces the
//! fully parametrized scenario instances the host test runner turns into
//! test cases: every background × scenario × example-table combination, with
//! per-level parameter tables merged by row-wise cross product. Merging two
//! tables that share a column name is a per-combination skip, never a
//! build-wide failure; parameter-closure validation is a separate, opt-in
//! check.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{Composite, DataCell, DataColumn, Scenario, ScenarioNode, Step, StepParameter, Tag};

/// Raised by [`merge_tables`] when both tables define a column of the same
/// name.
///
/// The plan builder treats this as recoverable: the offending combination is
/// skipped and expansion continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter tables share column headers {headers:?}")]
pub struct OverlappingTableParameter {
    /// Every column name defined by both tables.
    pub headers: BTreeSet<String>,
}

/// Raised by [`ParametrizedScenario::validate_parameters`] when placeholders
/// and table columns do not close over each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario has open parameters {open:?}")]
pub struct ValidationError {
    /// Every open parameter name, flow-side and table-side combined.
    pub open: BTreeSet<String>,
}

/// The step flow of one executable scenario instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioFlow {
    /// Keyword of the scenario the flow was derived from.
    pub keyword: Option<String>,
    /// Name of the scenario the flow was derived from.
    pub name: Option<String>,
    /// Description of the scenario the flow was derived from.
    pub description: Option<String>,
    /// Accumulated tags, duplicates retained.
    pub tags: Vec<Tag>,
    /// Background steps followed by scenario steps.
    pub steps: Vec<Step>,
}

impl ScenarioFlow {
    /// The deduplicated set of parameters referenced across all steps.
    #[must_use]
    pub fn step_parameter_set(&self) -> BTreeSet<StepParameter> {
        self.steps
            .iter()
            .flat_map(|step| step.parameters.iter().cloned())
            .collect()
    }
}

/// Parameter columns accumulated for one scenario instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedParametersTable {
    /// Columns in merge order: background, scenario, composite example.
    pub columns: Vec<DataColumn>,
    /// Accumulated tags, duplicates retained.
    pub tags: Vec<Tag>,
}

impl CombinedParametersTable {
    /// The set of column header names.
    #[must_use]
    pub fn header_names(&self) -> BTreeSet<String> {
        self.columns.iter().map(DataColumn::header_name).collect()
    }

    /// Number of parameter rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.data.len())
    }

    /// The table transposed into rows of cells.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<DataCell>> {
        rows_of(&self.columns)
    }
}

/// One parameter binding for one concrete scenario execution: column name
/// paired with the cell supplying its value.
pub type ParameterBinding = Vec<(String, DataCell)>;

/// One fully parametrized, runnable scenario instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParametrizedScenario {
    /// The concatenated step flow.
    pub flow: ScenarioFlow,
    /// The merged parameter table, absent when no level declared examples.
    pub combined_parameters_table: Option<CombinedParametersTable>,
}

impl ParametrizedScenario {
    /// Placeholder names referenced across the flow's steps.
    #[must_use]
    pub fn flow_defined_parameter_names(&self) -> BTreeSet<String> {
        self.flow
            .step_parameter_set()
            .into_iter()
            .map(|parameter| parameter.name)
            .collect()
    }

    /// Column names supplied by the combined table, empty when absent.
    #[must_use]
    pub fn table_defined_parameter_names(&self) -> BTreeSet<String> {
        self.combined_parameters_table
            .as_ref()
            .map(CombinedParametersTable::header_names)
            .unwrap_or_default()
    }

    /// Placeholders referenced by steps but unresolved by any column.
    #[must_use]
    pub fn flow_open_parameter_names(&self) -> BTreeSet<String> {
        self.flow_defined_parameter_names()
            .difference(&self.table_defined_parameter_names())
            .cloned()
            .collect()
    }

    /// Columns unreferenced by any step placeholder.
    #[must_use]
    pub fn table_open_parameter_names(&self) -> BTreeSet<String> {
        self.table_defined_parameter_names()
            .difference(&self.flow_defined_parameter_names())
            .cloned()
            .collect()
    }

    /// Check that every placeholder is resolved by exactly one column and
    /// vice versa.
    ///
    /// This is not run during plan building; the runner opts in.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing the full open set, flow-side and
    /// table-side combined.
    pub fn validate_parameters(&self) -> Result<(), ValidationError> {
        let mut open = self.flow_open_parameter_names();
        open.extend(self.table_open_parameter_names());
        if open.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { open })
        }
    }

    /// Enumerate the concrete executions of this instance, one per combined
    /// table row.
    ///
    /// An instance without a table has exactly one execution with an empty
    /// binding; an instance whose table has no rows has none.
    #[must_use]
    pub fn executions(&self) -> Vec<ParameterBinding> {
        match &self.combined_parameters_table {
            None => vec![Vec::new()],
            Some(table) => {
                let headers: Vec<String> =
                    table.columns.iter().map(DataColumn::header_name).collect();
                table
                    .rows()
                    .into_iter()
                    .map(|row| headers.iter().cloned().zip(row).collect())
                    .collect()
            }
        }
    }

    fn table(&self) -> Option<&CombinedParametersTable> {
        self.combined_parameters_table.as_ref()
    }
}

/// Expand a feature (or rule) into its parametrized scenario instances.
#[must_use]
pub fn expand_feature(feature: &Composite) -> Vec<ParametrizedScenario> {
    expand_composite(feature)
}

/// Expand a leaf scenario: one instance per example table, or a single
/// table-less instance when the scenario declares none.
#[must_use]
pub fn expand_scenario(scenario: &Scenario) -> Vec<ParametrizedScenario> {
    let flow = ScenarioFlow {
        keyword: Some(scenario.keyword.clone()),
        name: Some(scenario.name.clone()),
        description: scenario.description.clone(),
        tags: scenario.tags.clone(),
        steps: scenario.steps.clone(),
    };
    if scenario.examples.is_empty() {
        return vec![ParametrizedScenario {
            flow,
            combined_parameters_table: None,
        }];
    }
    scenario
        .examples
        .iter()
        .map(|example| ParametrizedScenario {
            flow: flow.clone(),
            combined_parameters_table: Some(CombinedParametersTable {
                columns: example.datatable.columns.clone(),
                tags: concat_tags(&[&example.tags, &scenario.tags]),
            }),
        })
        .collect()
}

fn expand_node(node: &ScenarioNode) -> Vec<ParametrizedScenario> {
    match node {
        ScenarioNode::Scenario(scenario) => expand_scenario(scenario),
        ScenarioNode::Rule(rule) => expand_composite(rule),
    }
}

fn expand_composite(node: &Composite) -> Vec<ParametrizedScenario> {
    // A composite with no backgrounds still runs its scenarios: pair them
    // with one neutral instance instead of an empty cross product.
    let backgrounds: Vec<ParametrizedScenario> = if node.backgrounds.is_empty() {
        vec![ParametrizedScenario::default()]
    } else {
        node.backgrounds.iter().flat_map(expand_scenario).collect()
    };
    let children: Vec<ParametrizedScenario> =
        node.children.iter().flat_map(expand_node).collect();

    let mut plan = Vec::new();
    for background in &backgrounds {
        for child in &children {
            combine_into(background, child, node, &mut plan);
        }
    }
    plan
}

/// Merge one background instance with one child instance under `node`,
/// once per node-level example table (or once with no third table).
///
/// The accumulation order is fixed: background, then child, then the node
/// example. Row ordering of the final cross product depends on it.
fn combine_into(
    background: &ParametrizedScenario,
    child: &ParametrizedScenario,
    node: &Composite,
    plan: &mut Vec<ParametrizedScenario>,
) {
    let node_tables: Vec<Option<CombinedParametersTable>> = if node.examples.is_empty() {
        vec![None]
    } else {
        node.examples
            .iter()
            .map(|example| {
                Some(CombinedParametersTable {
                    columns: example.datatable.columns.clone(),
                    tags: concat_tags(&[&example.tags, &node.tags]),
                })
            })
            .collect()
    };

    for node_table in node_tables {
        let merged = merge_tables(background.table(), child.table())
            .and_then(|accumulated| merge_tables(accumulated.as_ref(), node_table.as_ref()));
        match merged {
            Ok(combined_parameters_table) => plan.push(ParametrizedScenario {
                flow: ScenarioFlow {
                    keyword: child.flow.keyword.clone(),
                    name: child.flow.name.clone(),
                    description: child.flow.description.clone(),
                    tags: concat_tags(&[&background.flow.tags, &child.flow.tags, &node.tags]),
                    steps: [background.flow.steps.as_slice(), child.flow.steps.as_slice()]
                        .concat(),
                },
                combined_parameters_table,
            }),
            Err(err) => {
                log::warn!("skipping one combination under '{}': {err}", node.name);
            }
        }
    }
}

/// Merge two optional parameter tables.
///
/// `None` is the identity on either side. When both are present their column
/// names must be disjoint; the result is the row-wise cross product with the
/// left table's rows outermost, the left columns preceding the right, and
/// tags concatenated with duplicates retained.
///
/// # Errors
///
/// Returns [`OverlappingTableParameter`] naming every shared column header.
pub fn merge_tables(
    left: Option<&CombinedParametersTable>,
    right: Option<&CombinedParametersTable>,
) -> Result<Option<CombinedParametersTable>, OverlappingTableParameter> {
    match (left, right) {
        (None, None) => Ok(None),
        (Some(table), None) | (None, Some(table)) => Ok(Some(table.clone())),
        (Some(left), Some(right)) => merge(left, right).map(Some),
    }
}

fn merge(
    left: &CombinedParametersTable,
    right: &CombinedParametersTable,
) -> Result<CombinedParametersTable, OverlappingTableParameter> {
    let shared: BTreeSet<String> = left
        .header_names()
        .intersection(&right.header_names())
        .cloned()
        .collect();
    if !shared.is_empty() {
        return Err(OverlappingTableParameter { headers: shared });
    }

    let left_rows = rows_of(&left.columns);
    let right_rows = rows_of(&right.columns);
    let mut combined_rows = Vec::with_capacity(left_rows.len() * right_rows.len());
    for left_row in &left_rows {
        for right_row in &right_rows {
            let mut row = left_row.clone();
            row.extend(right_row.iter().cloned());
            combined_rows.push(row);
        }
    }

    let columns = left
        .columns
        .iter()
        .chain(&right.columns)
        .enumerate()
        .map(|(index, column)| DataColumn {
            header: column.header.clone(),
            data: combined_rows
                .iter()
                .map(|row| row.get(index).cloned().unwrap_or_default())
                .collect(),
        })
        .collect();

    Ok(CombinedParametersTable {
        columns,
        tags: concat_tags(&[&left.tags, &right.tags]),
    })
}

fn rows_of(columns: &[DataColumn]) -> Vec<Vec<DataCell>> {
    let row_count = columns.first().map_or(0, |column| column.data.len());
    (0..row_count)
        .map(|index| {
            columns
                .iter()
                .map(|column| column.data.get(index).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

fn concat_tags(groups: &[&[Tag]]) -> Vec<Tag> {
    groups.iter().flat_map(|tags| tags.iter().cloned()).collect()
}
