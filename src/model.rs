//! The static feature model.
//!
//! Everything here is an immutable value object once built: the document
//! builder constructs the tree top-down in a single pass and nothing mutates
//! it afterwards. The executable plan derived from this model lives in
//! [`crate::plan`] and is never merged back.

use serde_yaml::Value;

use crate::keyword::StepKeyword;

/// A tag attached to a feature-node or example table.
///
/// Tag names are always non-empty strings; the builders reject anything else.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    /// The tag text as written in the document.
    pub name: String,
}

impl Tag {
    /// Construct a tag from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One cell of a data table, holding a scalar or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataCell {
    /// The decoded scalar; `Value::Null` marks a padded or empty cell.
    pub value: Value,
}

impl DataCell {
    /// Wrap a scalar value in a cell.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The null cell used to pad ragged rows.
    #[must_use]
    pub fn null() -> Self {
        Self { value: Value::Null }
    }

    /// Render the cell for header comparison and parameter binding.
    ///
    /// Null renders as the empty string; scalars render in their canonical
    /// text form.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.clone(),
            other => format!("{other:?}"),
        }
    }
}

impl From<&str> for DataCell {
    fn from(text: &str) -> Self {
        Self::new(Value::String(text.to_owned()))
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    /// Header cell naming the column.
    pub header: DataCell,
    /// Cell values, one per table row.
    pub data: Vec<DataCell>,
}

impl DataColumn {
    /// The column's header rendered as text.
    #[must_use]
    pub fn header_name(&self) -> String {
        self.header.text()
    }
}

/// A rectangular table of named columns.
///
/// Every constructor guarantees that all columns share the same row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    /// Columns in declaration order.
    pub columns: Vec<DataColumn>,
}

impl DataTable {
    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows shared by every column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.data.len())
    }

    /// Column headers rendered as text, in declaration order.
    #[must_use]
    pub fn header_names(&self) -> Vec<String> {
        self.columns.iter().map(DataColumn::header_name).collect()
    }
}

/// One example table attached to a node or step.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleTable {
    /// The alias of the enclosing collection (`Examples` or `DataTables`).
    pub keyword: String,
    /// Tags declared on the table entry.
    pub tags: Vec<Tag>,
    /// The normalized table content.
    pub datatable: DataTable,
}

/// A named placeholder referenced by a step's text.
///
/// Two parameters with the same name are the same parameter; deduplication
/// happens when a scenario flow collects its parameter set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepParameter {
    /// Placeholder name without the angle brackets.
    pub name: String,
}

/// One step line of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The step's keyword role.
    pub keyword: StepKeyword,
    /// The raw step text, placeholders included.
    pub text: String,
    /// Placeholders referenced by the text, left to right, duplicates
    /// retained.
    pub parameters: Vec<StepParameter>,
    /// Step-local data tables.
    pub datatables: Vec<ExampleTable>,
}

/// A terminal scenario or background node.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// The alias under which the node was declared.
    pub keyword: String,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Tags declared on the node.
    pub tags: Vec<Tag>,
    /// Steps in declaration order.
    pub steps: Vec<Step>,
    /// Example tables declared on the node.
    pub examples: Vec<ExampleTable>,
}

/// An entry of a composite node's scenario collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioNode {
    /// A terminal scenario.
    Scenario(Scenario),
    /// A nested rule, recursing into the composite shape.
    Rule(Composite),
}

/// A composite node: a `Feature` or a `Rule`.
///
/// Both share one shape; the retained `keyword` tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// The alias under which the node was declared.
    pub keyword: String,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Tags declared on the node.
    pub tags: Vec<Tag>,
    /// Backgrounds, decoded as scenario-shaped nodes.
    pub backgrounds: Vec<Scenario>,
    /// Scenario collection entries: scenarios and nested rules.
    pub children: Vec<ScenarioNode>,
    /// Example tables declared on the node.
    pub examples: Vec<ExampleTable>,
}

impl Composite {
    /// The terminal scenarios of this node's scenario collection.
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.children.iter().filter_map(|child| match child {
            ScenarioNode::Scenario(scenario) => Some(scenario),
            ScenarioNode::Rule(_) => None,
        })
    }

    /// The nested rules of this node's scenario collection.
    pub fn rules(&self) -> impl Iterator<Item = &Composite> {
        self.children.iter().filter_map(|child| match child {
            ScenarioNode::Rule(rule) => Some(rule),
            ScenarioNode::Scenario(_) => None,
        })
    }
}

/// The decoded document root, owning every feature in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GherkinDocument {
    /// Features in the order their sections appeared.
    pub features: Vec<Composite>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_scalars_as_text() {
        assert_eq!(DataCell::null().text(), "");
        assert_eq!(DataCell::from("abc").text(), "abc");
        assert_eq!(DataCell::new(Value::Bool(true)).text(), "true");
        assert_eq!(DataCell::new(Value::from(3)).text(), "3");
    }

    #[test]
    fn composite_accessors_split_children_by_kind() {
        let scenario = Scenario {
            keyword: "Scenario".into(),
            name: "s".into(),
            description: None,
            tags: Vec::new(),
            steps: Vec::new(),
            examples: Vec::new(),
        };
        let rule = Composite {
            keyword: "Rule".into(),
            name: "r".into(),
            description: None,
            tags: Vec::new(),
            backgrounds: Vec::new(),
            children: Vec::new(),
            examples: Vec::new(),
        };
        let feature = Composite {
            keyword: "Feature".into(),
            name: "f".into(),
            description: None,
            tags: Vec::new(),
            backgrounds: Vec::new(),
            children: vec![
                ScenarioNode::Scenario(scenario.clone()),
                ScenarioNode::Rule(rule.clone()),
            ],
            examples: Vec::new(),
        };
        assert_eq!(feature.scenarios().collect::<Vec<_>>(), vec![&scenario]);
        assert_eq!(feature.rules().collect::<Vec<_>>(), vec![&rule]);
    }
}
