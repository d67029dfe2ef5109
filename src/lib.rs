//! Typed Gherkin feature models and executable scenario plans from
//! YAML-decoded documents.
//!
//! The crate works in two independent passes. The first decodes a sequence
//! of generic document values (as produced by any YAML-like decoder) into a
//! strongly typed [`GherkinDocument`], tolerating keyword synonyms and
//! normalizing every example-table source — inline structured content,
//! embedded delimited text, file references, remote URIs — into one
//! rectangular table representation. The second expands a decoded feature
//! into runnable [`ParametrizedScenario`] instances: the cross product of
//! backgrounds, scenarios, and example tables, with per-level parameter
//! tables merged and placeholder closure validated on demand.
//!
//! ```
//! use gherkin_plan::{BuildContext, build_document, expand_feature};
//!
//! let section: serde_yaml::Value = serde_yaml::from_str(
//!     "
//! Feature:
//!   Name: Lights
//!   Scenarios:
//!     - Scenario:
//!         Name: Toggle
//!         Steps:
//!           - Given: the light is <state>
//!         Examples:
//!           - Table:
//!               Content:
//!                 Headers: [state]
//!                 Rows: [[dim], [lit]]
//! ",
//! )
//! .expect("document parses");
//!
//! let ctx = BuildContext::new();
//! let document = build_document(std::slice::from_ref(&section), &ctx).expect("document builds");
//! let plan = expand_feature(&document.features[0]);
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].executions().len(), 2);
//! plan[0].validate_parameters().expect("parameters close");
//! ```

pub mod builder;
pub mod content;
pub mod context;
pub mod error;
pub mod keyword;
pub mod model;
pub mod plan;
pub mod resolve;
pub mod source;
mod table;

pub use builder::build_document;
pub use content::{ContentParser, ParsedTable, ParserRegistry};
pub use context::BuildContext;
pub use error::BuildError;
pub use model::{
    Composite, DataCell, DataColumn, DataTable, ExampleTable, GherkinDocument, Scenario,
    ScenarioNode, Step, StepParameter, Tag,
};
pub use plan::{
    CombinedParametersTable, OverlappingTableParameter, ParametrizedScenario, ScenarioFlow,
    ValidationError, expand_feature, expand_scenario, merge_tables,
};
