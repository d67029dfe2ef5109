//! Keyword vocabularies accepted by the document decoders.
//!
//! Every concept in the document format is reachable under a closed, ordered
//! group of key spellings. Decoders resolve keys through these groups rather
//! than probing containers ad hoc, so synonym handling lives in one place and
//! the matched spelling can be retained on the built node.

/// An ordered group of acceptable key spellings for one concept.
///
/// Resolution tries the aliases in declaration order and the first hit wins,
/// so preferred spellings ("Scenario Outline" over "Example") come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasGroup {
    /// Label used in error messages when no alias matches.
    pub name: &'static str,
    /// Accepted spellings, in match priority order.
    pub aliases: &'static [&'static str],
}

/// Top-level feature key of a document section.
pub const FEATURE: AliasGroup = AliasGroup {
    name: "Feature",
    aliases: &["Feature"],
};

/// Rule key inside a scenario collection.
pub const RULE: AliasGroup = AliasGroup {
    name: "Rule",
    aliases: &["Rule"],
};

/// Scenario key inside a scenario or background collection.
pub const SCENARIO: AliasGroup = AliasGroup {
    name: "Scenario",
    aliases: &["Scenario Outline", "Scenario", "Example"],
};

/// Required display name of a feature-node.
pub const NAME: AliasGroup = AliasGroup {
    name: "Name",
    aliases: &["Name"],
};

/// Optional free-text description of a feature-node.
pub const DESCRIPTION: AliasGroup = AliasGroup {
    name: "Description",
    aliases: &["Description"],
};

/// Tag list of a feature-node or example table.
pub const TAGS: AliasGroup = AliasGroup {
    name: "Tags",
    aliases: &["Tags"],
};

/// Background collection of a composite node.
pub const BACKGROUNDS: AliasGroup = AliasGroup {
    name: "Backgrounds",
    aliases: &["Backgrounds"],
};

/// Scenario collection of a composite node.
pub const SCENARIOS: AliasGroup = AliasGroup {
    name: "Scenarios",
    aliases: &["Scenarios"],
};

/// Step collection of a scenario.
pub const STEPS: AliasGroup = AliasGroup {
    name: "Steps",
    aliases: &["Steps"],
};

/// Step text field inside an expanded step mapping.
pub const STEP: AliasGroup = AliasGroup {
    name: "Step",
    aliases: &["Step"],
};

/// Example-table collections attached to nodes.
pub const EXAMPLES: AliasGroup = AliasGroup {
    name: "Examples",
    aliases: &["Examples", "DataTables"],
};

/// Step-local data-table collection.
pub const DATA_TABLES: AliasGroup = AliasGroup {
    name: "DataTables",
    aliases: &["DataTables"],
};

/// Per-entry wrapper around one example-table declaration.
pub const TABLE: AliasGroup = AliasGroup {
    name: "Table",
    aliases: &["Table"],
};

/// Embedded content of an example table.
pub const CONTENT: AliasGroup = AliasGroup {
    name: "Content",
    aliases: &["Content"],
};

/// Content-type label selecting a registered parser.
pub const CONTENT_TYPE: AliasGroup = AliasGroup {
    name: "ContentType",
    aliases: &["ContentType"],
};

/// Parser options for embedded content.
pub const CONTENT_META: AliasGroup = AliasGroup {
    name: "ContentMeta",
    aliases: &["ContentMeta"],
};

/// File reference of an example table.
pub const PATH: AliasGroup = AliasGroup {
    name: "Path",
    aliases: &["Path"],
};

/// Resolution mode of a file reference.
pub const PATH_TYPE: AliasGroup = AliasGroup {
    name: "Type",
    aliases: &["Type"],
};

/// Remote reference of an example table.
pub const URI: AliasGroup = AliasGroup {
    name: "URI",
    aliases: &["URI", "URL"],
};

/// Query parameters of a remote reference.
pub const REQUEST_PARAMS: AliasGroup = AliasGroup {
    name: "RequestParams",
    aliases: &["RequestParams"],
};

/// Structured table headers.
pub const HEADERS: AliasGroup = AliasGroup {
    name: "Headers",
    aliases: &["Headers"],
};

/// Structured table rows (row-major).
pub const ROWS: AliasGroup = AliasGroup {
    name: "Rows",
    aliases: &["Rows"],
};

/// Structured table columns (column-major).
pub const COLUMNS: AliasGroup = AliasGroup {
    name: "Columns",
    aliases: &["Columns"],
};

/// The closed set of step keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepKeyword {
    /// `Given` precondition step.
    Given,
    /// `When` action step.
    When,
    /// `Then` assertion step.
    Then,
    /// `And` continuation step. Bare string steps decode to this keyword.
    And,
    /// `But` contrasting continuation step.
    But,
    /// `*` wildcard step.
    Wildcard,
}

impl StepKeyword {
    /// All step keywords, in the order they are tried against a step mapping.
    pub const ALL: [Self; 6] = [
        Self::Given,
        Self::When,
        Self::Then,
        Self::And,
        Self::But,
        Self::Wildcard,
    ];

    /// The canonical spelling used as a mapping key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
            Self::Wildcard => "*",
        }
    }

    /// Parse a mapping key into a step keyword.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kw| kw.as_str() == alias)
    }
}

impl std::fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root against which a file reference is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathRoot {
    /// Resolve against the directory of the document being built.
    #[default]
    FeatureRelative,
    /// Resolve against the process working directory.
    Cwd,
}

impl PathRoot {
    /// Parse the `Type` value of a file reference.
    ///
    /// Anything other than `CWD` falls back to [`PathRoot::FeatureRelative`],
    /// matching the permissive behaviour expected by existing documents.
    #[must_use]
    pub fn from_alias(alias: &str) -> Self {
        if alias == "CWD" {
            Self::Cwd
        } else {
            if alias != "FeatureRelative" {
                log::debug!("unknown file reference type '{alias}'; using FeatureRelative");
            }
            Self::FeatureRelative
        }
    }
}
