//! First-match alias resolution over generic document values.
//!
//! Every decoder in this crate reads keys through [`find`] or [`require`],
//! which try an [`AliasGroup`]'s spellings in order and report which one
//! matched. Downstream builders keep the matched spelling as the node's
//! `keyword`, preserving the author's vocabulary choice.

use serde_yaml::Value;

use crate::error::BuildError;
use crate::keyword::AliasGroup;

/// A resolved key: the alias that matched and the value found under it.
#[derive(Debug, Clone, Copy)]
pub struct Keyed<'a> {
    /// The alias that matched, exactly as spelled in the group.
    pub keyword: &'static str,
    /// The value stored under the matched key.
    pub value: &'a Value,
}

/// Resolve the first alias of `group` present in `container`.
///
/// Returns `None` when no alias matches or when `container` is not a
/// mapping. Callers with a default substitute it at this point.
#[must_use]
pub fn find<'a>(container: &'a Value, group: &AliasGroup) -> Option<Keyed<'a>> {
    group.aliases.iter().copied().find_map(|alias| {
        container.get(alias).map(|value| Keyed {
            keyword: alias,
            value,
        })
    })
}

/// Resolve the first alias of `group` present in `container`, failing when
/// none match.
///
/// # Errors
///
/// Returns [`BuildError::MissingKey`] naming the alias group and `node`, the
/// caller's description of the container being searched.
pub fn require<'a>(
    container: &'a Value,
    group: &AliasGroup,
    node: &str,
) -> Result<Keyed<'a>, BuildError> {
    find(container, group).ok_or_else(|| BuildError::MissingKey {
        aliases: group.aliases,
        node: node.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap_or_else(|err| panic!("fixture must parse: {err}"))
    }

    #[test]
    fn first_alias_wins_and_is_reported() {
        let value = yaml("{Example: a, Scenario: b, 'Scenario Outline': c}");
        let keyed = find(&value, &keyword::SCENARIO).expect("a scenario alias is present");
        assert_eq!(keyed.keyword, "Scenario Outline");
        assert_eq!(keyed.value.as_str(), Some("c"));
    }

    #[test]
    fn later_aliases_match_when_earlier_ones_are_absent() {
        let value = yaml("{URL: 'http://example.test'}");
        let keyed = find(&value, &keyword::URI).expect("URL is an accepted spelling");
        assert_eq!(keyed.keyword, "URL");
    }

    #[test]
    fn absent_group_yields_none() {
        let value = yaml("{Name: n}");
        assert!(find(&value, &keyword::TAGS).is_none());
    }

    #[test]
    fn non_mapping_containers_never_match() {
        let value = yaml("[Feature]");
        assert!(find(&value, &keyword::FEATURE).is_none());
    }

    #[test]
    fn require_names_the_group_and_the_node() {
        let value = yaml("{Name: n}");
        let err = require(&value, &keyword::FEATURE, "document section")
            .expect_err("Feature key is absent");
        let message = err.to_string();
        assert!(message.contains("Feature"), "message was: {message}");
        assert!(message.contains("document section"), "message was: {message}");
    }
}
