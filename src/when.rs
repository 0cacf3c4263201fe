use crate::errors::MatchError;
use crate::oci::Spec;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Conditions under which a hook applies to a container.
///
/// Every present field is a clause. Clauses are combined with AND, or with OR
/// when `or` is set. A predicate with no clauses never matches, and
/// `always: true` matches regardless of the other clauses.
///
/// Patterns are stored as written and compiled on every [`When::matches`] call, so
/// a malformed pattern is reported when the hook is evaluated rather than when
/// it is loaded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct When {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always: Option<bool>,
    // annotation key -> value pattern; BTreeMap so errors come out in a stable order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(
        default,
        alias = "command",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_bind_mounts: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub or: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

impl When {
    pub fn matches(
        &self,
        config: &Spec,
        annotations: &HashMap<String, String>,
        has_bind_mounts: bool,
    ) -> Result<bool, MatchError> {
        // compile everything up front: a bad pattern is an error even when
        // another clause already decides the outcome
        let commands = self
            .commands
            .iter()
            .map(|pattern| Regex::new(&format!("^(?:{})$", pattern)).map_err(MatchError::Command))
            .collect::<Result<Vec<_>, _>>()?;
        let annotation_patterns = self
            .annotations
            .iter()
            .map(|(key, pattern)| {
                Regex::new(pattern)
                    .map(|re| (key, re))
                    .map_err(|e| MatchError::Annotation { key: key.clone(), source: e })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.always == Some(true) {
            return Ok(true);
        }

        let mut clauses = vec![];

        if let Some(always) = self.always {
            clauses.push(always);
        }

        if let Some(want) = self.has_bind_mounts {
            clauses.push(want == has_bind_mounts);
        }

        for (key, re) in annotation_patterns {
            clauses.push(annotations.get(key).is_some_and(|value| re.is_match(value)));
        }

        if !commands.is_empty() {
            let matched = match config.process.as_ref().map(|p| p.args.as_slice()) {
                None => false,
                Some([]) => return Err(MatchError::EmptyArgs),
                Some([command, ..]) => commands.iter().any(|re| re.is_match(command)),
            };
            clauses.push(matched);
        }

        if clauses.is_empty() {
            return Ok(false);
        }

        Ok(if self.or {
            clauses.into_iter().any(|c| c)
        } else {
            clauses.into_iter().all(|c| c)
        })
    }
}
