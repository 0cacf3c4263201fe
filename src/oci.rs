use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};
use validator::Validate;

// Only the parts of the runtime-spec config.json that hook injection reads or writes
// are typed here, everything else rides along in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Spec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Process {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single hook invocation as the runtime will execute it.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default, PartialEq)]
pub struct Hook {
    #[validate(length(min = 1, message = "missing required property: hook.path"))]
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "hook.timeout must be positive"))]
    pub timeout: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hooks {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prestart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_runtime: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_container: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_container: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststop: Vec<Hook>,
}

impl Hooks {
    pub fn stage_mut(&mut self, stage: Stage) -> &mut Vec<Hook> {
        match stage {
            Stage::Prestart => &mut self.prestart,
            Stage::CreateRuntime => &mut self.create_runtime,
            Stage::CreateContainer => &mut self.create_container,
            Stage::StartContainer => &mut self.start_container,
            Stage::Poststart => &mut self.poststart,
            Stage::Poststop => &mut self.poststop,
        }
    }
}

/// Lifecycle stages the runtime-spec document has a slot for.
#[derive(Serialize, Deserialize, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    #[serde(rename = "prestart")]
    #[strum(serialize = "prestart")]
    Prestart,
    #[serde(rename = "createRuntime")]
    #[strum(serialize = "createRuntime")]
    CreateRuntime,
    #[serde(rename = "createContainer")]
    #[strum(serialize = "createContainer")]
    CreateContainer,
    #[serde(rename = "startContainer")]
    #[strum(serialize = "startContainer")]
    StartContainer,
    #[serde(rename = "poststart")]
    #[strum(serialize = "poststart")]
    Poststart,
    #[serde(rename = "poststop")]
    #[strum(serialize = "poststop")]
    Poststop,
}
