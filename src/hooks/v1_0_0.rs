use crate::oci;
use crate::oci::Stage;
use crate::when::When;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

pub const VERSION: &str = "1.0.0";

/// One hook definition file.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Hook {
    pub version: String,
    #[validate(nested)]
    pub hook: oci::Hook,
    #[serde(default)]
    pub when: When,
    #[validate(length(min = 1, message = "at least one stage is required"))]
    pub stages: Vec<String>,
}

pub fn read(content: &[u8]) -> Result<Hook, serde_json::Error> {
    serde_json::from_slice(content)
}

impl Hook {
    /// Returns the first stage that is neither a runtime-spec stage nor one of
    /// `extension_stages`.
    pub fn unknown_stage(&self, extension_stages: &[String]) -> Option<&str> {
        self.stages
            .iter()
            .find(|stage| Stage::from_str(stage).is_err() && !extension_stages.contains(*stage))
            .map(String::as_str)
    }
}
