//! Shapes returned by the validation collaborator (§3 ValidationResult, §4.7).

use serde::{Deserialize, Serialize};

use super::action::{ConditionOperator, ConditionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResult {
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
    pub actual_value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub item_id: Option<i64>,
    pub passed: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub character_id: u32,
    pub passed: bool,
    pub results: Vec<ConditionResult>,
}
