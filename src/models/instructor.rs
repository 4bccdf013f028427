use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub experience: String,
}
