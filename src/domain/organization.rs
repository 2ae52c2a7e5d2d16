use serde::{Deserialize, Serialize};

use crate::domain::common::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, alias = "logo")]
    pub logo_url: Option<String>,
    #[serde(default, alias = "supportingDocument")]
    pub supporting_document_url: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl Identifiable for Organization {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Organization {
    fn name(&self) -> &str {
        &self.name
    }
}
