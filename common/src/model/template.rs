use crate::model::tag::TagSet;
use serde::{Deserialize, Serialize};

/// The template a user is preparing to send, handed from template editing to
/// dispatch.
///
/// Serialized as `{ "name": ..., "htmlContent": "...", "tags": [{ "name", "column" }] }`.
/// `name` is the display name used as the message title in
/// `template_name` title mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub html_content: String,
    #[serde(default)]
    pub tags: TagSet,
}

impl DraftTemplate {
    /// A draft with no content cannot be dispatched.
    pub fn is_empty(&self) -> bool {
        self.html_content.trim().is_empty()
    }
}
