use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{impl_resource_ids, IntoFields, Patchable, Resource};
use crate::filter::Fields;
use crate::validation::{Body, InvalidInput, Validate};

/// A saved instruction for note processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Prompt {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub template_type: String,
    pub prompt_text: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Prompt {
    const TABLE: &'static str = "prompts";
    const NAME: &'static str = "Prompt";
    const TRACKS_UPDATES: bool = true;

    type New = NewPrompt;

    impl_resource_ids!();
}

impl Patchable for Prompt {
    type Patch = PromptPatch;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPrompt {
    pub name: String,
    pub template_type: String,
    pub prompt_text: String,
    pub is_default: bool,
}

impl Validate for NewPrompt {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let name = body.required_str("name");
        let template_type = body.required_str("templateType");
        let prompt_text = body.required_str("promptText");
        let is_default = body.optional_bool("isDefault");
        body.finish(|| NewPrompt {
            name: name.unwrap_or_default(),
            template_type: template_type.unwrap_or_default(),
            prompt_text: prompt_text.unwrap_or_default(),
            is_default: is_default.unwrap_or(false),
        })
    }
}

impl IntoFields for NewPrompt {
    fn into_fields(self) -> Fields {
        Fields::new()
            .set("name", self.name)
            .set("template_type", self.template_type)
            .set("prompt_text", self.prompt_text)
            .set("is_default", self.is_default)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPatch {
    pub name: Option<String>,
    pub prompt_text: Option<String>,
    pub is_default: Option<bool>,
}

impl Validate for PromptPatch {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let name = body.optional_non_empty_str("name");
        let prompt_text = body.optional_non_empty_str("promptText");
        let is_default = body.optional_bool("isDefault");
        let patch = body.finish(|| PromptPatch { name, prompt_text, is_default })?;
        if patch == PromptPatch::default() {
            return Err(InvalidInput::field("body", "at least one of name, promptText, isDefault is required"));
        }
        Ok(patch)
    }
}

impl IntoFields for PromptPatch {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(name) = self.name {
            fields.insert("name", name);
        }
        if let Some(prompt_text) = self.prompt_text {
            fields.insert("prompt_text", prompt_text);
        }
        if let Some(is_default) = self.is_default {
            fields.insert("is_default", is_default);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_prompt_text_is_named() {
        let err = NewPrompt::validate(Body::from_value(json!({"name": "n", "templateType": "default"})).unwrap())
            .unwrap_err();
        assert_eq!(err.fields(), vec!["promptText"]);
    }

    #[test]
    fn template_type_cannot_be_patched() {
        let err = PromptPatch::validate(Body::from_value(json!({"templateType": "summarize"})).unwrap()).unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);
    }
}
