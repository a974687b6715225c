use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub const MESSAGE_VERSION: &str = "1.0";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const STATUS_OK: u16 = 200;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionParameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub parameter_type: String,
    pub value: String,
}

impl ActionParameter {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_type: "string".to_string(),
            value: value.into(),
        }
    }
}

/// Event delivered by the Bedrock agent runtime for one action invocation.
///
/// Only `action_group`, `api_path`, `http_method` and `parameters` drive
/// behavior. Agent and session fields are accepted so real events decode,
/// and default to empty when a caller leaves them out or sends `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default = "default_message_version")]
    pub message_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent: AgentInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_attributes: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_session_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ActionParameter>,
}

impl ActionRequest {
    pub fn new(
        action_group: impl Into<String>,
        api_path: impl Into<String>,
        http_method: impl Into<String>,
        parameters: Vec<ActionParameter>,
    ) -> Self {
        Self {
            message_version: default_message_version(),
            agent: AgentInfo::default(),
            session_id: String::new(),
            session_attributes: BTreeMap::new(),
            prompt_session_attributes: BTreeMap::new(),
            input_text: None,
            action_group: action_group.into(),
            api_path: api_path.into(),
            http_method: http_method.into(),
            parameters,
        }
    }

    /// Value of the first parameter called `name`, if any.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        find_parameter(&self.parameters, name)
    }
}

pub fn find_parameter<'a>(parameters: &'a [ActionParameter], name: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|parameter| parameter.name == name)
        .map(|parameter| parameter.value.as_str())
}

fn default_message_version() -> String {
    MESSAGE_VERSION.to_string()
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseBody {
    #[serde(rename = "application/json")]
    pub application_json: JsonBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponsePayload {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub message_version: String,
    pub response: ActionResponsePayload,
}

impl ActionResponse {
    /// Wraps an already-serialized JSON body, echoing the request envelope.
    pub fn with_body(request: &ActionRequest, status_code: u16, body: String) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ActionResponsePayload {
                action_group: request.action_group.clone(),
                api_path: request.api_path.clone(),
                http_method: request.http_method.clone(),
                http_status_code: status_code,
                response_body: ResponseBody {
                    application_json: JsonBody { body },
                },
            },
        }
    }

    pub fn from_result(
        request: &ActionRequest,
        status_code: u16,
        result: &impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(result)?;
        Ok(Self::with_body(request, status_code, body))
    }

    pub fn status_code(&self) -> u16 {
        self.response.http_status_code
    }

    pub fn body(&self) -> &str {
        &self.response.response_body.application_json.body
    }
}
