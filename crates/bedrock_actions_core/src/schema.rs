//! OpenAPI documents attached to each action group.
//!
//! The agent reads these documents to decide which operation to call and
//! which parameters to collect. The dispatcher never consults them at
//! request time; they are parsed here so tests and packaging can verify
//! that declared paths and registered handlers agree.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::contract::JSON_CONTENT_TYPE;
use crate::registry::OperationRegistry;

pub const SUPPORTED_OPENAPI_VERSION: &str = "3.0.0";
pub const GREETING_SCHEMA: &str = include_str!("../schemas/greeting.json");
pub const CUSTOMER_SERVICE_SCHEMA: &str = include_str!("../schemas/customer_service.json");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed schema document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported openapi version '{0}' (expected 3.0.0)")]
    UnsupportedVersion(String),
    #[error("operation {method} {path} has no 200 response")]
    MissingSuccessResponse { path: String, method: String },
}

#[derive(Debug, Deserialize)]
struct OpenApiDocument {
    openapi: String,
    info: DocumentInfo,
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, OperationObject>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationObject {
    operation_id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: String,
    request_body: Option<ContentHolder>,
    #[serde(default)]
    responses: BTreeMap<String, ContentHolder>,
}

#[derive(Debug, Deserialize)]
struct ContentHolder {
    #[serde(default)]
    content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Deserialize)]
struct MediaType {
    schema: ObjectSchema,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectSchema {
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    required: Vec<String>,
}

impl ContentHolder {
    fn json_schema(&self) -> Option<&ObjectSchema> {
        self.content
            .get(JSON_CONTENT_TYPE)
            .map(|media_type| &media_type.schema)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredOperation {
    pub path: String,
    pub method: String,
    pub operation_id: String,
    pub summary: String,
    pub description: String,
    pub request_properties: BTreeSet<String>,
    pub required_properties: BTreeSet<String>,
    pub response_properties: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSummary {
    pub info: DocumentInfo,
    pub operations: Vec<DeclaredOperation>,
}

impl SchemaSummary {
    pub fn parse(document: &str) -> Result<Self, SchemaError> {
        let document: OpenApiDocument = serde_json::from_str(document)?;
        if document.openapi != SUPPORTED_OPENAPI_VERSION {
            return Err(SchemaError::UnsupportedVersion(document.openapi));
        }

        let mut operations = Vec::new();
        for (path, methods) in document.paths {
            for (method, operation) in methods {
                let success = operation.responses.get("200").ok_or_else(|| {
                    SchemaError::MissingSuccessResponse {
                        path: path.clone(),
                        method: method.clone(),
                    }
                })?;
                let response_properties = success
                    .json_schema()
                    .map(|schema| schema.properties.keys().cloned().collect())
                    .unwrap_or_default();
                let request_schema = operation
                    .request_body
                    .as_ref()
                    .and_then(ContentHolder::json_schema);
                let (request_properties, required_properties) = match request_schema {
                    Some(schema) => (
                        schema.properties.keys().cloned().collect(),
                        schema.required.iter().cloned().collect(),
                    ),
                    None => (BTreeSet::new(), BTreeSet::new()),
                };

                operations.push(DeclaredOperation {
                    path: path.clone(),
                    method,
                    operation_id: operation.operation_id,
                    summary: operation.summary,
                    description: operation.description,
                    request_properties,
                    required_properties,
                    response_properties,
                });
            }
        }

        Ok(Self {
            info: document.info,
            operations,
        })
    }

    pub fn declared_paths(&self) -> BTreeSet<&str> {
        self.operations
            .iter()
            .map(|operation| operation.path.as_str())
            .collect()
    }

    pub fn operation(&self, path: &str) -> Option<&DeclaredOperation> {
        self.operations
            .iter()
            .find(|operation| operation.path == path)
    }

    pub fn drift_from(&self, registry: &OperationRegistry) -> RegistryDrift {
        let declared = self.declared_paths();
        let registered: BTreeSet<&str> = registry.paths().collect();

        RegistryDrift {
            unhandled_paths: declared
                .difference(&registered)
                .map(|path| path.to_string())
                .collect(),
            undeclared_paths: registered
                .difference(&declared)
                .map(|path| path.to_string())
                .collect(),
        }
    }
}

/// Mismatch between a schema document and a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDrift {
    /// Declared in the schema, no handler registered.
    pub unhandled_paths: Vec<String>,
    /// Registered, never declared to the agent.
    pub undeclared_paths: Vec<String>,
}

impl RegistryDrift {
    pub fn is_empty(&self) -> bool {
        self.unhandled_paths.is_empty() && self.undeclared_paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{
        say_hello, CHECK_ORDER_STATUS_PATH, PROCESS_RETURN_PATH, SAY_HELLO_PATH,
    };
    use crate::registry::ActionGroupVariant;

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn embedded_schemas_match_registries() {
        for variant in ActionGroupVariant::ALL {
            let summary = variant.schema_summary().expect("embedded schema should parse");
            let drift = summary.drift_from(&variant.registry());
            assert!(drift.is_empty(), "{variant} schema drift: {drift:?}");
        }
    }

    #[test]
    fn embedded_schemas_declare_post_operations_with_ids() {
        for variant in ActionGroupVariant::ALL {
            let summary = variant.schema_summary().expect("embedded schema should parse");
            assert!(!summary.info.title.is_empty());
            assert!(!summary.info.description.is_empty());
            for operation in &summary.operations {
                assert_eq!(operation.method, "post");
                assert_eq!(
                    format!("/{}", operation.operation_id),
                    operation.path,
                    "operationId should mirror the path"
                );
                assert!(!operation.summary.is_empty());
            }
        }
    }

    #[test]
    fn customer_service_schema_declares_handler_parameters() {
        let summary = ActionGroupVariant::CustomerService
            .schema_summary()
            .expect("embedded schema should parse");

        let order_status = summary
            .operation(CHECK_ORDER_STATUS_PATH)
            .expect("checkOrderStatus should be declared");
        assert_eq!(order_status.request_properties, names(&["orderId"]));
        assert_eq!(order_status.required_properties, names(&["orderId"]));
        assert_eq!(
            order_status.response_properties,
            names(&["estimatedDelivery", "orderId", "status"])
        );

        let process_return = summary
            .operation(PROCESS_RETURN_PATH)
            .expect("processReturn should be declared");
        assert_eq!(process_return.request_properties, names(&["orderId", "reason"]));
        assert_eq!(
            process_return.response_properties,
            names(&["orderId", "reason", "returnId", "status"])
        );
    }

    #[test]
    fn greeting_schema_keeps_name_optional() {
        let summary = ActionGroupVariant::Greeting
            .schema_summary()
            .expect("embedded schema should parse");
        let hello = summary
            .operation(SAY_HELLO_PATH)
            .expect("sayHello should be declared");

        assert_eq!(hello.request_properties, names(&["name"]));
        assert!(hello.required_properties.is_empty());
        assert_eq!(hello.response_properties, names(&["message"]));
    }

    #[test]
    fn drift_reports_both_directions() {
        let summary = ActionGroupVariant::CustomerService
            .schema_summary()
            .expect("embedded schema should parse");
        let registry = OperationRegistry::new().register(SAY_HELLO_PATH, say_hello);

        let drift = summary.drift_from(&registry);
        assert_eq!(
            drift.unhandled_paths,
            vec![CHECK_ORDER_STATUS_PATH.to_string(), PROCESS_RETURN_PATH.to_string()]
        );
        assert_eq!(drift.undeclared_paths, vec![SAY_HELLO_PATH.to_string()]);
    }

    #[test]
    fn rejects_other_openapi_versions() {
        let error = SchemaSummary::parse(
            r#"{"openapi": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}}"#,
        )
        .expect_err("swagger 2.0 should be rejected");
        assert!(matches!(error, SchemaError::UnsupportedVersion(version) if version == "2.0"));
    }

    #[test]
    fn rejects_operation_without_success_response() {
        let error = SchemaSummary::parse(
            r#"{
                "openapi": "3.0.0",
                "info": {"title": "t", "version": "1"},
                "paths": {"/x": {"post": {"operationId": "x", "responses": {}}}}
            }"#,
        )
        .expect_err("missing 200 response should be rejected");
        assert!(matches!(error, SchemaError::MissingSuccessResponse { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = SchemaSummary::parse("{").expect_err("truncated document should fail");
        assert!(matches!(error, SchemaError::Malformed(_)));
    }
}
