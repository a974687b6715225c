use bedrock_actions_core::contract::{
    ActionRequest, ActionResponse, STATUS_INTERNAL_ERROR, STATUS_OK,
};
use bedrock_actions_core::operations::{Clock, ErrorResult};
use bedrock_actions_core::registry::OperationRegistry;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum ActionEventError {
    #[error("invalid action group event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decodes a raw agent event and answers it.
///
/// Only an undecodable event is an error. Anything that decodes gets a
/// well-formed response, including unknown operation paths.
pub fn handle_raw_event(
    event: Value,
    registry: &OperationRegistry,
    clock: &dyn Clock,
) -> Result<ActionResponse, ActionEventError> {
    let request: ActionRequest = serde_json::from_value(event)?;
    Ok(handle_action_event(&request, registry, clock))
}

pub fn handle_action_event(
    request: &ActionRequest,
    registry: &OperationRegistry,
    clock: &dyn Clock,
) -> ActionResponse {
    info!(
        event_name = "action.request.received",
        action_group = %request.action_group,
        api_path = %request.api_path,
        http_method = %request.http_method,
        session_id = %request.session_id,
        parameter_count = request.parameters.len(),
        "received action request"
    );
    debug!(request = ?request, "action request detail");

    match registry.dispatch(request, clock) {
        Ok(result) => {
            let response = respond(request, STATUS_OK, &result);
            info!(
                event_name = "action.request.completed",
                api_path = %request.api_path,
                status_code = response.status_code(),
                "action request completed"
            );
            response
        }
        Err(dispatch_error) => {
            error!(
                event_name = "action.dispatch.failed",
                action_group = %request.action_group,
                api_path = %request.api_path,
                error = %dispatch_error,
                "error processing request"
            );
            respond(
                request,
                STATUS_INTERNAL_ERROR,
                &ErrorResult {
                    error: dispatch_error.to_string(),
                },
            )
        }
    }
}

fn respond(request: &ActionRequest, status_code: u16, result: &impl Serialize) -> ActionResponse {
    match ActionResponse::from_result(request, status_code, result) {
        Ok(response) => response,
        Err(serialize_error) => {
            error!(
                event_name = "action.response.serialization_failed",
                api_path = %request.api_path,
                error = %serialize_error,
                "failed to serialize action result"
            );
            ActionResponse::with_body(
                request,
                STATUS_INTERNAL_ERROR,
                json!({ "error": format!("failed to serialize result: {serialize_error}") })
                    .to_string(),
            )
        }
    }
}
