use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::contract::ActionRequest;
use crate::operations::{
    check_order_status, process_return, say_hello, ActionResult, Clock, OperationHandler,
    CHECK_ORDER_STATUS_PATH, PROCESS_RETURN_PATH, SAY_HELLO_PATH,
};
use crate::schema::{SchemaError, SchemaSummary, CUSTOMER_SERVICE_SCHEMA, GREETING_SCHEMA};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown API path: {api_path}")]
    UnknownOperation { api_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action group variant '{0}' (expected 'greeting' or 'customer-service')")]
pub struct VariantParseError(pub String);

/// Deployment configuration selecting which operation set is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroupVariant {
    Greeting,
    CustomerService,
}

impl ActionGroupVariant {
    pub const ALL: [Self; 2] = [Self::Greeting, Self::CustomerService];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::CustomerService => "customer-service",
        }
    }

    pub fn action_group_name(self) -> &'static str {
        match self {
            Self::Greeting => "GreetingActionGroup",
            Self::CustomerService => "CustomerServiceActionGroup",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Greeting => "Actions for greeting users",
            Self::CustomerService => "Actions for customer service operations",
        }
    }

    pub fn schema_document(self) -> &'static str {
        match self {
            Self::Greeting => GREETING_SCHEMA,
            Self::CustomerService => CUSTOMER_SERVICE_SCHEMA,
        }
    }

    pub fn schema_summary(self) -> Result<SchemaSummary, SchemaError> {
        SchemaSummary::parse(self.schema_document())
    }

    pub fn registry(self) -> OperationRegistry {
        match self {
            Self::Greeting => OperationRegistry::new().register(SAY_HELLO_PATH, say_hello),
            Self::CustomerService => OperationRegistry::new()
                .register(CHECK_ORDER_STATUS_PATH, check_order_status)
                .register(PROCESS_RETURN_PATH, process_return),
        }
    }
}

impl fmt::Display for ActionGroupVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionGroupVariant {
    type Err = VariantParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "greeting" => Ok(Self::Greeting),
            "customer-service" => Ok(Self::CustomerService),
            _ => Err(VariantParseError(value.to_string())),
        }
    }
}

/// Table from operation path to handler. Matching is exact.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    handlers: BTreeMap<&'static str, OperationHandler>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, api_path: &'static str, handler: OperationHandler) -> Self {
        self.handlers.insert(api_path, handler);
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn contains(&self, api_path: &str) -> bool {
        self.handlers.contains_key(api_path)
    }

    pub fn dispatch(
        &self,
        request: &ActionRequest,
        clock: &dyn Clock,
    ) -> Result<ActionResult, DispatchError> {
        let handler = self
            .handlers
            .get(request.api_path.as_str())
            .ok_or_else(|| DispatchError::UnknownOperation {
                api_path: request.api_path.clone(),
            })?;
        Ok(handler(request, clock))
    }
}
