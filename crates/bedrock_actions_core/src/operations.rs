//! Operation handlers and their result payloads.
//!
//! Every handler is a pure function of the request parameters and a clock.
//! Result fields backed by optional parameters are omitted from the
//! serialized body when the parameter was not supplied.

use serde::{Deserialize, Serialize};

use crate::contract::ActionRequest;

pub const SAY_HELLO_PATH: &str = "/sayHello";
pub const CHECK_ORDER_STATUS_PATH: &str = "/checkOrderStatus";
pub const PROCESS_RETURN_PATH: &str = "/processReturn";

pub const DEFAULT_GREETING_NAME: &str = "World";
pub const ORDER_STATUS_SHIPPED: &str = "Shipped";
pub const ESTIMATED_DELIVERY_DATE: &str = "2024-01-15";
pub const RETURN_STATUS_APPROVED: &str = "Approved";
pub const RETURN_ID_PREFIX: &str = "RET-";

/// Source of the timestamp embedded in return identifiers.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub type OperationHandler = fn(&ActionRequest, &dyn Clock) -> ActionResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GreetingResult {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub status: String,
    pub estimated_delivery: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub return_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResult {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActionResult {
    Greeting(GreetingResult),
    OrderStatus(OrderStatusResult),
    Return(ReturnResult),
}

pub fn say_hello(request: &ActionRequest, _clock: &dyn Clock) -> ActionResult {
    let name = request.parameter("name").unwrap_or(DEFAULT_GREETING_NAME);
    ActionResult::Greeting(GreetingResult {
        message: format!("Hello, {name}! Welcome to AWS Bedrock Agent."),
    })
}

pub fn check_order_status(request: &ActionRequest, _clock: &dyn Clock) -> ActionResult {
    ActionResult::OrderStatus(OrderStatusResult {
        order_id: request.parameter("orderId").map(str::to_string),
        status: ORDER_STATUS_SHIPPED.to_string(),
        estimated_delivery: ESTIMATED_DELIVERY_DATE.to_string(),
    })
}

pub fn process_return(request: &ActionRequest, clock: &dyn Clock) -> ActionResult {
    ActionResult::Return(ReturnResult {
        order_id: request.parameter("orderId").map(str::to_string),
        return_id: return_id(clock),
        status: RETURN_STATUS_APPROVED.to_string(),
        reason: request.parameter("reason").map(str::to_string),
    })
}

pub fn return_id(clock: &dyn Clock) -> String {
    format!("{RETURN_ID_PREFIX}{}", clock.now_millis())
}
