#![allow(dead_code)]

use serde_json::{json, Value};
use stamp_ledger_lambda::handlers::ledger::ApiGatewayResponse;

pub const STORE_ID: &str = "S1";
pub const CUSTOMER_ID: &str = "C1";

pub fn add_event(store_id: &str, customer_id: &str, number_of_stamps: i64) -> Value {
    json!({
        "requestType": "addStamps",
        "storeId": store_id,
        "customerId": customer_id,
        "numberOfStamps": number_of_stamps
    })
}

pub fn delete_event(store_id: &str, customer_id: &str, number_of_stamps: i64) -> Value {
    json!({
        "requestType": "deleteStamps",
        "storeId": store_id,
        "customerId": customer_id,
        "numberOfStamps": number_of_stamps
    })
}

pub fn reset_event(store_id: &str, customer_id: &str) -> Value {
    json!({
        "requestType": "resetStamps",
        "storeId": store_id,
        "customerId": customer_id
    })
}

pub fn get_event(store_id: &str, customer_id: &str) -> Value {
    json!({
        "requestType": "getStamps",
        "storeId": store_id,
        "customerId": customer_id
    })
}

/// Wraps a direct-invoke payload the way an API Gateway proxy integration does.
pub fn via_api_gateway(payload: Value) -> Value {
    json!({
        "httpMethod": "POST",
        "path": "/stamps",
        "body": payload.to_string()
    })
}

pub fn body(response: &ApiGatewayResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body should be json")
}

pub fn outcome(response: &ApiGatewayResponse) -> String {
    body(response)["outcome"]
        .as_str()
        .expect("success body should carry an outcome")
        .to_string()
}

pub fn error_code(response: &ApiGatewayResponse) -> String {
    body(response)["error"]
        .as_str()
        .expect("failure body should carry an error code")
        .to_string()
}
