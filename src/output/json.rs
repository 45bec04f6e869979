//! JSON output formatting

use serde_json::{json, Value};

use crate::engine::executor::{ExecutionResult, ResultData};

pub fn format_json(result: &ExecutionResult) -> String {
    let data: Value = match &result.data {
        ResultData::ActionResult(info) => serde_json::to_value(info).unwrap_or(json!(null)),
        ResultData::Containers(containers) => json!({ "containers": containers }),
        ResultData::Output(outputs) => json!({ "outputs": outputs }),
        ResultData::Frozen(images) => json!({ "frozen": images }),
        ResultData::Message(s) => json!({ "message": s }),
        ResultData::Empty => json!({ "empty": true }),
    };

    let document = match (&result.message, data) {
        (Some(message), Value::Object(mut fields)) => {
            fields
                .entry("message")
                .or_insert_with(|| Value::String(message.clone()));
            Value::Object(fields)
        }
        (_, data) => data,
    };

    serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
}
