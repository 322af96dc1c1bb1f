//! JSON-RPC 2.0 codec for the inbound endpoint
//!
//! Decoding never rejects a body that is valid JSON: validation is a separate
//! step so that the caller's id can still be echoed on an `Invalid Request`.

use serde_json::Value;

use crate::protocol::{
    error::GatewayError,
    jsonrpc::{JsonRpcRequest, RequestId, JSONRPC_VERSION},
};

/// A request that passed envelope validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCall {
    pub id: RequestId,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC 2.0 codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRpcCodec;

impl JsonRpcCodec {
    /// Create a new JSON-RPC codec
    pub fn new() -> Self {
        Self
    }

    /// Parse a request body
    ///
    /// Bodies that are not JSON fail with [`GatewayError::Parse`]. JSON that is
    /// not an object decodes to an empty envelope, which then fails validation.
    pub fn decode_request(&self, body: &[u8]) -> Result<JsonRpcRequest, GatewayError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Ok(JsonRpcRequest::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Check the envelope in order: version, id, method, params
    pub fn validate(&self, request: &JsonRpcRequest) -> Result<ValidatedCall, GatewayError> {
        match request.jsonrpc.as_ref().and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            _ => return Err(invalid("jsonrpc must be \"2.0\"")),
        }

        let id = request
            .response_id()
            .ok_or_else(|| invalid("id must be a non-empty string or a number"))?;

        let method = request
            .method
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("method must be a string"))?
            .to_string();

        let params = match &request.params {
            Some(params @ Value::Object(_)) => params.clone(),
            _ => return Err(invalid("params must be an object")),
        };

        Ok(ValidatedCall { id, method, params })
    }
}

fn invalid(reason: &str) -> GatewayError {
    GatewayError::RequestValidation(reason.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: Value) -> JsonRpcRequest {
        JsonRpcCodec.decode_request(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_valid_envelope() {
        let request = decode(json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "tasks/send",
            "params": {"message": {"parts": []}}
        }));

        let call = JsonRpcCodec.validate(&request).unwrap();
        assert_eq!(call.id, RequestId::from("abc"));
        assert_eq!(call.method, "tasks/send");
        assert!(call.params.is_object());
    }

    #[test]
    fn test_non_json_is_parse_error() {
        let err = JsonRpcCodec.decode_request(b"{not json").unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[test]
    fn test_non_object_json_fails_validation() {
        let request = decode(json!(["2.0", 1, "tasks/send", {}]));

        assert_eq!(request, JsonRpcRequest::default());
        assert!(matches!(
            JsonRpcCodec.validate(&request),
            Err(GatewayError::RequestValidation(_))
        ));
    }

    #[test]
    fn test_invalid_envelopes() {
        let cases = [
            json!({"id": 1, "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": "1.0", "id": 1, "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": 2.0, "id": 1, "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": "2.0", "id": "", "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": "2.0", "id": true, "method": "tasks/send", "params": {}}),
            json!({"jsonrpc": "2.0", "id": 1, "params": {}}),
            json!({"jsonrpc": "2.0", "id": 1, "method": 5, "params": {}}),
            json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/send"}),
            json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/send", "params": [1]}),
        ];

        for case in cases {
            let result = JsonRpcCodec.validate(&decode(case.clone()));
            assert!(
                matches!(result, Err(GatewayError::RequestValidation(_))),
                "expected invalid request for {case}"
            );
        }
    }

    #[test]
    fn test_empty_method_passes_validation() {
        let request = decode(json!({"jsonrpc": "2.0", "id": 1, "method": "", "params": {}}));

        let call = JsonRpcCodec.validate(&request).unwrap();
        assert_eq!(call.method, "");
    }
}
