use serde::{de, Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::error::ServiceError;

/// HTTP status reported in the response payload, serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::InternalServerError => 500,
        }
    }
}

impl TryFrom<u64> for Status {
    type Error = u64;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Status::Ok),
            400 => Ok(Status::BadRequest),
            500 => Ok(Status::InternalServerError),
            other => Err(other),
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.code())
    }
}

struct StatusCodeVisitor;

impl<'de> de::Visitor<'de> for StatusCodeVisitor {
    type Value = Status;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a supported HTTP status code")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Status::try_from(v).map_err(|code| de::Error::custom(format!("unsupported status {code}")))
    }
}

impl<'de> de::Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_u16(StatusCodeVisitor)
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status_code: Status,
    pub headers: Value,
    pub body: Value,
}

fn default_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*"
    })
}

pub fn make_response_payload(
    result: Result<Value, ServiceError>,
) -> Result<Value, lambda_runtime::Error> {
    let headers = default_headers();
    let response_payload = match result {
        Err(err) => ResponsePayload {
            status_code: err.status,
            headers,
            body: Value::String(err.msg),
        },
        Ok(body) => ResponsePayload {
            status_code: Status::Ok,
            headers,
            body,
        },
    };
    serde_json::to_value(response_payload).map_err(lambda_runtime::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reads_back_from_its_code() {
        for status in [Status::Ok, Status::BadRequest, Status::InternalServerError] {
            let encoded = serde_json::to_value(status).unwrap();
            assert_eq!(encoded, json!(status.code()));
            let decoded: Status = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, status);
        }
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        assert!(serde_json::from_value::<Status>(json!(418)).is_err());
    }

    #[test]
    fn success_wraps_body_with_200() {
        let payload = make_response_payload(Ok(json!({ "duplicates": 2 }))).unwrap();
        assert_eq!(payload["statusCode"], 200);
        assert_eq!(payload["body"]["duplicates"], 2);
        assert_eq!(payload["headers"]["Access-Control-Allow-Origin"], "*");
    }

    #[test]
    fn error_carries_its_status_and_message() {
        let payload =
            make_response_payload(Err(ServiceError::bad_request("threshold must be between 0 and 1")))
                .unwrap();
        let parsed: ResponsePayload = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.status_code, Status::BadRequest);
        assert_eq!(parsed.body, json!("threshold must be between 0 and 1"));
    }
}
