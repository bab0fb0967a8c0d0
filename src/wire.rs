use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Content type assumed when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Single entry of a structured API error payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Structured error payload returned with status >= 400.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub errors: Vec<ApiError>,
}

impl ApiErrorResponse {
    /// Individual messages joined with `,`.
    pub fn joined_messages(&self) -> String {
        self.errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parsed response body, chosen by the declared content type.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Parses `text` as JSON when `content_type` mentions `json` (or is
    /// absent), otherwise keeps it as plain text.
    pub fn parse(content_type: Option<&str>, text: String) -> Result<Self, serde_json::Error> {
        let content_type = content_type
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_ascii_lowercase();
        if content_type.contains("json") {
            serde_json::from_str(&text).map(Self::Json)
        } else {
            Ok(Self::Text(text))
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Deserializes the body into `T`. Text bodies are offered as a JSON string.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Self::Json(value) => T::deserialize(value),
            Self::Text(text) => T::deserialize(serde_json::Value::String(text.clone())),
        }
    }

    /// Interprets the body as a structured error payload, if it has that shape.
    pub fn api_errors(&self) -> Option<ApiErrorResponse> {
        self.as_json()
            .and_then(|value| ApiErrorResponse::deserialize(value).ok())
    }
}

/// Status line and headers of a received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseSnapshot {
    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        Self {
            status: response.status().as_u16(),
            headers,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ResponseBody, ResponseSnapshot};

    #[test]
    fn json_content_type_is_parsed() {
        let body = ResponseBody::parse(
            Some("Application/JSON; charset=utf-8"),
            r#"{"ok":true}"#.to_owned(),
        )
        .expect("json body");
        assert_eq!(body, ResponseBody::Json(json!({"ok": true})));
    }

    #[test]
    fn missing_content_type_defaults_to_json() {
        assert!(ResponseBody::parse(None, "[1,2]".to_owned()).is_ok());
        assert!(ResponseBody::parse(None, "<html>".to_owned()).is_err());
    }

    #[test]
    fn other_content_types_are_text() {
        let body = ResponseBody::parse(Some("text/plain"), "hello".to_owned()).expect("text");
        assert_eq!(body, ResponseBody::Text("hello".to_owned()));
        let decoded: String = body.decode().expect("string decode");
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn api_errors_require_error_list_shape() {
        let body = ResponseBody::Json(json!({
            "errors": [{"message": "bad address", "reason": "invalid"}, {"message": "again"}]
        }));
        let errors = body.api_errors().expect("structured errors");
        assert_eq!(errors.errors[0].reason.as_deref(), Some("invalid"));
        assert_eq!(errors.joined_messages(), "bad address,again");

        assert!(ResponseBody::Json(json!({"error": "nope"})).api_errors().is_none());
        assert!(ResponseBody::Text("nope".to_owned()).api_errors().is_none());
    }

    #[test]
    fn snapshot_header_lookup_ignores_case() {
        let snapshot = ResponseSnapshot {
            status: 200,
            headers: vec![("content-type".to_owned(), "text/plain".to_owned())],
        };
        assert_eq!(snapshot.content_type(), Some("text/plain"));
        assert_eq!(snapshot.header("Content-Type"), Some("text/plain"));
    }
}
