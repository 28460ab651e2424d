use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{TimestampMilliSeconds, serde_as};

/// Envelope wrapping every response of the service API.
///
/// `response_data` is left as whatever type the caller asks for; most callers use
/// [`serde_json::Value`].
#[serde_as]
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericResponse<T> {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub response_time: DateTime<Utc>,
    pub status_code: i64,
    pub status_message: String,
    pub response_data: Option<T>,
}

/// Sort order of list endpoints, sent as the `orderBy` query value.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OrderBy {
    Asc,
    #[default]
    Desc,
}

/// How the user is asked to confirm a user request, sent as the `requestType` query value.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestType {
    RedirectUri,
    Aoa,
}

impl RequestType {
    #[must_use]
    pub fn to_query(self) -> BTreeMap<String, String> {
        BTreeMap::from([("requestType".to_owned(), self.to_string())])
    }
}

/// Paging parameters accepted by list endpoints.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bon::Builder)]
pub struct PageRequest {
    #[builder(default = 10)]
    pub limit: u32,
    #[builder(default = 1)]
    pub page: u32,
    #[builder(default)]
    pub order_by: OrderBy,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PageRequest {
    #[must_use]
    pub fn to_query(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("limit".to_owned(), self.limit.to_string()),
            ("page".to_owned(), self.page.to_string()),
            ("orderBy".to_owned(), self.order_by.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn generic_response_should_deserialize() {
        let response: GenericResponse<Value> = serde_json::from_value(json!({
            "responseTime": 1_581_850_266_351_i64,
            "statusCode": 1000,
            "statusMessage": "Success",
            "responseData": { "serviceId": "4d1f" }
        }))
        .expect("decodes");

        assert_eq!(response.response_time.timestamp_millis(), 1_581_850_266_351);
        assert_eq!(response.status_code, 1000);
        assert_eq!(response.response_data, Some(json!({ "serviceId": "4d1f" })));
    }

    #[test]
    fn missing_response_data_is_none() {
        let response: GenericResponse<Value> = serde_json::from_value(json!({
            "responseTime": 1_581_850_266_351_i64,
            "statusCode": 1000,
            "statusMessage": "Success"
        }))
        .expect("decodes");

        assert_eq!(response.response_data, None);
    }

    #[test]
    fn page_request_defaults_to_first_page_descending() {
        let query = PageRequest::default().to_query();

        assert_eq!(query["limit"], "10");
        assert_eq!(query["page"], "1");
        assert_eq!(query["orderBy"], "desc");
    }

    #[test]
    fn page_request_builder_overrides() {
        let page = PageRequest::builder()
            .limit(50)
            .page(3)
            .order_by(OrderBy::Asc)
            .build();

        assert_eq!(page.to_query()["orderBy"], "asc");
        assert_eq!(page.to_query()["limit"], "50");
    }

    #[test]
    fn request_type_renders_as_query_value() {
        assert_eq!(RequestType::RedirectUri.to_query()["requestType"], "redirect_uri");
        assert_eq!(RequestType::Aoa.to_query()["requestType"], "aoa");
    }
}
