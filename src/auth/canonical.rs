use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::auth::Nonce;
use crate::error::{Error, Kind};
use crate::{Result, Timestamp};

/// The signable parts of one outgoing request.
///
/// Fields are fixed at construction. Query parameters live in a sorted map and body members
/// are sorted during flattening, so insertion order never affects the canonical string.
#[derive(Clone, Debug, PartialEq)]
pub struct SigningRequest {
    method: String,
    path: String,
    timestamp: Timestamp,
    nonce: Nonce,
    query: BTreeMap<String, String>,
    body: Option<Value>,
}

#[bon::bon]
impl SigningRequest {
    #[builder]
    pub fn new(
        // Normalized to uppercase.
        #[builder(into)]
        method: String,
        // No scheme, host or query; path parameters already substituted.
        #[builder(into)]
        path: String,
        timestamp: Timestamp,
        nonce: Nonce,
        #[builder(default)] query: BTreeMap<String, String>,
        // `None` signs differently from `Some(json!({}))`.
        body: Option<Value>,
    ) -> Result<Self> {
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::validation(format!("invalid HTTP method `{method}`")));
        }
        if !path.starts_with('/') || path.contains(['?', '#']) {
            return Err(Error::validation(format!(
                "signing path must be absolute and carry no query or fragment, got `{path}`"
            )));
        }

        Ok(Self {
            method: method.to_ascii_uppercase(),
            path,
            timestamp,
            nonce,
            query,
            body,
        })
    }
}

impl SigningRequest {
    /// Extracts the signable parts of an already built request.
    ///
    /// Repeated query keys are joined with `,`. A non-empty body must be UTF-8 JSON; streaming
    /// bodies cannot be signed.
    pub fn from_request(
        request: &reqwest::Request,
        timestamp: Timestamp,
        nonce: Nonce,
    ) -> Result<Self> {
        let mut query: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in request.url().query_pairs() {
            query
                .entry(key.into_owned())
                .and_modify(|joined| {
                    joined.push(',');
                    joined.push_str(&value);
                })
                .or_insert_with(|| value.clone().into_owned());
        }

        let body = match request.body() {
            None => None,
            Some(body) => {
                let bytes = body
                    .as_bytes()
                    .ok_or_else(|| Error::encoding("streaming request bodies cannot be signed"))?;
                if bytes.is_empty() {
                    None
                } else {
                    let text = std::str::from_utf8(bytes)
                        .map_err(|e| Error::with_source(Kind::Encoding, e))?;
                    Some(
                        serde_json::from_str(text)
                            .map_err(|e| Error::with_source(Kind::Encoding, e))?,
                    )
                }
            }
        };

        Self::builder()
            .method(request.method().as_str())
            .path(request.url().path())
            .timestamp(timestamp)
            .nonce(nonce)
            .query(query)
            .maybe_body(body)
            .build()
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[must_use]
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Builds the string to sign:
    ///
    /// ```text
    /// {nonce}{timestamp}{METHOD}{path}[?{query}][(?|&){body}]
    /// ```
    ///
    /// Query and body are flattened to `key=value` pairs sorted by key and joined with `&`.
    /// An absent body appends nothing while an empty one appends its bare separator.
    /// Nothing is percent-encoded or escaped, so values containing `&` or `=` are ambiguous.
    pub fn canonicalize(&self) -> Result<String> {
        let mut target = format!(
            "{}{}{}{}",
            self.nonce, self.timestamp, self.method, self.path
        );

        let mut separator = '?';
        if !self.query.is_empty() {
            target.push(separator);
            target.push_str(&join_pairs(&self.query));
            separator = '&';
        }

        if let Some(body) = &self.body {
            target.push(separator);
            target.push_str(&flatten_body(body)?);
        }

        Ok(target)
    }
}

/// Joins sorted pairs as `k=v&k=v`.
///
/// Keys and values are not escaped, which the server's verification expects. As a result a
/// value containing `&` or `=` can produce the same text as a different set of pairs, e.g.
/// `{a: "1&b=2"}` and `{a: "1", b: "2"}`.
fn join_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn flatten_body(body: &Value) -> Result<String> {
    let Value::Object(members) = body else {
        return Err(Error::encoding(format!(
            "request body must be a JSON object, got {}",
            type_name(body)
        )));
    };

    let mut pairs = BTreeMap::new();
    for (key, value) in members {
        match value {
            Value::Null => {}
            Value::Object(_) => {
                return Err(Error::encoding(format!(
                    "nested object `{key}` cannot be flattened"
                )));
            }
            Value::Array(items) => flatten_array(key, items, &mut pairs)?,
            primitive => insert_pair(&mut pairs, key.clone(), primitive_text(key, primitive)?)?,
        }
    }

    Ok(join_pairs(&pairs))
}

/// Arrays of objects become one `key.sub=v1,v2` pair per sub-key across all elements, with an
/// empty slot where an element lacks the sub-key. Arrays of primitives become `key=v1,v2`.
fn flatten_array(key: &str, items: &[Value], pairs: &mut BTreeMap<String, String>) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    if items.iter().all(Value::is_object) {
        let objects: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
        let sub_keys: BTreeSet<&String> = objects.iter().flat_map(|o| o.keys()).collect();

        for sub_key in sub_keys {
            let flat_key = format!("{key}.{sub_key}");
            let values = objects
                .iter()
                .map(|object| match object.get(sub_key) {
                    None => Ok(String::new()),
                    Some(value) => primitive_text(&flat_key, value),
                })
                .collect::<Result<Vec<_>>>()?;
            insert_pair(pairs, flat_key, values.join(","))?;
        }
        return Ok(());
    }

    if items.iter().any(|v| v.is_object() || v.is_array()) {
        return Err(Error::encoding(format!(
            "array `{key}` mixes objects with other values or nests arrays"
        )));
    }

    let values = items
        .iter()
        .map(|value| primitive_text(key, value))
        .collect::<Result<Vec<_>>>()?;
    insert_pair(pairs, key.to_owned(), values.join(","))
}

fn primitive_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Array(_) | Value::Object(_) => Err(Error::encoding(format!(
            "`{key}` holds a {} where a primitive is required",
            type_name(value)
        ))),
    }
}

fn insert_pair(pairs: &mut BTreeMap<String, String>, key: String, value: String) -> Result<()> {
    if pairs.contains_key(&key) {
        return Err(Error::encoding(format!(
            "flattened key `{key}` appears more than once"
        )));
    }
    pairs.insert(key, value);
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
