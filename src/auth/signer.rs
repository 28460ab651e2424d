use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac as _};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha512;

use crate::auth::{
    Credentials, NONCE, NONCE_HEADER, Nonce, SERVICE_API_KEY, SERVICE_API_KEY_HEADER, SIGNATURE,
    SIGNATURE_HEADER, SigningRequest, TIMESTAMP, TIMESTAMP_HEADER,
};
use crate::error::Error;
use crate::{Result, Timestamp};

type HmacSha512 = Hmac<Sha512>;

/// The four authentication headers for one request.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthHeaders {
    api_key: String,
    nonce: Nonce,
    timestamp: Timestamp,
    signature: String,
}

impl AuthHeaders {
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Base64 (standard alphabet, padded) HMAC-SHA512 of the canonical string.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Header name/value pairs in their documented spelling.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, String); 4] {
        [
            (SERVICE_API_KEY, self.api_key.clone()),
            (NONCE, self.nonce.to_string()),
            (TIMESTAMP, self.timestamp.to_string()),
            (SIGNATURE, self.signature.clone()),
        ]
    }

    /// Adds the auth headers to `headers`, leaving every other header untouched.
    ///
    /// A header the caller already set under one of our names is never overwritten. The only
    /// one tolerated is a `timestamp` equal to the signed one.
    pub fn merge_into(&self, headers: &mut HeaderMap) -> Result<()> {
        for name in [&SERVICE_API_KEY_HEADER, &NONCE_HEADER, &SIGNATURE_HEADER] {
            if headers.contains_key(name) {
                return Err(Error::validation(format!(
                    "header `{name}` is reserved for request signing"
                )));
            }
        }

        let timestamp = self.timestamp.to_string();
        if let Some(existing) = headers.get(&TIMESTAMP_HEADER) {
            if existing.as_bytes() != timestamp.as_bytes() {
                return Err(Error::validation(
                    "caller supplied `timestamp` header does not match the signed timestamp",
                ));
            }
        }

        headers.insert(SERVICE_API_KEY_HEADER, HeaderValue::from_str(&self.api_key)?);
        headers.insert(NONCE_HEADER, HeaderValue::from_str(self.nonce.as_str())?);
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(&timestamp)?);
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&self.signature)?);

        Ok(())
    }

    /// The auth headers on their own.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        self.merge_into(&mut map)?;
        Ok(map)
    }
}

/// Signs `request` with `credentials`.
///
/// Pure apart from reading the credentials: the same request always yields the same headers.
/// The secret is never logged.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "trace",
        skip_all,
        fields(
            method = request.method(),
            path = request.path(),
            nonce = %request.nonce(),
            timestamp = request.timestamp()
        )
    )
)]
pub fn sign(credentials: &Credentials, request: &SigningRequest) -> Result<AuthHeaders> {
    credentials.validate()?;

    let message = request.canonicalize()?;
    let signature = hmac(&credentials.secret, &message)?;

    Ok(AuthHeaders {
        api_key: credentials.key.clone(),
        nonce: request.nonce().clone(),
        timestamp: request.timestamp(),
        signature,
    })
}

fn hmac(secret: &SecretString, message: &str) -> Result<String> {
    let mut mac = HmacSha512::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| Error::invalid_credential(format!("secret cannot key the MAC: {e}")))?;
    mac.update(message.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{Value, json};

    use super::*;
    use crate::error::Kind;

    const SECRET: &str = "9256bf8a-2b86-42fe-b3e0-d3079d0141fe";

    fn credentials(secret: &str) -> Credentials {
        Credentials {
            key: "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2".to_owned(),
            secret: SecretString::from(secret),
        }
    }

    fn signing(
        method: &str,
        path: &str,
        timestamp: Timestamp,
        nonce: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> SigningRequest {
        SigningRequest::builder()
            .method(method)
            .path(path)
            .timestamp(timestamp)
            .nonce(nonce.parse().expect("valid nonce"))
            .query(
                query
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect::<BTreeMap<_, _>>(),
            )
            .maybe_body(body)
            .build()
            .expect("valid request")
    }

    #[test]
    fn hmac_sha512_known_vector() {
        let request = signing("GET", "/v1/wallets", 1_581_850_266_351, "Bp0IqgXE", &[], None);
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        assert_eq!(
            headers.signature(),
            "2LtyRNI16y/5/RdoTB65sfLkO0OSJ4pCuz2+ar0npkRbk1/dqq1fbt1FZo7fueQl1umKWWlBGu/53KD2cptcCA=="
        );
    }

    #[test]
    fn signature_with_query() {
        let request = signing(
            "GET",
            "/v1/wallets/tlink1fr9mpexk5yq3hu6jc0npajfsa0x7tl427fuveq/transactions",
            1_581_850_266_351,
            "Bp0IqgXE",
            &[("page", "2"), ("msgType", "coin/MsgSend")],
            None,
        );
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        assert_eq!(
            headers.signature(),
            "5x6bEV1mHkpJpEJMnMsCUH7jV5GzKzA038UwcqpYIAx7Zn1SvA9qhdf+aitu+3juXzXB+qSxM4zRon6/aNVMFg=="
        );
    }

    #[test]
    fn signature_with_paging_query() {
        let request = signing(
            "GET",
            "/v1/service-tokens/a48f097b/holders",
            1_611_243_023_551,
            "KScYbbH0",
            &[("limit", "10"), ("page", "1"), ("orderBy", "desc")],
            None,
        );
        let headers =
            sign(&credentials("098d8862-477d-49f2-928f-7655489be2d3"), &request).expect("signs");

        assert_eq!(
            headers.signature(),
            "8vcqBHXiwGaP5+78ZvuidcoZ/UiKnR1IrgXKzUaRf+HqetD5eHMaeTEW3OvHoKn7Z512WVNuKmRQDW88DvJ1aA=="
        );
    }

    #[test]
    fn signature_with_body() {
        let request = signing(
            "PUT",
            "/v1/item-tokens/61e14383/non-fungibles/10000001/00000001",
            1_581_850_266_351,
            "Bp0IqgXE",
            &[],
            Some(json!({
                "ownerAddress": "tlink1fr9mpexk5yq3hu6jc0npajfsa0x7tl427fuveq",
                "ownerSecret": "uhbdnNvIqQFnnIFDDG8EuVxtqkwsLtDR/owKInQIYmo=",
                "name": "NewName"
            })),
        );
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        assert_eq!(
            headers.signature(),
            "4L5BU0Ml/ejhzTg6Du12BDdElv8zoE7XD/iyOaZ2BHJIJG0SUOuCZWXu0YaF4i4C2CFJhjZoJFsje4CJn/wyyw=="
        );
    }

    #[test]
    fn signature_with_query_and_body() {
        let request = signing(
            "POST",
            "/v1/wallets/tlink1/transfer",
            1_581_850_266_351,
            "Bp0IqgXE",
            &[("page", "2")],
            Some(json!({ "amount": "1000" })),
        );
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        assert_eq!(
            headers.signature(),
            "hpp2n6iBI8hzeXrBQhyJxG5gnmGQpmikdO0OenNo0Hfi1eh9dVmiumbUSnUKPeEuJW1uqVaPuJbQhTp6ikeEeg=="
        );
    }

    #[test]
    fn headers_carry_request_values() {
        let request = signing("GET", "/v1/wallets", 1_581_850_266_351, "Bp0IqgXE", &[], None);
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        let pairs = headers.pairs();
        assert_eq!(pairs[0], (SERVICE_API_KEY, "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2".to_owned()));
        assert_eq!(pairs[1], (NONCE, "Bp0IqgXE".to_owned()));
        assert_eq!(pairs[2], (TIMESTAMP, "1581850266351".to_owned()));
        assert_eq!(pairs[3].0, SIGNATURE);

        let map = headers.to_header_map().expect("valid header values");
        assert_eq!(map.len(), 4);
        assert_eq!(map["service-api-key"], "136db0ec-0390-45a4-8b4c-f5b8b1b0a6a2");
        assert_eq!(map["nonce"], "Bp0IqgXE");
        assert_eq!(map["timestamp"], "1581850266351");
        assert_eq!(map["Signature"], headers.signature());
    }

    #[test]
    fn merge_preserves_unrelated_headers_and_rejects_conflicts() {
        let request = signing("GET", "/v1/wallets", 1_581_850_266_351, "Bp0IqgXE", &[], None);
        let headers = sign(&credentials(SECRET), &request).expect("signs");

        let mut outgoing = HeaderMap::new();
        outgoing.insert("x-request-id", HeaderValue::from_static("abc"));
        outgoing.insert("timestamp", HeaderValue::from_static("1581850266351"));
        headers.merge_into(&mut outgoing).expect("merges");
        assert_eq!(outgoing["x-request-id"], "abc");
        assert_eq!(outgoing.len(), 5);

        let mut conflicting = HeaderMap::new();
        conflicting.insert("signature", HeaderValue::from_static("forged"));
        let err = headers.merge_into(&mut conflicting).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
        assert_eq!(conflicting["signature"], "forged");

        let mut stale = HeaderMap::new();
        stale.insert("timestamp", HeaderValue::from_static("1"));
        let err = headers.merge_into(&mut stale).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn empty_secret_is_invalid_credential() {
        let request = signing("GET", "/v1/wallets", 1_581_850_266_351, "Bp0IqgXE", &[], None);
        let err = sign(&credentials(""), &request).unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidCredential);
        assert!(err.is_signing_failure(), "signing failures are local");
    }

    #[test]
    fn unflattenable_body_is_encoding_error() {
        let request = signing(
            "POST",
            "/v1/memos",
            1_581_850_266_351,
            "Bp0IqgXE",
            &[],
            Some(json!({ "nested": { "a": 1 } })),
        );
        let err = sign(&credentials(SECRET), &request).unwrap_err();

        assert_eq!(err.kind(), Kind::Encoding);
    }
}
