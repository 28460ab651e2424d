use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
#[cfg(feature = "tracing")]
use crate::error::{Error, Kind};

/// Deserializes a response payload, reporting fields the target type does not know about.
#[cfg(feature = "tracing")]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    let mut unknown = Vec::new();
    let mut record = |path: serde_ignored::Path<'_>| unknown.push(path.to_string());
    let deserializer = serde_ignored::Deserializer::new(value, &mut record);

    let result: T = serde_path_to_error::deserialize(deserializer).map_err(|e| {
        tracing::error!(path = %e.path(), "failed to deserialize response");
        Error::with_source(Kind::Internal, e)
    })?;

    for path in unknown {
        tracing::warn!(%path, "ignored unknown field in response");
    }

    Ok(result)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::error::Kind;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Known {
        name: String,
    }

    #[test]
    fn unknown_fields_do_not_fail() {
        let known: Known =
            deserialize_with_warnings(json!({ "name": "wallet", "extra": 1 })).expect("decodes");
        assert_eq!(
            known,
            Known {
                name: "wallet".to_owned()
            }
        );
    }

    #[test]
    fn type_mismatch_is_internal() {
        let err = deserialize_with_warnings::<Known>(json!({ "name": 1 })).unwrap_err();
        assert_eq!(err.kind(), Kind::Internal);
    }
}
