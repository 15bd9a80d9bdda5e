use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::SyncError;

/// Builds a payload extractor that reads the array at a JSON pointer
/// (RFC 6901) and deserializes its elements. `""` addresses the whole body.
///
/// ```
/// use restsync_engine::extract_at;
/// use serde_json::json;
///
/// let extract = extract_at::<String>("/items");
/// let items = extract(json!({"page": 1, "items": ["x", "y"]})).unwrap();
/// assert_eq!(items, vec!["x", "y"]);
/// ```
pub fn extract_at<T>(
    pointer: impl Into<String>,
) -> impl Fn(Value) -> Result<Vec<T>, SyncError> + Send + Sync
where
    T: DeserializeOwned,
{
    let pointer = pointer.into();
    move |mut body: Value| {
        let payload = body
            .pointer_mut(&pointer)
            .map(Value::take)
            .ok_or_else(|| SyncError::malformed(format!("no value at pointer {pointer:?}")))?;
        serde_json::from_value(payload).map_err(|err| {
            SyncError::malformed(format!("payload at {pointer:?} is not the expected array: {err}"))
        })
    }
}
