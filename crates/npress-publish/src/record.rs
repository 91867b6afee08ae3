use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;
use npress_templates::Object;
use serde::Deserialize;
use serde_json::Value;

/// A content record as it arrives from the data source, one row per post.
///
/// Fields this service interprets are typed; everything else rides along in
/// `extra` and still reaches the template context.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentRecord {
    pub post_type: String,
    pub slug: String,
    pub language: String,
    pub content: String,
    /// Embedded JSON object, stored double-encoded.
    pub custom: String,
    pub creation_date: Option<Value>,
    pub modified_date: Option<Value>,
    #[serde(flatten)]
    pub extra: Object,
}

impl ContentRecord {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Build the template context for this record.
    ///
    /// The `custom` field is parsed out of its embedded encoding, failing
    /// closed to an empty object; the content body is unescaped; integer
    /// epoch seconds become RFC 3339 timestamps. Unparseable dates keep
    /// their original value.
    #[must_use]
    pub fn normalize(&self) -> Object {
        let mut context = self.extra.clone();
        context.insert("post_type".into(), Value::String(self.post_type.clone()));
        context.insert("slug".into(), Value::String(self.slug.clone()));
        context.insert("language".into(), Value::String(self.language.clone()));
        context.insert(
            "content".into(),
            Value::String(unescape_content(&self.content)),
        );
        context.insert("custom".into(), parse_custom(&self.custom));

        for (name, raw) in [
            ("creation_date", &self.creation_date),
            ("modified_date", &self.modified_date),
        ] {
            if let Some(raw) = raw {
                let value = epoch_to_rfc3339(raw)
                    .map(Value::String)
                    .unwrap_or_else(|| raw.clone());
                context.insert(name.into(), value);
            }
        }
        context
    }
}

/// Parse the double-encoded `custom` object; anything unparseable or
/// non-object becomes an empty object.
fn parse_custom(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Object(Object::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => {
            tracing::warn!("unparseable custom field, using empty object");
            Value::Object(Object::new())
        }
    }
}

/// Undo the escape artifacts the content body is stored with.
fn unescape_content(content: &str) -> String {
    content
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

/// Epoch seconds (as an integer or a numeric string) to RFC 3339.
fn epoch_to_rfc3339(raw: &Value) -> Option<String> {
    let seconds = match raw {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let timestamp = Utc.timestamp_opt(seconds, 0).single()?;
    Some(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
