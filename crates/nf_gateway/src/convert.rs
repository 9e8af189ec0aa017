use serde_json::Value;
use zhconv::{zhconv, Variant};

/// Fields of each article that go through script conversion.
const CONVERTED_FIELDS: [&str; 2] = ["title", "description"];

pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

/// Traditional to simplified Chinese.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimplifiedChinese;

impl ScriptConverter for SimplifiedChinese {
    fn convert(&self, text: &str) -> String {
        zhconv(text, Variant::ZhHans)
    }
}

/// Leaves text untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl ScriptConverter for Passthrough {
    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Converts `title` and `description` of every entry in `results`.
///
/// Non-string values (including `null`) and every other field are left as
/// the upstream sent them.
pub fn normalize_envelope(envelope: &mut Value, converter: &dyn ScriptConverter) {
    let Some(results) = envelope.get_mut("results").and_then(Value::as_array_mut) else {
        return;
    };
    for article in results.iter_mut() {
        for field in CONVERTED_FIELDS {
            if let Some(Value::String(text)) = article.get_mut(field) {
                *text = converter.convert(text);
            }
        }
    }
}
