use serde_json::{Map, Value};

/// 사용자가 입력한 주택 속성 (모두 선택 사항)
///
/// Each numeric attribute is `None` when it was absent or could not be read as
/// a finite number; the feature derivation then applies its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    pub overall_qual: Option<f64>,
    pub area: Option<f64>,
    pub parking: Option<f64>,
    pub bathrooms: Option<f64>,
    pub bedrooms: Option<f64>,
    pub year_built: Option<f64>,
    pub location: Option<String>,
}

impl RawInput {
    /// Read the known keys out of a decoded request object. Unknown keys are ignored.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            overall_qual: numeric_field(payload, "overallQual"),
            area: numeric_field(payload, "area"),
            parking: numeric_field(payload, "parking"),
            bathrooms: numeric_field(payload, "bathrooms"),
            bedrooms: numeric_field(payload, "bedrooms"),
            year_built: numeric_field(payload, "yearBuilt"),
            location: text_field(payload, "location"),
        }
    }
}

/// Largest magnitude accepted for a numeric attribute; anything beyond is unusable
pub const MAX_ATTRIBUTE_MAGNITUDE: f64 = 1e9;

fn numeric_field(payload: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match payload.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite() && v.abs() <= MAX_ATTRIBUTE_MAGNITUDE)
}

fn text_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
