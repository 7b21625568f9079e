//! Shaping of submitted documents before they are stored.

use serde_json::{Map, Number, Value};

pub const DEFAULT_COMPUTER_CATEGORY: &str = "Ordinateurs";
pub const DEFAULT_COMPUTER_IMAGE: &str = "/img/Electronique/Ordinateurs/default.jpg";

/// JavaScript-style truthiness, which is how the admin page fills its forms.
fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}

fn parse_price(value: &Value) -> Option<Number> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(price)
}

/// Validate a computer article and fill its defaults.
///
/// `nom` and `prix` are required; `prix` may arrive as a numeric string.
pub fn prepare_computer(body: Value, now_ms: i64) -> Result<Map<String, Value>, String> {
    let Value::Object(mut computer) = body else {
        return Err("no data received".to_string());
    };

    if !is_set(computer.get("nom")) {
        return Err("computer name (nom) is required".to_string());
    }

    match computer.get("prix") {
        None | Some(Value::Null) => return Err("price (prix) is required".to_string()),
        Some(raw) => {
            let price = parse_price(raw).ok_or_else(|| "price (prix) must be a number".to_string())?;
            computer.insert("prix".to_string(), Value::Number(price));
        }
    }

    if !is_set(computer.get("id")) {
        computer.insert("id".to_string(), Value::String(now_ms.to_string()));
    }
    if !is_set(computer.get("categorie")) {
        computer.insert("categorie".to_string(), DEFAULT_COMPUTER_CATEGORY.into());
    }
    if !is_set(computer.get("description")) {
        let name = match computer.get("nom") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        computer.insert("description".to_string(), format!("Ordinateur {name}").into());
    }
    if !is_set(computer.get("image")) {
        computer.insert("image".to_string(), DEFAULT_COMPUTER_IMAGE.into());
    }

    Ok(computer)
}

/// Pending review: `id` first so the submitter may override it, then the
/// submitted fields, then the submission date.
pub fn stamp_pending_review(body: Value, now_ms: i64, now_iso: &str) -> Result<Value, String> {
    let Value::Object(fields) = body else {
        return Err("review must be a JSON object".to_string());
    };
    let mut review = Map::new();
    review.insert("id".to_string(), Value::from(now_ms));
    review.extend(fields);
    review.insert("dateSubmission".to_string(), now_iso.into());
    Ok(Value::Object(review))
}

/// Copy of `review` carrying the archive date.
pub fn stamp_archived(review: Value, now_iso: &str) -> Value {
    match review {
        Value::Object(mut fields) => {
            fields.insert("dateArchive".to_string(), now_iso.into());
            Value::Object(fields)
        }
        other => other,
    }
}
