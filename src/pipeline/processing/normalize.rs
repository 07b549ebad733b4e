use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::constants::{DEPRECATED_FIELDS, NOT_AVAILABLE};
use crate::domain::{CompanyRecord, RawRecord};
use crate::error::RecordError;

/// Decode one line of the main source into a raw record
pub fn decode_raw_record(line: &str) -> Result<RawRecord, RecordError> {
    let value: Value = serde_json::from_str(line.trim_end_matches('\r'))
        .map_err(|e| RecordError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RecordError::NotAnObject),
    }
}

/// Normalize a raw supplier record into a company row.
///
/// `processed_at` supplies `load_date`; callers pass one timestamp per run.
pub fn normalize_company(
    raw: &RawRecord,
    processed_at: DateTime<Utc>,
) -> Result<CompanyRecord, RecordError> {
    let mut data = raw.clone();

    let company_name = required_str(&data, "company_name")?.trim().to_uppercase();
    let country = required_str(&data, "country")?.trim().to_uppercase();
    let industry = title_case(required_str(&data, "industry")?);
    let size = parse_size(data.get("size"));
    let load_date = processed_at.date_naive();

    let (city, state) = split_headquarters(data.get("headquarters").and_then(Value::as_str));

    let latest_news = data
        .get("latest_news")
        .filter(|v| !is_blank(v))
        .and_then(value_to_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    for field in DEPRECATED_FIELDS {
        data.remove(field);
    }

    Ok(CompanyRecord {
        company_name,
        location: text_field(&data, "location"),
        country,
        industry,
        website: text_field(&data, "website"),
        size,
        ceo: text_field(&data, "ceo"),
        latest_news,
        linkedin_url: text_field(&data, "linkedin_url"),
        point_of_contact: text_field(&data, "point_of_contact"),
        id: text_field(&data, "id"),
        specialties: text_field(&data, "specialties"),
        founded: text_field(&data, "founded"),
        load_date,
        state,
        city,
    })
}

/// Capitalize every whitespace-separated word: first character upper, the rest lower.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a company size. Ranges like `"50-200"` yield their upper end; anything
/// unparseable yields 0.
pub fn parse_size(value: Option<&Value>) -> i64 {
    match value {
        None => 0,
        Some(Value::String(s)) => s
            .split('-')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .ok()
            .and_then(|parts| parts.into_iter().max())
            .unwrap_or(0),
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(_) => 0,
    }
}

/// Split `"City, State[, ...]"` into `(city, state)`: the first two comma
/// separated segments. Anything after the second comma is ignored.
pub fn split_headquarters(headquarters: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(hq) = headquarters else {
        return (None, None);
    };
    let mut parts = hq.split(',');
    let city = parts.next().and_then(non_empty);
    let state = parts.next().and_then(non_empty);
    (city, state)
}

// Null, false, zero and empty strings, arrays or objects carry no news.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required_str<'a>(data: &'a RawRecord, field: &'static str) -> Result<&'a str, RecordError> {
    match data.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(RecordError::NotAString(field)),
    }
}

fn text_field(data: &RawRecord, field: &str) -> Option<String> {
    data.get(field).and_then(value_to_text)
}

// Strings pass through as-is; numbers and booleans keep their JSON text.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn processed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 26, 23, 59, 0).unwrap()
    }

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn base_record() -> Value {
        json!({
            "company_name": "  acme corp ",
            "country": " usa",
            "industry": "software engineering",
            "size": "50-200",
            "headquarters": "Austin, TX",
            "latest_news": "Raised a Series B",
            "website": "https://acme.example",
            "description": "Makes everything",
            "locationUrl": "https://maps.example/acme",
            "founded": 1999
        })
    }

    #[test]
    fn test_normalize_full_record() {
        let record = normalize_company(&raw(base_record()), processed_at()).unwrap();

        assert_eq!(record.company_name, "ACME CORP");
        assert_eq!(record.country, "USA");
        assert_eq!(record.industry, "Software Engineering");
        assert_eq!(record.size, 200);
        assert_eq!(record.city.as_deref(), Some("Austin"));
        assert_eq!(record.state.as_deref(), Some("TX"));
        assert_eq!(record.latest_news, "Raised a Series B");
        assert_eq!(record.website.as_deref(), Some("https://acme.example"));
        assert_eq!(record.founded.as_deref(), Some("1999"));
        assert_eq!(record.load_date.to_string(), "2024-10-26");
        assert_eq!(record.ceo, None);
    }

    #[test]
    fn test_deprecated_fields_do_not_survive() {
        let record = normalize_company(&raw(base_record()), processed_at()).unwrap();
        let row = serde_json::to_value(&record).unwrap();
        for field in DEPRECATED_FIELDS {
            assert!(row.get(field).is_none(), "{} should be dropped", field);
        }
    }

    #[test]
    fn test_size_parsing() {
        assert_eq!(parse_size(Some(&json!("50-200"))), 200);
        assert_eq!(parse_size(Some(&json!("abc"))), 0);
        assert_eq!(parse_size(Some(&json!("75"))), 75);
        assert_eq!(parse_size(Some(&json!(" 10 - 20 "))), 20);
        assert_eq!(parse_size(Some(&json!("10-x"))), 0);
        assert_eq!(parse_size(Some(&json!(""))), 0);
        assert_eq!(parse_size(Some(&json!(42))), 42);
        assert_eq!(parse_size(Some(&Value::Null)), 0);
        assert_eq!(parse_size(None), 0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("software engineering"), "Software Engineering");
        assert_eq!(title_case("  FINANCIAL   services "), "Financial Services");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_headquarters_split() {
        assert_eq!(
            split_headquarters(Some("Austin, TX")),
            (Some("Austin".to_string()), Some("TX".to_string()))
        );
        assert_eq!(split_headquarters(Some("Austin")), (Some("Austin".to_string()), None));
        assert_eq!(split_headquarters(None), (None, None));
        assert_eq!(split_headquarters(Some("")), (None, None));
        assert_eq!(
            split_headquarters(Some("Austin, TX, USA")),
            (Some("Austin".to_string()), Some("TX".to_string()))
        );
        assert_eq!(split_headquarters(Some(", CA")), (None, Some("CA".to_string())));
    }

    #[test]
    fn test_latest_news_defaults() {
        let mut missing = raw(base_record());
        missing.remove("latest_news");
        let record = normalize_company(&missing, processed_at()).unwrap();
        assert_eq!(record.latest_news, NOT_AVAILABLE);

        let mut empty = raw(base_record());
        empty.insert("latest_news".to_string(), json!(""));
        let record = normalize_company(&empty, processed_at()).unwrap();
        assert_eq!(record.latest_news, NOT_AVAILABLE);
    }

    #[test]
    fn test_latest_news_falsy_values_use_sentinel() {
        for value in [json!(null), json!(0), json!(0.0), json!(false), json!(""), json!([]), json!({})] {
            let mut record = raw(base_record());
            record.insert("latest_news".to_string(), value.clone());
            let normalized = normalize_company(&record, processed_at()).unwrap();
            assert_eq!(normalized.latest_news, NOT_AVAILABLE, "latest_news = {}", value);
        }
    }

    #[test]
    fn test_latest_news_non_empty_values_are_kept() {
        for (value, expected) in [
            (json!("Acquired"), "Acquired"),
            (json!(3), "3"),
            (json!(true), "true"),
            (json!(["merger"]), "[\"merger\"]"),
        ] {
            let mut record = raw(base_record());
            record.insert("latest_news".to_string(), value);
            let normalized = normalize_company(&record, processed_at()).unwrap();
            assert_eq!(normalized.latest_news, expected);
        }
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut record = raw(base_record());
        record.remove("industry");
        assert_eq!(
            normalize_company(&record, processed_at()),
            Err(RecordError::MissingField("industry"))
        );

        let mut record = raw(base_record());
        record.insert("country".to_string(), json!(7));
        assert_eq!(
            normalize_company(&record, processed_at()),
            Err(RecordError::NotAString("country"))
        );
    }

    #[test]
    fn test_decode_raw_record() {
        assert!(decode_raw_record("{\"company_name\": \"x\"}\r").is_ok());
        assert_eq!(decode_raw_record("[1, 2]"), Err(RecordError::NotAnObject));
        assert!(matches!(decode_raw_record("{oops"), Err(RecordError::InvalidJson(_))));
    }
}
