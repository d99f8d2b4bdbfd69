use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One spreadsheet row as served by the events endpoint.
///
/// Every display field is optional: blank cells arrive as `null`, `""` or are
/// missing altogether, and all of those decode to `None`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// Shown verbatim on the card, never parsed.
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub artists: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<Status>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warn,
    Bad,
}

impl Status {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ok" => Some(Status::Ok),
            "warn" => Some(Status::Warn),
            "bad" => Some(Status::Bad),
            _ => None,
        }
    }

    /// CSS modifier used on the status tag.
    pub fn class(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warn => "warn",
            Status::Bad => "bad",
        }
    }
}

impl EventRecord {
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn venue_or_default(&self) -> &str {
        self.venue.as_deref().unwrap_or("")
    }
}

/// Spreadsheet cells may come through as numbers or booleans; keep them as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar field value, found {other}"
            )))
        }
    };
    Ok(text.filter(|s| !s.trim().is_empty()))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<Status>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = lenient_text(deserializer)?;
    Ok(tag.as_deref().and_then(Status::from_tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sparse_rows() {
        let rows: Vec<EventRecord> = serde_json::from_str(
            r#"[
                {"date": "2025-12-05", "title": "Recital", "type": "Show", "status": "ok"},
                {"date": null, "title": "", "price": 40, "status": "maybe", "extra": [1, 2]},
                {}
            ]"#,
        )
        .expect("decode rows");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind.as_deref(), Some("Show"));
        assert_eq!(rows[0].status, Some(Status::Ok));
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].title, None);
        assert_eq!(rows[1].price.as_deref(), Some("40"));
        assert_eq!(rows[1].status, None, "unknown status means no tag");
        assert_eq!(rows[2], EventRecord::default());
    }

    #[test]
    fn keeps_time_verbatim() {
        let row: EventRecord =
            serde_json::from_str(r#"{"time": " 20h às 23h "}"#).expect("decode row");
        assert_eq!(row.time.as_deref(), Some(" 20h às 23h "));
    }

    #[test]
    fn rejects_non_object_rows() {
        let result = serde_json::from_str::<Vec<EventRecord>>(r#"[{"title": "A"}, 3]"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_nested_field_values() {
        let result = serde_json::from_str::<EventRecord>(r#"{"title": {"text": "A"}}"#);
        assert!(result.is_err());
    }
}
