use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"title="[^"]*">([^<]+)"#).unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"mailto:(.*?)\?subject").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\d{1,4}(?:\s*\d+)*").unwrap());
static COMMENTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<br\s*/?>(.*)$").unwrap());

/// Sub-fields pulled out of the composite contact markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub comments: Option<String>,
}

impl Contact {
    pub const COLUMNS: [&'static str; 4] = ["Name", "Email", "Phone", "Comments"];

    pub fn into_values(self) -> [Value; 4] {
        [self.name, self.email, self.phone, self.comments].map(|v| v.map_or(Value::Null, Value::String))
    }
}

/// Split a composite contact field. Each part is probed independently, so a
/// malformed fragment only loses that part.
pub fn decompose(raw: Option<&Value>) -> Contact {
    let text = as_text(raw);
    Contact {
        name: NAME_RE.captures(&text).map(|c| c[1].trim().to_string()),
        email: EMAIL_RE.captures(&text).map(|c| c[1].to_string()),
        phone: PHONE_RE.find(&text).map(|m| m.as_str().to_string()),
        comments: COMMENTS_RE.captures(&text).map(|c| c[1].trim().to_string()),
    }
}

/// Missing and null become "None", which none of the probes match.
fn as_text(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
