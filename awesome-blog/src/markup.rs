use std::collections::HashMap;

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value as Json;

/// One escaped `<p>` per non-blank line
pub fn text2html(text: &str) -> String {
    text.split('\n')
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("<p>{}</p>", html_escape::encode_text(s)))
        .collect()
}

/// Relative age of a timestamp given in seconds
pub fn relative_time(t: f64, now: f64) -> String {
    let delta = (now - t) as i64;

    if delta < 60 {
        "1 minute ago".into()
    } else if delta < 3600 {
        format!("{} minutes ago", delta / 60)
    } else if delta < 86400 {
        format!("{} hours ago", delta / 3600)
    } else if delta < 604800 {
        format!("{} days ago", delta / 86400)
    } else {
        let dt: Option<DateTime<Local>> = Local.timestamp_opt(t as i64, 0).single();
        dt.map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Template filter `datetime`
pub fn datetime_filter(value: &Json, _args: &HashMap<String, Json>) -> tera::Result<Json> {
    let t = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("datetime filter expects a number, got {}", value)))?;
    let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    Ok(Json::String(relative_time(t, now)))
}
