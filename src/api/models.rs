use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Run states reported by the server (spelling is the wire format)
pub const STATUS_SUCCESSED: &str = "Successed";
pub const STATUS_FAILED: &str = "Failed";
pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_ABORTED: &str = "Aborted";

/// Reply envelope wrapped around every JSON response.
///
/// `code == 0` is success; application errors arrive as HTTP 200 with
/// `code == -1` and a message. Bodies without the envelope keys are treated
/// as the payload itself.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    pub data: Value,
}

impl Envelope {
    pub fn from_body(body: Option<Value>) -> Self {
        match body {
            Some(Value::Object(mut map))
                if map.contains_key("code") || map.contains_key("data") =>
            {
                Self {
                    code: map.get("code").and_then(Value::as_i64).unwrap_or(0),
                    message: map
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    data: map.remove("data").unwrap_or(Value::Null),
                }
            }
            Some(value) => Self {
                code: 0,
                message: String::new(),
                data: value,
            },
            None => Self {
                code: 0,
                message: String::new(),
                data: Value::Null,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Declared shape of a list endpoint's `data` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// `{page_size, page, total, list}`
    Paged,
    /// A bare array of records
    Bare,
}

/// Paged payload carried inside `data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub total: u64,
    // The server sends `"list": null` when a page is out of range
    #[serde(default, deserialize_with = "null_to_empty")]
    pub list: Vec<Value>,
}

fn null_to_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl Page {
    /// Interpret `data` according to the kind's declared shape, tolerating
    /// the other shape rather than failing.
    pub fn from_data(data: &Value, shape: PageShape) -> Self {
        match shape {
            PageShape::Bare => match data {
                Value::Array(_) => Self::wrap_bare(data),
                // Tolerate a paged object where a bare list was declared
                Value::Object(_) => serde_json::from_value(data.clone()).unwrap_or_default(),
                _ => Self::default(),
            },
            PageShape::Paged => match data {
                Value::Object(_) => serde_json::from_value(data.clone()).unwrap_or_default(),
                // Tolerate a bare list where a paged object was declared
                Value::Array(_) => Self::wrap_bare(data),
                _ => Self::default(),
            },
        }
    }

    fn wrap_bare(data: &Value) -> Self {
        let list = data.as_array().cloned().unwrap_or_default();
        Self {
            page_size: list.len() as u64,
            page: 1,
            total: list.len() as u64,
            list,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            1
        } else {
            self.total.div_ceil(self.page_size).max(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Resource counts from the summary endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub clusters: u64,
    #[serde(default)]
    pub hosts: u64,
    #[serde(default)]
    pub pipelines: u64,
    #[serde(default)]
    pub pipelineruns: u64,
    #[serde(default)]
    pub tasks: u64,
    #[serde(default)]
    pub taskruns: u64,
}
