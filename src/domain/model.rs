use serde::{Deserialize, Serialize};
use std::fmt;

/// 查詢參數值：原始腳本同時使用字串與整數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(i64),
    /// Page numbers and sizes; kept unsigned so large values are sent as given.
    UInt(u64),
    Str(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::UInt(n) => write!(f, "{}", n),
            QueryValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::UInt(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

/// 單次 GET 請求的描述：API 路徑（不含 `.json`）與有序查詢參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: String,
    pub query: Vec<(String, QueryValue)>,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Sets `key`, replacing an existing value in place so parameter order is stable.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set_param(key, value);
        self
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.query.push((key, value)),
        }
    }

    pub fn param(&self, key: &str) -> Option<&QueryValue> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Follow-up request for one page: same path, only `page`.
    pub fn page_of(&self, page: u64) -> Self {
        Self::new(self.path.clone()).with_param("page", page)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Paging metadata carried under the `paging` key of list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub total: Option<u64>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub pages: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub steps_executed: usize,
    pub requests_issued: usize,
    pub bodies_emitted: usize,
}

impl RunSummary {
    pub fn absorb(&mut self, other: RunSummary) {
        self.steps_executed += other.steps_executed;
        self.requests_issued += other.requests_issued;
        self.bodies_emitted += other.bodies_emitted;
    }
}
