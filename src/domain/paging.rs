use crate::domain::model::Paging;
use crate::utils::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How the follow-up page range is derived from the driving response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum PaginationMode {
    /// Pages `2..total`, `total` read as an exclusive upper page index.
    #[default]
    Total,
    /// Pages `2..=pages`, reading the page count the API reports.
    Pages,
}

impl PaginationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationMode::Total => "total",
            PaginationMode::Pages => "pages",
        }
    }
}

/// 從回應中取出 `paging`，缺少或型別錯誤時回傳 SchemaError
pub fn read_paging(url: &str, body: &serde_json::Value) -> Result<Paging> {
    let raw = body.get("paging").ok_or_else(|| ProbeError::SchemaError {
        url: url.to_string(),
        field: "paging".to_string(),
        message: "is missing".to_string(),
    })?;

    if !raw.is_object() {
        return Err(ProbeError::SchemaError {
            url: url.to_string(),
            field: "paging".to_string(),
            message: format!("is not an object (got {})", raw),
        });
    }

    serde_json::from_value(raw.clone()).map_err(|e| ProbeError::SchemaError {
        url: url.to_string(),
        field: "paging".to_string(),
        message: format!("has ill-typed fields: {}", e),
    })
}

/// Follow-up pages for `mode`, refusing to build a loop longer than `max_pages`.
///
/// `limit` caps the run at the first N pages counting the driving page, so
/// `Some(1)` follows nothing and `None` or `Some(0)` follows every page. The cap
/// is applied before the `max_pages` check.
pub fn follow_up_pages(
    url: &str,
    paging: &Paging,
    mode: PaginationMode,
    limit: Option<u64>,
    max_pages: u64,
) -> Result<Range<u64>> {
    let (field, upper) = match mode {
        PaginationMode::Total => ("paging.total", paging.total),
        PaginationMode::Pages => ("paging.pages", paging.pages.map(|p| p.saturating_add(1))),
    };

    let mut upper = upper.ok_or_else(|| ProbeError::SchemaError {
        url: url.to_string(),
        field: field.to_string(),
        message: "is missing".to_string(),
    })?;

    if let Some(limit) = limit.filter(|n| *n > 0) {
        upper = upper.min(limit.saturating_add(1));
    }

    let pages = 2..upper.max(2);
    let requested = pages.end - pages.start;
    if requested > max_pages {
        return Err(ProbeError::PaginationBoundError {
            url: url.to_string(),
            requested,
            limit: max_pages,
        });
    }

    Ok(pages)
}
