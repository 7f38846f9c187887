use crate::domain::endpoint::Endpoint;
use crate::domain::model::{QueryValue, RequestDescriptor};
use crate::domain::paging::PaginationMode;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutput {
    Print,
    #[default]
    Discard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginateSpec {
    #[serde(default)]
    pub mode: PaginationMode,
    #[serde(default = "default_page_output")]
    pub output: StepOutput,
    /// Stop after the first N pages, the driving page included; 0 or absent means all.
    #[serde(default)]
    pub limit: Option<u64>,
}

impl StepOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutput::Print => "print",
            StepOutput::Discard => "discard",
        }
    }
}

fn default_page_output() -> StepOutput {
    StepOutput::Print
}

impl Default for PaginateSpec {
    fn default() -> Self {
        Self {
            mode: PaginationMode::default(),
            output: StepOutput::Print,
            limit: None,
        }
    }
}

/// 腳本中的一步：呼叫一個端點，可選擇以其回應驅動分頁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub endpoint: Endpoint,
    #[serde(default)]
    pub ids: Vec<u64>,
    /// `None` uses the endpoint's default parameters; `Some` replaces them entirely.
    pub params: Option<BTreeMap<String, QueryValue>>,
    #[serde(default)]
    pub output: StepOutput,
    pub paginate: Option<PaginateSpec>,
}

impl Step {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ids: Vec::new(),
            params: None,
            output: StepOutput::Discard,
            paginate: None,
        }
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        self.params = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn printed(mut self) -> Self {
        self.output = StepOutput::Print;
        self
    }

    pub fn paginated(mut self, spec: PaginateSpec) -> Self {
        self.paginate = Some(spec);
        self
    }

    pub fn descriptor(&self) -> Result<RequestDescriptor> {
        match &self.params {
            None => self.endpoint.descriptor(&self.ids),
            Some(params) => {
                let params: Vec<(String, QueryValue)> = params
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                self.endpoint.descriptor_with(&self.ids, &params)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
}

impl Validate for Script {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("scripts.name", &self.name)?;
        if self.steps.is_empty() {
            return Err(ProbeError::ConfigValidationError {
                field: format!("scripts.{}.steps", self.name),
                message: "a script needs at least one step".to_string(),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.descriptor().map_err(|e| ProbeError::ConfigValidationError {
                field: format!("scripts.{}.steps[{}]", self.name, index),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

pub const LENDER_SEARCH: &str = "lender-search";
pub const NEWEST_LOANS: &str = "newest-loans";

/// Probe every listing endpoint, then print the follow-up pages of a lender search.
pub fn lender_search_script() -> Script {
    Script {
        name: LENDER_SEARCH.to_string(),
        description: "Probe listings, then print the pages of a lender search".to_string(),
        steps: vec![
            Step::new(Endpoint::LoansNewest).with_params([("page", 10i64), ("per_page", 75i64)]),
            Step::new(Endpoint::LendersNewest),
            Step::new(Endpoint::Methods),
            Step::new(Endpoint::LendersSearch).paginated(PaginateSpec::default()),
        ],
    }
}

pub fn newest_loans_script() -> Script {
    Script {
        name: NEWEST_LOANS.to_string(),
        description: "Fetch one sized page of new loans, then print the follow-up pages".to_string(),
        steps: vec![
            Step::new(Endpoint::LoansNewest).with_params([("page", 10i64), ("per_page", 75i64)]),
            Step::new(Endpoint::LoansNewest)
                .with_params(Vec::<(String, QueryValue)>::new())
                .paginated(PaginateSpec::default()),
        ],
    }
}

pub fn builtin_scripts() -> Vec<Script> {
    vec![lender_search_script(), newest_loans_script()]
}

/// Looks `name` up among `extra` first, then the built-ins.
pub fn find_script(name: &str, extra: &[Script]) -> Result<Script> {
    extra
        .iter()
        .find(|s| s.name == name)
        .cloned()
        .or_else(|| builtin_scripts().into_iter().find(|s| s.name == name))
        .ok_or_else(|| ProbeError::UnknownScript {
            name: name.to_string(),
        })
}
