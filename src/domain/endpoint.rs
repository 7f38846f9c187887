use crate::domain::model::{QueryValue, RequestDescriptor};
use crate::utils::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The API methods this tool knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    LoansNewest,
    LendersNewest,
    Methods,
    LendersSearch,
    Loans,
    LoansSimilar,
    LoanLenders,
    LoanTeams,
}

/// 端點表中的一列
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub default_params: &'static [(&'static str, DefaultParam)],
    pub paged: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum DefaultParam {
    Int(i64),
    Str(&'static str),
}

impl From<DefaultParam> for QueryValue {
    fn from(value: DefaultParam) -> Self {
        match value {
            DefaultParam::Int(n) => QueryValue::Int(n),
            DefaultParam::Str(s) => QueryValue::Str(s.to_string()),
        }
    }
}

pub const ALL_ENDPOINTS: [Endpoint; 8] = [
    Endpoint::LoansNewest,
    Endpoint::LendersNewest,
    Endpoint::Methods,
    Endpoint::LendersSearch,
    Endpoint::Loans,
    Endpoint::LoansSimilar,
    Endpoint::LoanLenders,
    Endpoint::LoanTeams,
];

impl Endpoint {
    pub fn spec(&self) -> EndpointSpec {
        match self {
            Endpoint::LoansNewest => EndpointSpec {
                name: "loans-newest",
                path: "/v1/loans/newest",
                default_params: &[("page", DefaultParam::Int(10)), ("per_page", DefaultParam::Int(75))],
                paged: true,
                description: "Most recently posted loans",
            },
            Endpoint::LendersNewest => EndpointSpec {
                name: "lenders-newest",
                path: "/v1/lenders/newest",
                default_params: &[],
                paged: true,
                description: "Most recently joined lenders",
            },
            Endpoint::Methods => EndpointSpec {
                name: "methods",
                path: "/v1/methods",
                default_params: &[],
                paged: false,
                description: "API method discovery",
            },
            Endpoint::LendersSearch => EndpointSpec {
                name: "lenders-search",
                path: "/v1/lenders/search",
                default_params: &[("q", DefaultParam::Str("shoes"))],
                paged: true,
                description: "Full-text lender search",
            },
            Endpoint::Loans => EndpointSpec {
                name: "loans",
                path: "/v1/loans/{ids}",
                default_params: &[],
                paged: false,
                description: "Loans by id (one or more, comma-joined)",
            },
            Endpoint::LoansSimilar => EndpointSpec {
                name: "loans-similar",
                path: "/v1/loans/{id}/similar",
                default_params: &[],
                paged: false,
                description: "Loans similar to the given loan",
            },
            Endpoint::LoanLenders => EndpointSpec {
                name: "loan-lenders",
                path: "/v1/loans/{id}/lenders",
                default_params: &[],
                paged: true,
                description: "Lenders of the given loan",
            },
            Endpoint::LoanTeams => EndpointSpec {
                name: "loan-teams",
                path: "/v1/loans/{id}/teams",
                default_params: &[],
                paged: true,
                description: "Teams that lent to the given loan",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Resolves the path template against `ids`.
    pub fn path(&self, ids: &[u64]) -> Result<String> {
        let template = self.spec().path;
        if template.contains("{ids}") {
            if ids.is_empty() {
                return Err(ProbeError::ConfigError {
                    message: format!("endpoint '{}' needs at least one loan id", self.name()),
                });
            }
            let joined = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            return Ok(template.replace("{ids}", &joined));
        }

        if template.contains("{id}") {
            return match ids {
                [id] => Ok(template.replace("{id}", &id.to_string())),
                _ => Err(ProbeError::ConfigError {
                    message: format!(
                        "endpoint '{}' needs exactly one loan id, got {}",
                        self.name(),
                        ids.len()
                    ),
                }),
            };
        }

        Ok(template.to_string())
    }

    /// Descriptor with the table's default parameters.
    pub fn descriptor(&self, ids: &[u64]) -> Result<RequestDescriptor> {
        let mut req = RequestDescriptor::new(self.path(ids)?);
        for (key, value) in self.spec().default_params {
            req.set_param(*key, QueryValue::from(*value));
        }
        Ok(req)
    }

    /// Descriptor with exactly the given parameters, ignoring the defaults.
    pub fn descriptor_with(
        &self,
        ids: &[u64],
        params: &[(String, QueryValue)],
    ) -> Result<RequestDescriptor> {
        let mut req = RequestDescriptor::new(self.path(ids)?);
        for (key, value) in params {
            req.set_param(key.clone(), value.clone());
        }
        Ok(req)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
