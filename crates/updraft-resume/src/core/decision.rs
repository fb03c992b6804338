use std::fmt;

use crate::data::{ResponseMeta, ResumableDownload, Validator, ValidatorKind, ValidatorPolicy, header, status};

/// Why a partial download cannot be continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    NoPriorState,
    NoPriorResponse,
    /// Nothing has been written to the partial file yet.
    NothingWritten,
    /// The recorded response declared `Accept-Ranges: none`.
    RangesUnsupported,
    MissingValidators,
    ValidatorMismatch { kind: ValidatorKind },
    /// The server answered a ranged request with the whole entity.
    RangeIgnored,
    RangeNotSatisfiable,
    /// A partial response did not start at the requested offset.
    UnexpectedRange,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::NoPriorState => write!(f, "no prior state"),
            RestartReason::NoPriorResponse => write!(f, "no response recorded"),
            RestartReason::NothingWritten => write!(f, "nothing written yet"),
            RestartReason::RangesUnsupported => write!(f, "server does not accept ranges"),
            RestartReason::MissingValidators => write!(f, "no common validator"),
            RestartReason::ValidatorMismatch { kind } => write!(f, "{kind} changed"),
            RestartReason::RangeIgnored => write!(f, "server ignored the range"),
            RestartReason::RangeNotSatisfiable => write!(f, "range not satisfiable"),
            RestartReason::UnexpectedRange => write!(f, "unexpected content range"),
        }
    }
}

/// Outcome of comparing a stored response with a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resumability {
    Resumable { validator: Validator },
    NotResumable(RestartReason),
}

impl Resumability {
    pub fn is_resumable(&self) -> bool { matches!(self, Resumability::Resumable { .. }) }
}

/// Request to issue for the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    Fresh { reason: RestartReason },
    Ranged { offset: u64, validator: Validator },
}

impl RequestPlan {
    pub fn offset(&self) -> u64 {
        match self {
            RequestPlan::Fresh { .. } => 0,
            RequestPlan::Ranged { offset, .. } => *offset,
        }
    }

    /// Extra request headers: `Range` and, when the validator allows it,
    /// `If-Range`.
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            RequestPlan::Fresh { .. } => Vec::new(),
            RequestPlan::Ranged { offset, validator } => {
                let mut headers = vec![(header::RANGE.to_string(), range_header(*offset))];
                if let Some(value) = validator.if_range() {
                    headers.push((header::IF_RANGE.to_string(), value.to_string()));
                }
                headers
            }
        }
    }
}

/// What to do with the response to a planned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Append the body at `offset` and persist `state` in place of the old record.
    Continue {
        offset: u64,
        state:  ResumableDownload,
    },
    /// Discard the partial file and the record. When `reuse_body` is set the
    /// response body is the whole entity and can be written from byte zero;
    /// otherwise a fresh request is needed.
    Restart {
        reason:     RestartReason,
        reuse_body: bool,
    },
    /// A status that is neither success nor a range signal. The record and
    /// the partial file stay as they are.
    Failed { status: u16 },
}

/// `Range` header value requesting everything from `offset` on.
pub fn range_header(offset: u64) -> String { format!("bytes={offset}-") }

/// Compares the validators of a stored response with a fresh response.
///
/// Validator kinds are tried in policy order. The first kind present on both
/// sides decides: equal values are resumable, different values are not. If no
/// kind is present on both sides the download is not resumable.
pub fn resumability(
    prior: Option<&ResumableDownload>,
    fresh: &ResponseMeta,
    policy: &ValidatorPolicy,
) -> Resumability {
    let Some(prior) = prior else {
        return Resumability::NotResumable(RestartReason::NoPriorState);
    };
    let Some(previous) = prior.response() else {
        return Resumability::NotResumable(RestartReason::NoPriorResponse);
    };

    for kind in policy.kinds() {
        let pair = (
            Validator::from_response(*kind, previous),
            Validator::from_response(*kind, fresh),
        );
        if let (Some(before), Some(after)) = pair {
            return if before == after {
                Resumability::Resumable { validator: before }
            } else {
                Resumability::NotResumable(RestartReason::ValidatorMismatch { kind: *kind })
            };
        }
    }

    Resumability::NotResumable(RestartReason::MissingValidators)
}

/// Plans the next request given the stored record and the number of bytes
/// currently at its file location.
pub fn plan_request(
    prior: Option<&ResumableDownload>,
    current_len: u64,
    policy: &ValidatorPolicy,
) -> RequestPlan {
    let Some(prior) = prior else {
        return RequestPlan::Fresh { reason: RestartReason::NoPriorState };
    };
    let Some(response) = prior.response() else {
        return RequestPlan::Fresh { reason: RestartReason::NoPriorResponse };
    };
    if current_len == 0 {
        return RequestPlan::Fresh { reason: RestartReason::NothingWritten };
    }
    if !response.accepts_ranges() {
        return RequestPlan::Fresh { reason: RestartReason::RangesUnsupported };
    }
    match policy.preferred(response) {
        Some(validator) => RequestPlan::Ranged {
            offset: current_len,
            validator,
        },
        None => RequestPlan::Fresh { reason: RestartReason::MissingValidators },
    }
}

/// Decides how to treat `response`, received for `plan`.
pub fn reconcile(
    plan: &RequestPlan,
    prior: Option<&ResumableDownload>,
    response: &ResponseMeta,
    policy: &ValidatorPolicy,
) -> Reconciliation {
    let offset = match plan {
        RequestPlan::Fresh { reason } => return reconcile_fresh(*reason, response),
        RequestPlan::Ranged { offset, .. } => *offset,
    };

    match response.status() {
        status::PARTIAL_CONTENT => {
            let starts_at_offset = response
                .content_range()
                .is_some_and(|range| range.start == offset);
            if !starts_at_offset {
                return Reconciliation::Restart {
                    reason:     RestartReason::UnexpectedRange,
                    reuse_body: false,
                };
            }
            match (resumability(prior, response, policy), prior) {
                (Resumability::Resumable { .. }, Some(prior)) => Reconciliation::Continue {
                    offset,
                    state: prior.with_response(response.clone()),
                },
                (Resumability::NotResumable(reason), _) => Reconciliation::Restart {
                    reason,
                    reuse_body: false,
                },
                (Resumability::Resumable { .. }, None) => Reconciliation::Restart {
                    reason:     RestartReason::NoPriorState,
                    reuse_body: false,
                },
            }
        }
        status::OK => Reconciliation::Restart {
            reason:     RestartReason::RangeIgnored,
            reuse_body: true,
        },
        status::RANGE_NOT_SATISFIABLE => Reconciliation::Restart {
            reason:     RestartReason::RangeNotSatisfiable,
            reuse_body: false,
        },
        other => Reconciliation::Failed { status: other },
    }
}

fn reconcile_fresh(reason: RestartReason, response: &ResponseMeta) -> Reconciliation {
    match response.status() {
        status::PARTIAL_CONTENT => Reconciliation::Restart {
            reason:     RestartReason::UnexpectedRange,
            reuse_body: false,
        },
        _ if response.is_success() => Reconciliation::Restart {
            reason,
            reuse_body: true,
        },
        other => Reconciliation::Failed { status: other },
    }
}
