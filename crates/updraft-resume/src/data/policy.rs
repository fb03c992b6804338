use std::fmt;

use super::response::ResponseMeta;

/// Kind of cache validator used to recognise an unchanged resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    /// Strong `ETag` header.
    EntityTag,
    /// `Last-Modified` header, compared verbatim.
    LastModified,
    /// Length of the whole entity. Only a weak signal, off by default.
    ContentLength,
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorKind::EntityTag => write!(f, "entity tag"),
            ValidatorKind::LastModified => write!(f, "last-modified"),
            ValidatorKind::ContentLength => write!(f, "content length"),
        }
    }
}

/// A validator value taken from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    EntityTag(String),
    LastModified(String),
    ContentLength(u64),
}

impl Validator {
    pub fn from_response(kind: ValidatorKind, response: &ResponseMeta) -> Option<Self> {
        match kind {
            ValidatorKind::EntityTag => response.etag().map(|t| Validator::EntityTag(t.to_string())),
            ValidatorKind::LastModified => response
                .last_modified()
                .map(|d| Validator::LastModified(d.to_string())),
            ValidatorKind::ContentLength => response.entity_length().map(Validator::ContentLength),
        }
    }

    pub fn kind(&self) -> ValidatorKind {
        match self {
            Validator::EntityTag(_) => ValidatorKind::EntityTag,
            Validator::LastModified(_) => ValidatorKind::LastModified,
            Validator::ContentLength(_) => ValidatorKind::ContentLength,
        }
    }

    /// Value for an `If-Range` request header. Content length cannot be
    /// expressed there.
    pub fn if_range(&self) -> Option<&str> {
        match self {
            Validator::EntityTag(tag) => Some(tag),
            Validator::LastModified(date) => Some(date),
            Validator::ContentLength(_) => None,
        }
    }
}

/// Ordered list of validator kinds to try when comparing two responses.
///
/// The first kind present on both sides decides the comparison.
///
/// # Examples
///
/// ```
/// use updraft_resume::{ValidatorKind, ValidatorPolicy};
///
/// let policy = ValidatorPolicy::default().with(ValidatorKind::ContentLength);
/// assert_eq!(policy.kinds().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorPolicy {
    order: Vec<ValidatorKind>,
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        Self {
            order: vec![ValidatorKind::EntityTag, ValidatorKind::LastModified],
        }
    }
}

impl ValidatorPolicy {
    /// Policy with an explicit order. Repeated kinds are dropped.
    pub fn new(order: impl IntoIterator<Item = ValidatorKind>) -> Self {
        let mut policy = Self { order: Vec::new() };
        for kind in order {
            policy = policy.with(kind);
        }
        policy
    }

    /// Appends `kind` unless it is already listed.
    pub fn with(mut self, kind: ValidatorKind) -> Self {
        if !self.order.contains(&kind) {
            self.order.push(kind);
        }
        self
    }

    pub fn kinds(&self) -> &[ValidatorKind] { &self.order }

    /// First validator in policy order present on `response`.
    pub fn preferred(&self, response: &ResponseMeta) -> Option<Validator> {
        self.order
            .iter()
            .find_map(|kind| Validator::from_response(*kind, response))
    }
}
