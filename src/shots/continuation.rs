//! Continuation tokens
//!
//! A token names a date bound that reproduces the rest of a listing without
//! any server state, plus a random nonce that keeps tokens unique. Wire
//! form: `latest=20190101T115959&<nonce>`, or `&<nonce>` when neither the
//! returned nor the held results carry a timestamp. Only the process that
//! minted a bare token can resume it.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use super::filename::format_key;
use crate::client::SortOrder;
use crate::error::ShotError;

/// Which side of the listing a bound closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundField {
    Earliest,
    Latest,
}

impl BoundField {
    fn as_str(self) -> &'static str {
        match self {
            BoundField::Earliest => "earliest",
            BoundField::Latest => "latest",
        }
    }
}

/// A date-bound filter term, e.g. `earliest=20190101T120000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBound {
    pub field: BoundField,
    pub value: String,
}

impl DateBound {
    /// The bound that resumes a listing right after `last`.
    ///
    /// Ascending listings continue one second later, descending ones one
    /// second earlier. Two shot files never share a second.
    pub fn after(last: NaiveDateTime, order: SortOrder) -> Self {
        if order.is_ascending() {
            Self {
                field: BoundField::Earliest,
                value: format_key(last + Duration::seconds(1)),
            }
        } else {
            Self {
                field: BoundField::Latest,
                value: format_key(last - Duration::seconds(1)),
            }
        }
    }
}

impl DateBound {
    /// The bound that resumes a listing at `next`, inclusive.
    pub fn at(next: NaiveDateTime, order: SortOrder) -> Self {
        let field = if order.is_ascending() {
            BoundField::Earliest
        } else {
            BoundField::Latest
        };
        Self {
            field,
            value: format_key(next),
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field.as_str(), self.value)
    }
}

/// Parsed continuation token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub bound: Option<DateBound>,
    pub nonce: String,
}

impl ContinuationToken {
    /// Mint a fresh token with a random nonce.
    pub fn mint(bound: Option<DateBound>) -> Self {
        Self {
            bound,
            nonce: Uuid::new_v4().to_string(),
        }
    }

    pub fn serialize(&self) -> String {
        match self.bound {
            Some(ref bound) => format!("{}&{}", bound, self.nonce),
            None => format!("&{}", self.nonce),
        }
    }

    /// Parse a token string. The nonce is kept verbatim and never interpreted.
    pub fn parse(token: &str) -> Result<Self, ShotError> {
        let malformed = || ShotError::MalformedContinuation(token.to_string());

        let (bound_part, nonce) = token.split_once('&').ok_or_else(malformed)?;
        if nonce.is_empty() {
            return Err(malformed());
        }

        let bound = if bound_part.is_empty() {
            None
        } else {
            let (field, value) = bound_part.split_once('=').ok_or_else(malformed)?;
            let field = match field {
                "earliest" => BoundField::Earliest,
                "latest" => BoundField::Latest,
                _ => return Err(malformed()),
            };
            if value.is_empty() {
                return Err(malformed());
            }
            Some(DateBound {
                field,
                value: value.to_string(),
            })
        };

        Ok(Self {
            bound,
            nonce: nonce.to_string(),
        })
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
