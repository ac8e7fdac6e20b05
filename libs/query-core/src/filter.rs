//! Filter value model: one `(match mode, value)` pair per requested column.
//!
//! Raw input (JSON bodies, query strings, CLI flags) is converted into a
//! [`DynamicValue`] exactly once, here. The predicate builder downstream only
//! asks for typed views (`as_i64`, `as_date`, ...) and treats `None` as
//! "this filter does not apply".

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::Error;

/// Filters keyed by property name. Ordered so predicates are always
/// combined in the same sequence for the same input.
pub type FilterMap = BTreeMap<String, FilterField>;

/// A filter operand decoded from untyped input.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DynamicValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Boolean(bool),
    #[default]
    Absent,
}

const DATE_FMT: &str = "%Y-%m-%d";

impl DynamicValue {
    /// Decode a JSON operand. Strings stay text (typed views coerce later);
    /// `null`, blank strings, arrays and objects become [`DynamicValue::Absent`].
    pub fn from_json(v: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null | J::Array(_) | J::Object(_) => Self::Absent,
            J::Bool(b) => Self::Boolean(*b),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else {
                    let repr = n.to_string();
                    Decimal::from_str(&repr)
                        .or_else(|_| Decimal::from_scientific(&repr))
                        .map(Self::Decimal)
                        .unwrap_or(Self::Text(repr))
                }
            }
            J::String(s) if s.trim().is_empty() => Self::Absent,
            J::String(s) => Self::Text(s.clone()),
        }
    }

    /// Decode an operand from a raw query-string or CLI token.
    ///
    /// The token is kept verbatim as text, so string filters see exactly what
    /// was typed (`007` stays `007`); typed views parse it per column kind.
    /// Blank tokens are [`DynamicValue::Absent`].
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Absent;
        }
        Self::Text(raw.to_string())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Boolean(_) => "boolean",
            Self::Absent => "absent",
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Decimal(d) => Some(d.to_string()),
            Self::Date(d) => Some(d.format(DATE_FMT).to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::Absent => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Decimal(d) => d.to_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Decimal(d) => Some(*d),
            Self::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(0) => Some(false),
            Self::Integer(1) => Some(true),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Text(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Date portion of the operand; time-of-day in textual timestamps is dropped.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => {
                let s = s.trim();
                NaiveDate::parse_from_str(s, DATE_FMT)
                    .ok()
                    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                            .ok()
                            .map(|dt| dt.date())
                    })
            }
            _ => None,
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for DynamicValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for DynamicValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<Decimal> for DynamicValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for DynamicValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Absent)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Self::Date(d) => serializer.serialize_str(&d.format(DATE_FMT).to_string()),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

/// Closed set of comparison modes.
///
/// Text modes only apply to string columns; date modes compare at day
/// granularity; the rest apply to any ordered scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchMode {
    StartsWith,
    Contains,
    NotContains,
    EndsWith,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    DateIs,
    DateIsNot,
    DateAfter,
    DateBefore,
}

impl MatchMode {
    pub const ALL: [MatchMode; 14] = [
        MatchMode::StartsWith,
        MatchMode::Contains,
        MatchMode::NotContains,
        MatchMode::EndsWith,
        MatchMode::Equals,
        MatchMode::NotEquals,
        MatchMode::GreaterThan,
        MatchMode::GreaterOrEqual,
        MatchMode::LessThan,
        MatchMode::LessOrEqual,
        MatchMode::DateIs,
        MatchMode::DateIsNot,
        MatchMode::DateAfter,
        MatchMode::DateBefore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::StartsWith => "startsWith",
            MatchMode::Contains => "contains",
            MatchMode::NotContains => "notContains",
            MatchMode::EndsWith => "endsWith",
            MatchMode::Equals => "equals",
            MatchMode::NotEquals => "notEquals",
            MatchMode::GreaterThan => "greaterThan",
            MatchMode::GreaterOrEqual => "greaterOrEqual",
            MatchMode::LessThan => "lessThan",
            MatchMode::LessOrEqual => "lessOrEqual",
            MatchMode::DateIs => "dateIs",
            MatchMode::DateIsNot => "dateIsNot",
            MatchMode::DateAfter => "dateAfter",
            MatchMode::DateBefore => "dateBefore",
        }
    }

    /// Substring modes, meaningful for string columns only.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            MatchMode::StartsWith | MatchMode::Contains | MatchMode::NotContains | MatchMode::EndsWith
        )
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            MatchMode::DateIs | MatchMode::DateIsNot | MatchMode::DateAfter | MatchMode::DateBefore
        )
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    /// Case-insensitive; `_` and `-` are ignored, and the usual short
    /// operator aliases (`eq`, `gte`, ...) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match norm.as_str() {
            "startswith" => MatchMode::StartsWith,
            "contains" => MatchMode::Contains,
            "notcontains" => MatchMode::NotContains,
            "endswith" => MatchMode::EndsWith,
            "equals" | "eq" => MatchMode::Equals,
            "notequals" | "ne" | "neq" => MatchMode::NotEquals,
            "greaterthan" | "gt" => MatchMode::GreaterThan,
            "greaterorequal" | "greaterthanorequal" | "gte" | "ge" => MatchMode::GreaterOrEqual,
            "lessthan" | "lt" => MatchMode::LessThan,
            "lessorequal" | "lessthanorequal" | "lte" | "le" => MatchMode::LessOrEqual,
            "dateis" => MatchMode::DateIs,
            "dateisnot" => MatchMode::DateIsNot,
            "dateafter" => MatchMode::DateAfter,
            "datebefore" => MatchMode::DateBefore,
            _ => return Err(Error::UnknownMatchMode(s.to_string())),
        })
    }
}

impl Serialize for MatchMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One predicate request for a single column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterField {
    #[serde(default)]
    pub value: DynamicValue,
    pub match_mode: MatchMode,
}

impl FilterField {
    pub fn new(match_mode: MatchMode, value: impl Into<DynamicValue>) -> Self {
        Self {
            value: value.into(),
            match_mode,
        }
    }
}
