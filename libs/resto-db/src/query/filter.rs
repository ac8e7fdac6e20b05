//! Filter compiler: `FilterField` → `sea_orm::Condition`.
//!
//! Unknown properties are a hard error ([`QueryError::PropertyNotFound`]).
//! A value that cannot be coerced to the column's kind, or a match mode that
//! does not apply to it (`contains` on a number, `dateIs` on a string), only
//! drops that one filter; the rest of the query is unchanged.

use chrono::{Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use query_core::{DynamicValue, FilterField, FilterMap, MatchMode};
use sea_orm::{
    sea_query::{LikeExpr, SimpleExpr},
    ColumnTrait, Condition, EntityTrait, IdenStatic,
};

use super::fields::{Field, FieldKind, FieldMap};
use super::QueryError;

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}
fn like_contains(s: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", like_escape(s))).escape('\\')
}
fn like_starts(s: &str) -> LikeExpr {
    LikeExpr::new(format!("{}%", like_escape(s))).escape('\\')
}
fn like_ends(s: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}", like_escape(s))).escape('\\')
}

/* ---------- coercion ---------- */

/// Convert a filter operand into a value of the column's kind.
fn coerce(kind: FieldKind, v: &DynamicValue) -> Option<sea_orm::Value> {
    Some(match kind {
        FieldKind::String => v.as_text()?.into(),
        FieldKind::I64 => v.as_i64()?.into(),
        FieldKind::F64 => v.as_f64()?.into(),
        FieldKind::Decimal => v.as_decimal()?.into(),
        FieldKind::Bool => v.as_bool()?.into(),
        FieldKind::Uuid => v.as_uuid()?.into(),
        FieldKind::Date => v.as_date()?.into(),
        // timestamp columns are only ever compared against day boundaries
        FieldKind::DateTime | FieldKind::DateTimeUtc => return None,
    })
}

/// Start of `day` expressed in the column's timestamp representation.
fn day_start(kind: FieldKind, day: NaiveDate) -> Option<sea_orm::Value> {
    let midnight: NaiveDateTime = day.and_hms_opt(0, 0, 0)?;
    match kind {
        FieldKind::DateTime => Some(midnight.into()),
        FieldKind::DateTimeUtc => Some(Utc.from_utc_datetime(&midnight).into()),
        _ => None,
    }
}

/* ---------- per-kind predicate builders ---------- */

fn string_predicate<C: ColumnTrait>(col: C, mode: MatchMode, v: &DynamicValue) -> Option<SimpleExpr> {
    let s = v.as_text()?;
    Some(match mode {
        MatchMode::Contains => col.like(like_contains(&s)),
        MatchMode::NotContains => col.not_like(like_contains(&s)),
        MatchMode::StartsWith => col.like(like_starts(&s)),
        MatchMode::EndsWith => col.like(like_ends(&s)),
        MatchMode::Equals => col.eq(s),
        MatchMode::NotEquals => col.ne(s),
        MatchMode::GreaterThan => col.gt(s),
        MatchMode::GreaterOrEqual => col.gte(s),
        MatchMode::LessThan => col.lt(s),
        MatchMode::LessOrEqual => col.lte(s),
        _ => return None,
    })
}

/// Ordered scalars (numbers, dates). Equality-only kinds reject ordering modes.
fn scalar_predicate<C: ColumnTrait>(
    col: C,
    kind: FieldKind,
    mode: MatchMode,
    v: &DynamicValue,
) -> Option<SimpleExpr> {
    let ordered = !matches!(kind, FieldKind::Bool | FieldKind::Uuid);
    let date_modes = kind == FieldKind::Date;
    if mode.is_text() || (mode.is_date() && !date_modes) {
        return None;
    }
    let value = coerce(kind, v)?;
    Some(match mode {
        MatchMode::Equals | MatchMode::DateIs => col.eq(value),
        MatchMode::NotEquals | MatchMode::DateIsNot => col.ne(value),
        MatchMode::GreaterThan | MatchMode::DateAfter if ordered => col.gt(value),
        MatchMode::GreaterOrEqual if ordered => col.gte(value),
        MatchMode::LessThan | MatchMode::DateBefore if ordered => col.lt(value),
        MatchMode::LessOrEqual if ordered => col.lte(value),
        _ => return None,
    })
}

/// Timestamp columns: every mode compares whole days as half-open ranges
/// `[d 00:00, d+1 00:00)`, so the stored time of day never matters.
fn timestamp_predicate<C: ColumnTrait>(
    col: C,
    kind: FieldKind,
    mode: MatchMode,
    v: &DynamicValue,
) -> Option<Condition> {
    if mode.is_text() {
        return None;
    }
    let day = v.as_date()?;
    let lo = day_start(kind, day)?;
    let hi = day_start(kind, day.checked_add_days(Days::new(1))?)?;
    Some(match mode {
        MatchMode::DateIs | MatchMode::Equals => Condition::all().add(col.gte(lo)).add(col.lt(hi)),
        MatchMode::DateIsNot | MatchMode::NotEquals => {
            Condition::any().add(col.lt(lo)).add(col.gte(hi))
        }
        MatchMode::DateAfter | MatchMode::GreaterThan => Condition::all().add(col.gte(hi)),
        MatchMode::GreaterOrEqual => Condition::all().add(col.gte(lo)),
        MatchMode::DateBefore | MatchMode::LessThan => Condition::all().add(col.lt(lo)),
        MatchMode::LessOrEqual => Condition::all().add(col.lt(hi)),
        _ => return None,
    })
}

/* ---------- public API ---------- */

/// Compile one filter against an already resolved field.
///
/// `None` means "no predicate": the operand is absent, cannot be coerced, or
/// the match mode does not apply to the column's kind.
pub fn filter_condition<E: EntityTrait>(field: &Field<E>, filter: &FilterField) -> Option<Condition> {
    if filter.value.is_absent() {
        return None;
    }
    let col = field.col;
    match field.kind {
        FieldKind::String => {
            string_predicate(col, filter.match_mode, &filter.value).map(|e| Condition::all().add(e))
        }
        FieldKind::DateTime | FieldKind::DateTimeUtc => {
            timestamp_predicate(col, field.kind, filter.match_mode, &filter.value)
        }
        kind => scalar_predicate(col, kind, filter.match_mode, &filter.value)
            .map(|e| Condition::all().add(e)),
    }
}

/// AND all filters together. Returns `Ok(None)` when no filter produced a predicate.
pub fn filters_to_condition<E: EntityTrait>(
    fmap: &FieldMap<E>,
    filters: &FilterMap,
) -> Result<Option<Condition>, QueryError> {
    let mut out: Option<Condition> = None;
    for (name, filter) in filters {
        let field = fmap.resolve(name)?;
        match filter_condition(field, filter) {
            Some(c) => {
                tracing::debug!(
                    property = %name,
                    column = field.col.as_str(),
                    mode = %filter.match_mode,
                    "filter applied"
                );
                out = Some(out.unwrap_or_else(Condition::all).add(c));
            }
            None if filter.value.is_absent() => {}
            None => tracing::warn!(
                property = %name,
                kind = ?field.kind,
                mode = %filter.match_mode,
                value_type = filter.value.type_name(),
                "filter skipped: value or match mode not applicable to column"
            ),
        }
    }
    Ok(out)
}

/// OR of `contains(term)` across the searchable fields. Blank terms and maps
/// without searchable fields yield `None`.
pub fn search_condition<E: EntityTrait>(fmap: &FieldMap<E>, term: &str) -> Option<Condition> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut any = Condition::any();
    let mut n = 0usize;
    for field in fmap.search_fields() {
        any = any.add(field.col.like(like_contains(term)));
        n += 1;
    }
    (n > 0).then_some(any)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;
