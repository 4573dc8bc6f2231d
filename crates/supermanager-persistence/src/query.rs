//! Declarative filtering, ordering and paging on top of `Select<E>`

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::sea_query::{Asterisk, Expr, Func, LikeExpr};
use sea_orm::*;

use supermanager_common::FieldErrors;

use crate::model::{OrderingTerm, Page, PageRequest};

/// How a query parameter is parsed and compared against its column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact string match
    Text,
    Integer,
    Boolean,
    Float,
    DateTime,
    Date,
    /// Case-insensitive substring match
    IContains,
}

/// A query parameter bound to a column
#[derive(Clone, Copy, Debug)]
pub struct FilterField<C> {
    pub param: &'static str,
    pub column: C,
    pub kind: FilterKind,
}

impl<C> FilterField<C> {
    pub const fn new(param: &'static str, column: C, kind: FilterKind) -> Self {
        Self {
            param,
            column,
            kind,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    DateTime::parse_from_rfc3339(value)
        .map(|v| v.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|v| v.and_utc())
        })
}

const LIKE_ESCAPE: char = '!';

/// Makes `%`, `_` and the escape character match literally inside a LIKE pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Builds an AND condition from every declared field present in `params`.
///
/// Blank values are ignored. A value that cannot be parsed for its kind is
/// reported against the parameter name.
pub fn filter_condition<C: ColumnTrait>(
    params: &HashMap<String, String>,
    fields: &[FilterField<C>],
) -> Result<Condition, FieldErrors> {
    let mut condition = Condition::all();
    let mut errors = FieldErrors::new();

    for field in fields {
        let Some(raw) = params.get(field.param) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }

        let column = field.column;
        let expr = match field.kind {
            FilterKind::Text => Some(column.eq(raw.as_str())),
            FilterKind::Integer => raw.trim().parse::<i64>().ok().map(|v| column.eq(v)),
            FilterKind::Boolean => parse_bool(raw).map(|v| column.eq(v)),
            FilterKind::Float => raw.trim().parse::<f64>().ok().map(|v| column.eq(v)),
            FilterKind::DateTime => parse_datetime(raw).map(|v| column.eq(v)),
            FilterKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(|v| column.eq(v)),
            FilterKind::IContains => Some(
                Expr::expr(Func::lower(Expr::col((column.entity_name(), column)))).like(
                    LikeExpr::new(format!("%{}%", escape_like(&raw.to_lowercase())))
                        .escape(LIKE_ESCAPE),
                ),
            ),
        };

        match expr {
            Some(expr) => condition = condition.add(expr),
            None => errors.add(field.param, invalid_filter_message(field.kind)),
        }
    }

    if errors.is_empty() {
        Ok(condition)
    } else {
        Err(errors)
    }
}

fn invalid_filter_message(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Integer => "Enter a whole number.",
        FilterKind::Float => "Enter a number.",
        FilterKind::Boolean => "Select a valid choice.",
        FilterKind::DateTime => "Enter a valid date/time.",
        FilterKind::Date => "Enter a valid date.",
        FilterKind::Text | FilterKind::IContains => "Enter a valid value.",
    }
}

/// Resolves `ordering` terms against the allowed columns; unknown names are
/// dropped. `tiebreak` is appended ascending so paging is stable.
pub fn resolve_ordering<C: ColumnTrait>(
    terms: &[OrderingTerm],
    fields: &[FilterField<C>],
    tiebreak: C,
) -> Vec<(C, Order)> {
    let mut resolved = terms
        .iter()
        .filter_map(|term| {
            fields
                .iter()
                .find(|f| f.param == term.field)
                .map(|f| (f.column, if term.descending { Order::Desc } else { Order::Asc }))
        })
        .collect::<Vec<(C, Order)>>();

    resolved.push((tiebreak, Order::Asc));
    resolved
}

pub async fn count<E, C>(db: &C, select: Select<E>) -> anyhow::Result<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let total = select
        .select_only()
        .column_as(Expr::col(Asterisk).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default();

    Ok(total as u64)
}

/// Counts the filtered rows, then fetches one ordered window of them.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    ordering: Vec<(E::Column, Order)>,
    request: PageRequest,
) -> anyhow::Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let total_count = count(db, select.clone()).await?;

    if total_count == 0 || request.offset >= total_count {
        return Ok(Page::new(total_count, request, Vec::new()));
    }

    let mut query = select;
    for (column, order) in ordering {
        query = query.order_by(column, order);
    }

    let results = query
        .offset(request.offset)
        .limit(request.limit)
        .all(db)
        .await?;

    Ok(Page::new(total_count, request, results))
}
