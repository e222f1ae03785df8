//! Composable listing queries split across the base table and the
//! translation store.

use chrono::{DateTime, Utc};
use jobs_core::{JobField, Locale};

use crate::DbError;

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Value compared against a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
    Time(DateTime<Utc>),
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&Locale> for FilterValue {
    fn from(v: &Locale) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::Time(v)
    }
}

/// One `field op value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: JobField,
    pub op: Comparison,
    pub value: FilterValue,
}

impl Condition {
    fn check_type(&self) -> Result<(), DbError> {
        let matches = match self.field {
            JobField::Draft => matches!(self.value, FilterValue::Bool(_)),
            JobField::PublishedAt | JobField::CreatedAt | JobField::UpdatedAt => {
                matches!(self.value, FilterValue::Time(_))
            }
            _ => matches!(self.value, FilterValue::Text(_)),
        };

        if matches {
            Ok(())
        } else {
            Err(DbError::Query(format!(
                "value {:?} cannot be compared with {}",
                self.value, self.field
            )))
        }
    }
}

/// A listing query.
///
/// Conditions on translated fields (and on `locale`) are evaluated against
/// the translation store; everything else against the base table. The two
/// sides are inner-joined on the listing id, so a listing is only returned
/// when it has a translation row satisfying the translated conditions.
///
/// When no `locale` condition is given, the locale passed at fetch time is
/// used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    base: Vec<Condition>,
    translated: Vec<Condition>,
    order: Option<(JobField, SortDirection)>,
    limit: Option<usize>,
}

/// Rendered SurrealQL with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub bindings: Vec<(String, FilterValue)>,
}

impl JobQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality conditions routed to the side of the join owning each field.
    pub fn with_localized_filter<I, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (JobField, V)>,
        V: Into<FilterValue>,
    {
        conditions
            .into_iter()
            .fold(Self::new(), |query, (field, value)| {
                query.filter(field, Comparison::Eq, value)
            })
    }

    /// Non-draft listings published at or before `as_of`, newest publication first.
    pub fn published_before(as_of: DateTime<Utc>) -> Self {
        Self::new()
            .filter(JobField::Draft, Comparison::Eq, false)
            .filter(JobField::PublishedAt, Comparison::Lte, as_of)
            .order_by(JobField::PublishedAt, SortDirection::Desc)
    }

    /// Add a condition.
    pub fn filter(mut self, field: JobField, op: Comparison, value: impl Into<FilterValue>) -> Self {
        let condition = Condition {
            field,
            op,
            value: value.into(),
        };
        if field.is_translated() {
            self.translated.push(condition);
        } else {
            self.base.push(condition);
        }
        self
    }

    /// Restrict the join to `locale`, replacing any locale condition.
    pub fn in_locale(mut self, locale: &Locale) -> Self {
        self.translated.retain(|c| c.field != JobField::Locale);
        self.filter(JobField::Locale, Comparison::Eq, locale)
    }

    pub fn order_by(mut self, field: JobField, direction: SortDirection) -> Self {
        self.order = Some((field, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn base_conditions(&self) -> &[Condition] {
        &self.base
    }

    pub fn translated_conditions(&self) -> &[Condition] {
        &self.translated
    }

    pub fn ordering(&self) -> Option<(JobField, SortDirection)> {
        self.order
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Whether the caller pinned a locale (or locale range) explicitly.
    pub fn has_locale_condition(&self) -> bool {
        self.translated.iter().any(|c| c.field == JobField::Locale)
    }

    /// Order to apply after the join, when sorting by a translated field.
    pub(crate) fn translated_order(&self) -> Option<(JobField, SortDirection)> {
        self.order.filter(|(field, _)| field.is_translated())
    }

    /// Base-table statement. Ordering by a base field is done by the store.
    pub(crate) fn base_statement(&self, table: &str) -> Result<Statement, DbError> {
        let mut statement = render(table, "b", &self.base)?;

        let (field, direction) = match self.order {
            Some((field, direction)) if !field.is_translated() => (field, direction),
            _ => (JobField::CreatedAt, SortDirection::Desc),
        };
        statement
            .sql
            .push_str(&format!(" ORDER BY {} {}", field.as_str(), direction.as_sql()));

        Ok(statement)
    }

    /// Translation-store statement restricted to the listings bound as `$ids`.
    pub(crate) fn translation_statement(
        &self,
        table: &str,
        default_locale: &Locale,
    ) -> Result<Statement, DbError> {
        let mut conditions = self.translated.clone();
        if !self.has_locale_condition() {
            conditions.push(Condition {
                field: JobField::Locale,
                op: Comparison::Eq,
                value: default_locale.into(),
            });
        }

        // The locale condition guarantees a WHERE clause.
        let mut statement = render(table, "t", &conditions)?;
        statement.sql.push_str(" AND listing IN $ids");
        Ok(statement)
    }
}

fn render(table: &str, prefix: &str, conditions: &[Condition]) -> Result<Statement, DbError> {
    let mut clauses = Vec::with_capacity(conditions.len());
    let mut bindings = Vec::with_capacity(conditions.len());

    for (i, condition) in conditions.iter().enumerate() {
        condition.check_type()?;
        let name = format!("{prefix}{i}");
        // Timestamps are bound as RFC 3339 strings and cast in the statement.
        let cast = match condition.value {
            FilterValue::Time(_) => "<datetime> ",
            _ => "",
        };
        clauses.push(format!(
            "{} {} {cast}${name}",
            condition.field.as_str(),
            condition.op.as_sql()
        ));
        bindings.push((name, condition.value.clone()));
    }

    let mut sql = format!("SELECT * FROM {table}");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    Ok(Statement { sql, bindings })
}
