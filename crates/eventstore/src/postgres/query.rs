use sqlx::{
  postgres::{PgArguments, PgRow},
  query::Query,
  types::Json,
  Postgres, Row,
};

use crate::{
  event::{kind::EventKind, tag::Tag, Event, Timestamp},
  Error, Filter,
};

use super::QueryLimits;

pub(crate) const EVENT_COLUMNS: &str = "id, pubkey, created_at, kind, tags, content, sig";

/// A positional argument of a generated statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryArg {
  Text(String),
  TextArray(Vec<String>),
  IntArray(Vec<i32>),
  BigInt(i64),
}

/// SQL text with its `$n` arguments in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SqlQuery {
  pub sql: String,
  pub args: Vec<QueryArg>,
}

impl SqlQuery {
  pub fn to_query(&self) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&self.sql);
    for arg in self.args.iter().cloned() {
      query = match arg {
        QueryArg::Text(value) => query.bind(value),
        QueryArg::TextArray(values) => query.bind(values),
        QueryArg::IntArray(values) => query.bind(values),
        QueryArg::BigInt(value) => query.bind(value),
      };
    }
    query
  }
}

#[derive(Default)]
struct Conditions {
  clauses: Vec<String>,
  args: Vec<QueryArg>,
}

impl Conditions {
  /// Registers `arg` and returns its placeholder.
  fn arg(&mut self, arg: QueryArg) -> String {
    self.args.push(arg);
    format!("${}", self.args.len())
  }

  fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", self.clauses.join(" AND "))
    }
  }
}

pub(crate) fn kind_to_column(kind: EventKind) -> Result<i32, Error> {
  let kind = kind.as_u64();
  i32::try_from(kind).map_err(|_| Error::KindOutOfRange(kind))
}

pub(crate) fn timestamp_to_column(timestamp: Timestamp) -> Result<i64, Error> {
  i64::try_from(timestamp).map_err(|_| Error::TimestampOutOfRange(timestamp))
}

/// Splits full 64-char hex values from shorter prefixes so exact
/// matches can use `= ANY` and prefixes `LIKE ANY`.
fn prefix_clause(conditions: &mut Conditions, column: &str, values: &[String]) -> String {
  let (exact, prefixes): (Vec<String>, Vec<String>) =
    values.iter().cloned().partition(|value| value.len() == 64);

  let mut alternatives = vec![];
  if !exact.is_empty() {
    let placeholder = conditions.arg(QueryArg::TextArray(exact));
    alternatives.push(format!("{column} = ANY({placeholder})"));
  }
  if !prefixes.is_empty() {
    let patterns = prefixes.into_iter().map(|prefix| format!("{prefix}%")).collect();
    let placeholder = conditions.arg(QueryArg::TextArray(patterns));
    alternatives.push(format!("{column} LIKE ANY({placeholder})"));
  }

  if alternatives.len() == 1 {
    alternatives.remove(0)
  } else {
    format!("({})", alternatives.join(" OR "))
  }
}

/// Returns `None` when the filter can't match anything and no
/// statement needs to run.
fn build_conditions(filter: &Filter, limits: &QueryLimits) -> Result<Option<Conditions>, Error> {
  filter.validate()?;

  if let Some(ids) = &filter.ids {
    if ids.len() > limits.ids {
      return Err(Error::TooManyIds(limits.ids));
    }
  }
  if let Some(authors) = &filter.authors {
    if authors.len() > limits.authors {
      return Err(Error::TooManyAuthors(limits.authors));
    }
  }
  if let Some(kinds) = &filter.kinds {
    if kinds.len() > limits.kinds {
      return Err(Error::TooManyKinds(limits.kinds));
    }
  }
  let tag_values: usize = filter.tags.values().map(Vec::len).sum();
  if tag_values > limits.tags {
    return Err(Error::TooManyTagValues(limits.tags));
  }

  if filter.matches_nothing() {
    return Ok(None);
  }

  let mut conditions = Conditions::default();

  if let Some(ids) = &filter.ids {
    let clause = prefix_clause(&mut conditions, "id", ids);
    conditions.clauses.push(clause);
  }

  if let Some(authors) = &filter.authors {
    let clause = prefix_clause(&mut conditions, "pubkey", authors);
    conditions.clauses.push(clause);
  }

  if let Some(kinds) = &filter.kinds {
    let kinds = kinds
      .iter()
      .map(|kind| kind_to_column(*kind))
      .collect::<Result<Vec<i32>, Error>>()?;
    let placeholder = conditions.arg(QueryArg::IntArray(kinds));
    conditions.clauses.push(format!("kind = ANY({placeholder})"));
  }

  for (name, values) in filter.tag_conditions() {
    let values_placeholder = conditions.arg(QueryArg::TextArray(values.clone()));
    let name_placeholder = conditions.arg(QueryArg::Text(name.to_string()));
    conditions.clauses.push(format!(
      "(tagvalues && {values_placeholder} AND EXISTS (SELECT 1 FROM jsonb_array_elements(tags) AS t WHERE t->>0 = {name_placeholder} AND t->>1 = ANY({values_placeholder})))"
    ));
  }

  if let Some(since) = filter.since {
    let placeholder = conditions.arg(QueryArg::BigInt(timestamp_to_column(since)?));
    conditions.clauses.push(format!("created_at >= {placeholder}"));
  }

  if let Some(until) = filter.until {
    let placeholder = conditions.arg(QueryArg::BigInt(timestamp_to_column(until)?));
    conditions.clauses.push(format!("created_at <= {placeholder}"));
  }

  Ok(Some(conditions))
}

/// Limit applied to a query: the filter's own when it is within
/// `1..=limits.query`, the maximum otherwise.
pub(crate) fn effective_limit(filter: &Filter, limits: &QueryLimits) -> i64 {
  let max = limits.query as u64;
  match filter.limit {
    Some(limit) if (1..=max).contains(&limit) => limit as i64,
    _ => max as i64,
  }
}

pub(crate) fn build_select(filter: &Filter, limits: &QueryLimits) -> Result<Option<SqlQuery>, Error> {
  let Some(mut conditions) = build_conditions(filter, limits)? else {
    return Ok(None);
  };

  let where_clause = conditions.where_clause();
  let limit_placeholder = conditions.arg(QueryArg::BigInt(effective_limit(filter, limits)));

  Ok(Some(SqlQuery {
    sql: format!(
      "SELECT {EVENT_COLUMNS} FROM event{where_clause} ORDER BY created_at DESC, id LIMIT {limit_placeholder}"
    ),
    args: conditions.args,
  }))
}

pub(crate) fn build_count(filter: &Filter, limits: &QueryLimits) -> Result<Option<SqlQuery>, Error> {
  let Some(conditions) = build_conditions(filter, limits)? else {
    return Ok(None);
  };

  Ok(Some(SqlQuery {
    sql: format!("SELECT COUNT(*) FROM event{}", conditions.where_clause()),
    args: conditions.args,
  }))
}

pub(crate) fn event_from_row(row: &PgRow) -> Result<Event, Error> {
  let created_at: i64 = row.try_get("created_at")?;
  let kind: i32 = row.try_get("kind")?;
  let Json(tags): Json<Vec<Tag>> = row.try_get("tags")?;

  Ok(Event {
    id: row.try_get("id")?,
    pubkey: row.try_get("pubkey")?,
    created_at: u64::try_from(created_at).map_err(|_| Error::InvalidData)?,
    kind: EventKind::from(u64::try_from(kind).map_err(|_| Error::InvalidData)?),
    tags,
    content: row.try_get("content")?,
    sig: row.try_get("sig")?,
  })
}
