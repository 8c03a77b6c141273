use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::filters::Predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Rows in the group.
    Count,
    /// Distinct non-null values of a column, e.g. owning property ids.
    CountDistinct(&'static str),
    Sum(&'static str),
    /// `sum / count` in floating point, unrounded.
    Avg(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Measure {
    pub kind: MeasureKind,
    pub alias: &'static str,
}

impl Measure {
    pub const fn new(kind: MeasureKind, alias: &'static str) -> Self {
        Self { kind, alias }
    }

    fn expression(&self) -> String {
        match self.kind {
            MeasureKind::Count => "COUNT(*)".to_string(),
            MeasureKind::CountDistinct(column) => format!("COUNT(DISTINCT {column})"),
            MeasureKind::Sum(column) => format!("CAST(COALESCE(SUM({column}), 0) AS REAL)"),
            MeasureKind::Avg(column) => format!("CAST(AVG({column}) AS REAL)"),
        }
    }

    fn decode(&self, row: &SqliteRow) -> Result<AggregateValue, sqlx::Error> {
        match self.kind {
            MeasureKind::Count | MeasureKind::CountDistinct(_) => {
                row.try_get::<i64, _>(self.alias).map(AggregateValue::Integer)
            }
            MeasureKind::Sum(_) | MeasureKind::Avg(_) => row
                .try_get::<Option<f64>, _>(self.alias)
                .map(|v| AggregateValue::Real(v.unwrap_or(0.0))),
        }
    }
}

/// Grouped aggregate over one table. Ordering is ascending by the group keys
/// in declaration order and cannot be changed by callers.
#[derive(Debug, Clone, Copy)]
pub struct AggregateSpec {
    pub table: &'static str,
    pub group_by: &'static [&'static str],
    pub measures: &'static [Measure],
}

impl AggregateSpec {
    pub fn query<'args>(&self, scope: &Predicate) -> QueryBuilder<'args, Sqlite> {
        let mut columns: Vec<String> = self.group_by.iter().map(|c| c.to_string()).collect();
        columns.extend(
            self.measures
                .iter()
                .map(|m| format!("{} AS {}", m.expression(), m.alias)),
        );

        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE 1=1",
            columns.join(", "),
            self.table
        ));
        scope.push_sql(&mut qb);

        let keys = self.group_by.join(", ");
        let order: Vec<String> = self.group_by.iter().map(|c| format!("{c} ASC")).collect();
        qb.push(format!(" GROUP BY {keys} ORDER BY {}", order.join(", ")));
        qb
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateValue {
    Integer(i64),
    Real(f64),
}

impl AggregateValue {
    pub fn as_i64(&self) -> i64 {
        match *self {
            AggregateValue::Integer(v) => v,
            AggregateValue::Real(v) => v.round() as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            AggregateValue::Integer(v) => v as f64,
            AggregateValue::Real(v) => v,
        }
    }
}

/// One output row: group key values plus named measures.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub key: Vec<String>,
    pub values: Vec<(&'static str, AggregateValue)>,
}

impl GroupResult {
    pub fn key(&self, index: usize) -> &str {
        self.key.get(index).map(String::as_str).unwrap_or_default()
    }

    /// Measure by alias. Asking for an alias the spec never declared is a bug.
    pub fn value(&self, alias: &str) -> AppResult<AggregateValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, value)| *value)
            .ok_or_else(|| AppError::internal(format!("aggregate has no measure named {alias}")))
    }
}

/// Runs `spec` restricted to `scope`. No matching rows yields an empty vec.
pub async fn aggregate(
    pool: &SqlitePool,
    spec: &AggregateSpec,
    scope: &Predicate,
) -> AppResult<Vec<GroupResult>> {
    let mut qb = spec.query(scope);
    let rows = qb.build().fetch_all(pool).await?;

    let mut groups = Vec::with_capacity(rows.len());
    for row in &rows {
        let key = spec
            .group_by
            .iter()
            .map(|column| row.try_get::<Option<String>, _>(*column).map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>, _>>()?;
        let values = spec
            .measures
            .iter()
            .map(|m| m.decode(row).map(|v| (m.alias, v)))
            .collect::<Result<Vec<_>, _>>()?;
        groups.push(GroupResult { key, values });
    }

    tracing::debug!(table = spec.table, groups = groups.len(), "aggregate computed");
    Ok(groups)
}
