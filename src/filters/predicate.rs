use sqlx::{QueryBuilder, Sqlite};

/// Coerced right-hand side of an exact-match predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

/// Query predicate composed from a filter request.
///
/// Column names always come from the registry, never from the request; only
/// values are bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match.
    Contains { column: &'static str, needle: String },
    Equals { column: &'static str, value: FilterValue },
    /// Calendar-day match on a timestamp column (`YYYY-MM-DD`).
    SameDay { column: &'static str, day: String },
    /// `column` references a row of `parent_table` whose `parent_column` equals `value`.
    Related {
        column: &'static str,
        parent_table: &'static str,
        parent_column: &'static str,
        value: i64,
    },
    /// Conjunction; empty is the identity predicate.
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn identity() -> Self {
        Predicate::All(Vec::new())
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(Predicate::is_identity),
            _ => false,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::All(mut parts) => {
                parts.push(other);
                Predicate::All(parts)
            }
            single => Predicate::All(vec![single, other]),
        }
    }

    /// Appends ` AND <fragment>` for every leaf, left to right.
    ///
    /// The builder must already hold a `WHERE` clause (`WHERE 1=1` works).
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        match self {
            Predicate::Contains { column, needle } => {
                qb.push(format!(" AND instr({column}, "));
                qb.push_bind(needle.clone());
                qb.push(") > 0");
            }
            Predicate::Equals { column, value } => {
                qb.push(format!(" AND {column} = "));
                match value {
                    FilterValue::Text(text) => qb.push_bind(text.clone()),
                    FilterValue::Integer(int) => qb.push_bind(*int),
                    FilterValue::Real(real) => qb.push_bind(*real),
                };
            }
            Predicate::SameDay { column, day } => {
                qb.push(format!(" AND date({column}) = "));
                qb.push_bind(day.clone());
            }
            Predicate::Related {
                column,
                parent_table,
                parent_column,
                value,
            } => {
                qb.push(format!(
                    " AND {column} IN (SELECT id FROM {parent_table} WHERE {parent_column} = "
                ));
                qb.push_bind(*value);
                qb.push(")");
            }
            Predicate::All(parts) => {
                for part in parts {
                    part.push_sql(qb);
                }
            }
        }
    }
}
