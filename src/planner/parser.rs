use crate::planner::{
    error::PlannerError,
    logical_plan::{Projection, SelectPlan},
};
use sqlparser::{
    ast::{BinaryOperator, Expr, Ident, Query, Select, SelectItem, SetExpr, Statement, TableFactor, Value as SqlValue},
    dialect::SQLiteDialect,
    parser::Parser,
};

pub const SUPPORTED_QUERIES: &str = "Only SELECT * FROM <table> [LIMIT <n>] and SELECT <cols> FROM <table> WHERE <col> = '<value>' queries are supported";

/// Recognises the two query shapes the reader can answer:
/// `SELECT * FROM t [LIMIT n]` and `SELECT c1, c2 FROM t WHERE col = 'v'`.
pub struct QueryParser;

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_sql(&self, sql: &str) -> Result<SelectPlan, PlannerError> {
        let dialect = SQLiteDialect {};
        let statements = Parser::parse_sql(&dialect, sql)?;

        if statements.len() != 1 {
            return Err(PlannerError::InvalidQuery(
                "Expected exactly one statement".to_string(),
            ));
        }

        match &statements[0] {
            Statement::Query(query) => self.to_plan(query),
            statement => Err(PlannerError::UnsupportedQuery(statement.to_string())),
        }
    }

    fn to_plan(&self, query: &Query) -> Result<SelectPlan, PlannerError> {
        let unsupported = || PlannerError::UnsupportedQuery(query.to_string());

        if query.with.is_some()
            || query.order_by.is_some()
            || query.offset.is_some()
            || query.fetch.is_some()
        {
            return Err(unsupported());
        }
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Err(unsupported());
        };
        if select.distinct.is_some() || select.having.is_some() {
            return Err(unsupported());
        }

        let table_name = Self::table_name(select).ok_or_else(unsupported)?;
        let limit = query.limit.as_ref().map(Self::limit).transpose()?;
        let projection = Self::projection(select).ok_or_else(unsupported)?;

        match (projection, &select.selection) {
            (Projection::All, None) => Ok(SelectPlan::scan_all(table_name, limit)),
            (Projection::Columns(columns), Some(selection)) if limit.is_none() => {
                let (column_name, literal) = Self::equality(selection).ok_or_else(unsupported)?;
                Ok(SelectPlan::filtered(table_name, columns, column_name, literal))
            }
            _ => Err(unsupported()),
        }
    }

    fn table_name(select: &Select) -> Option<String> {
        let [from] = select.from.as_slice() else {
            return None;
        };
        if !from.joins.is_empty() {
            return None;
        }
        match &from.relation {
            TableFactor::Table { name, .. } => name.0.last().map(|ident| ident.value.clone()),
            _ => None,
        }
    }

    fn projection(select: &Select) -> Option<Projection> {
        if let [SelectItem::Wildcard(_)] = select.projection.as_slice() {
            return Some(Projection::All);
        }
        select
            .projection
            .iter()
            .map(|item| match item {
                SelectItem::UnnamedExpr(expr) => Self::column_name(expr),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Projection::Columns)
    }

    fn column_name(expr: &Expr) -> Option<String> {
        match expr {
            Expr::Identifier(ident) if ident.quote_style != Some('\'') => Some(ident.value.clone()),
            Expr::CompoundIdentifier(parts) => parts.last().map(|ident| ident.value.clone()),
            _ => None,
        }
    }

    fn literal(expr: &Expr) -> Option<String> {
        match expr {
            Expr::Value(SqlValue::SingleQuotedString(s))
            | Expr::Value(SqlValue::DoubleQuotedString(s))
            | Expr::Value(SqlValue::Number(s, _)) => Some(s.clone()),
            // SQLite reads "value" as a string when no such column exists.
            Expr::Identifier(Ident {
                value,
                quote_style: Some('"'),
                ..
            }) => Some(value.clone()),
            _ => None,
        }
    }

    fn equality(expr: &Expr) -> Option<(String, String)> {
        match expr {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                let column_name = match left.as_ref() {
                    Expr::Identifier(ident) => ident.value.clone(),
                    _ => return None,
                };
                Some((column_name, Self::literal(right)?))
            }
            Expr::Nested(inner) => Self::equality(inner),
            _ => None,
        }
    }

    fn limit(expr: &Expr) -> Result<usize, PlannerError> {
        match expr {
            Expr::Value(SqlValue::Number(n, _)) => n
                .parse()
                .map_err(|_| PlannerError::InvalidQuery(format!("Invalid LIMIT value: {}", n))),
            other => Err(PlannerError::InvalidQuery(format!(
                "LIMIT must be a non-negative integer, got {}",
                other
            ))),
        }
    }
}
