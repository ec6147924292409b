use sqlparser::ast::Statement;
use sqlparser::dialect::SnowflakeDialect;
use sqlparser::parser::Parser;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlParserError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("SQL parsing error: {0}")]
    SqlParseError(String),

    #[error("Empty SQL statement")]
    Empty,
}

/// Checks SQL produced by the analyst service before it reaches the catalog
pub struct SqlParser {
    dialect: SnowflakeDialect,
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlParser {
    pub fn new() -> Self {
        SqlParser {
            dialect: SnowflakeDialect {},
        }
    }

    pub fn parse(&self, query: &str) -> Result<Vec<Statement>, SqlParserError> {
        Parser::parse_sql(&self.dialect, query)
            .map_err(|e| SqlParserError::SqlParseError(e.to_string()))
    }

    /// Accept only read-only queries, returning the statement text unchanged
    pub fn validate_read_only<'a>(&self, query: &'a str) -> Result<&'a str, SqlParserError> {
        let statements = self.parse(query)?;
        if statements.is_empty() {
            return Err(SqlParserError::Empty);
        }

        for statement in &statements {
            if !matches!(statement, Statement::Query(_)) {
                return Err(SqlParserError::PermissionDenied(
                    "Only read-only SQL statements are allowed".to_string(),
                ));
            }
        }
        Ok(query)
    }
}

#[cfg(test)]
mod test {
    use super::SqlParser;
    use rstest::*;

    #[fixture]
    fn sql_parser_fixture() -> SqlParser {
        SqlParser::new()
    }

    #[rstest]
    #[case::simple_query("SELECT region, SUM(amount) FROM demo.public.orders GROUP BY region")]
    #[case::with_comment(
        "-- Generated by Cortex Analyst\nSELECT DATE_TRUNC('MONTH', order_date) AS order_month, SUM(revenue) FROM daily_revenue GROUP BY order_month ORDER BY order_month"
    )]
    #[case::query_with_cte(
        "WITH __daily_revenue AS (SELECT order_date, revenue FROM demo.public.daily_revenue) SELECT MAX(revenue) FROM __daily_revenue;"
    )]
    #[case::test_union("SELECT 1 AS a UNION ALL SELECT 2 AS a")]
    fn test_accept_read_only(sql_parser_fixture: SqlParser, #[case] query: &str) {
        assert_eq!(sql_parser_fixture.validate_read_only(query).unwrap(), query);
    }

    #[rstest]
    #[case::simple_update("UPDATE employees SET salary = 60000 WHERE employee_id = 101;")]
    #[case::delete("DELETE FROM orders WHERE order_id = 1234;")]
    #[case::drop("DROP TABLE orders;")]
    #[case::insert("INSERT INTO orders (id) VALUES (1);")]
    #[case::smuggled_after_select("SELECT 1; DROP TABLE orders;")]
    fn test_reject_modify_function(sql_parser_fixture: SqlParser, #[case] query: &str) {
        assert!(sql_parser_fixture.validate_read_only(query).is_err());
    }

    #[rstest]
    #[case::garbage("SELEC FROM")]
    #[case::empty("")]
    fn test_reject_unparseable(sql_parser_fixture: SqlParser, #[case] query: &str) {
        assert!(sql_parser_fixture.validate_read_only(query).is_err());
    }
}
