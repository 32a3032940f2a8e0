use chrono::NaiveDate;
use sqlparser::ast::{
    self, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor, TableObject, Value,
    ValueWithSpan,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use ulid::Ulid;

use crate::model::{parse_hhmm, BookingStatus, Minute};

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    InsertVenue {
        id: Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
    },
    UpdateVenue {
        id: Ulid,
        name: Option<String>,
        capacity: Option<u32>,
        /// Outer None: not assigned; Some(None): SET description = NULL.
        description: Option<Option<String>>,
        is_active: Option<bool>,
    },
    DeleteVenue {
        id: Ulid,
    },
    SelectVenues,
    InsertBooking {
        id: Ulid,
        venue_id: Ulid,
        date: NaiveDate,
        start: Minute,
        end: Minute,
    },
    UpdateBookingStatus {
        id: Ulid,
        status: BookingStatus,
    },
    DeleteBooking {
        id: Ulid,
    },
    SelectBookings {
        id: Option<Ulid>,
        venue_id: Option<Ulid>,
        date: Option<NaiveDate>,
    },
    SelectAvailability {
        venue_id: Ulid,
        date: NaiveDate,
        time: Option<Minute>,
    },
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    let dialect = PostgreSqlDialect {};
    let stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    if stmts.is_empty() {
        return Err(SqlError::Empty);
    }

    match &stmts[0] {
        Statement::Insert(insert) => parse_insert(insert),
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => parse_update(table, assignments, selection),
        Statement::Delete(delete) => parse_delete(delete),
        Statement::Query(query) => parse_select(query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    let values = extract_insert_values(insert)?;

    match table.as_str() {
        "venues" => {
            if values.len() < 2 {
                return Err(SqlError::WrongArity("venues", 2, values.len()));
            }
            let id = parse_ulid(&values[0])?;
            let name = parse_string(&values[1])?;
            let capacity = if values.len() >= 3 {
                parse_u32(&values[2])?
            } else {
                1
            };
            let description = if values.len() >= 4 {
                parse_string_or_null(&values[3])?
            } else {
                None
            };
            Ok(Command::InsertVenue {
                id,
                name,
                capacity,
                description,
            })
        }
        "bookings" => {
            if values.len() < 5 {
                return Err(SqlError::WrongArity("bookings", 5, values.len()));
            }
            Ok(Command::InsertBooking {
                id: parse_ulid(&values[0])?,
                venue_id: parse_ulid(&values[1])?,
                date: parse_date(&values[2])?,
                start: parse_time(&values[3])?,
                end: parse_time(&values[4])?,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_update(
    table: &ast::TableWithJoins,
    assignments: &[ast::Assignment],
    selection: &Option<Expr>,
) -> Result<Command, SqlError> {
    let table = table_factor_name(&table.relation)?;
    let id = extract_where_id(selection)?;

    match table.as_str() {
        "bookings" => {
            // Status is the only mutable booking field.
            if assignments.len() != 1 {
                return Err(SqlError::Unsupported(
                    "bookings UPDATE takes exactly one SET status assignment".into(),
                ));
            }
            let a = &assignments[0];
            if assignment_column(a).as_deref() != Some("status") {
                return Err(SqlError::Unsupported(
                    "only the status column of bookings is updatable".into(),
                ));
            }
            let raw = parse_string(&a.value)?;
            let status = BookingStatus::parse(&raw)
                .ok_or_else(|| SqlError::Parse(format!("bad status: {raw}")))?;
            Ok(Command::UpdateBookingStatus { id, status })
        }
        "venues" => {
            let mut name = None;
            let mut capacity = None;
            let mut description = None;
            let mut is_active = None;
            for a in assignments {
                match assignment_column(a).as_deref() {
                    Some("name") => name = Some(parse_string(&a.value)?),
                    Some("capacity") => capacity = Some(parse_u32(&a.value)?),
                    Some("description") => description = Some(parse_string_or_null(&a.value)?),
                    Some("is_active") => is_active = Some(parse_bool(&a.value)?),
                    Some(other) => {
                        return Err(SqlError::Unsupported(format!(
                            "unknown venues column: {other}"
                        )));
                    }
                    None => return Err(SqlError::Parse("bad assignment target".into())),
                }
            }
            Ok(Command::UpdateVenue {
                id,
                name,
                capacity,
                description,
                is_active,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    let id = extract_where_id(&delete.selection)?;

    match table.as_str() {
        "venues" => Ok(Command::DeleteVenue { id }),
        "bookings" => Ok(Command::DeleteBooking { id }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };

    if select.from.is_empty() {
        return Err(SqlError::Parse("SELECT without FROM".into()));
    }
    let table = table_factor_name(&select.from[0].relation)?;

    match table.as_str() {
        "venues" => Ok(Command::SelectVenues),
        "bookings" => {
            let mut filters = BookingFilters::default();
            if let Some(selection) = &select.selection {
                extract_booking_filters(selection, &mut filters)?;
            }
            Ok(Command::SelectBookings {
                id: filters.id,
                venue_id: filters.venue_id,
                date: filters.date,
            })
        }
        "availability" => {
            let mut filters = AvailabilityFilters::default();
            if let Some(selection) = &select.selection {
                extract_availability_filters(selection, &mut filters)?;
            }
            Ok(Command::SelectAvailability {
                venue_id: filters.venue_id.ok_or(SqlError::MissingFilter("venue_id"))?,
                date: filters.date.ok_or(SqlError::MissingFilter("date"))?,
                time: filters.time,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

#[derive(Default)]
struct BookingFilters {
    id: Option<Ulid>,
    venue_id: Option<Ulid>,
    date: Option<NaiveDate>,
}

fn extract_booking_filters(expr: &Expr, filters: &mut BookingFilters) -> Result<(), SqlError> {
    match expr {
        Expr::BinaryOp { left, op, right } => match op {
            ast::BinaryOperator::And => {
                extract_booking_filters(left, filters)?;
                extract_booking_filters(right, filters)?;
            }
            ast::BinaryOperator::Eq => match expr_column_name(left).as_deref() {
                Some("id") => filters.id = Some(parse_ulid(right)?),
                Some("venue_id") => filters.venue_id = Some(parse_ulid(right)?),
                Some("date") => filters.date = Some(parse_date(right)?),
                _ => {}
            },
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

#[derive(Default)]
struct AvailabilityFilters {
    venue_id: Option<Ulid>,
    date: Option<NaiveDate>,
    time: Option<Minute>,
}

fn extract_availability_filters(
    expr: &Expr,
    filters: &mut AvailabilityFilters,
) -> Result<(), SqlError> {
    match expr {
        Expr::BinaryOp { left, op, right } => match op {
            ast::BinaryOperator::And => {
                extract_availability_filters(left, filters)?;
                extract_availability_filters(right, filters)?;
            }
            ast::BinaryOperator::Eq => match expr_column_name(left).as_deref() {
                Some("venue_id") => filters.venue_id = Some(parse_ulid(right)?),
                Some("date") => filters.date = Some(parse_date(right)?),
                Some("time") => filters.time = Some(parse_time(right)?),
                _ => {}
            },
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    if let Some(first) = tables_with_joins.first() {
        table_factor_name(&first.relation)
    } else {
        Err(SqlError::Parse("DELETE without table".into()))
    }
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn assignment_column(a: &ast::Assignment) -> Option<String> {
    match &a.target {
        ast::AssignmentTarget::ColumnName(name) => object_name_last(name),
        _ => None,
    }
}

fn extract_insert_values(insert: &ast::Insert) -> Result<Vec<Expr>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => {
            if values.rows.is_empty() {
                return Err(SqlError::Parse("empty VALUES".into()));
            }
            if values.rows.len() > 1 {
                return Err(SqlError::Unsupported("multi-row INSERT".into()));
            }
            Ok(values.rows[0].clone())
        }
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

fn extract_where_id(selection: &Option<Expr>) -> Result<Ulid, SqlError> {
    let sel = selection.as_ref().ok_or(SqlError::MissingFilter("id"))?;
    match sel {
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } => {
            if expr_column_name(left).as_deref() == Some("id") {
                parse_ulid(right)
            } else {
                Err(SqlError::MissingFilter("id"))
            }
        }
        _ => Err(SqlError::MissingFilter("id")),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

fn extract_value(expr: &Expr) -> Option<&Value> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => Some(value),
        _ => None,
    }
}

fn parse_ulid(expr: &Expr) -> Result<Ulid, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) | Value::Number(s, _) => {
                Ulid::from_string(s).map_err(|e| SqlError::Parse(format!("bad ULID: {e}")))
            }
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_string(expr: &Expr) -> Result<String, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) => Ok(s.clone()),
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_string_or_null(expr: &Expr) -> Result<Option<String>, SqlError> {
    if let Some(Value::Null) = extract_value(expr) {
        return Ok(None);
    }
    parse_string(expr).map(Some)
}

fn parse_date(expr: &Expr) -> Result<NaiveDate, SqlError> {
    let s = parse_string(expr)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| SqlError::Parse(format!("bad date {s:?}: {e}")))
}

fn parse_time(expr: &Expr) -> Result<Minute, SqlError> {
    let s = parse_string(expr)?;
    parse_hhmm(&s).ok_or_else(|| SqlError::Parse(format!("bad time {s:?} (expected HH:MM)")))
}

fn parse_u32(expr: &Expr) -> Result<u32, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Number(s, _) | Value::SingleQuotedString(s) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad u32: {e}"))),
            _ => Err(SqlError::Parse(format!("expected number, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_bool(expr: &Expr) -> Result<bool, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::SingleQuotedString(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(SqlError::Parse(format!("bad bool: {s}"))),
            },
            Value::Number(n, _) => Ok(n != "0"),
            _ => Err(SqlError::Parse(format!("expected bool, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    WrongArity(&'static str, usize, usize),
    MissingFilter(&'static str),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected {expected} values, got {got}")
            }
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
        }
    }
}

impl std::error::Error for SqlError {}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parse_insert_venue_minimal() {
        let sql = format!("INSERT INTO venues (id, name) VALUES ('{ID}', 'Room A')");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertVenue {
                id,
                name,
                capacity,
                description,
            } => {
                assert_eq!(id.to_string(), ID);
                assert_eq!(name, "Room A");
                assert_eq!(capacity, 1);
                assert_eq!(description, None);
            }
            _ => panic!("expected InsertVenue, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_venue_full() {
        let sql = format!(
            "INSERT INTO venues (id, name, capacity, description) VALUES ('{ID}', 'Room A', 12, 'window seat')"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertVenue {
                capacity,
                description,
                ..
            } => {
                assert_eq!(capacity, 12);
                assert_eq!(description.as_deref(), Some("window seat"));
            }
            _ => panic!("expected InsertVenue, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_venue_null_description() {
        let sql = format!(
            "INSERT INTO venues (id, name, capacity, description) VALUES ('{ID}', 'Room A', 12, NULL)"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertVenue { description, .. } => assert_eq!(description, None),
            _ => panic!("expected InsertVenue, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_venue_wrong_arity() {
        let sql = format!("INSERT INTO venues (id) VALUES ('{ID}')");
        assert!(matches!(
            parse_sql(&sql),
            Err(SqlError::WrongArity("venues", 2, 1))
        ));
    }

    #[test]
    fn parse_insert_booking() {
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) VALUES ('{ID}', '{ID}', '2025-06-01', '09:00', '10:30')"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertBooking {
                date, start, end, ..
            } => {
                assert_eq!(date, d("2025-06-01"));
                assert_eq!(start, 540);
                assert_eq!(end, 630);
            }
            _ => panic!("expected InsertBooking, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_booking_unpadded_time() {
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) VALUES ('{ID}', '{ID}', '2025-06-01', '9:00', '10:00')"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertBooking { start, .. } => assert_eq!(start, 540),
            _ => panic!("expected InsertBooking, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_booking_bad_time() {
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) VALUES ('{ID}', '{ID}', '2025-06-01', '9am', '10:00')"
        );
        assert!(matches!(parse_sql(&sql), Err(SqlError::Parse(_))));
    }

    #[test]
    fn parse_insert_booking_bad_date() {
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) VALUES ('{ID}', '{ID}', 'June 1st', '09:00', '10:00')"
        );
        assert!(matches!(parse_sql(&sql), Err(SqlError::Parse(_))));
    }

    #[test]
    fn parse_update_booking_status() {
        let sql = format!("UPDATE bookings SET status = 'confirmed' WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateBookingStatus { id, status } => {
                assert_eq!(id.to_string(), ID);
                assert_eq!(status, BookingStatus::Confirmed);
            }
            _ => panic!("expected UpdateBookingStatus, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_booking_bad_status() {
        let sql = format!("UPDATE bookings SET status = 'done' WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Err(SqlError::Parse(_))));
    }

    #[test]
    fn parse_update_booking_other_column_rejected() {
        let sql = format!("UPDATE bookings SET start_time = '09:00' WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Err(SqlError::Unsupported(_))));
    }

    #[test]
    fn parse_update_booking_requires_id() {
        let sql = "UPDATE bookings SET status = 'confirmed'";
        assert!(matches!(
            parse_sql(sql),
            Err(SqlError::MissingFilter("id"))
        ));
    }

    #[test]
    fn parse_update_venue_partial() {
        let sql = format!("UPDATE venues SET name = 'Room B', is_active = false WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateVenue {
                name,
                capacity,
                description,
                is_active,
                ..
            } => {
                assert_eq!(name.as_deref(), Some("Room B"));
                assert_eq!(capacity, None);
                assert_eq!(description, None);
                assert_eq!(is_active, Some(false));
            }
            _ => panic!("expected UpdateVenue, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_venue_null_description() {
        let sql = format!("UPDATE venues SET description = NULL WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateVenue { description, .. } => assert_eq!(description, Some(None)),
            _ => panic!("expected UpdateVenue, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_delete_venue_and_booking() {
        let sql = format!("DELETE FROM venues WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Ok(Command::DeleteVenue { .. })));

        let sql = format!("DELETE FROM bookings WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Ok(Command::DeleteBooking { .. })));
    }

    #[test]
    fn parse_select_venues() {
        let cmd = parse_sql("SELECT * FROM venues").unwrap();
        assert_eq!(cmd, Command::SelectVenues);
    }

    #[test]
    fn parse_select_bookings_unfiltered() {
        let cmd = parse_sql("SELECT * FROM bookings").unwrap();
        assert_eq!(
            cmd,
            Command::SelectBookings {
                id: None,
                venue_id: None,
                date: None
            }
        );
    }

    #[test]
    fn parse_select_bookings_by_id() {
        let sql = format!("SELECT * FROM bookings WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectBookings { id: Some(id), .. } => assert_eq!(id.to_string(), ID),
            _ => panic!("expected SelectBookings with id, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_bookings_by_venue_and_date() {
        let sql = format!("SELECT * FROM bookings WHERE venue_id = '{ID}' AND date = '2025-06-01'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectBookings {
                venue_id: Some(v),
                date: Some(dt),
                id: None,
            } => {
                assert_eq!(v.to_string(), ID);
                assert_eq!(dt, d("2025-06-01"));
            }
            _ => panic!("expected SelectBookings with filters, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_availability() {
        let sql = format!("SELECT * FROM availability WHERE venue_id = '{ID}' AND date = '2025-06-01'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectAvailability {
                venue_id,
                date,
                time,
            } => {
                assert_eq!(venue_id.to_string(), ID);
                assert_eq!(date, d("2025-06-01"));
                assert_eq!(time, None);
            }
            _ => panic!("expected SelectAvailability, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_availability_with_time() {
        let sql = format!(
            "SELECT * FROM availability WHERE venue_id = '{ID}' AND date = '2025-06-01' AND time = '14:00'"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectAvailability { time, .. } => assert_eq!(time, Some(840)),
            _ => panic!("expected SelectAvailability, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_availability_missing_filters() {
        let sql = format!("SELECT * FROM availability WHERE venue_id = '{ID}'");
        assert!(matches!(
            parse_sql(&sql),
            Err(SqlError::MissingFilter("date"))
        ));
        assert!(matches!(
            parse_sql("SELECT * FROM availability"),
            Err(SqlError::MissingFilter("venue_id"))
        ));
    }

    #[test]
    fn parse_unknown_table_errors() {
        let sql = format!("INSERT INTO rooms (id, name) VALUES ('{ID}', 'x')");
        assert!(matches!(parse_sql(&sql), Err(SqlError::UnknownTable(_))));
    }

    #[test]
    fn parse_multi_row_insert_rejected() {
        let sql = format!(
            "INSERT INTO venues (id, name) VALUES ('{ID}', 'a'), ('{ID}', 'b')"
        );
        assert!(matches!(parse_sql(&sql), Err(SqlError::Unsupported(_))));
    }

    #[test]
    fn parse_empty_errors() {
        assert!(matches!(parse_sql(""), Err(SqlError::Empty)));
    }
}
