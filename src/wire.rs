use std::fmt::Debug;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use futures::Sink;
use pgwire::api::auth::cleartext::CleartextPasswordAuthStartupHandler;
use pgwire::api::auth::{DefaultServerParameterProvider, StartupHandler};
use pgwire::api::copy::CopyHandler;
use pgwire::api::portal::{Format, Portal};
use pgwire::api::query::{ExtendedQueryHandler, SimpleQueryHandler};
use pgwire::api::results::{
    DataRowEncoder, DescribePortalResponse, DescribeStatementResponse, FieldFormat, FieldInfo,
    QueryResponse, Response, Tag,
};
use pgwire::api::stmt::{QueryParser, StoredStatement};
use pgwire::api::store::PortalStore;
use pgwire::api::{ClientInfo, ClientPortalStore, NoopHandler, PgWireServerHandlers, Type};
use pgwire::error::{ErrorInfo, PgWireError, PgWireResult};
use pgwire::messages::PgWireBackendMessage;
use pgwire::tokio::TlsAcceptor;
use tokio::net::TcpStream;

use crate::auth::VenuedAuthSource;
use crate::engine::Engine;
use crate::model::{fmt_hhmm, Booking, Caller, Role, TimeInterval, Venue};
use crate::observability;
use crate::sql::{self, Command};

pub struct VenuedHandler {
    engine: Arc<Engine>,
    admin_user: String,
    query_parser: Arc<VenuedQueryParser>,
}

impl VenuedHandler {
    pub fn new(engine: Arc<Engine>, admin_user: String) -> Self {
        Self {
            engine,
            admin_user,
            query_parser: Arc::new(VenuedQueryParser),
        }
    }

    /// Caller identity comes from the authenticated session's login user name.
    /// The configured admin user gets the admin role; everyone else is a user.
    fn resolve_caller<C: ClientInfo>(&self, client: &C) -> Caller {
        let user_id = client
            .metadata()
            .get("user")
            .cloned()
            .unwrap_or_else(|| "anonymous".to_string());
        let role = if user_id == self.admin_user {
            Role::Admin
        } else {
            Role::User
        };
        Caller { user_id, role }
    }

    async fn execute_command(
        &self,
        caller: &Caller,
        cmd: Command,
    ) -> PgWireResult<Vec<Response>> {
        let label = observability::command_label(&cmd);
        let start = std::time::Instant::now();
        let result = self.dispatch_command(caller, cmd).await;
        metrics::histogram!(observability::QUERY_DURATION_SECONDS, "command" => label)
            .record(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(observability::QUERIES_TOTAL, "command" => label, "status" => status)
            .increment(1);
        result
    }

    async fn dispatch_command(
        &self,
        caller: &Caller,
        cmd: Command,
    ) -> PgWireResult<Vec<Response>> {
        match cmd {
            Command::InsertVenue {
                id,
                name,
                capacity,
                description,
            } => {
                self.engine
                    .create_venue(id, name, capacity, description, caller)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpdateVenue {
                id,
                name,
                capacity,
                description,
                is_active,
            } => {
                // Partial SET merges over the current row.
                let current = self.engine.get_venue(id).map_err(engine_err)?;
                self.engine
                    .update_venue(
                        id,
                        name.unwrap_or(current.name),
                        capacity.unwrap_or(current.capacity),
                        description.unwrap_or(current.description),
                        is_active.unwrap_or(current.is_active),
                        caller,
                    )
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("UPDATE").with_rows(1))])
            }
            Command::DeleteVenue { id } => {
                self.engine
                    .delete_venue(id, caller)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("DELETE").with_rows(1))])
            }
            Command::SelectVenues => {
                let venues = self.engine.list_venues();
                Ok(vec![venue_rows(venues)?])
            }
            Command::InsertBooking {
                id,
                venue_id,
                date,
                start,
                end,
            } => {
                let interval = TimeInterval { start, end };
                self.engine
                    .create_booking(id, venue_id, date, interval, caller)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpdateBookingStatus { id, status } => {
                self.engine
                    .set_booking_status(id, status, caller)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("UPDATE").with_rows(1))])
            }
            Command::DeleteBooking { id } => {
                self.engine
                    .remove_booking(id, caller)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![Response::Execution(Tag::new("DELETE").with_rows(1))])
            }
            Command::SelectBookings { id, venue_id, date } => {
                let bookings = match id {
                    Some(id) => {
                        vec![self.engine.get_booking(id, caller).await.map_err(engine_err)?]
                    }
                    None => self.engine.list_bookings(caller, venue_id, date).await,
                };
                Ok(vec![booking_rows(bookings)?])
            }
            Command::SelectAvailability {
                venue_id,
                date,
                time,
            } => {
                let slots = match time {
                    Some(start) => self
                        .engine
                        .check_slot(venue_id, date, start)
                        .await
                        .map_err(engine_err)?
                        .into_iter()
                        .collect(),
                    None => self
                        .engine
                        .free_slots_for(venue_id, date)
                        .await
                        .map_err(engine_err)?,
                };

                let schema = Arc::new(availability_schema());
                let venue_str = venue_id.to_string();
                let date_str = date.format("%Y-%m-%d").to_string();
                let rows: Vec<PgWireResult<_>> = slots
                    .into_iter()
                    .map(|slot| {
                        let mut encoder = DataRowEncoder::new(schema.clone());
                        encoder.encode_field(&venue_str)?;
                        encoder.encode_field(&date_str)?;
                        encoder.encode_field(&fmt_hhmm(slot.start))?;
                        encoder.encode_field(&fmt_hhmm(slot.end))?;
                        Ok(encoder.take_row())
                    })
                    .collect();

                Ok(vec![Response::Query(QueryResponse::new(
                    schema,
                    stream::iter(rows),
                ))])
            }
        }
    }
}

// ── Result schemas ───────────────────────────────────────────────

fn text_field(name: &str) -> FieldInfo {
    FieldInfo::new(name.into(), None, None, Type::VARCHAR, FieldFormat::Text)
}

fn venues_schema() -> Vec<FieldInfo> {
    vec![
        text_field("id"),
        text_field("name"),
        FieldInfo::new("capacity".into(), None, None, Type::INT4, FieldFormat::Text),
        text_field("description"),
        FieldInfo::new("is_active".into(), None, None, Type::BOOL, FieldFormat::Text),
    ]
}

fn bookings_schema() -> Vec<FieldInfo> {
    vec![
        text_field("id"),
        text_field("venue_id"),
        text_field("user_id"),
        text_field("date"),
        text_field("start_time"),
        text_field("end_time"),
        text_field("status"),
    ]
}

fn availability_schema() -> Vec<FieldInfo> {
    vec![
        text_field("venue_id"),
        text_field("date"),
        text_field("start_time"),
        text_field("end_time"),
    ]
}

fn venue_rows(venues: Vec<Venue>) -> PgWireResult<Response> {
    let schema = Arc::new(venues_schema());
    let rows: Vec<PgWireResult<_>> = venues
        .into_iter()
        .map(|venue| {
            let mut encoder = DataRowEncoder::new(schema.clone());
            encoder.encode_field(&venue.id.to_string())?;
            encoder.encode_field(&venue.name)?;
            encoder.encode_field(&(venue.capacity as i32))?;
            encoder.encode_field(&venue.description)?;
            encoder.encode_field(&venue.is_active)?;
            Ok(encoder.take_row())
        })
        .collect();
    Ok(Response::Query(QueryResponse::new(
        schema,
        stream::iter(rows),
    )))
}

fn booking_rows(bookings: Vec<Booking>) -> PgWireResult<Response> {
    let schema = Arc::new(bookings_schema());
    let rows: Vec<PgWireResult<_>> = bookings
        .into_iter()
        .map(|booking| {
            let mut encoder = DataRowEncoder::new(schema.clone());
            encoder.encode_field(&booking.id.to_string())?;
            encoder.encode_field(&booking.venue_id.to_string())?;
            encoder.encode_field(&booking.user_id)?;
            encoder.encode_field(&booking.date.format("%Y-%m-%d").to_string())?;
            encoder.encode_field(&fmt_hhmm(booking.interval.start))?;
            encoder.encode_field(&fmt_hhmm(booking.interval.end))?;
            encoder.encode_field(&booking.status.to_string())?;
            Ok(encoder.take_row())
        })
        .collect();
    Ok(Response::Query(QueryResponse::new(
        schema,
        stream::iter(rows),
    )))
}

#[async_trait]
impl SimpleQueryHandler for VenuedHandler {
    async fn do_query<C>(&self, client: &mut C, query: &str) -> PgWireResult<Vec<Response>>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let caller = self.resolve_caller(client);
        let cmd = sql::parse_sql(query).map_err(sql_err)?;
        self.execute_command(&caller, cmd).await
    }
}

// ── Extended Query Protocol ──────────────────────────────────────

#[derive(Debug)]
pub struct VenuedQueryParser;

#[async_trait]
impl QueryParser for VenuedQueryParser {
    type Statement = String;

    async fn parse_sql<C>(
        &self,
        _client: &C,
        sql: &str,
        _types: &[Option<Type>],
    ) -> PgWireResult<String>
    where
        C: ClientInfo + Unpin + Send + Sync,
    {
        Ok(sql.to_string())
    }

    fn get_parameter_types(&self, stmt: &String) -> PgWireResult<Vec<Type>> {
        Ok(vec![Type::VARCHAR; count_params(stmt)])
    }

    fn get_result_schema(
        &self,
        stmt: &String,
        _column_format: Option<&Format>,
    ) -> PgWireResult<Vec<FieldInfo>> {
        Ok(select_schema(stmt).unwrap_or_default())
    }
}

/// Result schema for SELECT statements, keyed on the table name in the text.
fn select_schema(stmt: &str) -> Option<Vec<FieldInfo>> {
    let upper = stmt.to_uppercase();
    if !upper.contains("SELECT") {
        return None;
    }
    if upper.contains("AVAILABILITY") {
        Some(availability_schema())
    } else if upper.contains("BOOKINGS") {
        Some(bookings_schema())
    } else if upper.contains("VENUES") {
        Some(venues_schema())
    } else {
        None
    }
}

#[async_trait]
impl ExtendedQueryHandler for VenuedHandler {
    type Statement = String;
    type QueryParser = VenuedQueryParser;

    fn query_parser(&self) -> Arc<Self::QueryParser> {
        self.query_parser.clone()
    }

    async fn do_query<C>(
        &self,
        client: &mut C,
        portal: &Portal<Self::Statement>,
        _max_rows: usize,
    ) -> PgWireResult<Response>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let caller = self.resolve_caller(client);
        let sql = substitute_params(portal);
        let cmd = sql::parse_sql(&sql).map_err(sql_err)?;
        let mut responses = self.execute_command(&caller, cmd).await?;
        Ok(responses.remove(0))
    }

    async fn do_describe_statement<C>(
        &self,
        _client: &mut C,
        target: &StoredStatement<Self::Statement>,
    ) -> PgWireResult<DescribeStatementResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let param_types = vec![Type::VARCHAR; count_params(&target.statement)];
        Ok(DescribeStatementResponse::new(
            param_types,
            select_schema(&target.statement).unwrap_or_default(),
        ))
    }

    async fn do_describe_portal<C>(
        &self,
        _client: &mut C,
        target: &Portal<Self::Statement>,
    ) -> PgWireResult<DescribePortalResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        Ok(DescribePortalResponse::new(
            select_schema(&target.statement.statement).unwrap_or_default(),
        ))
    }
}

/// Count the highest $N parameter placeholder in the SQL string.
fn count_params(sql: &str) -> usize {
    let mut max = 0usize;
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i > start {
                if let Ok(n) = sql[start..i].parse::<usize>() {
                    if n > max {
                        max = n;
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    max
}

/// Substitute $1, $2, ... placeholders with bound parameter values (text format).
fn substitute_params(portal: &Portal<String>) -> String {
    let sql = portal.statement.statement.to_string();
    let params = &portal.parameters;
    let mut result = sql;

    for (i, param) in params.iter().enumerate().rev() {
        let placeholder = format!("${}", i + 1);
        let value = match param {
            Some(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                format!("'{}'", text.replace('\'', "''"))
            }
            None => "NULL".to_string(),
        };
        result = result.replace(&placeholder, &value);
    }

    result
}

// ── Factory ──────────────────────────────────────────────────────

pub struct VenuedFactory {
    handler: Arc<VenuedHandler>,
    auth_handler:
        Arc<CleartextPasswordAuthStartupHandler<VenuedAuthSource, DefaultServerParameterProvider>>,
    noop: Arc<NoopHandler>,
}

impl VenuedFactory {
    pub fn new(engine: Arc<Engine>, secret: String, admin_user: String) -> Self {
        let auth_source = VenuedAuthSource::new(secret);
        let param_provider = DefaultServerParameterProvider::default();
        Self {
            handler: Arc::new(VenuedHandler::new(engine, admin_user)),
            auth_handler: Arc::new(CleartextPasswordAuthStartupHandler::new(
                auth_source,
                param_provider,
            )),
            noop: Arc::new(NoopHandler),
        }
    }
}

impl PgWireServerHandlers for VenuedFactory {
    fn simple_query_handler(&self) -> Arc<impl SimpleQueryHandler> {
        self.handler.clone()
    }

    fn extended_query_handler(&self) -> Arc<impl ExtendedQueryHandler> {
        self.handler.clone()
    }

    fn startup_handler(&self) -> Arc<impl StartupHandler> {
        self.auth_handler.clone()
    }

    fn copy_handler(&self) -> Arc<impl CopyHandler> {
        self.noop.clone()
    }
}

/// Serve one client connection until it closes.
pub async fn process_connection(
    socket: TcpStream,
    engine: Arc<Engine>,
    secret: String,
    admin_user: String,
    tls: Option<TlsAcceptor>,
) -> Result<(), io::Error> {
    let factory = VenuedFactory::new(engine, secret, admin_user);
    pgwire::tokio::process_socket(socket, tls, factory).await
}

/// Stable SQLSTATE per error kind so clients can tell "pick another slot"
/// from "you're not allowed" from "that doesn't exist".
fn engine_err(e: crate::engine::EngineError) -> PgWireError {
    use crate::engine::EngineError::*;
    let code = match &e {
        Validation(_) | InvalidTransition { .. } => "22023",
        NotFound(_) => "P0002",
        Conflict(_) => "23P01",
        Permission(_) => "42501",
        AlreadyExists(_) => "23505",
        HasActiveBookings(_) => "55006",
        LimitExceeded(_) => "54000",
        WalError(_) => "58030",
    };
    PgWireError::UserError(Box::new(ErrorInfo::new(
        "ERROR".into(),
        code.into(),
        e.to_string(),
    )))
}

fn sql_err(e: crate::sql::SqlError) -> PgWireError {
    PgWireError::UserError(Box::new(ErrorInfo::new(
        "ERROR".into(),
        "42601".into(),
        e.to_string(),
    )))
}
