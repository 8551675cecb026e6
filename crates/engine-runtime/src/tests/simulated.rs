//! An in-memory stand-in for Trino with one Kafka topic and one Iceberg table.
//!
//! It recognises the statements this crate renders and applies them to its
//! own state, including the LIMIT, ordering and anti-join of the append.
//! The event timestamp keeps only milliseconds unless the append parses it
//! with `from_iso8601_timestamp_nanos`, as Trino does.
//! Payloads with a missing field are rejected here, where Trino would write
//! NULL; poison-message tests use values that fail the cast instead.

use async_trait::async_trait;
use chrono::SubsecRound;
use connectors::{
    error::{QueryError, TABLE_NOT_FOUND},
    executor::{QueryExecutor, QueryResult},
};
use model::{
    core::{offset::Watermarks, schema::destination_column_names},
    records::{message::SourceMessage, record::Record},
};
use reqwest::StatusCode;
use serde_json::{Value as JsonValue, json};
use std::{collections::BTreeMap, sync::Mutex, time::Duration};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct TopicMessage {
    pub partition_id: i64,
    pub offset: i64,
    pub payload: String,
}

#[derive(Debug, Default)]
struct State {
    topic: Vec<TopicMessage>,
    table: Option<Vec<Record>>,
    columns: Option<Vec<String>>,
    create_error: Option<&'static str>,
    unreachable: bool,
    fail_reads: bool,
    report_update_count: bool,
    statements: Vec<String>,
    insert_starts: Vec<Instant>,
}

pub struct SimulatedTrino {
    state: Mutex<State>,
    insert_delay: Duration,
}

impl Default for SimulatedTrino {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTrino {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                report_update_count: true,
                ..State::default()
            }),
            insert_delay: Duration::ZERO,
        }
    }

    /// Every append takes this long to complete.
    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = delay;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Appends a message to a partition and returns its offset.
    pub fn publish(&self, partition_id: i64, payload: impl Into<String>) -> i64 {
        let mut state = self.lock();
        let offset = state
            .topic
            .iter()
            .filter(|m| m.partition_id == partition_id)
            .map(|m| m.offset + 1)
            .max()
            .unwrap_or(0);
        state.topic.push(TopicMessage {
            partition_id,
            offset,
            payload: payload.into(),
        });
        offset
    }

    pub fn publish_event(&self, partition_id: i64, id: i32, name: &str) -> i64 {
        self.publish(
            partition_id,
            json!({"id": id, "name": name, "timestamp": "2024-03-01T10:00:00.000000"}).to_string(),
        )
    }

    /// Replaces the payload at `(partition_id, offset)`, as an operator would
    /// to remediate a poison message.
    pub fn repair(&self, partition_id: i64, offset: i64, payload: impl Into<String>) {
        let mut state = self.lock();
        if let Some(m) = state
            .topic
            .iter_mut()
            .find(|m| m.partition_id == partition_id && m.offset == offset)
        {
            m.payload = payload.into();
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_create_error(&self, name: &'static str) {
        self.lock().create_error = Some(name);
    }

    pub fn set_report_update_count(&self, report: bool) {
        self.lock().report_update_count = report;
    }

    /// Creates the table up front with a custom column list.
    pub fn create_table_with_columns(&self, columns: &[&str]) {
        let mut state = self.lock();
        state.table = Some(Vec::new());
        state.columns = Some(columns.iter().map(|c| c.to_string()).collect());
    }

    pub fn table_exists(&self) -> bool {
        self.lock().table.is_some()
    }

    pub fn rows(&self) -> Vec<Record> {
        let mut rows = self.lock().table.clone().unwrap_or_default();
        rows.sort_by_key(|r| r.key());
        rows
    }

    pub fn offsets(&self) -> Vec<(i64, i64)> {
        self.rows().iter().map(|r| r.key()).collect()
    }

    /// Highest offset present in the table per partition.
    pub fn max_offsets(&self) -> BTreeMap<i64, i64> {
        let mut out = BTreeMap::new();
        for (p, o) in self.offsets() {
            let e = out.entry(p).or_insert(o);
            *e = (*e).max(o);
        }
        out
    }

    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    pub fn insert_starts(&self) -> Vec<Instant> {
        self.lock().insert_starts.clone()
    }

    fn table_rows(state: &State) -> Result<&Vec<Record>, QueryError> {
        state.table.as_ref().ok_or_else(|| {
            QueryError::query(TABLE_NOT_FOUND, "USER_ERROR", "Table does not exist")
        })
    }

    fn read(state: &State) -> Result<&Vec<Record>, QueryError> {
        if state.fail_reads {
            return Err(QueryError::query(
                "GENERIC_INTERNAL_ERROR",
                "INTERNAL_ERROR",
                "metadata file unavailable",
            ));
        }
        Self::table_rows(state)
    }

    fn append(&self, sql: &str) -> Result<QueryResult, QueryError> {
        let mut state = self.lock();
        let after = parse_after(between(sql, " AS s WHERE ", " AND NOT EXISTS"));
        let limit = int_after(sql, " LIMIT ") as usize;

        let existing: Vec<(i64, i64)> = Self::table_rows(&state)?
            .iter()
            .map(Record::key)
            .collect();

        let mut batch: Vec<TopicMessage> = state
            .topic
            .iter()
            .filter(|m| m.offset > after.after(m.partition_id))
            .filter(|m| !existing.contains(&(m.partition_id, m.offset)))
            .cloned()
            .collect();
        batch.sort_by_key(|m| (m.partition_id, m.offset));
        batch.truncate(limit);

        let ingest_time = chrono::Utc::now().naive_utc();
        let millis_only = !sql.contains("from_iso8601_timestamp_nanos(");
        let records = batch
            .into_iter()
            .map(|m| {
                SourceMessage::parse(&m.payload)
                    .map(|mut msg| {
                        if millis_only {
                            msg.timestamp = msg.timestamp.trunc_subsecs(3);
                        }
                        Record::from_message(msg, m.partition_id, m.offset, ingest_time)
                    })
                    .map_err(|e| {
                        QueryError::query("INVALID_CAST_ARGUMENT", "USER_ERROR", e.to_string())
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = records.len() as u64;
        if let Some(table) = state.table.as_mut() {
            table.extend(records);
        }

        Ok(if state.report_update_count {
            QueryResult::with_update_count(count)
        } else {
            QueryResult::default()
        })
    }
}

#[async_trait]
impl QueryExecutor for SimulatedTrino {
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        {
            let mut state = self.lock();
            state.statements.push(sql.to_string());
            if state.unreachable {
                return Err(QueryError::Unavailable(StatusCode::SERVICE_UNAVAILABLE));
            }
        }

        if sql.starts_with("INSERT INTO") {
            self.lock().insert_starts.push(Instant::now());
            if !self.insert_delay.is_zero() {
                tokio::time::sleep(self.insert_delay).await;
            }
            return self.append(sql);
        }

        let mut state = self.lock();
        if sql == "SELECT 1" {
            Ok(QueryResult::with_rows(vec![vec![json!(1)]]))
        } else if sql.starts_with("CREATE TABLE IF NOT EXISTS") {
            if let Some(name) = state.create_error {
                return Err(QueryError::query(name, "USER_ERROR", "create rejected"));
            }
            state.table.get_or_insert_with(Vec::new);
            Ok(QueryResult::default())
        } else if sql.starts_with("SHOW COLUMNS FROM") {
            Self::table_rows(&state)?;
            let columns = state.columns.clone().unwrap_or_else(|| {
                destination_column_names()
                    .into_iter()
                    .map(String::from)
                    .collect()
            });
            Ok(QueryResult::with_rows(
                columns
                    .into_iter()
                    .map(|c| vec![json!(c), json!("varchar"), json!(""), json!("")])
                    .collect(),
            ))
        } else if sql.starts_with("SELECT COALESCE(MAX(") {
            let max = Self::read(&state)?
                .iter()
                .map(|r| r.source_offset)
                .max()
                .unwrap_or(-1);
            Ok(QueryResult::with_rows(vec![vec![json!(max)]]))
        } else if sql.starts_with(r#"SELECT "partition_id", MAX("offset")"#) {
            let mut marks: BTreeMap<i64, i64> = BTreeMap::new();
            for r in Self::read(&state)? {
                let e = marks.entry(r.partition_id).or_insert(r.source_offset);
                *e = (*e).max(r.source_offset);
            }
            Ok(QueryResult::with_rows(
                marks
                    .into_iter()
                    // BIGINT arrives as a number; a string exercises the lenient decode.
                    .map(|(p, o)| vec![json!(p), json!(o.to_string())])
                    .collect(),
            ))
        } else if sql.starts_with("SELECT COUNT(*)") {
            let after = parse_after(sql.split_once(" WHERE ").map_or("", |(_, p)| p));
            let count = Self::read(&state)?
                .iter()
                .filter(|r| r.source_offset > after.after(r.partition_id))
                .count();
            Ok(QueryResult::with_rows(vec![vec![JsonValue::from(count as i64)]]))
        } else {
            Err(QueryError::query(
                "NOT_SUPPORTED",
                "USER_ERROR",
                format!("unsupported statement: {sql}"),
            ))
        }
    }

    fn target(&self) -> String {
        "simulated:8080".into()
    }
}

fn between<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
    let from = s.find(start).map_or(0, |i| i + start.len());
    let rest = &s[from..];
    rest.find(end).map_or(rest, |i| &rest[..i])
}

fn int_after(s: &str, marker: &str) -> i64 {
    let tail = s.rsplit_once(marker).map_or("", |(_, t)| t);
    let digits: String = tail
        .chars()
        .enumerate()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '-'))
        .map(|(_, c)| c)
        .collect();
    digits.parse().unwrap_or_else(|_| panic!("no integer after {marker:?} in {s}"))
}

/// Reads back the per-partition predicate rendered for `after`.
fn parse_after(predicate: &str) -> Watermarks {
    if !predicate.starts_with("((") {
        return Watermarks::uniform(int_after(predicate, " > "));
    }

    let clauses: Vec<&str> = predicate
        .trim_start_matches("((")
        .trim_end_matches("))")
        .split(") OR (")
        .collect();
    let mut marks = Vec::new();
    let mut floor = -1;
    for clause in clauses {
        if clause.contains(" NOT IN ") {
            floor = int_after(clause, " > ");
        } else {
            marks.push((int_after(clause, " = "), int_after(clause, " > ")));
        }
    }

    let mut out = Watermarks::uniform(floor);
    for (partition_id, offset) in marks {
        out.advance(partition_id, offset);
    }
    out
}
