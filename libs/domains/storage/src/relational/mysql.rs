//! `SqlBackend` over a sqlx MySQL pool.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, Transaction, TypeInfo};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::models::Fields;
use crate::relational::backend::{SqlBackend, SqlExecutor, SqlTransaction};
use crate::relational::builder::SqlStatement;
use crate::relational::decode::{decoding_for, saturate_unsigned, ColumnDecoding};
use crate::value::TypedValue;

#[derive(Clone, Debug)]
pub struct MySqlBackend {
    pool: MySqlPool,
}

impl MySqlBackend {
    /// Opens the pool and verifies the server answers.
    pub async fn connect(url: &str, acquire_timeout: Duration) -> StorageResult<Self> {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| StorageError::from(e).context("sql open error"))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StorageError::from(e).context("sql ping error"))?;

        info!("connected to MySQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SqlBackend for MySqlBackend {
    type Conn = MySqlConn;
    type Tx = MySqlTx;

    async fn acquire(&self) -> StorageResult<MySqlConn> {
        Ok(MySqlConn(self.pool.acquire().await?))
    }

    async fn begin(&self) -> StorageResult<MySqlTx> {
        Ok(MySqlTx(self.pool.begin().await?))
    }
}

pub struct MySqlConn(PoolConnection<MySql>);

pub struct MySqlTx(Transaction<'static, MySql>);

#[async_trait]
impl SqlExecutor for MySqlConn {
    async fn execute(&mut self, stmt: &SqlStatement) -> StorageResult<u64> {
        execute_on(&mut self.0, stmt).await
    }

    async fn fetch_all(&mut self, stmt: &SqlStatement) -> StorageResult<Vec<Fields>> {
        fetch_on(&mut self.0, stmt).await
    }
}

#[async_trait]
impl SqlExecutor for MySqlTx {
    async fn execute(&mut self, stmt: &SqlStatement) -> StorageResult<u64> {
        execute_on(&mut self.0, stmt).await
    }

    async fn fetch_all(&mut self, stmt: &SqlStatement) -> StorageResult<Vec<Fields>> {
        fetch_on(&mut self.0, stmt).await
    }
}

#[async_trait]
impl SqlTransaction for MySqlTx {
    async fn commit(self) -> StorageResult<()> {
        Ok(self.0.commit().await?)
    }

    async fn rollback(self) -> StorageResult<()> {
        Ok(self.0.rollback().await?)
    }
}

async fn execute_on(conn: &mut MySqlConnection, stmt: &SqlStatement) -> StorageResult<u64> {
    debug!(sql = %stmt.sql, params = stmt.params.len(), "execute");
    let done = bind_params(&stmt.sql, &stmt.params).execute(conn).await?;
    Ok(done.rows_affected())
}

async fn fetch_on(conn: &mut MySqlConnection, stmt: &SqlStatement) -> StorageResult<Vec<Fields>> {
    debug!(sql = %stmt.sql, params = stmt.params.len(), "fetch");
    let rows = bind_params(&stmt.sql, &stmt.params).fetch_all(conn).await?;
    rows.iter().map(decode_row).collect()
}

fn bind_params<'q>(sql: &'q str, params: &'q [TypedValue]) -> Query<'q, MySql, MySqlArguments> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            TypedValue::String(s) => query.bind(s.as_str()),
            TypedValue::Int(v) | TypedValue::Timestamp(v) => query.bind(*v),
            TypedValue::Double(v) => query.bind(*v),
            TypedValue::Bool(v) => query.bind(*v),
            TypedValue::Bytes(v) => query.bind(v.as_slice()),
            TypedValue::Null => query.bind(None::<String>),
        })
}

fn decode_row(row: &MySqlRow) -> StorageResult<Fields> {
    let mut fields = Fields::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let decoding = decoding_for(column.type_info().name());
        fields.insert(column.name().to_string(), decode_cell(row, idx, decoding)?);
    }
    Ok(fields)
}

// Column types are already known from the metadata, so cells are read
// unchecked and NULL always maps through `Option`.
fn decode_cell(row: &MySqlRow, idx: usize, decoding: ColumnDecoding) -> StorageResult<TypedValue> {
    let value = match decoding {
        ColumnDecoding::Null => TypedValue::Null,
        ColumnDecoding::Bool => row.try_get_unchecked::<Option<bool>, _>(idx)?.into(),
        ColumnDecoding::Int => row.try_get_unchecked::<Option<i64>, _>(idx)?.into(),
        ColumnDecoding::UnsignedInt => row
            .try_get_unchecked::<Option<u64>, _>(idx)?
            .map(saturate_unsigned)
            .into(),
        ColumnDecoding::Float => row
            .try_get_unchecked::<Option<f32>, _>(idx)?
            .map(f64::from)
            .into(),
        ColumnDecoding::Double => row.try_get_unchecked::<Option<f64>, _>(idx)?.into(),
        ColumnDecoding::DateTime => row
            .try_get_unchecked::<Option<NaiveDateTime>, _>(idx)?
            .map_or(TypedValue::Null, |dt| {
                TypedValue::Timestamp(dt.and_utc().timestamp_millis())
            }),
        ColumnDecoding::Date => row
            .try_get_unchecked::<Option<NaiveDate>, _>(idx)?
            .map_or(TypedValue::Null, |d| {
                TypedValue::Timestamp(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
            }),
        ColumnDecoding::Time => row
            .try_get_unchecked::<Option<NaiveTime>, _>(idx)?
            .map(|t| t.to_string())
            .into(),
        ColumnDecoding::Text => row.try_get_unchecked::<Option<String>, _>(idx)?.into(),
        ColumnDecoding::Binary => row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)?.into(),
    };
    Ok(value)
}
