pub mod categories;
pub mod flowers;
pub mod users;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use tracing::error;
use uuid::Uuid;

use blossom_db::Database;

use crate::error::AppError;

pub use categories::CategoryRepository;
pub use flowers::FlowerRepository;
pub use users::UserRepository;

/// Run a blocking gateway call off the async runtime.
pub(crate) async fn blocking<F, T>(db: &Arc<Database>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(e.into())
        })?
        .map_err(AppError::from)
}

/// Parse a client-supplied identity. Anything that is not a UUID is an
/// identity-cast failure, reported as not found.
pub(crate) fn parse_id(value: &str) -> Result<Uuid, AppError> {
    value.trim().parse::<Uuid>().map_err(|_| AppError::InvalidId {
        value: value.to_string(),
    })
}

pub(crate) fn parse_stored_id(value: &str) -> anyhow::Result<Uuid> {
    value
        .parse()
        .with_context(|| format!("corrupt id {value:?} in store"))
}

/// Current time at the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A write timestamp strictly later than `previous`, even when the clock has not moved.
pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("corrupt timestamp {value:?} in store"))?
        .with_timezone(&Utc))
}

/// Trim a text field; blank input collapses to `None`.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
