//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Times one repository query and records its duration on drop-site call.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_member_by_number");
/// let result = sqlx::query_as::<_, MemberEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Start a timer for the named query.
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration.
    pub fn record(self) {
        histogram!(
            "db_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

/// Record connection pool gauges. Called periodically by a background job.
pub fn record_pool_metrics(pool: &PgPool) {
    let total = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("db_pool_connections_total").set(total as f64);
    gauge!("db_pool_connections_idle").set(idle as f64);
    gauge!("db_pool_connections_active").set(total.saturating_sub(idle) as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_holds_name() {
        let timer = QueryTimer::new("append_import_row");
        assert_eq!(timer.query_name, "append_import_row");
    }

    #[test]
    fn test_query_timer_record_consumes() {
        let timer = QueryTimer::new("noop");
        timer.record();
    }
}
