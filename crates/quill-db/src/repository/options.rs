//! # Operation Options
//!
//! Per-call settings for create / update / delete.
//!
//! Options are a different type from [`QueryModifier`](super::QueryModifier)
//! on purpose: a publishing toggle cannot be handed to a read.

use sqlx::SqlitePool;

/// One per-call setting for a mutation.
#[derive(Debug, Clone)]
pub enum OperationOption {
    /// Whether a successful mutation is announced to the publisher.
    Publishing(bool),
    /// Run the statement on this pool instead of the repository's own.
    Pool(SqlitePool),
}

/// Toggles the change notification. Publishing is on by default.
pub fn with_publishing(enabled: bool) -> OperationOption {
    OperationOption::Publishing(enabled)
}

/// Overrides the store handle for one call.
pub fn with_pool(pool: SqlitePool) -> OperationOption {
    OperationOption::Pool(pool)
}

/// Settings a mutation actually runs with.
#[derive(Debug, Clone)]
pub struct OperationOptions {
    pub publish: bool,
    pub pool: SqlitePool,
}

impl OperationOptions {
    /// Folds `options` over the defaults: publishing on, repository pool.
    ///
    /// Built fresh for every call; a later option overrides an earlier one.
    pub fn resolve(default_pool: &SqlitePool, options: &[OperationOption]) -> Self {
        let defaults = OperationOptions {
            publish: true,
            pool: default_pool.clone(),
        };

        options.iter().fold(defaults, |mut acc, option| {
            match option {
                OperationOption::Publishing(enabled) => acc.publish = *enabled,
                OperationOption::Pool(pool) => acc.pool = pool.clone(),
            }
            acc
        })
    }
}
