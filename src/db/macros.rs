//! Database dispatch macros for reducing code duplication.
//!
//! Each backend has its own pool type, so code that is identical across
//! backends still has to be type-checked once per backend. These macros expand
//! the per-variant match arms at compile time.

/// Macro for generating database dispatch match arms.
///
/// Two forms are accepted. Explicit arms, when the backends differ:
///
/// ```ignore
/// impl_db_dispatch!(pool, {
///     MySql(p) => do_mysql(p),
///     Postgres(p) => do_postgres(p),
///     SQLite(p) => do_sqlite(p),
/// });
/// ```
///
/// Or a single body repeated for every variant, with `p` bound to the concrete
/// pool type in each arm:
///
/// ```ignore
/// impl_db_dispatch!(pool, |p| p.begin().await.map(|_| ()))
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::pool::DbPool::$variant($p) => $body,
            )+
        }
    };
    ($pool:expr, |$p:ident| $body:expr) => {
        match $pool {
            $crate::db::pool::DbPool::MySql($p) => $body,
            $crate::db::pool::DbPool::Postgres($p) => $body,
            $crate::db::pool::DbPool::SQLite($p) => $body,
        }
    };
}

pub use impl_db_dispatch;
