//! Pool settings as they appear under `database.pool` in the application
//! config. Durations use humantime (`"30s"`, `"5m"`).

use serde::{Deserialize, Serialize};
use sqlx::pool::PoolOptions;
use std::time::Duration;

use crate::ConnectOpts;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoolCfg {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde", default)]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: Option<bool>,
}

impl PoolCfg {
    /// Overlay onto `base`. Fields left unset in the config keep the base value.
    pub fn apply_to(&self, base: ConnectOpts) -> ConnectOpts {
        ConnectOpts {
            max_conns: self.max_conns.or(base.max_conns),
            min_conns: self.min_conns.or(base.min_conns),
            acquire_timeout: self.acquire_timeout.or(base.acquire_timeout),
            idle_timeout: self.idle_timeout.or(base.idle_timeout),
            max_lifetime: self.max_lifetime.or(base.max_lifetime),
            test_before_acquire: self.test_before_acquire.unwrap_or(base.test_before_acquire),
            ..base
        }
    }

    /// sqlx pool options for any backend; unset knobs stay at sqlx defaults.
    pub fn pool_options<DB: sqlx::Database>(&self) -> PoolOptions<DB> {
        let mut opts = PoolOptions::<DB>::new();
        if let Some(n) = self.max_conns {
            opts = opts.max_connections(n);
        }
        if let Some(n) = self.min_conns {
            opts = opts.min_connections(n);
        }
        if let Some(t) = self.acquire_timeout {
            opts = opts.acquire_timeout(t);
        }
        if self.idle_timeout.is_some() {
            opts = opts.idle_timeout(self.idle_timeout);
        }
        if self.max_lifetime.is_some() {
            opts = opts.max_lifetime(self.max_lifetime);
        }
        if let Some(b) = self.test_before_acquire {
            opts = opts.test_before_acquire(b);
        }
        opts
    }
}

impl From<&ConnectOpts> for PoolCfg {
    fn from(o: &ConnectOpts) -> Self {
        Self {
            max_conns: o.max_conns,
            min_conns: o.min_conns,
            acquire_timeout: o.acquire_timeout,
            idle_timeout: o.idle_timeout,
            max_lifetime: o.max_lifetime,
            test_before_acquire: Some(o.test_before_acquire),
        }
    }
}
