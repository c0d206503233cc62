//! Per-alteration configuration handed to the transport layer.

use std::time::Duration;

/// Settings that govern how an alteration is submitted, as opposed to what
/// it changes.
///
/// `timeout` and `wait` are consumed by the transport and never appear in
/// the request message. `modify_external_catalogs` is copied into the
/// request verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterConfig {
    /// Maximum time to wait for the master to accept the alteration.
    pub timeout: Duration,
    /// Whether to block until the alteration has been applied to all tablets.
    pub wait: bool,
    /// Whether external catalogs (e.g. a metastore) are updated as well.
    pub modify_external_catalogs: bool,
}

impl Default for AlterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            wait: true,
            modify_external_catalogs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alter_config_defaults() {
        let config = AlterConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.wait);
        assert!(config.modify_external_catalogs);
    }
}
