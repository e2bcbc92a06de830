/// Default number of audit entries kept.
pub const DEFAULT_RETENTION: i64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// Only the newest `retention` entries survive each write.
    pub retention: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
        }
    }
}

impl AuditConfig {
    /// Reads `AUDIT_LOG_RETENTION`. Non-positive values fall back to the default.
    pub fn from_env() -> Self {
        let retention = crate::env_or("AUDIT_LOG_RETENTION", DEFAULT_RETENTION);
        Self {
            retention: if retention > 0 {
                retention
            } else {
                DEFAULT_RETENTION
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_newest_thousand() {
        assert_eq!(AuditConfig::default().retention, 1000);
        assert_eq!(DEFAULT_RETENTION, 1000);
    }
}
