//! Domain types for monitored nodes.
//!
//! `NodeSpec` is the durable/wire form of one monitored node (the
//! shape stored in the config file and accepted by `/add`);
//! `NodeRecord` adds the runtime liveness state; `StatusEntry` is the
//! public view served by `/status`. Wire keys are camelCase.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RegistryError, RegistryResult};

/// Durable description of one monitored node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// host:port of the node's JSON-RPC endpoint.
    pub address: String,
    /// Executable to run when the node is judged dead.
    pub revive_cmd: String,
    /// Single argument passed to the revival command.
    pub revive_args: String,
}

impl NodeSpec {
    /// Validate the spec for admission via `/add`.
    ///
    /// All three fields must be non-empty and `address` must split
    /// into a non-empty host and a valid port.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.address.trim().is_empty() {
            return Err(RegistryError::InvalidSpec("address must not be empty".into()));
        }
        parse_host_port(&self.address)?;
        if self.revive_cmd.trim().is_empty() {
            return Err(RegistryError::InvalidSpec(format!(
                "reviveCmd must not be empty for {}",
                self.address
            )));
        }
        if self.revive_args.trim().is_empty() {
            return Err(RegistryError::InvalidSpec(format!(
                "reviveArgs must not be empty for {}",
                self.address
            )));
        }
        Ok(())
    }
}

/// Split a `host:port` string, validating both halves.
pub fn parse_host_port(address: &str) -> RegistryResult<(&str, u16)> {
    let (host, port) = address.rsplit_once(':').ok_or_else(|| {
        RegistryError::InvalidSpec(format!("address `{address}` is not host:port"))
    })?;
    if host.is_empty() {
        return Err(RegistryError::InvalidSpec(format!(
            "address `{address}` has an empty host"
        )));
    }
    let port = port.parse::<u16>().map_err(|_| {
        RegistryError::InvalidSpec(format!("address `{address}` has an invalid port"))
    })?;
    Ok((host, port))
}

/// In-memory state of one monitored node.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub spec: NodeSpec,
    /// Consecutive probe failures since the last success.
    pub failures: u32,
    /// True iff the most recent probe succeeded.
    pub alive: bool,
    /// A revival has been dispatched since the last success.
    pub revived: bool,
}

impl NodeRecord {
    /// Create a fresh record. No probe has run yet, so `alive` starts
    /// false.
    pub fn new(spec: NodeSpec) -> Self {
        Self {
            spec,
            failures: 0,
            alive: false,
            revived: false,
        }
    }

    /// Apply one probe outcome. Returns true when this outcome is the
    /// one that crosses the failure tolerance and a revival must be
    /// dispatched.
    pub fn record_outcome(&mut self, ok: bool, tolerance: u32) -> bool {
        if ok {
            if !self.alive && self.failures > 0 {
                debug!(address = %self.spec.address, "node recovered");
            }
            self.failures = 0;
            self.alive = true;
            self.revived = false;
            return false;
        }

        self.failures += 1;
        self.alive = false;

        if self.failures == tolerance && !self.revived {
            warn!(
                address = %self.spec.address,
                failures = self.failures,
                "failure tolerance reached"
            );
            self.revived = true;
            return true;
        }
        false
    }

    /// Public view for the control surface.
    pub fn status(&self) -> StatusEntry {
        StatusEntry {
            address: self.spec.address.clone(),
            revive_cmd: self.spec.revive_cmd.clone(),
            revive_args: self.spec.revive_args.clone(),
            alive: self.alive,
        }
    }
}

/// One element of the `/status` response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub address: String,
    pub revive_cmd: String,
    pub revive_args: String,
    pub alive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(address: &str) -> NodeSpec {
        NodeSpec {
            address: address.to_string(),
            revive_cmd: "touch".to_string(),
            revive_args: "server1".to_string(),
        }
    }

    #[test]
    fn spec_round_trips_with_camel_case_keys() {
        let json = r#"{"address":"localhost:8545","reviveCmd":"touch","reviveArgs":"server1"}"#;
        let parsed: NodeSpec = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, spec("localhost:8545"));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }

    #[test]
    fn validate_accepts_well_formed_spec() {
        assert!(spec("localhost:8545").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let mut s = spec("localhost:8545");
        s.revive_cmd = String::new();
        assert!(s.validate().is_err());

        let mut s = spec("localhost:8545");
        s.revive_args = "  ".to_string();
        assert!(s.validate().is_err());

        let mut s = spec("localhost:8545");
        s.address = String::new();
        assert!(s.validate().is_err());
    }

    #[test]
    fn parse_host_port_accepts_hostnames_and_ips() {
        assert_eq!(parse_host_port("localhost:8545").unwrap(), ("localhost", 8545));
        assert_eq!(parse_host_port("10.0.0.7:9000").unwrap(), ("10.0.0.7", 9000));
    }

    #[test]
    fn parse_host_port_rejects_malformed_addresses() {
        assert!(parse_host_port("localhost").is_err());
        assert!(parse_host_port(":8545").is_err());
        assert!(parse_host_port("localhost:port").is_err());
        assert!(parse_host_port("localhost:99999").is_err());
    }

    #[test]
    fn new_record_starts_not_alive() {
        let record = NodeRecord::new(spec("localhost:8545"));
        assert_eq!(record.failures, 0);
        assert!(!record.alive);
        assert!(!record.revived);
    }

    #[test]
    fn success_resets_failure_streak() {
        let mut record = NodeRecord::new(spec("localhost:8545"));
        record.record_outcome(false, 5);
        record.record_outcome(false, 5);
        assert_eq!(record.failures, 2);
        assert!(!record.alive);

        let revive = record.record_outcome(true, 5);
        assert!(!revive);
        assert_eq!(record.failures, 0);
        assert!(record.alive);
        assert!(!record.revived);
    }

    #[test]
    fn revival_fires_exactly_at_tolerance() {
        let mut record = NodeRecord::new(spec("localhost:8545"));
        assert!(!record.record_outcome(false, 3));
        assert!(!record.record_outcome(false, 3));
        assert!(record.record_outcome(false, 3));
        assert!(record.revived);
    }

    #[test]
    fn revival_fires_at_most_once_per_streak() {
        let mut record = NodeRecord::new(spec("localhost:8545"));
        let mut fired = 0;
        for _ in 0..10 {
            if record.record_outcome(false, 3) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(record.failures, 10);

        // A success re-arms the streak.
        record.record_outcome(true, 3);
        for _ in 0..10 {
            if record.record_outcome(false, 3) {
                fired += 1;
            }
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn tolerance_of_one_revives_on_first_failure() {
        let mut record = NodeRecord::new(spec("localhost:8545"));
        assert!(record.record_outcome(false, 1));
    }

    #[test]
    fn status_exposes_public_fields_only() {
        let mut record = NodeRecord::new(spec("localhost:8545"));
        record.record_outcome(true, 5);

        let entry = record.status();
        assert!(entry.alive);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["address"], "localhost:8545");
        assert_eq!(json["reviveCmd"], "touch");
        assert_eq!(json["reviveArgs"], "server1");
        assert_eq!(json["alive"], true);
        assert!(json.get("failures").is_none());
        assert!(json.get("revived").is_none());
    }
}
