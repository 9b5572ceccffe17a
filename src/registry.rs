use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Custom(Subunit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subunit {
    OpsPerSec,
    KilobytesPerSec,
    RequestsPerSec,
}

impl Subunit {
    pub fn label(self) -> &'static str {
        match self {
            Subunit::OpsPerSec => "Ops/sec",
            Subunit::KilobytesPerSec => "Kilobytes/sec",
            Subunit::RequestsPerSec => "Requests/sec",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upper,
    // degraded below the limits, e.g. hit ratios
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub direction: Direction,
    pub warning: i64,
    pub error: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDefinition {
    pub name: &'static str,
    pub dataset: &'static str,
    pub channel: &'static str,
    pub unit: Unit,
    pub thresholds: Thresholds,
    pub primary: bool,
}

impl CheckDefinition {
    pub fn path(&self) -> String {
        format!("/analytics/v1/datasets/{}/data", self.dataset)
    }
}

const fn upper(warning: i64, error: i64) -> Thresholds {
    Thresholds {
        direction: Direction::Upper,
        warning,
        error,
    }
}

const fn lower(warning: i64, error: i64) -> Thresholds {
    Thresholds {
        direction: Direction::Lower,
        warning,
        error,
    }
}

const fn ops(
    name: &'static str,
    dataset: &'static str,
    channel: &'static str,
    subunit: Subunit,
    thresholds: Thresholds,
) -> CheckDefinition {
    CheckDefinition {
        name,
        dataset,
        channel,
        unit: Unit::Custom(subunit),
        thresholds,
        primary: false,
    }
}

pub static CHECKS: &[CheckDefinition] = &[
    CheckDefinition {
        name: "cpu",
        dataset: "cpu.utilization",
        channel: "CPU Usage Percent",
        unit: Unit::Percent,
        thresholds: upper(60, 80),
        primary: true,
    },
    ops("nfs2", "nfs2.ops", "NFS2", Subunit::OpsPerSec, upper(50_000, 100_000)),
    ops("nfs3", "nfs3.ops", "NFS3", Subunit::OpsPerSec, upper(50_000, 100_000)),
    ops("nfs4", "nfs4.ops", "NFS4", Subunit::OpsPerSec, upper(40_000, 80_000)),
    ops("nfs41", "nfs4-1.ops", "NFS4.1", Subunit::OpsPerSec, upper(40_000, 80_000)),
    ops("disk", "io.ops", "Disk", Subunit::OpsPerSec, upper(25_000, 50_000)),
    ops("fc", "fc.ops", "FC", Subunit::OpsPerSec, upper(6_000, 8_000)),
    ops("iscsi", "iscsi.ops", "ISCSI", Subunit::OpsPerSec, upper(6_000, 8_000)),
    ops("smb", "smb.ops", "SMB", Subunit::OpsPerSec, upper(40_000, 80_000)),
    ops("smb2", "smb2.ops", "SMB2", Subunit::OpsPerSec, upper(40_000, 80_000)),
    ops("nic", "nic.kilobytes", "NIC", Subunit::KilobytesPerSec, upper(500_000, 1_000_000)),
    CheckDefinition {
        name: "cache",
        dataset: "arc.hitratio",
        channel: "Cache Hit Ratio",
        unit: Unit::Percent,
        thresholds: lower(80, 60),
        primary: false,
    },
    ops("http", "http.reqs", "HTTP", Subunit::RequestsPerSec, upper(5_000, 10_000)),
    ops("sftp", "sftp.kilobytes", "SFTP", Subunit::KilobytesPerSec, upper(500_000, 1_000_000)),
    ops("ftp", "ftp.kilobytes", "FTP", Subunit::KilobytesPerSec, upper(500_000, 1_000_000)),
];

fn index() -> &'static HashMap<&'static str, usize> {
    static INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        CHECKS
            .iter()
            .enumerate()
            .map(|(pos, check)| (check.name, pos))
            .collect()
    })
}

pub fn lookup(name: &str) -> Option<&'static CheckDefinition> {
    index().get(name).map(|&pos| &CHECKS[pos])
}

pub fn position(name: &str) -> Option<usize> {
    index().get(name).copied()
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CHECKS.iter().map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_in_registration_order() {
        let names: Vec<_> = names().collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names.first(), Some(&"cpu"));
        assert_eq!(names.last(), Some(&"ftp"));
        assert_eq!(position("nfs3"), Some(2));
    }

    #[test]
    fn exactly_one_primary_channel() {
        let primaries: Vec<_> = CHECKS.iter().filter(|c| c.primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].name, "cpu");
    }

    #[test]
    fn cache_breaches_below_its_limits() {
        let cache = lookup("cache").expect("cache is registered");
        assert_eq!(cache.unit, Unit::Percent);
        assert_eq!(cache.thresholds, lower(80, 60));
        assert!(cache.thresholds.warning > cache.thresholds.error);
    }

    #[test]
    fn upper_bound_limits_are_ordered() {
        for check in CHECKS
            .iter()
            .filter(|c| c.thresholds.direction == Direction::Upper)
        {
            assert!(
                check.thresholds.warning < check.thresholds.error,
                "{} has inverted limits",
                check.name
            );
        }
    }

    #[test]
    fn lookup_unknown_name() {
        assert!(lookup("tape").is_none());
        assert_eq!(
            lookup("nic").map(|c| c.unit),
            Some(Unit::Custom(Subunit::KilobytesPerSec))
        );
        assert_eq!(
            lookup("cpu").map(|c| c.path()),
            Some("/analytics/v1/datasets/cpu.utilization/data".to_string())
        );
    }
}
