use crate::collectors::dataset::{DatasetSource, RequestError};
use crate::config::{Config, ConfigError};
use crate::registry::{self, CheckDefinition, CHECKS};
use crate::state::CollectionOutcome;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SelectionPlan {
    pub checks: Vec<&'static CheckDefinition>,
    // included names with no registry entry
    pub unknown: Vec<String>,
    pub per_check_timeout: Duration,
}

pub fn plan_selection(cfg: &Config) -> Result<SelectionPlan, ConfigError> {
    if !cfg.include.is_empty() && !cfg.exclude.is_empty() {
        return Err(ConfigError::IncludeAndExclude);
    }
    if let Some(name) = cfg.exclude.iter().find(|n| registry::lookup(n).is_none()) {
        return Err(ConfigError::UnknownExclude(name.clone()));
    }

    let mut unknown = Vec::new();
    let checks: Vec<&'static CheckDefinition> = if cfg.include.is_empty() {
        CHECKS
            .iter()
            .filter(|c| !cfg.exclude.iter().any(|n| n == c.name))
            .collect()
    } else {
        let mut positions = Vec::with_capacity(cfg.include.len());
        for name in &cfg.include {
            match registry::position(name) {
                Some(pos) => positions.push(pos),
                None if !unknown.contains(name) => unknown.push(name.clone()),
                None => {}
            }
        }
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|pos| &CHECKS[pos]).collect()
    };

    let per_check_timeout = per_check_budget(cfg.total_deadline(), checks.len());
    Ok(SelectionPlan {
        checks,
        unknown,
        per_check_timeout,
    })
}

pub fn per_check_budget(total: Duration, selected: usize) -> Duration {
    let share = match selected {
        0 => total.as_secs(),
        n => total.as_secs() / n as u64,
    };
    Duration::from_secs(share)
}

pub async fn run_checks<S>(
    source: &S,
    plan: &SelectionPlan,
    outcome: &mut CollectionOutcome,
) -> u64
where
    S: DatasetSource + ?Sized,
{
    let mut errors = 0_u64;

    for name in &plan.unknown {
        warn!(check = %name, "check is not registered");
        outcome.note_failure(name);
        errors += 1;
    }

    if plan.per_check_timeout.is_zero() {
        warn!(
            checks = plan.checks.len(),
            "deadline too short to give every check a second"
        );
        for check in &plan.checks {
            outcome.note_failure(check.name);
            errors += 1;
        }
        return errors;
    }

    for check in &plan.checks {
        match run_check(source, check, plan.per_check_timeout).await {
            Ok(samples) => {
                if samples.is_empty() {
                    debug!(check = %check.name, "dataset returned no rows");
                }
                for value in samples {
                    outcome.add_channel(check, value);
                }
            }
            Err(err) => {
                warn!(check = %check.name, error = %err, "check failed");
                outcome.note_failure(check.name);
                errors += 1;
            }
        }
    }

    errors
}

async fn run_check<S>(
    source: &S,
    check: &CheckDefinition,
    timeout: Duration,
) -> Result<Vec<i64>, RequestError>
where
    S: DatasetSource + ?Sized,
{
    match time::timeout(timeout, source.fetch(&check.path(), timeout)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(RequestError::Timeout(timeout)),
    }
}

pub async fn collect<S>(
    source: &S,
    cfg: &Config,
    outcome: &mut CollectionOutcome,
) -> Result<u64, ConfigError>
where
    S: DatasetSource + ?Sized,
{
    let plan = plan_selection(cfg)?;
    info!(
        checks = plan.checks.len(),
        per_check_timeout = %humantime::format_duration(plan.per_check_timeout),
        "running checks"
    );
    Ok(run_checks(source, &plan, outcome).await)
}
