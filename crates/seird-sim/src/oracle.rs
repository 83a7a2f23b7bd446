use crate::driver::{DAYS_PER_WEEK, SimulationReport};
use crate::state::HealthState;

// ── Core result types ─────────────────────────────────────────────────────────

/// Outcome of checking a [`SimulationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    #[must_use]
    fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    #[must_use]
    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

impl Default for OracleResult {
    fn default() -> Self {
        Self::pass()
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

/// One broken report invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Cumulative cases went down between consecutive weeks.
    CumulativeDecreased {
        week: u32,
        previous: usize,
        current: usize,
    },

    /// Cumulative cases differ from the initial count plus all new cases so far.
    ///
    /// `week` equal to the number of records refers to the report's final
    /// cumulative count.
    CumulativeMismatch {
        week: u32,
        expected: usize,
        actual: usize,
    },

    /// State counts at week end do not add up to the node count.
    CountsMismatch {
        week: u32,
        counted: usize,
        node_count: usize,
    },

    /// Dead nodes differ from the initially dead plus all deaths so far.
    DeathsMismatch {
        week: u32,
        dead: usize,
        expected: usize,
    },

    /// A node moved out of a terminal state or backwards along `S → E → I`.
    ///
    /// `week` is the record whose snapshot shows `to`.
    IllegalTransition {
        week: u32,
        node: usize,
        from: HealthState,
        to: HealthState,
    },

    /// A single day moved a node along an edge the state machine lacks,
    /// such as `S → I` without a day spent exposed.
    IllegalStep {
        day: u64,
        node: usize,
        from: HealthState,
        to: HealthState,
    },

    /// The community ledger disagrees with the reported case count.
    LedgerMismatch { ledger_total: usize, new_cases: usize },
}

// ── Oracle ───────────────────────────────────────────────────────────────────

/// Checks the invariants every correct run satisfies, whatever the seed.
pub struct ReportOracle;

impl ReportOracle {
    /// Run every check against `report` for a graph of `node_count` nodes.
    #[must_use]
    pub fn check_all(report: &SimulationReport, node_count: usize) -> OracleResult {
        OracleResult::pass()
            .merge(Self::check_cumulative(report))
            .merge(Self::check_counts(report, node_count))
            .merge(Self::check_deaths(report))
            .merge(Self::check_transitions(report))
            .merge(Self::check_ledger(report))
    }

    /// Cumulative cases never decrease and always balance.
    #[must_use]
    pub fn check_cumulative(report: &SimulationReport) -> OracleResult {
        let mut violations = Vec::new();
        let mut expected = report.initial_infected;
        let mut previous = report.initial_infected;

        for week in &report.weeks {
            if week.cumulative_cases < previous {
                violations.push(InvariantViolation::CumulativeDecreased {
                    week: week.week,
                    previous,
                    current: week.cumulative_cases,
                });
            }
            expected += week.new_cases;
            if week.cumulative_cases != expected {
                violations.push(InvariantViolation::CumulativeMismatch {
                    week: week.week,
                    expected,
                    actual: week.cumulative_cases,
                });
            }
            previous = week.cumulative_cases;
        }

        let whole_weeks = report.days % DAYS_PER_WEEK == 0;
        if whole_weeks && report.cumulative_cases != expected {
            violations.push(InvariantViolation::CumulativeMismatch {
                week: u32::try_from(report.weeks.len()).unwrap_or(u32::MAX),
                expected,
                actual: report.cumulative_cases,
            });
        }
        OracleResult::from_violations(violations)
    }

    /// Every week's state counts cover the whole graph.
    #[must_use]
    pub fn check_counts(report: &SimulationReport, node_count: usize) -> OracleResult {
        let violations = report
            .weeks
            .iter()
            .filter(|week| week.counts.total() != node_count)
            .map(|week| InvariantViolation::CountsMismatch {
                week: week.week,
                counted: week.counts.total(),
                node_count,
            })
            .collect();
        OracleResult::from_violations(violations)
    }

    /// The dead count at each week end matches the deaths reported so far.
    #[must_use]
    pub fn check_deaths(report: &SimulationReport) -> OracleResult {
        let mut violations = Vec::new();
        let mut expected = report.initial_counts.dead;
        for week in &report.weeks {
            expected += week.deaths;
            if week.counts.dead != expected {
                violations.push(InvariantViolation::DeathsMismatch {
                    week: week.week,
                    dead: week.counts.dead,
                    expected,
                });
            }
        }
        OracleResult::from_violations(violations)
    }

    /// No node leaves a terminal state or moves backwards between snapshots.
    ///
    /// Passes trivially when snapshots were not retained.
    #[must_use]
    pub fn check_transitions(report: &SimulationReport) -> OracleResult {
        let mut violations = Vec::new();
        let mut previous = report.initial_snapshot.as_deref();

        for week in &report.weeks {
            let Some(current) = week.snapshot.as_deref() else {
                previous = None;
                continue;
            };
            if let Some(before) = previous {
                for (node, (&from, &to)) in before.iter().zip(current).enumerate() {
                    if !from.can_reach(to) {
                        violations.push(InvariantViolation::IllegalTransition {
                            week: week.week,
                            node,
                            from,
                            to,
                        });
                    }
                }
            }
            previous = Some(current);
        }
        OracleResult::from_violations(violations)
    }

    /// Every node moved along a one-day edge of the state machine between
    /// `before` (start of `day`) and `after` (end of `day`).
    ///
    /// Nodes present in only one of the two slices are not checked.
    #[must_use]
    pub fn check_day(day: u64, before: &[HealthState], after: &[HealthState]) -> OracleResult {
        let violations = before
            .iter()
            .zip(after)
            .enumerate()
            .filter(|(_, (from, to))| !from.can_step_to(**to))
            .map(|(node, (&from, &to))| InvariantViolation::IllegalStep {
                day,
                node,
                from,
                to,
            })
            .collect();
        OracleResult::from_violations(violations)
    }

    /// The per-community ledger accounts for every new case.
    #[must_use]
    pub fn check_ledger(report: &SimulationReport) -> OracleResult {
        let ledger_total = report.ledger.total();
        let new_cases = report
            .cumulative_cases
            .saturating_sub(report.initial_infected);
        if ledger_total == new_cases {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(vec![InvariantViolation::LedgerMismatch {
                ledger_total,
                new_cases,
            }])
        }
    }
}

/// Check `report` against a graph of `node_count` nodes.
#[must_use]
pub fn check_report(report: &SimulationReport, node_count: usize) -> OracleResult {
    ReportOracle::check_all(report, node_count)
}

/// Format an invariant violation into a human-readable string.
#[must_use]
pub fn format_violation(v: &InvariantViolation) -> String {
    match v {
        InvariantViolation::CumulativeDecreased {
            week,
            previous,
            current,
        } => format!("CumulativeDecreased: week {week} fell from {previous} to {current}"),
        InvariantViolation::CumulativeMismatch {
            week,
            expected,
            actual,
        } => format!("CumulativeMismatch: week {week} has {actual}, expected {expected}"),
        InvariantViolation::CountsMismatch {
            week,
            counted,
            node_count,
        } => format!("CountsMismatch: week {week} counts {counted} nodes of {node_count}"),
        InvariantViolation::DeathsMismatch {
            week,
            dead,
            expected,
        } => format!("DeathsMismatch: week {week} has {dead} dead, expected {expected}"),
        InvariantViolation::IllegalTransition {
            week,
            node,
            from,
            to,
        } => format!(
            "IllegalTransition: node {node} went {} -> {} by week {week}",
            from.code(),
            to.code()
        ),
        InvariantViolation::IllegalStep {
            day,
            node,
            from,
            to,
        } => format!(
            "IllegalStep: node {node} went {} -> {} on day {day}",
            from.code(),
            to.code()
        ),
        InvariantViolation::LedgerMismatch {
            ledger_total,
            new_cases,
        } => format!("LedgerMismatch: ledger holds {ledger_total} cases, report has {new_cases}"),
    }
}
