//! Execution engine - reconciles a plan one resource at a time

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::error::{Error, Result};
use crate::planner::ExecutionPlan;
use crate::reconcile::reconcile;
use crate::resource::Resource;
use crate::types::{ExecuteOptions, ExecuteSummary, Failure, Outcome, ReconcileOptions};
use jirakit::Transport;
use serde::Serialize;

/// Everything that happened while executing a plan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteReport {
    /// One outcome per reconciled resource, in plan order
    pub outcomes: Vec<Outcome>,
    /// Resources that failed
    pub failures: Vec<Failure>,
    /// Resources a dry run could not check because they depend on
    /// changes earlier in the plan
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<String>,
    /// Per-action counters
    pub summary: ExecuteSummary,
    /// The user declined the confirmation prompt
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub declined: bool,
}

impl ExecuteReport {
    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn from_slots(slots: Vec<Slot>) -> Self {
        let mut report = Self::default();
        for slot in slots {
            match slot {
                Slot::Done(outcome) => {
                    report.summary.add_action(outcome.action);
                    report.outcomes.push(outcome);
                }
                Slot::Failed(failure) => {
                    report.summary.failed += 1;
                    report.failures.push(failure);
                }
                Slot::Deferred(id) => {
                    report.summary.skipped += 1;
                    report.deferred.push(id);
                }
                Slot::Skipped => report.summary.skipped += 1,
            }
        }
        report
    }
}

/// Result of one resource within a pass
#[derive(Debug)]
enum Slot {
    Done(Outcome),
    Failed(Failure),
    /// A dry run hit a missing dependency that an earlier change may create
    Deferred(String),
    /// Not attempted
    Skipped,
}

impl Slot {
    fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }

    /// Would change something, or cannot tell until earlier changes land
    fn is_pending(&self) -> bool {
        match self {
            Slot::Done(outcome) => outcome.changed,
            Slot::Deferred(_) => true,
            Slot::Failed(_) | Slot::Skipped => false,
        }
    }
}

/// Execute a plan with the given options and callbacks
///
/// Resources are reconciled one at a time in plan order, so a resource may
/// rely on anything created before it. Without `keep_going` the first
/// failure stops the run and the remaining resources count as skipped.
///
/// When `confirm` needs to ask, a dry-run pass runs first. A resource whose
/// required lookup misses after an earlier pending change is deferred
/// rather than failed. The changed and deferred resources are then applied
/// in order once the user agrees.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `transport` - Where requests go
/// * `opts` - Execution options (dry_run, keep_going)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
pub fn execute<P, C>(
    plan: &ExecutionPlan,
    transport: &dyn Transport,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let resources: Vec<&dyn Resource> = plan.resources.iter().map(AsRef::as_ref).collect();

    if opts.dry_run || !confirm.needs_prompt() {
        let slots = run_pass(&resources, transport, opts.reconcile(), opts.keep_going, progress);
        return Ok(ExecuteReport::from_slots(slots));
    }

    // Preview pass
    let mut slots = run_pass(&resources, transport, ReconcileOptions { dry_run: true }, opts.keep_going, progress);

    let failed = slots.iter().any(Slot::is_failed);
    let pending: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_pending())
        .map(|(i, _)| i)
        .collect();

    if (failed && !opts.keep_going) || pending.is_empty() {
        return Ok(ExecuteReport::from_slots(slots));
    }

    let prompt = format!("Apply {} change(s)?", pending.len());
    if !confirm.confirm(&prompt)? {
        for &i in &pending {
            slots[i] = Slot::Skipped;
        }
        let mut report = ExecuteReport::from_slots(slots);
        report.declined = true;
        return Ok(report);
    }

    let batch: Vec<&dyn Resource> = pending.iter().map(|&i| resources[i]).collect();
    let applied = run_pass(&batch, transport, ReconcileOptions::default(), opts.keep_going, progress);
    for (&i, slot) in pending.iter().zip(applied) {
        slots[i] = slot;
    }

    Ok(ExecuteReport::from_slots(slots))
}

/// Reconcile resources in order
fn run_pass<P: ProgressCallback>(
    resources: &[&dyn Resource],
    transport: &dyn Transport,
    options: ReconcileOptions,
    keep_going: bool,
    progress: &mut P,
) -> Vec<Slot> {
    let mut slots: Vec<Slot> = Vec::with_capacity(resources.len());
    progress.on_batch_start(resources.len(), options.dry_run);

    for resource in resources {
        if !keep_going && slots.iter().any(Slot::is_failed) {
            slots.push(Slot::Skipped);
            continue;
        }

        let id = resource.id();
        progress.on_resource_start(&id);

        match apply_resource(*resource, transport, options) {
            Ok(outcome) => {
                progress.on_resource_complete(&outcome);
                slots.push(Slot::Done(outcome));
            }
            Err(e) if options.dry_run && is_missing_dependency(&e) && slots.iter().any(Slot::is_pending) => {
                log::debug!("{id} deferred: {e}");
                progress.on_resource_deferred(&id, &e);
                slots.push(Slot::Deferred(id));
            }
            Err(e) => {
                log::debug!("{id} failed: {e}");
                progress.on_resource_failed(&id, &e);
                slots.push(Slot::Failed(Failure {
                    kind: resource.kind().to_string(),
                    name: resource.name(),
                    error: e.to_string(),
                }));
            }
        }
    }

    progress.on_batch_complete();
    slots
}

/// A required name lookup missed
fn is_missing_dependency(error: &Error) -> bool {
    matches!(error.jira(), Some(jirakit::Error::NotFound { .. }))
}

/// Reconcile a single resource
pub fn apply_resource(resource: &dyn Resource, transport: &dyn Transport, options: ReconcileOptions) -> Result<Outcome> {
    let desired = resource.desired()?;
    let kind = resource.descriptor(transport)?;
    reconcile(transport, &kind, &desired, &options)
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: &ExecutionPlan, transport: &dyn Transport, opts: ExecuteOptions) -> Result<ExecuteReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, transport, opts, &mut NoProgress, &mut AutoConfirm)
}
