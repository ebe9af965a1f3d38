//! Workflow status state machine.
//!
//! Issue status has no stored transition table. It is recomputed from
//! scratch out of the phase set after every structural or status mutation,
//! so it can never drift from its inputs. Phases are not forced to run
//! sequentially; several may be in progress at once, and the derived status
//! reflects the most mature of them.

use super::error::{NotFoundError, ValidationError, WorkflowError};
use super::ids::PhaseId;
use super::issue::{Issue, IssueStatus};
use super::phase::{Phase, PhaseKind, PhaseStatus, REQUIRED_KINDS};
use mockable::Clock;

/// Maturity rank of a phase kind for status derivation.
///
/// Kindless phases rank alongside development: they represent generic work
/// rather than analysis.
const fn maturity(kind: Option<PhaseKind>) -> u8 {
    match kind {
        Some(PhaseKind::Rollout) => 3,
        Some(PhaseKind::AcceptanceTest) => 2,
        Some(PhaseKind::Development) | None => 1,
        Some(PhaseKind::Investigation | PhaseKind::ProposeSolution) => 0,
    }
}

const fn status_for_maturity(rank: u8) -> IssueStatus {
    match rank {
        3 => IssueStatus::InRollout,
        2 => IssueStatus::InTest,
        1 => IssueStatus::InDevelopment,
        _ => IssueStatus::InAnalysis,
    }
}

/// Returns the required phase kinds not represented among the phases.
fn missing_required_kinds(phases: &[Phase]) -> Vec<PhaseKind> {
    REQUIRED_KINDS
        .into_iter()
        .filter(|required| !phases.iter().any(|phase| phase.kind() == Some(*required)))
        .collect()
}

/// Derives the issue-level status from its phases' statuses and kinds.
///
/// A failed phase absorbs everything else; an issue is done only when every
/// phase is done and the required kind set is fully represented; otherwise
/// the highest-maturity in-progress phase wins; with nothing in progress
/// the issue is not active. Total over every reachable combination,
/// including zero phases.
#[must_use]
pub fn derive_issue_status(issue: &Issue) -> IssueStatus {
    let phases = issue.phases();
    if phases.is_empty() {
        return IssueStatus::Created;
    }
    if phases
        .iter()
        .any(|phase| phase.status() == PhaseStatus::Failed)
    {
        return IssueStatus::Failed;
    }
    let all_done = phases
        .iter()
        .all(|phase| phase.status() == PhaseStatus::Done);
    if all_done && missing_required_kinds(phases).is_empty() {
        return IssueStatus::Done;
    }
    phases
        .iter()
        .filter(|phase| phase.status() == PhaseStatus::InProgress)
        .map(|phase| maturity(phase.kind()))
        .max()
        .map_or(IssueStatus::NotActive, status_for_maturity)
}

/// Explicitly closes an issue.
///
/// Stricter than status derivation: closing demands that every phase is
/// already done and the required kind set is present, and fails otherwise
/// instead of quietly staying open.
///
/// # Errors
///
/// Returns [`ValidationError::CloseRequiresAllPhasesDone`] when any phase
/// is not done, or [`ValidationError::MissingRequiredKinds`] when the
/// required kind set is incomplete.
pub fn close(issue: &mut Issue, clock: &impl Clock) -> Result<(), ValidationError> {
    if !issue
        .phases()
        .iter()
        .all(|phase| phase.status() == PhaseStatus::Done)
        || issue.phases().is_empty()
    {
        return Err(ValidationError::CloseRequiresAllPhasesDone);
    }
    let missing = missing_required_kinds(issue.phases());
    if !missing.is_empty() {
        return Err(ValidationError::MissingRequiredKinds(missing));
    }
    issue.refresh_status(clock);
    Ok(())
}

/// Abandons an issue, failing every phase that is not already done.
///
/// An issue without phases is set to failed directly, since derivation has
/// no phase to carry the failure.
pub fn abandon(issue: &mut Issue, clock: &impl Clock) {
    if issue.phases().is_empty() {
        issue.force_status(IssueStatus::Failed, clock);
        return;
    }
    for phase in issue.phases_mut() {
        phase.force_fail(clock);
    }
    issue.refresh_status(clock);
}

/// Marks a phase failed and re-derives the issue status.
///
/// # Errors
///
/// Returns [`NotFoundError::Phase`] when the phase does not exist, or a
/// [`ValidationError`] when the phase is already terminal.
pub fn fail_phase(
    issue: &mut Issue,
    phase_id: PhaseId,
    clock: &impl Clock,
) -> Result<(), WorkflowError> {
    let phase = issue
        .phase_mut(phase_id)
        .ok_or(NotFoundError::Phase(phase_id))?;
    phase.fail(clock)?;
    issue.refresh_status(clock);
    Ok(())
}

/// Returns a failed or done phase to in-progress and re-derives the issue
/// status.
///
/// # Errors
///
/// Returns [`NotFoundError::Phase`] when the phase does not exist, or a
/// [`ValidationError`] when the phase is neither failed nor done.
pub fn reopen_phase(
    issue: &mut Issue,
    phase_id: PhaseId,
    clock: &impl Clock,
) -> Result<(), WorkflowError> {
    let phase = issue
        .phase_mut(phase_id)
        .ok_or(NotFoundError::Phase(phase_id))?;
    phase.reopen(clock)?;
    issue.refresh_status(clock);
    Ok(())
}
