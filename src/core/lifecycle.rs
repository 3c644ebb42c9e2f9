//! Order lifecycle business logic - the status enum and its stage projection.
//!
//! The lifecycle is rendered to users as a stepper of eight stages. Which
//! stages are completed, current, or blocked is not a pure function of status
//! rank: Briefing completes on its completeness score, Payment completes on
//! payment-confirmation evidence, and Production/Delivery are gated on
//! payment milestones. This module reproduces both the ordinal table and the
//! override rules as pure, referentially-transparent functions so the
//! projection can be recomputed from fetched state at any time.

use crate::{
    entities::{OrderStatus, order, revision},
    errors::{Error, Result},
};

/// Briefing is considered complete once its score reaches this threshold,
/// regardless of the order's status.
pub const BRIEFING_COMPLETE_SCORE: i32 = 80;

/// The eight logical stages of an order, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The chosen service - standing evidence, complete from creation
    Service,
    /// Briefing submission and completeness
    Briefing,
    /// Quote preparation and approval
    Quote,
    /// Initial payment
    Payment,
    /// Production work
    Production,
    /// Revision rounds
    Revision,
    /// File handover
    Delivery,
    /// Protocol and public tracking link - always visible
    Reference,
}

impl Stage {
    /// All stages in display order.
    pub const ALL: [Self; 8] = [
        Self::Service,
        Self::Briefing,
        Self::Quote,
        Self::Payment,
        Self::Production,
        Self::Revision,
        Self::Delivery,
        Self::Reference,
    ];

    /// Ordinal position of this stage, 0-7.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Service => 0,
            Self::Briefing => 1,
            Self::Quote => 2,
            Self::Payment => 3,
            Self::Production => 4,
            Self::Revision => 5,
            Self::Delivery => 6,
            Self::Reference => 7,
        }
    }

    /// Human-readable stage title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Service => "Service",
            Self::Briefing => "Briefing",
            Self::Quote => "Quote",
            Self::Payment => "Payment",
            Self::Production => "Production",
            Self::Revision => "Revision",
            Self::Delivery => "Delivery",
            Self::Reference => "Reference",
        }
    }
}

/// Display state of one stage in the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Finished, either by status rank or by stage-specific evidence
    Completed,
    /// The stage the order is at right now
    Current,
    /// Cannot start because prerequisite evidence is absent
    Blocked,
    /// Not started and not blocked
    Upcoming,
}

/// One stage of the projection, with the reason when blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSnapshot {
    /// Which stage this is
    pub stage: Stage,
    /// Its computed display state
    pub state: StageState,
    /// Why the stage is blocked, when it is
    pub blocked_reason: Option<&'static str>,
}

/// The evidence the stage projection is computed from.
///
/// Everything the projection needs is captured here, so equal inputs always
/// produce the same output and tests never depend on wall-clock or database
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageContext {
    /// The order's current status
    pub status: OrderStatus,
    /// Briefing completeness score, 0-100
    pub briefing_score: i32,
    /// Whether an initial payment confirmation milestone exists
    pub has_payment_confirmation: bool,
    /// Whether any deliverable has been handed over
    pub has_deliverables: bool,
}

impl StageContext {
    /// Builds the projection inputs from a fetched order.
    #[must_use]
    pub fn for_order(order: &order::Model, has_deliverables: bool) -> Self {
        Self {
            status: order.status,
            briefing_score: order.briefing_completeness_score,
            has_payment_confirmation: order.payment_confirmed_at.is_some(),
            has_deliverables,
        }
    }
}

/// Maps a status to its ordinal stage, 0-7.
///
/// Terminal `cancelled`/`rejected` map to 0: nothing is considered complete
/// by rank alone, only standing evidence survives.
#[must_use]
pub const fn stage_index(status: OrderStatus) -> usize {
    match status {
        OrderStatus::Cancelled | OrderStatus::Rejected => 0,
        OrderStatus::Briefing => 1,
        OrderStatus::QuoteSent | OrderStatus::QuoteApproved => 2,
        OrderStatus::AwaitingPayment => 3,
        OrderStatus::PaymentConfirmed | OrderStatus::InProduction => 4,
        OrderStatus::AwaitingClientApproval | OrderStatus::InRevision => 5,
        OrderStatus::AwaitingFinalPayment => 6,
        OrderStatus::Completed => 7,
    }
}

/// Computes the full eight-stage projection for the given evidence.
#[must_use]
pub fn project_stages(ctx: &StageContext) -> [StageSnapshot; 8] {
    Stage::ALL.map(|stage| {
        let (state, blocked_reason) = classify(stage, ctx);
        StageSnapshot {
            stage,
            state,
            blocked_reason,
        }
    })
}

/// Computes the stage projection from a raw status string.
///
/// # Errors
/// Fails with [`Error::UnknownStatus`] when the string is not one of the
/// thirteen recognized statuses. The projection is never silently defaulted.
pub fn project_stages_for(
    status: &str,
    briefing_score: i32,
    has_payment_confirmation: bool,
    has_deliverables: bool,
) -> Result<[StageSnapshot; 8]> {
    let status: OrderStatus = status.parse()?;
    Ok(project_stages(&StageContext {
        status,
        briefing_score,
        has_payment_confirmation,
        has_deliverables,
    }))
}

fn classify(stage: Stage, ctx: &StageContext) -> (StageState, Option<&'static str>) {
    let idx = stage_index(ctx.status);
    match stage {
        // A service was chosen when the order was created.
        Stage::Service => (StageState::Completed, None),

        Stage::Briefing => {
            if ctx.briefing_score >= BRIEFING_COMPLETE_SCORE || idx > Stage::Briefing.index() {
                (StageState::Completed, None)
            } else if idx == Stage::Briefing.index() {
                (StageState::Current, None)
            } else {
                (StageState::Upcoming, None)
            }
        }

        Stage::Quote => {
            // quote_approved shares ordinal 2 with quote_sent, so approval
            // counts as completion evidence on top of the ordinal rule.
            if idx > Stage::Quote.index() || ctx.status == OrderStatus::QuoteApproved {
                (StageState::Completed, None)
            } else if idx == Stage::Quote.index() {
                (StageState::Current, None)
            } else {
                (StageState::Upcoming, None)
            }
        }

        Stage::Payment => {
            if idx > Stage::Payment.index() || ctx.has_payment_confirmation {
                (StageState::Completed, None)
            } else if idx == Stage::Payment.index() {
                (StageState::Current, None)
            } else {
                (StageState::Upcoming, None)
            }
        }

        Stage::Production => {
            let before_payment = matches!(
                ctx.status,
                OrderStatus::Briefing
                    | OrderStatus::QuoteSent
                    | OrderStatus::QuoteApproved
                    | OrderStatus::AwaitingPayment
            );
            if idx > Stage::Production.index() {
                (StageState::Completed, None)
            } else if before_payment {
                (StageState::Blocked, Some("Awaiting payment confirmation"))
            } else if idx == Stage::Production.index() {
                (StageState::Current, None)
            } else {
                (StageState::Upcoming, None)
            }
        }

        Stage::Revision => {
            if idx > Stage::Revision.index() {
                (StageState::Completed, None)
            } else if idx < Stage::Revision.index() {
                (StageState::Blocked, None)
            } else {
                (StageState::Current, None)
            }
        }

        Stage::Delivery => {
            let unlocked = matches!(
                ctx.status,
                OrderStatus::AwaitingFinalPayment | OrderStatus::Completed
            );
            if ctx.status == OrderStatus::Completed && ctx.has_deliverables {
                (StageState::Completed, None)
            } else if unlocked {
                (StageState::Current, None)
            } else {
                (StageState::Blocked, Some("Awaiting final payment"))
            }
        }

        // The protocol exists from creation and the tracking link stays live
        // for the whole life of the order, terminal states included.
        Stage::Reference => (StageState::Completed, None),
    }
}

/// Read-time integrity check over the revision ledger.
///
/// The counter on the order is authoritative for numbering, so no stored
/// revision may carry a number above it. A failure here means the ledger was
/// mutated outside the transactional path and the caller must not trust
/// derived quota math.
///
/// # Errors
/// Fails with [`Error::CounterDrift`] when a stored revision number exceeds
/// the order's counter.
pub fn verify_revision_counter(
    order: &order::Model,
    revisions: &[revision::Model],
) -> Result<()> {
    let highest = revisions
        .iter()
        .map(|r| r.revision_number)
        .max()
        .unwrap_or(0);

    if order.revision_count < highest {
        return Err(Error::CounterDrift {
            order_id: order.id,
            counter: order.revision_count,
            highest,
        });
    }

    Ok(())
}

/// Condensed progress view for the public tracking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingProgress {
    /// Step reached, 0-6; terminal statuses report 0
    pub step: u8,
    /// Total number of public steps
    pub total: u8,
    /// Progress as a whole percentage
    pub percentage: u8,
}

/// Number of steps on the public tracking page.
pub const TRACKING_TOTAL_STEPS: u8 = 6;

/// Maps a status onto the condensed public tracking progress.
///
/// The public view deliberately folds the thirteen statuses into six steps so
/// clients see movement without internal detail.
#[must_use]
pub const fn tracking_progress(status: OrderStatus) -> TrackingProgress {
    let step: u8 = match status {
        OrderStatus::Cancelled | OrderStatus::Rejected => 0,
        OrderStatus::Briefing => 1,
        OrderStatus::QuoteSent | OrderStatus::QuoteApproved => 2,
        OrderStatus::AwaitingPayment | OrderStatus::PaymentConfirmed => 3,
        OrderStatus::InProduction | OrderStatus::InRevision => 4,
        OrderStatus::AwaitingClientApproval | OrderStatus::AwaitingFinalPayment => 5,
        OrderStatus::Completed => 6,
    };
    let total = TRACKING_TOTAL_STEPS;
    // Cast safety: step <= 6, so the widened quotient is in [0, 100].
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    let percentage = ((step as u16 * 100 + total as u16 / 2) / total as u16) as u8;
    TrackingProgress {
        step,
        total,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn ctx(status: OrderStatus) -> StageContext {
        StageContext {
            status,
            briefing_score: 100,
            has_payment_confirmation: false,
            has_deliverables: false,
        }
    }

    fn state_of(stages: &[StageSnapshot; 8], stage: Stage) -> StageState {
        stages[stage.index()].state
    }

    #[test]
    fn test_stage_index_table() {
        assert_eq!(stage_index(OrderStatus::Briefing), 1);
        assert_eq!(stage_index(OrderStatus::QuoteSent), 2);
        assert_eq!(stage_index(OrderStatus::QuoteApproved), 2);
        assert_eq!(stage_index(OrderStatus::AwaitingPayment), 3);
        assert_eq!(stage_index(OrderStatus::PaymentConfirmed), 4);
        assert_eq!(stage_index(OrderStatus::InProduction), 4);
        assert_eq!(stage_index(OrderStatus::AwaitingClientApproval), 5);
        assert_eq!(stage_index(OrderStatus::InRevision), 5);
        assert_eq!(stage_index(OrderStatus::AwaitingFinalPayment), 6);
        assert_eq!(stage_index(OrderStatus::Completed), 7);
        assert_eq!(stage_index(OrderStatus::Cancelled), 0);
        assert_eq!(stage_index(OrderStatus::Rejected), 0);
    }

    #[test]
    fn test_production_blocked_until_payment_confirmed() {
        // Scenario D: awaiting_payment blocks Production...
        let stages = project_stages(&ctx(OrderStatus::AwaitingPayment));
        assert_eq!(state_of(&stages, Stage::Production), StageState::Blocked);
        assert_eq!(
            stages[Stage::Production.index()].blocked_reason,
            Some("Awaiting payment confirmation")
        );

        // ...and payment_confirmed makes it current.
        let stages = project_stages(&ctx(OrderStatus::PaymentConfirmed));
        assert_eq!(state_of(&stages, Stage::Production), StageState::Current);
        assert_eq!(stages[Stage::Production.index()].blocked_reason, None);
    }

    #[test]
    fn test_briefing_completes_on_score_regardless_of_status() {
        let mut context = ctx(OrderStatus::Briefing);
        context.briefing_score = 80;
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Briefing), StageState::Completed);

        context.briefing_score = 79;
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Briefing), StageState::Current);
    }

    #[test]
    fn test_briefing_completes_by_ordinal_rank() {
        let mut context = ctx(OrderStatus::InProduction);
        context.briefing_score = 40;
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Briefing), StageState::Completed);
    }

    #[test]
    fn test_quote_approved_completes_quote_stage() {
        let stages = project_stages(&ctx(OrderStatus::QuoteSent));
        assert_eq!(state_of(&stages, Stage::Quote), StageState::Current);

        let stages = project_stages(&ctx(OrderStatus::QuoteApproved));
        assert_eq!(state_of(&stages, Stage::Quote), StageState::Completed);
    }

    #[test]
    fn test_payment_completes_on_confirmation_evidence() {
        let mut context = ctx(OrderStatus::AwaitingPayment);
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Payment), StageState::Current);

        context.has_payment_confirmation = true;
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Payment), StageState::Completed);
    }

    #[test]
    fn test_delivery_gated_on_final_payment() {
        let stages = project_stages(&ctx(OrderStatus::InProduction));
        assert_eq!(state_of(&stages, Stage::Delivery), StageState::Blocked);
        assert_eq!(
            stages[Stage::Delivery.index()].blocked_reason,
            Some("Awaiting final payment")
        );

        let stages = project_stages(&ctx(OrderStatus::AwaitingFinalPayment));
        assert_eq!(state_of(&stages, Stage::Delivery), StageState::Current);

        let mut context = ctx(OrderStatus::Completed);
        context.has_deliverables = true;
        let stages = project_stages(&context);
        assert_eq!(state_of(&stages, Stage::Delivery), StageState::Completed);
    }

    #[test]
    fn test_completed_without_files_keeps_delivery_open() {
        let stages = project_stages(&ctx(OrderStatus::Completed));
        assert_eq!(state_of(&stages, Stage::Delivery), StageState::Current);
    }

    #[test]
    fn test_revision_window() {
        let stages = project_stages(&ctx(OrderStatus::InProduction));
        assert_eq!(state_of(&stages, Stage::Revision), StageState::Blocked);

        let stages = project_stages(&ctx(OrderStatus::AwaitingClientApproval));
        assert_eq!(state_of(&stages, Stage::Revision), StageState::Current);

        let stages = project_stages(&ctx(OrderStatus::InRevision));
        assert_eq!(state_of(&stages, Stage::Revision), StageState::Current);

        let stages = project_stages(&ctx(OrderStatus::AwaitingFinalPayment));
        assert_eq!(state_of(&stages, Stage::Revision), StageState::Completed);
    }

    #[test]
    fn test_terminal_statuses_reset_ordinal_progress() {
        let mut context = ctx(OrderStatus::Cancelled);
        context.briefing_score = 50;
        let stages = project_stages(&context);

        assert_eq!(state_of(&stages, Stage::Service), StageState::Completed);
        assert_eq!(state_of(&stages, Stage::Briefing), StageState::Upcoming);
        assert_eq!(state_of(&stages, Stage::Quote), StageState::Upcoming);
        assert_eq!(state_of(&stages, Stage::Production), StageState::Upcoming);
        assert_eq!(state_of(&stages, Stage::Revision), StageState::Blocked);
        assert_eq!(state_of(&stages, Stage::Delivery), StageState::Blocked);
        // The protocol reference outlives the order.
        assert_eq!(state_of(&stages, Stage::Reference), StageState::Completed);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let context = StageContext {
            status: OrderStatus::InRevision,
            briefing_score: 85,
            has_payment_confirmation: true,
            has_deliverables: false,
        };
        assert_eq!(project_stages(&context), project_stages(&context));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = project_stages_for("em_confeccao", 100, false, false);
        assert!(matches!(
            result.unwrap_err(),
            Error::UnknownStatus { value } if value == "em_confeccao"
        ));
    }

    #[test]
    fn test_projection_from_raw_status() -> Result<()> {
        let stages = project_stages_for("awaiting_payment", 100, false, false)?;
        assert_eq!(state_of(&stages, Stage::Payment), StageState::Current);
        Ok(())
    }

    #[test]
    fn test_tracking_progress_steps() {
        assert_eq!(tracking_progress(OrderStatus::Briefing).step, 1);
        assert_eq!(tracking_progress(OrderStatus::Briefing).percentage, 17);
        assert_eq!(tracking_progress(OrderStatus::InProduction).step, 4);
        assert_eq!(tracking_progress(OrderStatus::Completed).percentage, 100);
        assert_eq!(tracking_progress(OrderStatus::Cancelled).step, 0);
        assert_eq!(tracking_progress(OrderStatus::Cancelled).percentage, 0);
    }

    #[tokio::test]
    async fn test_verify_revision_counter_detects_drift() -> Result<()> {
        let (db, order) = setup_with_order().await?;

        // Consistent: no revisions yet.
        verify_revision_counter(&order, &[])?;

        // A row numbered above the counter means the ledger drifted.
        let revision = create_test_revision(&db, order.id, 3).await?;
        let result = verify_revision_counter(&order, &[revision]);
        assert!(matches!(
            result.unwrap_err(),
            Error::CounterDrift {
                counter: 0,
                highest: 3,
                ..
            }
        ));

        Ok(())
    }
}
