//! Activity timeline read-model.
//!
//! Merges the entries emitted by the ledgers into one chronological feed for
//! display: newest first, labeled and iconed per action key, color-tagged per
//! actor. Unknown action keys fall back to the raw key and a generic icon
//! instead of failing - the action vocabulary is open-ended by design.

use crate::entities::{ActorType, activity};

/// One rendered entry of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    /// Human-readable label for the action
    pub label: String,
    /// Icon name for the action
    pub icon: &'static str,
    /// Color tag for the actor badge
    pub color: &'static str,
    /// The underlying log entry
    pub entry: activity::Model,
}

/// The merged, truncated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Entries to display, newest first
    pub items: Vec<TimelineItem>,
    /// How many older entries were cut by `max_items` ("+N more")
    pub hidden_count: usize,
}

/// Label for a known action key; `None` for keys outside the vocabulary.
#[must_use]
pub fn known_action_label(action: &str) -> Option<&'static str> {
    let label = match action {
        "order_created" => "Order created",
        "quote_sent" => "Quote sent",
        "quote_approved" => "Quote approved",
        "quote_rejected" => "Quote rejected",
        "payment_confirmed" => "Payment confirmed",
        "payment_self_reported" => "Payment reported by client",
        "payment_proof_attached" => "Payment proof attached",
        "production_started" => "Production started",
        "revision_requested" => "Revision requested",
        "revision_extra_requested" => "Extra revision requested",
        "revision_in_progress" => "Revision in progress",
        "revision_completed" => "Revision completed",
        "revision_rejected" => "Revision rejected",
        "partial_deliverable_added" => "Partial deliverable added",
        "final_deliverable_added" => "Final deliverable added",
        "deliverable_downloaded" => "File downloaded by client",
        "installments_created" => "Installment plan created",
        "installment_paid" => "Installment paid",
        "delivery_sent" => "Delivery sent",
        "delivery_revoked" => "Delivery revoked",
        "status_changed" => "Status changed",
        "order_archived" => "Order archived",
        _ => return None,
    };
    Some(label)
}

/// Icon name for an action key, with a generic fallback for unknown keys.
#[must_use]
pub fn action_icon(action: &str) -> &'static str {
    match action {
        "order_created" => "Plus",
        "quote_sent" => "Send",
        "quote_approved" => "CheckCircle",
        "quote_rejected" => "XCircle",
        "payment_confirmed" => "DollarSign",
        "payment_self_reported" => "HandCoins",
        "payment_proof_attached" => "Paperclip",
        "production_started" => "Play",
        "revision_requested" => "RotateCcw",
        "revision_extra_requested" => "AlertTriangle",
        "revision_in_progress" => "Clock",
        "revision_completed" => "CheckCircle",
        "revision_rejected" => "XCircle",
        "partial_deliverable_added" => "FileUp",
        "final_deliverable_added" => "PackageCheck",
        "deliverable_downloaded" => "Download",
        "installments_created" => "CreditCard",
        "installment_paid" => "BadgeCheck",
        "delivery_sent" => "Mail",
        "delivery_revoked" => "Ban",
        "status_changed" => "ArrowRightLeft",
        "order_archived" => "Archive",
        _ => "Activity",
    }
}

/// Color tag for an actor badge.
#[must_use]
pub const fn actor_color(actor: ActorType) -> &'static str {
    match actor {
        ActorType::Admin => "lime",
        ActorType::Client => "blue",
        ActorType::System => "gray",
    }
}

/// Builds the display feed from raw log entries.
///
/// Entries may come pre-fetched from any number of queries; they are merged
/// and sorted by `created_at` descending here. With `max_items`, older
/// entries are cut and counted in `hidden_count` for a "+N more" footer.
#[must_use]
pub fn build_timeline(mut entries: Vec<activity::Model>, max_items: Option<usize>) -> Timeline {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = entries.len();
    let shown = max_items.map_or(total, |limit| limit.min(total));
    entries.truncate(shown);

    let items = entries
        .into_iter()
        .map(|entry| TimelineItem {
            label: known_action_label(&entry.action)
                .map_or_else(|| entry.action.clone(), str::to_string),
            icon: action_icon(&entry.action),
            color: actor_color(entry.actor_type),
            entry,
        })
        .collect();

    Timeline {
        items,
        hidden_count: total - shown,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_entries_sorted_newest_first() {
        let entries = vec![
            activity_fixture(1, "order_created", ActorType::System, utc(2024, 1, 1)),
            activity_fixture(2, "installment_paid", ActorType::Admin, utc(2024, 1, 3)),
            activity_fixture(3, "quote_sent", ActorType::Admin, utc(2024, 1, 2)),
        ];

        let timeline = build_timeline(entries, None);
        let actions: Vec<&str> = timeline
            .items
            .iter()
            .map(|i| i.entry.action.as_str())
            .collect();
        assert_eq!(actions, ["installment_paid", "quote_sent", "order_created"]);
        assert_eq!(timeline.hidden_count, 0);
    }

    #[test]
    fn test_truncation_counts_hidden_entries() {
        let entries = (0..5)
            .map(|i| activity_fixture(i, "status_changed", ActorType::System, utc(2024, 1, 1)))
            .collect();

        let timeline = build_timeline(entries, Some(2));
        assert_eq!(timeline.items.len(), 2);
        assert_eq!(timeline.hidden_count, 3);
    }

    #[test]
    fn test_truncation_larger_than_feed() {
        let entries = vec![activity_fixture(
            1,
            "order_created",
            ActorType::System,
            utc(2024, 1, 1),
        )];
        let timeline = build_timeline(entries, Some(10));
        assert_eq!(timeline.items.len(), 1);
        assert_eq!(timeline.hidden_count, 0);
    }

    #[test]
    fn test_unknown_action_falls_back() {
        let entries = vec![activity_fixture(
            1,
            "nps_submitted",
            ActorType::Client,
            utc(2024, 1, 1),
        )];
        let timeline = build_timeline(entries, None);

        // Unknown keys keep their raw label and get the generic icon.
        assert_eq!(timeline.items[0].label, "nps_submitted");
        assert_eq!(timeline.items[0].icon, "Activity");
    }

    #[test]
    fn test_labels_and_colors() {
        assert_eq!(known_action_label("installment_paid"), Some("Installment paid"));
        assert_eq!(known_action_label("made_up_key"), None);
        assert_eq!(action_icon("deliverable_downloaded"), "Download");
        assert_eq!(actor_color(ActorType::Admin), "lime");
        assert_eq!(actor_color(ActorType::Client), "blue");
        assert_eq!(actor_color(ActorType::System), "gray");
    }
}
