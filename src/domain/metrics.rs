//! Dashboard headline counts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Ticket, TicketStatus};

/// Ticket counts shown above the KPI grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketOverview {
    /// All tickets in scope.
    pub total: usize,
    /// Open or in progress.
    pub open: usize,
    pub pending: usize,
    /// Resolved or closed.
    pub resolved: usize,
    pub escalated: usize,
    pub unassigned: usize,
    /// Tickets with a missed SLA.
    pub breached: usize,
}

impl TicketOverview {
    /// Count tickets in a single pass.
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(
            Self {
                total: tickets.len(),
                ..Self::default()
            },
            |mut acc, t| {
                if t.status.is_active() {
                    acc.open += 1;
                }
                if t.status == TicketStatus::Pending {
                    acc.pending += 1;
                }
                if t.status.is_resolved() {
                    acc.resolved += 1;
                }
                if t.escalated {
                    acc.escalated += 1;
                }
                if t.assignee.is_none() {
                    acc.unassigned += 1;
                }
                if t.sla_breached {
                    acc.breached += 1;
                }
                acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    #[test]
    fn test_overview_counts() {
        let reporter = User::new("c1", "Customer");
        let tickets = vec![
            Ticket::new("1", "SUP-1", "a", reporter.clone()),
            Ticket::new("2", "SUP-2", "b", reporter.clone())
                .with_status(TicketStatus::InProgress)
                .with_assignee(User::new("a1", "Agent")),
            Ticket::new("3", "SUP-3", "c", reporter.clone()).with_status(TicketStatus::Pending),
            Ticket::new("4", "SUP-4", "d", reporter.clone())
                .with_status(TicketStatus::Closed)
                .escalated_times(1)
                .with_sla(2, true),
        ];

        let overview = TicketOverview::from_tickets(&tickets);

        assert_eq!(overview.total, 4);
        assert_eq!(overview.open, 2);
        assert_eq!(overview.pending, 1);
        assert_eq!(overview.resolved, 1);
        assert_eq!(overview.escalated, 1);
        assert_eq!(overview.unassigned, 3);
        assert_eq!(overview.breached, 1);
    }

    #[test]
    fn test_overview_of_nothing() {
        assert_eq!(TicketOverview::from_tickets(&[]), TicketOverview::default());
    }
}
