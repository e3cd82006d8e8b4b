//! Ticket Filter - narrows a ticket collection by AND-combined criteria.

use crate::domain::{Ticket, TicketFilters};

/// Stateless ticket filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketFilter;

impl TicketFilter {
    pub fn new() -> Self {
        Self
    }

    /// Return the tickets matching every present criterion.
    ///
    /// Input order is preserved and the input is left untouched.
    pub fn apply(&self, tickets: &[Ticket], filters: &TicketFilters) -> Vec<Ticket> {
        if filters.is_empty() {
            return tickets.to_vec();
        }

        let kept: Vec<Ticket> = tickets
            .iter()
            .filter(|t| self.matches(t, filters))
            .cloned()
            .collect();

        tracing::debug!(
            input = tickets.len(),
            kept = kept.len(),
            filters = ?filters,
            "Tickets filtered"
        );

        kept
    }

    /// Whether a single ticket satisfies the criteria.
    pub fn matches(&self, ticket: &Ticket, filters: &TicketFilters) -> bool {
        if let Some(statuses) = filters.status.as_deref().filter(|s| !s.is_empty()) {
            if !statuses.contains(&ticket.status) {
                return false;
            }
        }

        if let Some(priorities) = filters.priority.as_deref().filter(|p| !p.is_empty()) {
            if !priorities.contains(&ticket.priority) {
                return false;
            }
        }

        if let Some(assignees) = filters.assignee.as_deref().filter(|a| !a.is_empty()) {
            // Unassigned tickets never match an assignee criterion
            match ticket.assignee_id() {
                Some(id) if assignees.iter().any(|a| a == id) => {}
                _ => return false,
            }
        }

        if let Some(range) = &filters.date_range {
            if !range.contains(ticket.created_at) {
                return false;
            }
        }

        if let Some(sprint) = filters.sprint.as_deref().filter(|s| !s.is_empty()) {
            if ticket.sprint.as_deref() != Some(sprint) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateRange, Priority, TicketStatus, User};
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, 9, 0, 0).unwrap()
    }

    fn ticket(n: u32, status: TicketStatus, priority: Priority) -> Ticket {
        Ticket::new(n.to_string(), format!("SUP-{}", n), "t", User::new("c", "Customer"))
            .with_status(status)
            .with_priority(priority)
            .created(day(n))
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket(1, TicketStatus::Open, Priority::High)
                .with_assignee(User::new("ana", "Ana"))
                .with_sprint("Week 18"),
            ticket(2, TicketStatus::Resolved, Priority::Low).with_assignee(User::new("bo", "Bo")),
            ticket(3, TicketStatus::Closed, Priority::Highest).with_sprint("Week 18"),
            ticket(4, TicketStatus::Pending, Priority::High).with_assignee(User::new("ana", "Ana")),
            ticket(5, TicketStatus::Open, Priority::Medium),
        ]
    }

    fn keys(tickets: &[Ticket]) -> Vec<&str> {
        tickets.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_matches_all() {
        let tickets = sample();
        let out = TicketFilter::new().apply(&tickets, &TicketFilters::default());
        assert_eq!(out, tickets);
    }

    #[test]
    fn test_empty_lists_behave_as_absent() {
        let tickets = sample();
        let filters = TicketFilters::default()
            .with_status(vec![])
            .with_priority(vec![])
            .with_assignees(vec![]);

        assert_eq!(TicketFilter::new().apply(&tickets, &filters), tickets);
    }

    #[test]
    fn test_status_membership() {
        let filters =
            TicketFilters::default().with_status(vec![TicketStatus::Resolved, TicketStatus::Closed]);
        let out = TicketFilter::new().apply(&sample(), &filters);
        assert_eq!(keys(&out), vec!["SUP-2", "SUP-3"]);
    }

    #[test]
    fn test_assignee_excludes_unassigned() {
        let filters = TicketFilters::default().with_assignees(vec!["ana".to_string()]);
        let out = TicketFilter::new().apply(&sample(), &filters);
        assert_eq!(keys(&out), vec!["SUP-1", "SUP-4"]);
    }

    #[test]
    fn test_sprint_exact_match() {
        let filters = TicketFilters::default().with_sprint("Week 18");
        let out = TicketFilter::new().apply(&sample(), &filters);
        assert_eq!(keys(&out), vec!["SUP-1", "SUP-3"]);

        let filters = TicketFilters::default().with_sprint("week 18");
        assert!(TicketFilter::new().apply(&sample(), &filters).is_empty());
    }

    #[test]
    fn test_priority_and_inclusive_date_range() {
        let range = DateRange::new(day(1), day(4)).unwrap();
        let filters = TicketFilters::default()
            .with_priority(vec![Priority::High, Priority::Highest])
            .with_date_range(range);

        let out = TicketFilter::new().apply(&sample(), &filters);
        // SUP-1 and SUP-4 sit exactly on the window edges
        assert_eq!(keys(&out), vec!["SUP-1", "SUP-3", "SUP-4"]);
    }

    #[test]
    fn test_composition_equals_conjunction() {
        let filter = TicketFilter::new();
        let tickets = sample();
        let by_status = TicketFilters::default().with_status(vec![TicketStatus::Open]);
        let by_priority = TicketFilters::default().with_priority(vec![Priority::High]);
        let both = TicketFilters::default()
            .with_status(vec![TicketStatus::Open])
            .with_priority(vec![Priority::High]);

        let chained = filter.apply(&filter.apply(&tickets, &by_status), &by_priority);
        assert_eq!(chained, filter.apply(&tickets, &both));
        assert_eq!(keys(&chained), vec!["SUP-1"]);
    }

    #[test]
    fn test_result_is_subset_and_input_untouched() {
        let tickets = sample();
        let before = tickets.clone();
        let filters = TicketFilters::default().with_status(vec![TicketStatus::Open]);

        let out = TicketFilter::new().apply(&tickets, &filters);

        assert!(out.iter().all(|t| tickets.contains(t)));
        assert_eq!(tickets, before);
    }
}
