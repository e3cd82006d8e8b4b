//! KPI Aggregator - turns a ticket collection into the seven KPIs.
//!
//! Every indicator follows the same shape: pick the relevant subset,
//! compute a scalar, classify it against the category thresholds and
//! package it. Empty subsets yield a value of 0, never an error.

use chrono::{DateTime, Utc};

use crate::config::KpiConfig;
use crate::domain::{Kpi, KpiCategory, Ticket};

/// Stateless KPI calculator.
#[derive(Debug, Clone)]
pub struct KpiAggregator {
    /// Upper bound (inclusive) for a reply to count as fast.
    fast_reply_minutes: f64,
}

impl Default for KpiAggregator {
    fn default() -> Self {
        Self::new(KpiConfig::default())
    }
}

impl KpiAggregator {
    pub fn new(config: KpiConfig) -> Self {
        Self {
            fast_reply_minutes: config.fast_reply_minutes,
        }
    }

    /// Compute all KPIs in the fixed category order.
    pub fn aggregate(&self, tickets: &[Ticket]) -> Vec<Kpi> {
        self.aggregate_at(tickets, Utc::now())
    }

    /// Same as [`aggregate`](Self::aggregate) with an explicit timestamp.
    pub fn aggregate_at(&self, tickets: &[Ticket], at: DateTime<Utc>) -> Vec<Kpi> {
        let kpis: Vec<Kpi> = KpiCategory::ALL
            .iter()
            .map(|&category| self.calculate(category, tickets, at))
            .collect();

        tracing::debug!(
            tickets = tickets.len(),
            statuses = ?kpis.iter().map(|k| (k.category, k.status)).collect::<Vec<_>>(),
            "KPIs calculated"
        );

        kpis
    }

    /// Compute a single KPI.
    pub fn calculate(&self, category: KpiCategory, tickets: &[Ticket], at: DateTime<Utc>) -> Kpi {
        let (value, data_points) = match category {
            KpiCategory::Frt => self.first_response_time(tickets),
            KpiCategory::Ttr => self.time_to_resolve(tickets),
            KpiCategory::SlaCompliance => self.sla_compliance(tickets),
            KpiCategory::SlaAverage => self.sla_average(tickets),
            KpiCategory::Fcr => self.first_contact_resolution(tickets),
            KpiCategory::Frrt => self.fast_reply_rate(tickets),
            KpiCategory::Escalations => self.escalation_rate(tickets),
        };

        Kpi::from_value(category, value, data_points, at)
    }

    /// Mean first-response time in hours over tickets that have one.
    fn first_response_time(&self, tickets: &[Ticket]) -> (f64, usize) {
        let (mean, n) = mean(tickets.iter().filter_map(|t| t.first_response_time));
        (mean / 60.0, n)
    }

    /// Mean resolution time in hours over tickets that have one.
    fn time_to_resolve(&self, tickets: &[Ticket]) -> (f64, usize) {
        let (mean, n) = mean(tickets.iter().filter_map(|t| t.resolution_time));
        (mean / 60.0, n)
    }

    /// Share of tickets without an SLA breach.
    fn sla_compliance(&self, tickets: &[Ticket]) -> (f64, usize) {
        let compliant = tickets.iter().filter(|t| !t.sla_breached).count();
        (percentage(compliant, tickets.len()), tickets.len())
    }

    /// Mean star rating over all tickets.
    fn sla_average(&self, tickets: &[Ticket]) -> (f64, usize) {
        mean(tickets.iter().map(|t| f64::from(t.sla_compliance)))
    }

    /// Share of resolved/closed tickets solved on first contact.
    fn first_contact_resolution(&self, tickets: &[Ticket]) -> (f64, usize) {
        let (resolved, first_contact) = tickets
            .iter()
            .filter(|t| t.status.is_resolved())
            .fold((0, 0), |(n, hits), t| {
                (n + 1, hits + usize::from(t.resolved_on_first_contact))
            });
        (percentage(first_contact, resolved), resolved)
    }

    /// Share of answered tickets answered within the fast reply window.
    fn fast_reply_rate(&self, tickets: &[Ticket]) -> (f64, usize) {
        let (answered, fast) = tickets
            .iter()
            .filter_map(|t| t.first_response_time)
            .fold((0, 0), |(n, hits), minutes| {
                (n + 1, hits + usize::from(minutes <= self.fast_reply_minutes))
            });
        (percentage(fast, answered), answered)
    }

    /// Share of escalated tickets.
    fn escalation_rate(&self, tickets: &[Ticket]) -> (f64, usize) {
        let escalated = tickets.iter().filter(|t| t.escalated).count();
        (percentage(escalated, tickets.len()), tickets.len())
    }
}

/// Mean and sample size; 0 for an empty sample.
fn mean(values: impl Iterator<Item = f64>) -> (f64, usize) {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        (0.0, 0)
    } else {
        (sum / n as f64, n)
    }
}

/// `part / whole` as a percentage; 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
