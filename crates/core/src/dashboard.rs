//! Dashboard statistics over a tenant's clients.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::client::{Client, DEFAULT_EXPIRING_THRESHOLD_DAYS, Server};
use crate::subscription::{days_remaining, ClientPlan, UrgencyBucket};
use crate::{Error, Result};

/// Price of one term, in cents.
pub fn plan_price_cents(plan: ClientPlan) -> u64 {
    match plan {
        ClientPlan::Monthly => 2_990,
        ClientPlan::Annual => 29_990,
    }
}

/// A calendar month used to filter clients by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Invalid month '{}', expected YYYY-MM", raw));
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if year < 1 || !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UrgencyCounts {
    pub critical: usize,
    pub warning: usize,
    pub good: usize,
    pub excellent: usize,
}

impl UrgencyCounts {
    fn record(&mut self, bucket: UrgencyBucket) {
        match bucket {
            UrgencyBucket::Critical => self.critical += 1,
            UrgencyBucket::Warning => self.warning += 1,
            UrgencyBucket::Good => self.good += 1,
            UrgencyBucket::Excellent => self.excellent += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub total_clients: usize,
    pub active_clients: usize,
    pub inactive_clients: usize,
    pub monthly_clients: usize,
    pub annual_clients: usize,
    pub clients_by_server: BTreeMap<Server, usize>,
    pub revenue_cents: u64,
    pub urgency: UrgencyCounts,
    pub expiring_clients: usize,
    pub available_months: Vec<String>,
}

impl DashboardStats {
    /// Aggregate `clients` as of `now`, optionally restricted to those whose
    /// start date falls in `month`. `availableMonths` always spans all clients.
    pub fn compute(clients: &[Client], now: DateTime<Utc>, month: Option<MonthKey>) -> Self {
        let available_months = clients
            .iter()
            .map(|c| MonthKey::of(c.start_date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|key| key.to_string())
            .collect();

        let mut stats = Self {
            month: month.map(|key| key.to_string()),
            total_clients: 0,
            active_clients: 0,
            inactive_clients: 0,
            monthly_clients: 0,
            annual_clients: 0,
            clients_by_server: BTreeMap::new(),
            revenue_cents: 0,
            urgency: UrgencyCounts::default(),
            expiring_clients: 0,
            available_months,
        };

        for client in clients
            .iter()
            .filter(|c| month.map_or(true, |key| MonthKey::of(c.start_date) == key))
        {
            stats.total_clients += 1;
            if client.is_active() {
                stats.active_clients += 1;
            } else {
                stats.inactive_clients += 1;
            }
            match client.plan {
                ClientPlan::Monthly => stats.monthly_clients += 1,
                ClientPlan::Annual => stats.annual_clients += 1,
            }
            *stats.clients_by_server.entry(client.server).or_default() += 1;
            stats.revenue_cents += plan_price_cents(client.plan);

            let days = days_remaining(client.expiration_date, now);
            stats.urgency.record(UrgencyBucket::from_days_remaining(days));
            if client.is_active() && days <= DEFAULT_EXPIRING_THRESHOLD_DAYS {
                stats.expiring_clients += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientFields, ClientStatus};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn client(server: Server, plan: ClientPlan, start: (i32, u32, u32), status: ClientStatus) -> Client {
        Client::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            ClientFields {
                name: "Client".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                server,
                plan,
                start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
                status,
            },
        )
    }

    fn sample() -> Vec<Client> {
        vec![
            client(Server::Unitv, ClientPlan::Monthly, (2024, 1, 15), ClientStatus::Active),
            client(Server::Unitv, ClientPlan::Annual, (2023, 12, 1), ClientStatus::Active),
            client(Server::Neko, ClientPlan::Monthly, (2024, 1, 1), ClientStatus::Active),
            client(Server::Blade, ClientPlan::Monthly, (2024, 2, 1), ClientStatus::Inactive),
        ]
    }

    #[test]
    fn totals_revenue_and_servers() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let stats = DashboardStats::compute(&sample(), now, None);

        assert_eq!(stats.total_clients, 4);
        assert_eq!(stats.active_clients, 3);
        assert_eq!(stats.inactive_clients, 1);
        assert_eq!(stats.monthly_clients, 3);
        assert_eq!(stats.annual_clients, 1);
        assert_eq!(stats.revenue_cents, 3 * 2_990 + 29_990);
        assert_eq!(stats.clients_by_server[&Server::Unitv], 2);
        assert_eq!(stats.clients_by_server[&Server::Neko], 1);
        assert!(!stats.clients_by_server.contains_key(&Server::Lion));
        assert_eq!(stats.available_months, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn urgency_and_expiring_counts() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let stats = DashboardStats::compute(&sample(), now, None);

        // Expirations: 02-15 (26d), 2024-12-01 (>90d), 02-01 (12d), 03-01 (41d, inactive).
        assert_eq!(
            stats.urgency,
            UrgencyCounts {
                critical: 0,
                warning: 2,
                good: 1,
                excellent: 1,
            }
        );
        assert_eq!(stats.expiring_clients, 2);
    }

    #[test]
    fn month_filter_restricts_counts_but_not_available_months() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let month = MonthKey::parse("2024-01").unwrap();
        let stats = DashboardStats::compute(&sample(), now, Some(month));

        assert_eq!(stats.month.as_deref(), Some("2024-01"));
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.revenue_cents, 2 * 2_990);
        assert_eq!(stats.available_months.len(), 3);
    }

    #[test]
    fn month_key_parsing() {
        assert_eq!(MonthKey::parse("2024-03").unwrap().to_string(), "2024-03");
        assert!(MonthKey::parse("2024-13").is_err());
        assert!(MonthKey::parse("march").is_err());
    }

    #[test]
    fn servers_serialize_as_map_keys() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let value = serde_json::to_value(DashboardStats::compute(&sample(), now, None)).unwrap();
        assert_eq!(value["clientsByServer"]["UNITV"], 2);
        assert_eq!(value["revenueCents"], 38_960);
    }
}
