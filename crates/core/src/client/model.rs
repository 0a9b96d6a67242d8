//! Client model definitions

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subscription::{checked_expiration, compute_expiration, ClientPlan};
use crate::{Error, Result};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

/// Whether a client is currently being served. Set by users only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl Default for ClientStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl FromStr for ClientStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(Error::Validation(format!("Unsupported status '{}'", value))),
        }
    }
}

/// Provider a client is hosted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Server {
    Unitv,
    Strong,
    Lion,
    Tivione,
    Latino,
    Magis,
    Pfast,
    Blade,
    Uniplay,
    Warez,
    Neko,
}

impl Server {
    pub const ALL: [Server; 11] = [
        Self::Unitv,
        Self::Strong,
        Self::Lion,
        Self::Tivione,
        Self::Latino,
        Self::Magis,
        Self::Pfast,
        Self::Blade,
        Self::Uniplay,
        Self::Warez,
        Self::Neko,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unitv => "UNITV",
            Self::Strong => "STRONG",
            Self::Lion => "LION",
            Self::Tivione => "TIVIONE",
            Self::Latino => "LATINO",
            Self::Magis => "MAGIS",
            Self::Pfast => "PFAST",
            Self::Blade => "BLADE",
            Self::Uniplay => "UNIPLAY",
            Self::Warez => "WAREZ",
            Self::Neko => "NEKO",
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Server {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|server| server.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("Unknown server '{}'", value)))
    }
}

/// A tenant's subscriber record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub server: Server,
    pub plan: ClientPlan,
    pub status: ClientStatus,
    pub start_date: NaiveDate,
    /// Always `start_date` advanced by one term of `plan`.
    pub expiration_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(tenant_id: Uuid, created_by: Uuid, fields: ClientFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            expiration_date: compute_expiration(fields.start_date, fields.plan),
            name: fields.name,
            email: fields.email,
            server: fields.server,
            plan: fields.plan,
            status: fields.status,
            start_date: fields.start_date,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every mutable field and re-derive the expiration date.
    pub fn apply(&mut self, fields: ClientFields) {
        self.expiration_date = compute_expiration(fields.start_date, fields.plan);
        self.name = fields.name;
        self.email = fields.email;
        self.server = fields.server;
        self.plan = fields.plan;
        self.status = fields.status;
        self.start_date = fields.start_date;
    }

    pub fn is_active(&self) -> bool {
        self.status == ClientStatus::Active
    }
}

/// Validated, user-editable client fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFields {
    pub name: String,
    pub email: String,
    pub server: Server,
    pub plan: ClientPlan,
    pub start_date: NaiveDate,
    pub status: ClientStatus,
}

/// Client fields as submitted by a caller, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ClientDraft {
    pub fn validate(&self) -> Result<ClientFields> {
        let name = required(&self.name, "name")?.to_string();

        let email = required(&self.email, "email")?.to_lowercase();
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(Error::Validation(format!("Invalid email '{}'", email)));
        }

        let server = required(&self.server, "server")?.parse::<Server>()?;
        let plan = required(&self.plan, "plan")?.parse::<ClientPlan>()?;
        let start_date = parse_start_date(required(&self.start_date, "startDate")?)?;
        ensure_term_in_range(start_date, plan)?;
        let status = match self.status.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<ClientStatus>()?,
            _ => ClientStatus::default(),
        };

        Ok(ClientFields {
            name,
            email,
            server,
            plan,
            start_date,
            status,
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation(format!("Field '{}' is required", field)))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 instant, keeping the UTC date.
fn parse_start_date(raw: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc).date_naive())
        .map_err(|_| Error::Validation(format!("Invalid startDate '{}'", raw)))
}

fn ensure_term_in_range(start_date: NaiveDate, plan: ClientPlan) -> Result<()> {
    checked_expiration(start_date, plan).map(|_| ()).ok_or_else(|| {
        Error::Validation(format!(
            "startDate {} is too late for a {} plan",
            start_date, plan
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ClientDraft {
        ClientDraft {
            name: Some("  Joan Silva ".to_string()),
            email: Some("Joan@Email.com".to_string()),
            server: Some("unitv".to_string()),
            plan: Some("MONTHLY".to_string()),
            start_date: Some("2024-01-15".to_string()),
            status: None,
        }
    }

    #[test]
    fn valid_draft_is_normalized() {
        let fields = draft().validate().unwrap();
        assert_eq!(fields.name, "Joan Silva");
        assert_eq!(fields.email, "joan@email.com");
        assert_eq!(fields.server, Server::Unitv);
        assert_eq!(fields.plan, ClientPlan::Monthly);
        assert_eq!(fields.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(fields.status, ClientStatus::Active);
    }

    #[test]
    fn missing_fields_are_named() {
        let cases: [(&str, fn(&mut ClientDraft)); 5] = [
            ("name", |d| d.name = None),
            ("email", |d| d.email = Some(" ".to_string())),
            ("server", |d| d.server = None),
            ("plan", |d| d.plan = None),
            ("startDate", |d| d.start_date = None),
        ];
        for (field, mutate) in cases {
            let mut candidate = draft();
            mutate(&mut candidate);
            match candidate.validate() {
                Err(Error::Validation(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("expected validation error for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut bad_email = draft();
        bad_email.email = Some("not-an-email".to_string());
        assert!(matches!(bad_email.validate(), Err(Error::Validation(_))));

        let mut bad_server = draft();
        bad_server.server = Some("Server 9".to_string());
        assert!(matches!(bad_server.validate(), Err(Error::Validation(_))));

        let mut bad_date = draft();
        bad_date.start_date = Some("15/01/2024".to_string());
        assert!(matches!(bad_date.validate(), Err(Error::Validation(_))));

        let mut bad_status = draft();
        bad_status.status = Some("PAUSED".to_string());
        assert!(matches!(bad_status.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn start_date_without_representable_expiration_is_rejected() {
        assert!(matches!(
            ensure_term_in_range(NaiveDate::MAX, ClientPlan::Monthly),
            Err(Error::Validation(_))
        ));
        let late = NaiveDate::MAX - chrono::Months::new(6);
        assert!(ensure_term_in_range(late, ClientPlan::Monthly).is_ok());
        assert!(matches!(
            ensure_term_in_range(late, ClientPlan::Annual),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rfc3339_start_date_keeps_utc_date() {
        let mut candidate = draft();
        candidate.start_date = Some("2024-03-10T23:30:00-03:00".to_string());
        let fields = candidate.validate().unwrap();
        assert_eq!(fields.start_date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn new_client_derives_expiration() {
        let fields = draft().validate().unwrap();
        let client = Client::new(Uuid::new_v4(), Uuid::new_v4(), fields);
        assert_eq!(client.expiration_date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert!(client.is_active());
    }

    #[test]
    fn apply_recomputes_expiration() {
        let mut client = Client::new(Uuid::new_v4(), Uuid::new_v4(), draft().validate().unwrap());
        let mut annual = draft();
        annual.plan = Some("annual".to_string());
        client.apply(annual.validate().unwrap());
        assert_eq!(client.plan, ClientPlan::Annual);
        assert_eq!(client.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn dates_serialize_without_time_component() {
        let client = Client::new(Uuid::new_v4(), Uuid::new_v4(), draft().validate().unwrap());
        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(value["startDate"], "2024-01-15");
        assert_eq!(value["expirationDate"], "2024-02-15");
        assert_eq!(value["plan"], "MONTHLY");
        assert_eq!(value["server"], "UNITV");
    }
}
