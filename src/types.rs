use serde::{Deserialize, Serialize};

/// Placeholder organization identity stamped on created incidents until
/// real authentication lands.
pub const DEFAULT_ORG_ID: &str = "24bae8af-2d39-4a91-ab94-59be032a8e23";

/// Placeholder reporter identity stamped on created incidents.
pub const DEFAULT_REPORTER_ID: &str = "a3204998-c81b-487b-9763-bcf58e80da4d";

/// Incident impact level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a stored severity string, defaulting to `Medium` for
    /// anything unrecognized.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("low") => Severity::Low,
            Some("high") => Severity::High,
            Some("critical") => Severity::Critical,
            _ => Severity::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Incident lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl Status {
    /// Parse a stored status string, defaulting to `Open` for anything
    /// unrecognized.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("investigating") => Status::Investigating,
            Some("resolved") => Status::Resolved,
            Some("closed") => Status::Closed,
            _ => Status::Open,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Open => write!(f, "open"),
            Status::Investigating => write!(f, "investigating"),
            Status::Resolved => write!(f, "resolved"),
            Status::Closed => write!(f, "closed"),
        }
    }
}

/// An incident row as stored in the hosted store.
///
/// Every field is optional because rows predate schema migrations; the
/// accessors below encode the default-fill rules so callers never reach
/// into raw options. Severity and status are kept as raw strings here so
/// a single malformed row cannot fail a whole fetch; they are parsed
/// (with defaults) at the read boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

impl Incident {
    /// Effective identifier: `incident_id`, falling back to the store row
    /// `id`, then `"unknown"`.
    pub fn effective_id(&self) -> &str {
        self.incident_id
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unknown")
    }

    /// Whether this row carries a soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn severity(&self) -> Severity {
        Severity::parse_or_default(self.severity.as_deref())
    }

    pub fn status(&self) -> Status {
        Status::parse_or_default(self.status.as_deref())
    }

    /// Convert to the frontend wire shape, applying default fills.
    pub fn to_view(&self) -> IncidentView {
        let now = || chrono::Utc::now().to_rfc3339();
        let created_at = self
            .created_at
            .clone()
            .or_else(|| self.timestamp.clone())
            .unwrap_or_else(now);
        let updated_at = self
            .updated_at
            .clone()
            .or_else(|| self.timestamp.clone())
            .unwrap_or_else(now);

        IncidentView {
            id: self.effective_id().to_string(),
            title: self.title.clone().unwrap_or_else(|| "Untitled".to_string()),
            description: self.description.clone().unwrap_or_default(),
            severity: self.severity(),
            status: self.status(),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            created_at,
            updated_at,
            timeline: Vec::new(),
            ai_insights: Vec::new(),
        }
    }
}

/// Incident in the shape the frontend consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: Status,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
    pub timeline: Vec<serde_json::Value>,
    pub ai_insights: Vec<String>,
}
