//! Wedding entity
//!
//! A wedding site project owned by one admin. Status changes go through the
//! methods here so the lifecycle rules hold regardless of the caller:
//!
//! ```text
//! DRAFT <-> READY --publish--> PUBLISHED --upgrade--> PUBLISHED
//!   \________\____________________\______archive_____> ARCHIVED
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::DomainError;

/// Wedding lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeddingStatus {
    Draft,
    Ready,
    Published,
    Archived,
}

impl WeddingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeddingStatus::Draft => "DRAFT",
            WeddingStatus::Ready => "READY",
            WeddingStatus::Published => "PUBLISHED",
            WeddingStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for WeddingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeddingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(WeddingStatus::Draft),
            "READY" => Ok(WeddingStatus::Ready),
            "PUBLISHED" => Ok(WeddingStatus::Published),
            "ARCHIVED" => Ok(WeddingStatus::Archived),
            other => Err(format!("unknown wedding status '{}'", other)),
        }
    }
}

/// URL slug: lower-case ASCII letters, digits, hyphens and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and lower-case a slug
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let slug = raw.trim().to_lowercase();
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DomainError::InvalidSlug);
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slug::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

/// Wedding project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedding {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub title: String,
    pub slug: Slug,
    status: WeddingStatus,
    pub selected_design_key: Option<String>,
    pub selected_features: Vec<String>,
    total_credit_cost: i64,
    published_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wedding {
    /// Create a new DRAFT wedding
    pub fn create(admin_id: Uuid, title: String, slug: Slug) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            admin_id,
            title,
            slug,
            status: WeddingStatus::Draft,
            selected_design_key: None,
            selected_features: Vec::new(),
            total_credit_cost: 0,
            published_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a wedding from stored state
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        admin_id: Uuid,
        title: String,
        slug: Slug,
        status: WeddingStatus,
        selected_design_key: Option<String>,
        selected_features: Vec<String>,
        total_credit_cost: i64,
        published_at: Option<DateTime<Utc>>,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            admin_id,
            title,
            slug,
            status,
            selected_design_key,
            selected_features,
            total_credit_cost,
            published_at,
            version,
            created_at,
            updated_at,
        }
    }

    pub fn status(&self) -> WeddingStatus {
        self.status
    }

    /// Cost charged at the most recent publish (0 before the first one)
    pub fn total_credit_cost(&self) -> i64 {
        self.total_credit_cost
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn is_archived(&self) -> bool {
        self.status == WeddingStatus::Archived
    }

    pub fn is_owned_by(&self, admin_id: Uuid) -> bool {
        self.admin_id == admin_id
    }

    /// Fail if the wedding no longer accepts changes
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.is_archived() {
            return Err(DomainError::WeddingArchived);
        }
        Ok(())
    }

    /// Move between the pre-publish states.
    ///
    /// Only DRAFT and READY can be chosen directly, and only before the first
    /// publish; PUBLISHED and ARCHIVED have dedicated operations.
    pub fn set_status(&mut self, to: WeddingStatus) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let from = self.status;
        let allowed = matches!(to, WeddingStatus::Draft | WeddingStatus::Ready)
            && self.published_at.is_none()
            && matches!(from, WeddingStatus::Draft | WeddingStatus::Ready);
        if !allowed {
            return Err(DomainError::InvalidTransition { from, to });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    /// Archive the wedding. Returns false if it was already archived.
    pub fn archive(&mut self) -> bool {
        if self.is_archived() {
            return false;
        }
        self.status = WeddingStatus::Archived;
        self.touch();
        true
    }

    /// Record a successful publish at `total_cost`.
    ///
    /// `published_at` keeps the time of the first publish.
    pub(crate) fn mark_published(&mut self, total_cost: i64, now: DateTime<Utc>) {
        self.status = WeddingStatus::Published;
        self.published_at.get_or_insert(now);
        self.total_credit_cost = total_cost;
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Public path of the published site
    pub fn url_path(&self) -> String {
        format!("/wedding/{}", self.slug)
    }
}
