use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::owner::{MediaOwner, OwnerType};

/// Line of business; parent of products, technologies and machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Division {
    pub id: Uuid,
    pub name: String,
    /// Globally unique, lowercase, hyphen-separated.
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivisionInput {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// The three kinds of entries nested under a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Product,
    Technology,
    Machine,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [
        CatalogKind::Product,
        CatalogKind::Technology,
        CatalogKind::Machine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Product => "product",
            CatalogKind::Technology => "technology",
            CatalogKind::Machine => "machine",
        }
    }

    pub fn owner_type(self) -> OwnerType {
        match self {
            CatalogKind::Product => OwnerType::Product,
            CatalogKind::Technology => OwnerType::Technology,
            CatalogKind::Machine => OwnerType::Machine,
        }
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" | "products" => Ok(CatalogKind::Product),
            "technology" | "technologies" => Ok(CatalogKind::Technology),
            "machine" | "machines" => Ok(CatalogKind::Machine),
            _ => Err(format!("Unknown catalog kind: {}", s)),
        }
    }
}

impl Display for CatalogKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A product, technology or machine belonging to exactly one division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub division_id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    pub fn media_owner(&self) -> MediaOwner {
        MediaOwner::new(self.kind.owner_type(), self.id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogItemInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Milestone {
    pub id: Uuid,
    pub year: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneInput {
    pub year: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
