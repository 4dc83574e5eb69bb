use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of entity kinds that may own media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Division,
    Product,
    Technology,
    Machine,
    Client,
}

/// Lookup table between persisted owner tags and owner kinds.
const OWNER_TYPES: [(&str, OwnerType); 5] = [
    ("division", OwnerType::Division),
    ("product", OwnerType::Product),
    ("technology", OwnerType::Technology),
    ("machine", OwnerType::Machine),
    ("client", OwnerType::Client),
];

impl OwnerType {
    /// Lowercase tag used in storage paths and the `owner_type` column.
    pub fn as_str(self) -> &'static str {
        OWNER_TYPES
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(tag, _)| *tag)
            .unwrap_or("division")
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        OWNER_TYPES
            .iter()
            .find(|(tag, _)| *tag == lowered)
            .map(|(_, t)| *t)
            .ok_or_else(|| format!("Unknown media owner type: {}", s))
    }
}

impl Display for OwnerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Owner reference of a media record: an owner kind paired with its id.
///
/// Fixed at creation; a media item never moves to another owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum MediaOwner {
    Division(Uuid),
    Product(Uuid),
    Technology(Uuid),
    Machine(Uuid),
    Client(Uuid),
}

impl MediaOwner {
    pub fn new(owner_type: OwnerType, id: Uuid) -> Self {
        match owner_type {
            OwnerType::Division => MediaOwner::Division(id),
            OwnerType::Product => MediaOwner::Product(id),
            OwnerType::Technology => MediaOwner::Technology(id),
            OwnerType::Machine => MediaOwner::Machine(id),
            OwnerType::Client => MediaOwner::Client(id),
        }
    }

    /// Rebuild an owner from the persisted `(mediable_type, mediable_id)` pair.
    pub fn from_parts(owner_type: &str, id: Uuid) -> Result<Self, String> {
        Ok(Self::new(owner_type.parse()?, id))
    }

    pub fn owner_type(&self) -> OwnerType {
        match self {
            MediaOwner::Division(_) => OwnerType::Division,
            MediaOwner::Product(_) => OwnerType::Product,
            MediaOwner::Technology(_) => OwnerType::Technology,
            MediaOwner::Machine(_) => OwnerType::Machine,
            MediaOwner::Client(_) => OwnerType::Client,
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            MediaOwner::Division(id)
            | MediaOwner::Product(id)
            | MediaOwner::Technology(id)
            | MediaOwner::Machine(id)
            | MediaOwner::Client(id) => id,
        }
    }
}

impl Display for MediaOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.owner_type(), self.id())
    }
}
