use anyhow::{Context, Result};
use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Database, Iter, TryFromKeyValue};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Whatsapp,
    Phone,
    Email,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    Navbar,
    Footer,
    Floating,
    PropertyDetails,
    PropertyCard,
}

/// A visitor contact or view event recorded for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub source: InteractionSource,
    pub device_type: String,
    pub created_at: DateTime<Utc>,
}

impl TryFromKeyValue for Interaction {
    fn try_from_key_value(key: &[u8], value: &[u8]) -> Result<Self> {
        bincode::deserialize(value)
            .with_context(|| format!("invalid interaction in database for key {key:02x?}"))
    }
}

impl Database {
    /// Keys sort by creation time, so the tree iterates oldest first.
    pub fn insert_interaction(&self, interaction: &Interaction) -> Result<()> {
        let key = format!(
            "{:020}-{}",
            interaction.created_at.timestamp_millis().max(0),
            Uuid::new_v4()
        );
        Database::insert(&key, interaction, &self.interaction_tree)
    }

    pub fn interactions(&self) -> Iter<Interaction> {
        Iter::new(self.interaction_tree.iter())
    }
}
