use std::{collections::BTreeSet, fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use async_graphql::{Enum, InputObject, SimpleObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Database, Iter, TryFromKeyValue};
use crate::{filter::PropertyQuery, store::DataStore};

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Land,
    Commercial,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::Land => "land",
            Self::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "house" => Ok(Self::House),
            "apartment" => Ok(Self::Apartment),
            "land" => Ok(Self::Land),
            "commercial" => Ok(Self::Commercial),
            other => Err(anyhow!("unknown property type: {other}")),
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    ForSale,
    ForRent,
    Both,
}

#[derive(SimpleObject, InputObject, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[graphql(input_name = "AddressInput")]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A listing as stored in the `properties` tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub total_area: f64,
    pub built_area: Option<f64>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking_spots: u32,
    pub featured: bool,
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

impl PropertyRecord {
    /// The display code shown to visitors: the last four characters of the id.
    pub fn short_code(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(idx, _)| idx);
        &self.id[start..]
    }
}

impl TryFromKeyValue for PropertyRecord {
    fn try_from_key_value(key: &[u8], value: &[u8]) -> Result<Self> {
        bincode::deserialize(value)
            .with_context(|| format!("invalid property in database for key {key:02x?}"))
    }
}

impl Database {
    pub fn insert_property(&self, record: &PropertyRecord) -> Result<()> {
        Database::insert(&record.id, record, &self.property_tree)
    }

    pub fn update_property(&self, record: &PropertyRecord) -> Result<()> {
        if !self.property_tree.contains_key(&record.id)? {
            bail!("property {} does not exist", record.id);
        }
        Database::insert(&record.id, record, &self.property_tree)
    }

    pub fn delete_property(&self, id: &str) -> Result<PropertyRecord> {
        let Some(val) = self.property_tree.remove(id)? else {
            bail!("property {id} does not exist");
        };
        Ok(bincode::deserialize(&val)?)
    }

    pub fn set_featured(&self, id: &str, featured: bool) -> Result<PropertyRecord> {
        let mut record = self
            .property(id)?
            .with_context(|| format!("property {id} does not exist"))?;
        record.featured = featured;
        Database::insert(id, &record, &self.property_tree)?;
        Ok(record)
    }

    pub fn property(&self, id: &str) -> Result<Option<PropertyRecord>> {
        Database::select(id, &self.property_tree)
    }

    pub fn properties(&self) -> Iter<PropertyRecord> {
        Iter::new(self.property_tree.iter())
    }

    /// Distinct non-empty cities of every stored listing, sorted.
    pub fn available_cities(&self) -> Result<Vec<String>> {
        let mut cities = BTreeSet::new();
        for record in self.properties() {
            let record = record?;
            if !record.address.city.is_empty() {
                cities.insert(record.address.city);
            }
        }
        Ok(cities.into_iter().collect())
    }
}

#[async_trait]
impl DataStore for Database {
    async fn query(&self, query: &PropertyQuery) -> Result<Vec<PropertyRecord>> {
        let mut records = Vec::new();
        for record in self.properties() {
            let record = record?;
            if query.matches(&record) {
                records.push(record);
            }
        }
        query.order.sort(&mut records);
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> Result<PropertyRecord> {
        self.property(id)?
            .with_context(|| format!("property {id} not found"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        database::test_database,
        filter::{build_query, FilterCriteria},
    };

    fn listing(id: &str, city: &str, price: f64, day: u32) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            price,
            address: Address {
                city: city.to_string(),
                ..Default::default()
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn short_code_is_last_four_characters() {
        let record = listing("a1b2c3d4-AB12", "", 0.0, 1);
        assert_eq!(record.short_code(), "AB12");
        let record = listing("x1", "", 0.0, 1);
        assert_eq!(record.short_code(), "x1");
    }

    #[test]
    fn update_and_delete_require_existing_listing() {
        let (_dir, db) = test_database();
        let record = listing("p1", "Springfield", 100.0, 1);
        assert!(db.update_property(&record).is_err());
        assert!(db.delete_property("p1").is_err());

        db.insert_property(&record).unwrap();
        let mut changed = record.clone();
        changed.price = 200.0;
        db.update_property(&changed).unwrap();
        assert_eq!(db.property("p1").unwrap().unwrap().price, 200.0);

        let removed = db.delete_property("p1").unwrap();
        assert_eq!(removed.id, "p1");
        assert!(db.property("p1").unwrap().is_none());
    }

    #[test]
    fn set_featured_persists_flag() {
        let (_dir, db) = test_database();
        db.insert_property(&listing("p1", "Springfield", 1.0, 1))
            .unwrap();
        let updated = db.set_featured("p1", true).unwrap();
        assert!(updated.featured);
        assert!(db.property("p1").unwrap().unwrap().featured);
        assert!(db.set_featured("missing", true).is_err());
    }

    #[test]
    fn available_cities_are_distinct_and_sorted() {
        let (_dir, db) = test_database();
        db.insert_property(&listing("p1", "Shelbyville", 1.0, 1))
            .unwrap();
        db.insert_property(&listing("p2", "Springfield", 1.0, 2))
            .unwrap();
        db.insert_property(&listing("p3", "Capital City", 1.0, 3))
            .unwrap();
        db.insert_property(&listing("p4", "Springfield", 1.0, 4))
            .unwrap();
        db.insert_property(&listing("p5", "", 1.0, 5)).unwrap();
        assert_eq!(
            db.available_cities().unwrap(),
            vec!["Capital City", "Shelbyville", "Springfield"]
        );
    }

    #[tokio::test]
    async fn query_returns_newest_first() {
        let (_dir, db) = test_database();
        db.insert_property(&listing("old", "Springfield", 1.0, 1))
            .unwrap();
        db.insert_property(&listing("new", "Springfield", 1.0, 9))
            .unwrap();
        db.insert_property(&listing("mid", "Springfield", 1.0, 5))
            .unwrap();

        let query = build_query(&FilterCriteria::default());
        let ids: Vec<_> = db
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn get_by_id_reports_missing_listing() {
        let (_dir, db) = test_database();
        assert!(db.get_by_id("nope").await.is_err());
        db.insert_property(&listing("p1", "Springfield", 1.0, 1))
            .unwrap();
        assert_eq!(db.get_by_id("p1").await.unwrap().id, "p1");
    }
}
