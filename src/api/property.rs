use std::fmt;

use async_graphql::{
    connection::{query, Connection, EmptyFields},
    Context, InputObject, Object, Result, ServerError, ID,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    api::{self, DateTimeUtc},
    database::{Address, Database, PropertyRecord, PropertyStatus, PropertyType},
    favorites::FavoritesSet,
    filter::{
        parse_amount, AdminListFilter, FilterCriteria, FilterEngine, SearchOutcome, SearchResult,
    },
    store::DataStore,
};

pub(crate) struct Property(PropertyRecord);

#[Object]
impl Property {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    /// The last four characters of the id, shown to visitors as a reference.
    async fn short_code(&self) -> &str {
        self.0.short_code()
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn price(&self) -> f64 {
        self.0.price
    }

    async fn property_type(&self) -> PropertyType {
        self.0.property_type
    }

    async fn status(&self) -> PropertyStatus {
        self.0.status
    }

    async fn total_area(&self) -> f64 {
        self.0.total_area
    }

    async fn built_area(&self) -> Option<f64> {
        self.0.built_area
    }

    async fn bedrooms(&self) -> u32 {
        self.0.bedrooms
    }

    async fn bathrooms(&self) -> u32 {
        self.0.bathrooms
    }

    async fn parking_spots(&self) -> u32 {
        self.0.parking_spots
    }

    async fn featured(&self) -> bool {
        self.0.featured
    }

    async fn address(&self) -> &Address {
        &self.0.address
    }

    async fn created_at(&self) -> DateTimeUtc {
        DateTimeUtc(self.0.created_at)
    }
}

impl From<PropertyRecord> for Property {
    fn from(record: PropertyRecord) -> Self {
        Self(record)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0.id)
    }
}

/// Public search form. Values are taken as typed by the visitor; anything
/// that does not parse imposes no constraint.
#[derive(InputObject, Debug, Default)]
pub(crate) struct PropertySearch {
    /// A property type, or `all`.
    property_type: Option<String>,
    city: Option<String>,
    /// A range such as `500000-1000000` or `2000000+`, or `custom`.
    price_range: Option<String>,
    custom_price_min: Option<String>,
    custom_price_max: Option<String>,
    min_bedrooms: Option<u32>,
    min_parking_spots: Option<u32>,
    /// Fragment of the listing's short code.
    code: Option<String>,
    #[graphql(default)]
    favorites_only: bool,
}

impl From<PropertySearch> for FilterCriteria {
    fn from(search: PropertySearch) -> Self {
        Self {
            property_type: search.property_type.and_then(|t| t.parse().ok()),
            city: search.city.filter(|c| !c.is_empty()),
            price_range: search.price_range.and_then(|p| p.parse().ok()),
            custom_price_min: search.custom_price_min.as_deref().and_then(parse_amount),
            custom_price_max: search.custom_price_max.as_deref().and_then(parse_amount),
            min_bedrooms: search.min_bedrooms,
            min_parking_spots: search.min_parking_spots,
            code_fragment: search.code,
            favorites_only: search.favorites_only,
        }
    }
}

#[derive(InputObject, Debug)]
pub(crate) struct PropertyInput {
    title: String,
    #[graphql(default)]
    description: String,
    price: f64,
    property_type: PropertyType,
    status: PropertyStatus,
    total_area: f64,
    built_area: Option<f64>,
    #[graphql(default)]
    bedrooms: u32,
    #[graphql(default)]
    bathrooms: u32,
    #[graphql(default)]
    parking_spots: u32,
    #[graphql(default)]
    featured: bool,
    address: Address,
}

impl PropertyInput {
    fn into_record(self, id: String, created_at: chrono::DateTime<Utc>) -> PropertyRecord {
        PropertyRecord {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            property_type: self.property_type,
            status: self.status,
            total_area: self.total_area,
            built_area: self.built_area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            parking_spots: self.parking_spots,
            featured: self.featured,
            address: self.address,
            created_at,
        }
    }
}

#[derive(Default)]
pub(super) struct PropertyListingQuery;

#[Object]
impl PropertyListingQuery {
    /// Listings matching the search form, newest first.
    ///
    /// `favorites` holds the visitor's favorite ids and is only consulted
    /// when `favoritesOnly` is set.
    #[allow(clippy::too_many_arguments)]
    async fn properties(
        &self,
        ctx: &Context<'_>,
        filter: Option<PropertySearch>,
        favorites: Option<Vec<String>>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<String, Property, EmptyFields, EmptyFields>> {
        let db = ctx.data::<Database>()?;
        let criteria = FilterCriteria::from(filter.unwrap_or_default());
        let favorites: FavoritesSet = favorites.unwrap_or_default().into_iter().collect();
        let engine = FilterEngine::new(db.clone());
        let outcome = match engine.search(&criteria, &favorites).await {
            SearchResult::Current(outcome) => outcome,
            SearchResult::Superseded => SearchOutcome::default(),
        };
        if let Some(message) = outcome.error {
            ctx.add_error(ServerError::new(message, None));
        }
        let nodes: Vec<Property> = outcome
            .records
            .into_iter()
            .map(Property::from)
            .collect();
        query(
            after,
            before,
            first,
            last,
            |after, before, first, last| async move {
                api::load_connection(nodes, after, before, first, last)
            },
        )
        .await
    }

    async fn property(&self, ctx: &Context<'_>, id: ID) -> Result<Property> {
        let db = ctx.data::<Database>()?;
        Ok(db.get_by_id(&id).await?.into())
    }

    /// Cities that have at least one listing, sorted.
    async fn cities(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let db = ctx.data::<Database>()?;
        Ok(db.available_cities()?)
    }

    async fn admin_properties(
        &self,
        ctx: &Context<'_>,
        filter: Option<AdminListFilter>,
    ) -> Result<Vec<Property>> {
        let db = ctx.data::<Database>()?;
        let records = db.properties().collect::<anyhow::Result<Vec<_>>>()?;
        Ok(filter
            .unwrap_or_default()
            .apply(records)
            .into_iter()
            .map(Property::from)
            .collect())
    }
}

#[derive(Default)]
pub(super) struct PropertyMutation;

#[Object]
impl PropertyMutation {
    async fn create_property(&self, ctx: &Context<'_>, input: PropertyInput) -> Result<Property> {
        let db = ctx.data::<Database>()?;
        let record = input.into_record(Uuid::new_v4().to_string(), Utc::now());
        db.insert_property(&record)?;
        info!(id = %record.id, "Property created");
        Ok(record.into())
    }

    async fn update_property(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: PropertyInput,
    ) -> Result<Property> {
        let db = ctx.data::<Database>()?;
        let existing = db.get_by_id(&id).await?;
        let record = input.into_record(existing.id, existing.created_at);
        db.update_property(&record)?;
        info!(id = %record.id, "Property updated");
        Ok(record.into())
    }

    async fn delete_property(&self, ctx: &Context<'_>, id: ID) -> Result<Property> {
        let db = ctx.data::<Database>()?;
        let removed = db.delete_property(&id)?;
        info!(id = %removed.id, "Property deleted");
        Ok(removed.into())
    }

    async fn set_featured(&self, ctx: &Context<'_>, id: ID, featured: bool) -> Result<Property> {
        let db = ctx.data::<Database>()?;
        Ok(db.set_featured(&id, featured)?.into())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::{
        api::TestSchema,
        database::{Address, PropertyRecord, PropertyType},
    };

    fn listing(id: &str, ty: PropertyType, city: &str, price: f64, bedrooms: u32, day: u32) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            title: format!("listing {id}"),
            property_type: ty,
            price,
            bedrooms,
            address: Address {
                city: city.to_string(),
                ..Default::default()
            },
            created_at: chrono::Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    fn seed(schema: &TestSchema) {
        for record in [
            listing("0001-aaaa-HS01", PropertyType::House, "Springfield", 750_000.0, 3, 1),
            listing("0002-bbbb-AP01", PropertyType::Apartment, "Springfield", 600_000.0, 2, 2),
            listing("0003-cccc-HS02", PropertyType::House, "Shelbyville", 2_500_000.0, 5, 3),
        ] {
            schema.db.insert_property(&record).unwrap();
        }
    }

    #[tokio::test]
    async fn properties_empty() {
        let schema = TestSchema::new();
        let query = r"
        {
            properties {
                edges {
                    node {
                        id
                    }
                }
            }
        }";
        let res = schema.execute(query).await;
        assert_eq!(res.data.to_string(), "{properties: {edges: []}}");
    }

    #[tokio::test]
    async fn properties_with_corrupt_record() {
        let schema = TestSchema::new();
        schema.db.insert_raw_property("bad", b"\xff");
        let query = r"
        {
            properties {
                edges {
                    node {
                        id
                    }
                }
            }
        }";
        let res = schema.execute(query).await;
        assert_eq!(res.data.to_string(), "{properties: {edges: []}}");
        assert_eq!(res.errors.len(), 1);
        assert!(res.errors[0].message.starts_with("invalid property"));
    }

    #[tokio::test]
    async fn properties_newest_first() {
        let schema = TestSchema::new();
        seed(&schema);
        let query = r"
        {
            properties(first: 2) {
                edges {
                    node {
                        shortCode
                    }
                }
                pageInfo {
                    hasNextPage
                }
            }
        }";
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{properties: {edges: [{node: {shortCode: "HS02"}}, {node: {shortCode: "AP01"}}], pageInfo: {hasNextPage: true}}}"#
        );
    }

    #[tokio::test]
    async fn properties_filtered() {
        let schema = TestSchema::new();
        seed(&schema);
        let query = r#"
        {
            properties(filter: {
                propertyType: "house",
                city: "Springfield",
                priceRange: "500000-1000000",
                minBedrooms: 2
            }) {
                edges {
                    node {
                        shortCode
                    }
                }
            }
        }"#;
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{properties: {edges: [{node: {shortCode: "HS01"}}]}}"#
        );

        let query = r#"
        {
            properties(filter: {priceRange: "custom", customPriceMin: "abc", code: "hs"}) {
                edges {
                    node {
                        shortCode
                    }
                }
            }
        }"#;
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{properties: {edges: [{node: {shortCode: "HS02"}}, {node: {shortCode: "HS01"}}]}}"#
        );
    }

    #[tokio::test]
    async fn properties_favorites_only() {
        let schema = TestSchema::new();
        seed(&schema);
        let query = r#"
        {
            properties(filter: {favoritesOnly: true}, favorites: ["0002-bbbb-AP01"]) {
                edges {
                    node {
                        shortCode
                    }
                }
            }
        }"#;
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{properties: {edges: [{node: {shortCode: "AP01"}}]}}"#
        );
    }

    #[tokio::test]
    async fn cities_and_admin_listing() {
        let schema = TestSchema::new();
        seed(&schema);
        let res = schema.execute("{ cities }").await;
        assert_eq!(
            res.data.to_string(),
            r#"{cities: ["Shelbyville", "Springfield"]}"#
        );

        let query = r"
        {
            adminProperties(filter: {propertyType: HOUSE, sortBy: PRICE, descending: false}) {
                shortCode
            }
        }";
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{adminProperties: [{shortCode: "HS01"}, {shortCode: "HS02"}]}"#
        );
    }

    #[tokio::test]
    async fn create_update_delete() {
        let schema = TestSchema::new();
        let query = r#"
        mutation {
            createProperty(input: {
                title: "Corner lot",
                price: 120000,
                propertyType: LAND,
                status: FOR_SALE,
                totalArea: 450,
                address: {
                    street: "Main St",
                    number: "10",
                    neighborhood: "Center",
                    city: "Ogdenville",
                    state: "OR",
                    postalCode: "97000"
                }
            }) {
                id
                featured
            }
        }"#;
        let res = schema.execute(query).await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        let created = schema.db.properties().next().unwrap().unwrap();
        assert_eq!(created.title, "Corner lot");
        assert!(!created.featured);

        let query = format!(
            r#"mutation {{ setFeatured(id: "{}", featured: true) {{ featured }} }}"#,
            created.id
        );
        let res = schema.execute(&query).await;
        assert_eq!(res.data.to_string(), "{setFeatured: {featured: true}}");

        let query = format!(r#"mutation {{ deleteProperty(id: "{}") {{ title }} }}"#, created.id);
        let res = schema.execute(&query).await;
        assert_eq!(res.data.to_string(), r#"{deleteProperty: {title: "Corner lot"}}"#);
        assert!(schema.db.property(&created.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_creation_time() {
        let schema = TestSchema::new();
        seed(&schema);
        let query = r#"
        mutation {
            updateProperty(id: "0001-aaaa-HS01", input: {
                title: "Renovated house",
                price: 800000,
                propertyType: HOUSE,
                status: BOTH,
                totalArea: 200,
                bedrooms: 4,
                address: {
                    street: "Evergreen Terrace",
                    number: "742",
                    neighborhood: "Evergreen",
                    city: "Springfield",
                    state: "OR",
                    postalCode: "97001"
                }
            }) {
                title
                createdAt
            }
        }"#;
        let res = schema.execute(query).await;
        assert_eq!(
            res.data.to_string(),
            r#"{updateProperty: {title: "Renovated house", createdAt: "2024-02-01T00:00:00+00:00"}}"#
        );

        let res = schema
            .execute(r#"{ property(id: "missing") { title } }"#)
            .await;
        assert_eq!(res.errors.len(), 1);
    }
}
