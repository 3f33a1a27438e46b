use std::collections::BTreeMap;

use async_graphql::{Context, Object, Result, SimpleObject};

use crate::database::{Database, InteractionKind, PropertyType};

#[derive(SimpleObject)]
struct PropertyTypeCount {
    property_type: PropertyType,
    count: usize,
}

#[derive(SimpleObject)]
struct InteractionCount {
    kind: InteractionKind,
    count: usize,
}

#[derive(SimpleObject)]
struct DashboardStat {
    /// The number of listings.
    total_properties: usize,

    /// The number of listings marked as featured.
    featured_properties: usize,

    /// Listings per property type, sorted by type name. Types without
    /// listings are omitted.
    properties_by_type: Vec<PropertyTypeCount>,

    /// Recorded interactions per kind.
    interactions_by_kind: Vec<InteractionCount>,
}

#[derive(Default)]
pub(super) struct DashboardStatQuery;

#[Object]
impl DashboardStatQuery {
    async fn dashboard_stat(&self, ctx: &Context<'_>) -> Result<DashboardStat> {
        let db = ctx.data::<Database>()?;

        let mut total_properties = 0;
        let mut featured_properties = 0;
        let mut by_type: BTreeMap<&'static str, (PropertyType, usize)> = BTreeMap::new();
        for record in db.properties() {
            let record = record?;
            total_properties += 1;
            if record.featured {
                featured_properties += 1;
            }
            by_type
                .entry(record.property_type.as_str())
                .or_insert((record.property_type, 0))
                .1 += 1;
        }

        let mut by_kind: BTreeMap<InteractionKind, usize> = BTreeMap::new();
        for interaction in db.interactions() {
            *by_kind.entry(interaction?.kind).or_insert(0) += 1;
        }

        Ok(DashboardStat {
            total_properties,
            featured_properties,
            properties_by_type: by_type
                .into_values()
                .map(|(property_type, count)| PropertyTypeCount {
                    property_type,
                    count,
                })
                .collect(),
            interactions_by_kind: by_kind
                .into_iter()
                .map(|(kind, count)| InteractionCount { kind, count })
                .collect(),
        })
    }
}
