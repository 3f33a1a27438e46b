//! Translation of the search form into store predicates plus the filters that
//! only make sense after retrieval.

mod admin;
mod criteria;
mod engine;
mod query;

pub use admin::AdminListFilter;
pub use criteria::{
    parse_amount, reset_filters, FilterCriteria, PriceRange, SearchParams, TypeFilter,
};
pub use engine::{FilterEngine, SearchOutcome, SearchResult};
pub use query::{OrderBy, Predicate, PropertyQuery, SortField};

use crate::{database::PropertyRecord, favorites::FavoritesSet};

/// Composes the predicates the data store evaluates. The ordering is always
/// newest first.
pub fn build_query(criteria: &FilterCriteria) -> PropertyQuery {
    let mut predicates = Vec::new();
    if let Some(TypeFilter::Only(ty)) = criteria.property_type {
        predicates.push(Predicate::TypeEq(ty));
    }
    if let Some(city) = criteria.city.as_deref().filter(|c| !c.is_empty()) {
        predicates.push(Predicate::CityEq(city.to_string()));
    }
    match criteria.price_range {
        Some(PriceRange::Bucket { min, max }) => {
            predicates.push(Predicate::PriceAtLeast(min));
            if let Some(max) = max {
                predicates.push(Predicate::PriceAtMost(max));
            }
        }
        Some(PriceRange::Custom) => {
            let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
            if let Some(min) = positive(criteria.custom_price_min) {
                predicates.push(Predicate::PriceAtLeast(min));
            }
            if let Some(max) = positive(criteria.custom_price_max) {
                predicates.push(Predicate::PriceAtMost(max));
            }
        }
        None => {}
    }
    if let Some(n) = criteria.min_bedrooms {
        predicates.push(Predicate::BedroomsAtLeast(n));
    }
    if let Some(n) = criteria.min_parking_spots {
        predicates.push(Predicate::ParkingSpotsAtLeast(n));
    }
    PropertyQuery {
        predicates,
        order: OrderBy::NEWEST_FIRST,
    }
}

/// Applies the code-fragment and favorites-only filters, in that order, to
/// records returned by the store. Relative order is preserved.
pub fn apply_local_filters(
    records: Vec<PropertyRecord>,
    criteria: &FilterCriteria,
    favorites: &FavoritesSet,
) -> Vec<PropertyRecord> {
    let fragment = criteria
        .code_fragment
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);
    records
        .into_iter()
        .filter(|record| match &fragment {
            Some(fragment) => record.short_code().to_lowercase().contains(fragment),
            None => true,
        })
        .filter(|record| !criteria.favorites_only || favorites.contains(&record.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::database::{Address, PropertyType};

    fn record(id: &str, ty: PropertyType, city: &str, price: f64, bedrooms: u32) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            property_type: ty,
            price,
            bedrooms,
            address: Address {
                city: city.to_string(),
                ..Default::default()
            },
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_criteria_is_identity() {
        let query = build_query(&FilterCriteria::default());
        assert_eq!(query, PropertyQuery::default());
        assert!(query.predicates.is_empty());
        assert_eq!(query.order, OrderBy::NEWEST_FIRST);

        let records = vec![
            record("p1", PropertyType::House, "A", 1.0, 1),
            record("p2", PropertyType::Land, "B", 2.0, 0),
        ];
        let kept = apply_local_filters(
            records.clone(),
            &FilterCriteria::default(),
            &FavoritesSet::new(),
        );
        assert_eq!(kept, records);
    }

    #[test]
    fn all_type_sentinel_adds_no_predicate() {
        let criteria = FilterCriteria {
            property_type: Some(TypeFilter::All),
            ..Default::default()
        };
        assert!(build_query(&criteria).predicates.is_empty());
    }

    #[test]
    fn custom_range_with_only_min() {
        let criteria = FilterCriteria {
            price_range: Some(PriceRange::Custom),
            custom_price_min: Some(500_000.0),
            ..Default::default()
        };
        assert_eq!(
            build_query(&criteria).predicates,
            vec![Predicate::PriceAtLeast(500_000.0)]
        );
    }

    #[test]
    fn custom_range_ignores_non_positive_bounds() {
        let criteria = FilterCriteria {
            price_range: Some(PriceRange::Custom),
            custom_price_min: Some(0.0),
            custom_price_max: Some(-10.0),
            ..Default::default()
        };
        assert!(build_query(&criteria).predicates.is_empty());

        let criteria = FilterCriteria {
            custom_price_max: Some(900_000.0),
            ..criteria
        };
        assert_eq!(
            build_query(&criteria).predicates,
            vec![Predicate::PriceAtMost(900_000.0)]
        );
    }

    #[test]
    fn open_bucket_applies_only_lower_bound() {
        let criteria = FilterCriteria {
            price_range: "2000000+".parse().ok(),
            ..Default::default()
        };
        assert_eq!(
            build_query(&criteria).predicates,
            vec![Predicate::PriceAtLeast(2_000_000.0)]
        );
    }

    #[test]
    fn code_fragment_is_case_insensitive() {
        let records = vec![record("0f3c-9a1e-AB12", PropertyType::House, "A", 1.0, 1)];
        let matching = FilterCriteria {
            code_fragment: Some("ab1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            apply_local_filters(records.clone(), &matching, &FavoritesSet::new()).len(),
            1
        );
        let other = FilterCriteria {
            code_fragment: Some("cd".to_string()),
            ..Default::default()
        };
        assert!(apply_local_filters(records, &other, &FavoritesSet::new()).is_empty());
    }

    #[test]
    fn code_fragment_only_searches_short_code() {
        let records = vec![record("ab12-ZZZZ", PropertyType::House, "A", 1.0, 1)];
        let criteria = FilterCriteria {
            code_fragment: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(apply_local_filters(records, &criteria, &FavoritesSet::new()).is_empty());
    }

    #[test]
    fn favorites_only_intersects() {
        let records = vec![
            record("p1", PropertyType::House, "A", 1.0, 1),
            record("p2", PropertyType::House, "A", 1.0, 1),
        ];
        let criteria = FilterCriteria {
            favorites_only: true,
            ..Default::default()
        };
        let favorites = FavoritesSet::from(["p2".to_string()]);
        let kept = apply_local_filters(records.clone(), &criteria, &favorites);
        assert_eq!(kept, vec![records[1].clone()]);
        assert!(apply_local_filters(records, &criteria, &FavoritesSet::new()).is_empty());
    }

    #[test]
    fn springfield_house_scenario() {
        let house = record("h1", PropertyType::House, "Springfield", 750_000.0, 3);
        let apartment = record("a1", PropertyType::Apartment, "Springfield", 600_000.0, 2);
        let params: SearchParams = "type=house&city=Springfield&price=500000-1000000&bedrooms=2"
            .parse()
            .unwrap();
        let criteria = FilterCriteria::from_params(&params);
        let query = build_query(&criteria);
        let found: Vec<_> = [house.clone(), apartment]
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        let found = apply_local_filters(found, &criteria, &FavoritesSet::new());
        assert_eq!(found, vec![house]);
    }

    #[test]
    fn parking_minimum_is_pushed_down() {
        let criteria = FilterCriteria {
            min_parking_spots: Some(2),
            ..Default::default()
        };
        let query = build_query(&criteria);
        assert_eq!(query.predicates, vec![Predicate::ParkingSpotsAtLeast(2)]);

        let one = PropertyRecord {
            parking_spots: 1,
            ..record("p1", PropertyType::House, "A", 1.0, 1)
        };
        let two = PropertyRecord {
            parking_spots: 2,
            ..record("p2", PropertyType::House, "A", 1.0, 1)
        };
        assert!(!query.matches(&one));
        assert!(query.matches(&two));
    }

    #[test]
    fn every_criterion_adds_its_predicate() {
        let criteria = FilterCriteria {
            property_type: Some(TypeFilter::Only(PropertyType::House)),
            city: Some("Springfield".to_string()),
            price_range: Some(PriceRange::Bucket {
                min: 500_000.0,
                max: Some(1_000_000.0),
            }),
            custom_price_min: Some(1.0),
            custom_price_max: Some(2.0),
            min_bedrooms: Some(2),
            min_parking_spots: Some(1),
            code_fragment: Some("HS".to_string()),
            favorites_only: true,
        };
        assert_eq!(
            build_query(&criteria).predicates,
            vec![
                Predicate::TypeEq(PropertyType::House),
                Predicate::CityEq("Springfield".to_string()),
                Predicate::PriceAtLeast(500_000.0),
                Predicate::PriceAtMost(1_000_000.0),
                Predicate::BedroomsAtLeast(2),
                Predicate::ParkingSpotsAtLeast(1),
            ]
        );
    }
}
