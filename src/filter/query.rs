use crate::database::{PropertyRecord, PropertyType};

/// One condition pushed down to the data store.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    TypeEq(PropertyType),
    CityEq(String),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    BedroomsAtLeast(u32),
    ParkingSpotsAtLeast(u32),
}

impl Predicate {
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        match self {
            Self::TypeEq(ty) => record.property_type == *ty,
            Self::CityEq(city) => record.address.city == *city,
            Self::PriceAtLeast(min) => record.price >= *min,
            Self::PriceAtMost(max) => record.price <= *max,
            Self::BedroomsAtLeast(n) => record.bedrooms >= *n,
            Self::ParkingSpotsAtLeast(n) => record.parking_spots >= *n,
        }
    }
}

#[derive(async_graphql::Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum SortField {
    Title,
    Price,
    Bedrooms,
    City,
    CreatedAt,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    pub field: SortField,
    pub descending: bool,
}

impl OrderBy {
    pub const NEWEST_FIRST: OrderBy = OrderBy {
        field: SortField::CreatedAt,
        descending: true,
    };

    pub fn sort(&self, records: &mut [PropertyRecord]) {
        records.sort_by(|a, b| {
            let ord = match self.field {
                SortField::Title => a.title.cmp(&b.title),
                SortField::Price => a.price.total_cmp(&b.price),
                SortField::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
                SortField::City => a.address.city.cmp(&b.address.city),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

/// A conjunction of predicates plus the result ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyQuery {
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
            order: OrderBy::NEWEST_FIRST,
        }
    }
}

impl PropertyQuery {
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
