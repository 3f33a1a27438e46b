use async_graphql::InputObject;

use super::{OrderBy, SortField};
use crate::database::{PropertyRecord, PropertyStatus, PropertyType};

/// Filter and ordering of the admin property table.
#[derive(InputObject, Clone, Debug, PartialEq)]
pub struct AdminListFilter {
    /// Case-insensitive text matched against title, city, neighborhood and
    /// type.
    pub search: Option<String>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
    #[graphql(default_with = "SortField::CreatedAt")]
    pub sort_by: SortField,
    #[graphql(default = true)]
    pub descending: bool,
}

impl Default for AdminListFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            property_type: None,
            sort_by: OrderBy::NEWEST_FIRST.field,
            descending: OrderBy::NEWEST_FIRST.descending,
        }
    }
}

impl AdminListFilter {
    fn matches(&self, record: &PropertyRecord, needle: Option<&str>) -> bool {
        let text_match = needle.is_none_or(|needle| {
            [
                record.title.as_str(),
                record.address.city.as_str(),
                record.address.neighborhood.as_str(),
                record.property_type.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
        });
        text_match
            && self.status.is_none_or(|status| record.status == status)
            && self
                .property_type
                .is_none_or(|ty| record.property_type == ty)
    }

    pub fn apply(&self, records: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut records: Vec<_> = records
            .into_iter()
            .filter(|r| self.matches(r, needle.as_deref()))
            .collect();
        OrderBy {
            field: self.sort_by,
            descending: self.descending,
        }
        .sort(&mut records);
        records
    }
}
