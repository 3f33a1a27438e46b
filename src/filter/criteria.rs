use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::database::PropertyType;

const ALL_TYPES: [&str; 2] = ["all", "todos"];
const CUSTOM_RANGE: &str = "custom";

/// Selection in the property type dropdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TypeFilter {
    /// The "every type" option. Imposes no constraint.
    All,
    Only(PropertyType),
}

impl FromStr for TypeFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        if ALL_TYPES.contains(&s) {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only).map_err(|_| ())
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TYPES[0]),
            Self::Only(ty) => ty.fmt(f),
        }
    }
}

/// Selection in the price dropdown.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PriceRange {
    /// A named range such as `500000-1000000`, or `2000000+` when open-ended.
    Bucket { min: f64, max: Option<f64> },
    /// Bounds come from `custom_price_min` and `custom_price_max`.
    Custom,
}

impl PriceRange {
    /// Options offered by the public search form.
    pub const BUCKETS: [PriceRange; 4] = [
        PriceRange::Bucket {
            min: 0.0,
            max: Some(500_000.0),
        },
        PriceRange::Bucket {
            min: 500_000.0,
            max: Some(1_000_000.0),
        },
        PriceRange::Bucket {
            min: 1_000_000.0,
            max: Some(2_000_000.0),
        },
        PriceRange::Bucket {
            min: 2_000_000.0,
            max: None,
        },
    ];
}

impl FromStr for PriceRange {
    type Err = ();

    /// Accepts `custom`, `<min>-<max>` and `<min>+`. An empty lower bound
    /// reads as zero; an empty or zero upper bound leaves the range open.
    fn from_str(s: &str) -> Result<Self, ()> {
        if s == CUSTOM_RANGE {
            return Ok(Self::Custom);
        }
        let (min, max) = match s.split_once('-') {
            Some((min, max)) => (min, max),
            None => (s.strip_suffix('+').unwrap_or(s), ""),
        };
        let min = if min.is_empty() {
            0.0
        } else {
            parse_amount(min).ok_or(())?
        };
        let max = parse_amount(max).filter(|max| *max != 0.0);
        Ok(Self::Bucket { min, max })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Custom => f.write_str(CUSTOM_RANGE),
            Self::Bucket { min, max: Some(max) } => write!(f, "{min}-{max}"),
            Self::Bucket { min, max: None } => write!(f, "{min}+"),
        }
    }
}

/// Parses a user-typed amount. Anything that is not a finite number is
/// treated as absent.
pub fn parse_amount(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Snapshot of the search form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub property_type: Option<TypeFilter>,
    pub city: Option<String>,
    pub price_range: Option<PriceRange>,
    pub custom_price_min: Option<f64>,
    pub custom_price_max: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub min_parking_spots: Option<u32>,
    pub code_fragment: Option<String>,
    pub favorites_only: bool,
}

/// The query-string mirror of the search form.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for SearchParams {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('?').unwrap_or(s);
        Ok(Self(
            url::form_urlencoded::parse(s.as_bytes())
                .into_owned()
                .collect(),
        ))
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish();
        f.write_str(&encoded)
    }
}

impl FilterCriteria {
    /// Derives criteria from the query-string mirror. Empty or unparsable
    /// values are absent.
    pub fn from_params(params: &SearchParams) -> Self {
        Self {
            property_type: params.get("type").and_then(|t| t.parse().ok()),
            city: params.get("city").map(str::to_string),
            price_range: params.get("price").and_then(|p| p.parse().ok()),
            custom_price_min: None,
            custom_price_max: None,
            min_bedrooms: params.get("bedrooms").and_then(|v| v.parse().ok()),
            min_parking_spots: params.get("parking").and_then(|v| v.parse().ok()),
            code_fragment: params.get("code").map(str::to_string),
            favorites_only: params.get("favorite") == Some("true"),
        }
    }

    /// Writes the criteria back to a query-string mirror. A custom range is
    /// written as `<min>-<max>` with empty sides for absent bounds.
    pub fn to_params(&self) -> SearchParams {
        let mut params = SearchParams::default();
        if let Some(ty) = self.property_type {
            params.set("type", ty.to_string());
        }
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            params.set("city", city);
        }
        match self.price_range {
            Some(PriceRange::Custom) => {
                let side = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
                params.set(
                    "price",
                    format!(
                        "{}-{}",
                        side(self.custom_price_min),
                        side(self.custom_price_max)
                    ),
                );
            }
            Some(bucket) => params.set("price", bucket.to_string()),
            None => {}
        }
        if let Some(n) = self.min_bedrooms {
            params.set("bedrooms", n.to_string());
        }
        if let Some(n) = self.min_parking_spots {
            params.set("parking", n.to_string());
        }
        if let Some(code) = self.code_fragment.as_deref().filter(|c| !c.is_empty()) {
            params.set("code", code);
        }
        if self.favorites_only {
            params.set("favorite", "true");
        }
        params
    }
}

/// Clears the host's mirror and returns the all-absent criteria.
pub fn reset_filters(params: &mut SearchParams) -> FilterCriteria {
    params.clear();
    FilterCriteria::default()
}
