use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

/// A value that violates the fixed listing schema. Classified here so the
/// loader can attach row context before surfacing the failure.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown purpose label '{0}' (expected 'For Sale' or 'For Rent')")]
    UnknownPurpose(String),
    #[error("listing_month {0} is out of range 1-12")]
    MonthOutOfRange(u32),
}

// ---------------------------------------------------------------------------
// Purpose – sale vs rental
// ---------------------------------------------------------------------------

/// Whether a listing is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    ForSale,
    ForRent,
}

impl Purpose {
    pub const ALL: [Purpose; 2] = [Purpose::ForSale, Purpose::ForRent];

    /// Parse the label used in the source data.
    pub fn parse_label(s: &str) -> Option<Purpose> {
        match s {
            "For Sale" => Some(Purpose::ForSale),
            "For Rent" => Some(Purpose::ForRent),
            _ => None,
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::ForSale => write!(f, "For Sale"),
            Purpose::ForRent => write!(f, "For Rent"),
        }
    }
}

impl<'de> Deserialize<'de> for Purpose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Purpose::parse_label(&label)
            .ok_or_else(|| serde::de::Error::custom(SchemaError::UnknownPurpose(label)))
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the source table
// ---------------------------------------------------------------------------

/// A single housing listing (one row of the source table). Columns beyond
/// the fixed schema pass through the deserializer unread.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub purpose: Purpose,
    pub property_type: String,
    pub city: String,
    /// Location label, nested under `city`.
    pub location: String,
    pub bedrooms: u32,
    pub price: f64,
    /// Month of the year the listing appeared, 1-12.
    pub listing_month: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl Listing {
    /// Check the value-range constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !(1..=12).contains(&self.listing_month) {
            return Err(SchemaError::MonthOutOfRange(self.listing_month));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded table with pre-computed unique-value indices. Built once
/// at startup and immutable thereafter; shared read-only across the UI.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All listings (rows), in file order.
    pub listings: Vec<Listing>,
    /// Sorted unique city names.
    pub cities: Vec<String>,
    /// Sorted unique property-type labels.
    pub property_types: Vec<String>,
    /// Sorted unique location labels.
    pub locations: Vec<String>,
    /// Sorted unique bedroom counts.
    pub bedroom_counts: Vec<u32>,
}

impl Dataset {
    /// Build the unique-value indices from the loaded rows.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut cities: BTreeSet<&str> = BTreeSet::new();
        let mut property_types: BTreeSet<&str> = BTreeSet::new();
        let mut locations: BTreeSet<&str> = BTreeSet::new();
        let mut bedroom_counts: BTreeSet<u32> = BTreeSet::new();

        for l in &listings {
            cities.insert(&l.city);
            property_types.insert(&l.property_type);
            locations.insert(&l.location);
            bedroom_counts.insert(l.bedrooms);
        }

        Dataset {
            cities: cities.into_iter().map(str::to_owned).collect(),
            property_types: property_types.into_iter().map(str::to_owned).collect(),
            locations: locations.into_iter().map(str::to_owned).collect(),
            bedroom_counts: bedroom_counts.into_iter().collect(),
            listings,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Sorted bedroom counts observed for one purpose and property type.
    /// Drives the dependent bedrooms dropdown in the price-trend view.
    pub fn bedroom_counts_for(&self, purpose: Purpose, property_type: &str) -> Vec<u32> {
        let counts: BTreeSet<u32> = self
            .listings
            .iter()
            .filter(|l| l.purpose == purpose && l.property_type == property_type)
            .map(|l| l.bedrooms)
            .collect();
        counts.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Month labels
// ---------------------------------------------------------------------------

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Short tick labels for trend axes.
pub const MONTH_TICKS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Full month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(purpose: Purpose, property_type: &str, city: &str, bedrooms: u32) -> Listing {
        Listing {
            purpose,
            property_type: property_type.to_string(),
            city: city.to_string(),
            location: format!("{city} Central"),
            bedrooms,
            price: 1_000_000.0,
            listing_month: 5,
            latitude: 31.5,
            longitude: 74.3,
        }
    }

    #[test]
    fn purpose_labels_round_trip() {
        for p in Purpose::ALL {
            assert_eq!(Purpose::parse_label(&p.to_string()), Some(p));
        }
        assert_eq!(Purpose::parse_label("for sale"), None);
        assert_eq!(Purpose::parse_label("Rent"), None);
    }

    #[test]
    fn month_validation() {
        let mut l = listing(Purpose::ForSale, "House", "Lahore", 3);
        assert!(l.validate().is_ok());
        l.listing_month = 0;
        assert_eq!(l.validate(), Err(SchemaError::MonthOutOfRange(0)));
        l.listing_month = 13;
        assert_eq!(l.validate(), Err(SchemaError::MonthOutOfRange(13)));
    }

    #[test]
    fn indices_are_sorted_and_unique() {
        let ds = Dataset::from_listings(vec![
            listing(Purpose::ForSale, "House", "Lahore", 3),
            listing(Purpose::ForRent, "Flat", "Karachi", 2),
            listing(Purpose::ForSale, "House", "Lahore", 5),
        ]);
        assert_eq!(ds.len(), 3);
        assert!(!ds.is_empty());
        assert!(Dataset::from_listings(Vec::new()).is_empty());
        assert_eq!(ds.cities, vec!["Karachi", "Lahore"]);
        assert_eq!(ds.property_types, vec!["Flat", "House"]);
        assert_eq!(ds.bedroom_counts, vec![2, 3, 5]);
    }

    #[test]
    fn bedroom_counts_respect_purpose_and_type() {
        let ds = Dataset::from_listings(vec![
            listing(Purpose::ForSale, "House", "Lahore", 3),
            listing(Purpose::ForSale, "House", "Lahore", 5),
            listing(Purpose::ForRent, "House", "Lahore", 1),
            listing(Purpose::ForSale, "Flat", "Karachi", 2),
        ]);
        assert_eq!(ds.bedroom_counts_for(Purpose::ForSale, "House"), vec![3, 5]);
        assert_eq!(ds.bedroom_counts_for(Purpose::ForRent, "House"), vec![1]);
        assert!(ds.bedroom_counts_for(Purpose::ForRent, "Flat").is_empty());
    }

    #[test]
    fn month_names_line_up() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "?");
        assert_eq!(MONTH_TICKS[4], "May");
    }
}
