use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::model::{Dataset, Listing, Purpose};

// ---------------------------------------------------------------------------
// Aggregation pipeline
//
// Every operation here is a pure function of the immutable dataset and the
// user's filter values: filter rows, group by one or two dimensions, reduce
// by count or mean, then sort/limit. The derived tables are recomputed on
// every interaction and never persisted. An empty filtered set yields an
// empty table, which the chart layer renders as "no listings match".
// ---------------------------------------------------------------------------

/// Geographic bounding box used before any map rendering. Rows with
/// out-of-range coordinates are dropped.
pub const LAT_RANGE: (f64, f64) = (23.42, 37.06);
pub const LON_RANGE: (f64, f64) = (60.50, 77.50);

/// Rankings truncate to this many rows.
pub const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Generic group-by helpers
// ---------------------------------------------------------------------------

/// Count occurrences per key, output sorted by key.
fn counts_by_key<K: Ord>(keys: impl Iterator<Item = K>) -> Vec<(K, u64)> {
    let mut counts: BTreeMap<K, u64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Count occurrences per key, output in first-seen order. Keeps ranking
/// ties stable under the later (stable) descending sort.
fn counts_first_seen<K: Eq + Hash + Clone>(keys: impl Iterator<Item = K>) -> Vec<(K, u64)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut rows: Vec<(K, u64)> = Vec::new();
    for key in keys {
        match index.entry(key) {
            Entry::Occupied(slot) => rows[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                rows.push((slot.key().clone(), 1));
                slot.insert(rows.len() - 1);
            }
        }
    }
    rows
}

/// Mean of values per key, output sorted by key.
fn means_by_key<K: Ord>(pairs: impl Iterator<Item = (K, f64)>) -> Vec<(K, f64)> {
    let mut acc: BTreeMap<K, (f64, u64)> = BTreeMap::new();
    for (key, value) in pairs {
        let slot = acc.entry(key).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Headline metrics for the overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub total_listings: usize,
    pub property_types: usize,
    pub cities: usize,
    pub locations: usize,
}

pub fn overview(dataset: &Dataset) -> Overview {
    Overview {
        total_listings: dataset.len(),
        property_types: dataset.property_types.len(),
        cities: dataset.cities.len(),
        locations: dataset.locations.len(),
    }
}

/// One point on the overview map.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub city: String,
}

/// Rows inside the geographic bounding box, projected for map rendering.
pub fn geo_points(dataset: &Dataset) -> Vec<GeoPoint> {
    dataset
        .listings
        .iter()
        .filter(|l| {
            (LAT_RANGE.0..=LAT_RANGE.1).contains(&l.latitude)
                && (LON_RANGE.0..=LON_RANGE.1).contains(&l.longitude)
        })
        .map(|l| GeoPoint {
            longitude: l.longitude,
            latitude: l.latitude,
            city: l.city.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Listing counts
// ---------------------------------------------------------------------------

/// Listing count per month, chronological. Months with no listings are
/// omitted rather than zero-filled.
pub fn listings_per_month(dataset: &Dataset) -> Vec<(u32, u64)> {
    counts_by_key(dataset.listings.iter().map(|l| l.listing_month))
}

/// Listing count per property type within one month.
pub fn listings_by_type_in_month(dataset: &Dataset, month: u32) -> Vec<(String, u64)> {
    counts_by_key(
        dataset
            .listings
            .iter()
            .filter(|l| l.listing_month == month)
            .map(|l| l.property_type.clone()),
    )
}

/// Listing count per purpose.
pub fn listings_by_purpose(dataset: &Dataset) -> Vec<(Purpose, u64)> {
    counts_by_key(dataset.listings.iter().map(|l| l.purpose))
}

/// Listing count per property type for one purpose.
pub fn listings_by_type_for_purpose(dataset: &Dataset, purpose: Purpose) -> Vec<(String, u64)> {
    counts_by_key(
        dataset
            .listings
            .iter()
            .filter(|l| l.purpose == purpose)
            .map(|l| l.property_type.clone()),
    )
}

/// Listing count per city, descending.
pub fn listings_by_city(dataset: &Dataset) -> Vec<(String, u64)> {
    let mut rows = counts_first_seen(dataset.listings.iter().map(|l| l.city.clone()));
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Count matrix of city × property type, missing combinations zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    /// Row axis, sorted.
    pub cities: Vec<String>,
    /// Column axis, sorted.
    pub property_types: Vec<String>,
    /// `counts[city_idx][type_idx]`.
    pub counts: Vec<Vec<u64>>,
}

impl CrossTab {
    /// Largest cell value, used to scale the heatmap colours.
    pub fn max_count(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

pub fn city_type_crosstab(dataset: &Dataset) -> CrossTab {
    let cities = dataset.cities.clone();
    let property_types = dataset.property_types.clone();

    let city_idx: HashMap<&str, usize> = cities
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let type_idx: HashMap<&str, usize> = property_types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut counts = vec![vec![0u64; property_types.len()]; cities.len()];
    for l in &dataset.listings {
        counts[city_idx[l.city.as_str()]][type_idx[l.property_type.as_str()]] += 1;
    }

    CrossTab {
        cities,
        property_types,
        counts,
    }
}

/// Top locations by listing count, descending, at most [`TOP_N`] rows.
/// Ties keep first-seen order.
pub fn top_locations(dataset: &Dataset, city: Option<&str>) -> Vec<(String, u64)> {
    let mut rows = counts_first_seen(
        dataset
            .listings
            .iter()
            .filter(|l| city.map_or(true, |c| l.city == c))
            .map(|l| l.location.clone()),
    );
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(TOP_N);
    rows
}

// ---------------------------------------------------------------------------
// Price aggregates
// ---------------------------------------------------------------------------

/// Mean price per `(property_type, bedrooms)` for one purpose.
pub fn mean_price_by_type_and_bedrooms(
    dataset: &Dataset,
    purpose: Purpose,
) -> Vec<((String, u32), f64)> {
    means_by_key(
        dataset
            .listings
            .iter()
            .filter(|l| l.purpose == purpose)
            .map(|l| ((l.property_type.clone(), l.bedrooms), l.price)),
    )
}

/// Mean price per `(bedrooms, city)` for one purpose and property type.
pub fn mean_price_by_bedrooms_and_city(
    dataset: &Dataset,
    purpose: Purpose,
    property_type: &str,
) -> Vec<((u32, String), f64)> {
    means_by_key(
        dataset
            .listings
            .iter()
            .filter(|l| l.purpose == purpose && l.property_type == property_type)
            .map(|l| ((l.bedrooms, l.city.clone()), l.price)),
    )
}

/// Mean price per month for one purpose, property type, and bedroom count,
/// chronological. All three filters constrain the rows.
pub fn mean_price_per_month(
    dataset: &Dataset,
    purpose: Purpose,
    property_type: &str,
    bedrooms: u32,
) -> Vec<(u32, f64)> {
    means_by_key(
        dataset
            .listings
            .iter()
            .filter(|l| {
                l.purpose == purpose && l.property_type == property_type && l.bedrooms == bedrooms
            })
            .map(|l| (l.listing_month, l.price)),
    )
}

// ---------------------------------------------------------------------------
// Hot locations
// ---------------------------------------------------------------------------

/// One row of the hot-locations table.
#[derive(Debug, Clone, PartialEq)]
pub struct HotLocation {
    pub location: String,
    pub city: String,
    pub average_price: f64,
}

/// For-Sale rows restricted to locations with more than one sale listing.
/// Dropping singleton locations removes one-off outliers from the ranking.
fn sale_base(dataset: &Dataset) -> Vec<&Listing> {
    let mut location_counts: HashMap<&str, u64> = HashMap::new();
    for l in &dataset.listings {
        if l.purpose == Purpose::ForSale {
            *location_counts.entry(l.location.as_str()).or_insert(0) += 1;
        }
    }
    dataset
        .listings
        .iter()
        .filter(|l| l.purpose == Purpose::ForSale && location_counts[l.location.as_str()] > 1)
        .collect()
}

/// Mean sale price per `(location, city)` over the hot-locations base set,
/// sorted by key. Feeds the treemap.
pub fn hot_location_prices(dataset: &Dataset) -> Vec<HotLocation> {
    means_by_key(
        sale_base(dataset)
            .into_iter()
            .map(|l| ((l.location.clone(), l.city.clone()), l.price)),
    )
    .into_iter()
    .map(|((location, city), average_price)| HotLocation {
        location,
        city,
        average_price,
    })
    .collect()
}

/// Cities present in the hot-locations table, sorted. Drives the city
/// dropdown for the top-10 view.
pub fn hot_cities(dataset: &Dataset) -> Vec<String> {
    let mut cities: Vec<String> = hot_location_prices(dataset)
        .into_iter()
        .map(|h| h.city)
        .collect();
    cities.sort();
    cities.dedup();
    cities
}

/// Most expensive hot locations in one city, descending, at most
/// [`TOP_N`] rows.
pub fn hot_top_locations_in_city(dataset: &Dataset, city: &str) -> Vec<HotLocation> {
    let mut rows: Vec<HotLocation> = hot_location_prices(dataset)
        .into_iter()
        .filter(|h| h.city == city)
        .collect();
    rows.sort_by(|a, b| b.average_price.total_cmp(&a.average_price));
    rows.truncate(TOP_N);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Listing;

    fn row(
        purpose: Purpose,
        property_type: &str,
        city: &str,
        location: &str,
        bedrooms: u32,
        price: f64,
        listing_month: u32,
    ) -> Listing {
        Listing {
            purpose,
            property_type: property_type.to_string(),
            city: city.to_string(),
            location: location.to_string(),
            bedrooms,
            price,
            listing_month,
            latitude: 31.5,
            longitude: 74.3,
        }
    }

    /// The three-row table used through the scenario tests.
    fn small_dataset() -> Dataset {
        Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 15_000_000.0, 5),
            row(Purpose::ForRent, "House", "Lahore", "DHA", 3, 40_000.0, 6),
            row(Purpose::ForSale, "Flat", "Karachi", "Clifton", 2, 8_000_000.0, 5),
        ])
    }

    #[test]
    fn purpose_counts() {
        let ds = small_dataset();
        assert_eq!(
            listings_by_purpose(&ds),
            vec![(Purpose::ForSale, 2), (Purpose::ForRent, 1)]
        );
    }

    #[test]
    fn mean_price_by_type_and_bedrooms_for_sale() {
        let ds = small_dataset();
        let rows = mean_price_by_type_and_bedrooms(&ds, Purpose::ForSale);
        assert_eq!(
            rows,
            vec![
                (("Flat".to_string(), 2), 8_000_000.0),
                (("House".to_string(), 3), 15_000_000.0),
            ]
        );
    }

    #[test]
    fn month_trend_is_chronological_and_sparse() {
        let ds = small_dataset();
        // Listings exist in months 5 and 6 only; other months are absent,
        // not zero-filled.
        assert_eq!(listings_per_month(&ds), vec![(5, 2), (6, 1)]);
    }

    #[test]
    fn month_filter_groups_by_property_type() {
        let ds = small_dataset();
        assert_eq!(
            listings_by_type_in_month(&ds, 5),
            vec![("Flat".to_string(), 1), ("House".to_string(), 1)]
        );
        assert!(listings_by_type_in_month(&ds, 1).is_empty());
    }

    #[test]
    fn count_sums_match_filtered_input() {
        let ds = small_dataset();
        let total: u64 = listings_by_purpose(&ds).iter().map(|r| r.1).sum();
        assert_eq!(total as usize, ds.len());

        let total: u64 = listings_per_month(&ds).iter().map(|r| r.1).sum();
        assert_eq!(total as usize, ds.len());

        let total: u64 = listings_by_city(&ds).iter().map(|r| r.1).sum();
        assert_eq!(total as usize, ds.len());

        let sale_rows = ds
            .listings
            .iter()
            .filter(|l| l.purpose == Purpose::ForSale)
            .count();
        let total: u64 = listings_by_type_for_purpose(&ds, Purpose::ForSale)
            .iter()
            .map(|r| r.1)
            .sum();
        assert_eq!(total as usize, sale_rows);
    }

    #[test]
    fn crosstab_zero_fills_missing_combinations() {
        let ds = small_dataset();
        let ct = city_type_crosstab(&ds);
        assert_eq!(ct.cities, vec!["Karachi", "Lahore"]);
        assert_eq!(ct.property_types, vec!["Flat", "House"]);
        // Karachi has no houses, Lahore has no flats.
        assert_eq!(ct.counts, vec![vec![1, 0], vec![0, 2]]);
        assert_eq!(ct.max_count(), 2);
        let total: u64 = ct.counts.iter().flatten().sum();
        assert_eq!(total as usize, ds.len());
    }

    #[test]
    fn city_counts_are_descending() {
        let ds = small_dataset();
        assert_eq!(
            listings_by_city(&ds),
            vec![("Lahore".to_string(), 2), ("Karachi".to_string(), 1)]
        );
    }

    #[test]
    fn top_locations_caps_at_ten_and_sorts_descending() {
        let mut listings = Vec::new();
        // 12 locations: location-0 gets 13 rows, location-1 gets 12, ...
        for i in 0..12u32 {
            for _ in 0..(13 - i) {
                listings.push(row(
                    Purpose::ForSale,
                    "House",
                    "Lahore",
                    &format!("location-{i}"),
                    3,
                    1_000_000.0,
                    5,
                ));
            }
        }
        let ds = Dataset::from_listings(listings);
        let rows = top_locations(&ds, None);
        assert_eq!(rows.len(), TOP_N);
        assert!(rows.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(rows[0], ("location-0".to_string(), 13));
    }

    #[test]
    fn top_locations_never_truncates_below_distinct_groups() {
        let ds = small_dataset();
        let rows = top_locations(&ds, None);
        assert_eq!(rows.len(), 2.min(TOP_N));
    }

    #[test]
    fn top_location_ties_keep_first_seen_order() {
        let ds = Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "Gulberg", 3, 1.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "Askari", 3, 1.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 1.0, 5),
        ]);
        let rows = top_locations(&ds, None);
        // All counts tie at 1; input order wins, not alphabetical.
        assert_eq!(rows[0].0, "Gulberg");
        assert_eq!(rows[1].0, "Askari");
        assert_eq!(rows[2].0, "DHA");
    }

    #[test]
    fn top_locations_respects_city_filter() {
        let ds = small_dataset();
        let rows = top_locations(&ds, Some("Karachi"));
        assert_eq!(rows, vec![("Clifton".to_string(), 1)]);
    }

    #[test]
    fn hot_locations_drop_singletons() {
        let ds = Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 10.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "DHA", 4, 20.0, 5),
            // Only one sale listing in Clifton: excluded from the ranking.
            row(Purpose::ForSale, "Flat", "Karachi", "Clifton", 2, 99.0, 5),
            // Rentals never count towards the sale base.
            row(Purpose::ForRent, "Flat", "Karachi", "Clifton", 2, 1.0, 5),
        ]);
        let rows = hot_location_prices(&ds);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "DHA");
        assert_eq!(rows[0].average_price, 15.0);
        assert!(rows.iter().all(|h| h.location != "Clifton"));
    }

    #[test]
    fn hot_top_locations_sort_by_average_price() {
        let ds = Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 10.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "DHA", 4, 20.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "Gulberg", 3, 40.0, 5),
            row(Purpose::ForSale, "House", "Lahore", "Gulberg", 4, 60.0, 5),
            row(Purpose::ForSale, "House", "Karachi", "Clifton", 3, 80.0, 5),
            row(Purpose::ForSale, "House", "Karachi", "Clifton", 4, 90.0, 5),
        ]);
        let rows = hot_top_locations_in_city(&ds, "Lahore");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "Gulberg");
        assert_eq!(rows[0].average_price, 50.0);
        assert_eq!(rows[1].location, "DHA");
        assert!(rows.iter().all(|h| h.city == "Lahore"));

        assert_eq!(hot_cities(&ds), vec!["Karachi", "Lahore"]);
    }

    #[test]
    fn geo_points_respect_bounding_box() {
        let mut inside = row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 1.0, 5);
        inside.latitude = 31.5;
        inside.longitude = 74.3;
        let mut far_north = inside.clone();
        far_north.latitude = 51.5; // London, clearly out of range
        let mut far_west = inside.clone();
        far_west.longitude = -0.1;
        let ds = Dataset::from_listings(vec![inside, far_north, far_west]);

        let points = geo_points(&ds);
        assert_eq!(points.len(), 1);
        for p in &points {
            assert!((LAT_RANGE.0..=LAT_RANGE.1).contains(&p.latitude));
            assert!((LON_RANGE.0..=LON_RANGE.1).contains(&p.longitude));
        }
    }

    #[test]
    fn price_trend_applies_all_three_filters() {
        let ds = Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 100.0, 1),
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 300.0, 2),
            // Same bedrooms but wrong purpose / type: must not contribute.
            row(Purpose::ForRent, "House", "Lahore", "DHA", 3, 9_999.0, 1),
            row(Purpose::ForSale, "Flat", "Lahore", "DHA", 3, 9_999.0, 1),
            // Wrong bedrooms.
            row(Purpose::ForSale, "House", "Lahore", "DHA", 4, 9_999.0, 1),
        ]);
        let rows = mean_price_per_month(&ds, Purpose::ForSale, "House", 3);
        assert_eq!(rows, vec![(1, 100.0), (2, 300.0)]);
    }

    #[test]
    fn mean_price_by_bedrooms_and_city_filters_and_groups() {
        let ds = Dataset::from_listings(vec![
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 100.0, 1),
            row(Purpose::ForSale, "House", "Lahore", "DHA", 3, 200.0, 2),
            row(Purpose::ForSale, "House", "Karachi", "Clifton", 3, 400.0, 1),
            row(Purpose::ForRent, "House", "Lahore", "DHA", 3, 9.0, 1),
        ]);
        let rows = mean_price_by_bedrooms_and_city(&ds, Purpose::ForSale, "House");
        assert_eq!(
            rows,
            vec![
                ((3, "Karachi".to_string()), 400.0),
                ((3, "Lahore".to_string()), 150.0),
            ]
        );
    }

    #[test]
    fn empty_filtered_set_yields_empty_tables() {
        let ds = small_dataset();
        assert!(mean_price_per_month(&ds, Purpose::ForRent, "Flat", 9).is_empty());
        assert!(listings_by_type_in_month(&ds, 12).is_empty());
        assert!(top_locations(&ds, Some("Quetta")).is_empty());

        let empty = Dataset::from_listings(Vec::new());
        assert!(listings_per_month(&empty).is_empty());
        assert!(hot_location_prices(&empty).is_empty());
        assert_eq!(overview(&empty).total_listings, 0);
    }

    #[test]
    fn overview_counts_rows_not_cells() {
        let ds = small_dataset();
        let o = overview(&ds);
        assert_eq!(o.total_listings, 3);
        assert_eq!(o.property_types, 2);
        assert_eq!(o.cities, 2);
        assert_eq!(o.locations, 2);
    }
}
