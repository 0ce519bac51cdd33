use std::sync::Arc;

use crate::data::model::{Dataset, Purpose};

// ---------------------------------------------------------------------------
// Analysis modes
// ---------------------------------------------------------------------------

/// The nine selectable analyses, dispatched by value rather than a
/// conditional chain: the sidebar iterates [`AnalysisMode::ALL`] and the
/// chart layer matches on the active variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Overview,
    ListingsByMonth,
    ListingsByPurpose,
    ListingsByCity,
    TopLocations,
    PriceByPurpose,
    PriceByCity,
    HotLocations,
    PriceTrend,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 9] = [
        AnalysisMode::Overview,
        AnalysisMode::ListingsByMonth,
        AnalysisMode::ListingsByPurpose,
        AnalysisMode::ListingsByCity,
        AnalysisMode::TopLocations,
        AnalysisMode::PriceByPurpose,
        AnalysisMode::PriceByCity,
        AnalysisMode::HotLocations,
        AnalysisMode::PriceTrend,
    ];

    /// Short label for the sidebar radio.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::Overview => "Overview",
            AnalysisMode::ListingsByMonth => "Listings by Month",
            AnalysisMode::ListingsByPurpose => "Listings by Purpose",
            AnalysisMode::ListingsByCity => "Listings by City",
            AnalysisMode::TopLocations => "Top Locations",
            AnalysisMode::PriceByPurpose => "Price by Purpose",
            AnalysisMode::PriceByCity => "Price by City",
            AnalysisMode::HotLocations => "Hot Locations",
            AnalysisMode::PriceTrend => "Price Trend Over Time",
        }
    }

    /// Section title rendered above the chart.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisMode::Overview => "Overview",
            AnalysisMode::ListingsByMonth => "Listings by Month of the Year",
            AnalysisMode::ListingsByPurpose => "Listings by Purpose (Sale/Rental)",
            AnalysisMode::ListingsByCity => "Listings by City",
            AnalysisMode::TopLocations => "Top Locations (By Number of Listings)",
            AnalysisMode::PriceByPurpose => "Price Analysis by Purpose (Sale/Rental)",
            AnalysisMode::PriceByCity => "Price Analysis by City",
            AnalysisMode::HotLocations => "Hot Locations (By Average Property Sale Price)",
            AnalysisMode::PriceTrend => "Trend in Property Prices Across Months",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The dataset is loaded once
/// at startup and threaded into every view as an immutable reference.
pub struct AppState {
    pub dataset: Arc<Dataset>,

    /// Active analysis mode.
    pub mode: AnalysisMode,

    /// Listings by Month: `None` = all months, else 1-12.
    pub selected_month: Option<u32>,

    /// Listings by Purpose: `None` = both purposes.
    pub breakdown_purpose: Option<Purpose>,

    /// Listings by City: show the city × property-type heatmap instead of
    /// the count bars.
    pub city_trend: bool,

    /// Top Locations: `None` = all cities.
    pub top_city: Option<String>,

    /// Price by Purpose.
    pub price_purpose: Purpose,

    /// Price by City.
    pub city_price_purpose: Purpose,
    pub city_price_type: String,

    /// Hot Locations: top-10 view toggle and its city.
    pub hot_top10: bool,
    pub hot_city: Option<String>,

    /// Price Trend Over Time.
    pub trend_purpose: Purpose,
    pub trend_type: String,
    pub trend_bedrooms: u32,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let first_type = dataset.property_types.first().cloned().unwrap_or_default();
        let mut state = Self {
            dataset,
            mode: AnalysisMode::Overview,
            selected_month: None,
            breakdown_purpose: None,
            city_trend: false,
            top_city: None,
            price_purpose: Purpose::ForSale,
            city_price_purpose: Purpose::ForSale,
            city_price_type: first_type.clone(),
            hot_top10: false,
            hot_city: None,
            trend_purpose: Purpose::ForSale,
            trend_type: first_type,
            trend_bedrooms: 0,
        };
        state.clamp_trend_bedrooms();
        state
    }

    /// Bedroom counts valid for the current price-trend purpose and type.
    pub fn trend_bedroom_choices(&self) -> Vec<u32> {
        self.dataset
            .bedroom_counts_for(self.trend_purpose, &self.trend_type)
    }

    /// Snap `trend_bedrooms` back into the valid domain after the purpose
    /// or property-type selection changes.
    pub fn clamp_trend_bedrooms(&mut self) {
        let choices = self.trend_bedroom_choices();
        if !choices.contains(&self.trend_bedrooms) {
            self.trend_bedrooms = choices.first().copied().unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Listing;

    fn dataset() -> Arc<Dataset> {
        let row = |purpose, property_type: &str, bedrooms| Listing {
            purpose,
            property_type: property_type.to_string(),
            city: "Lahore".to_string(),
            location: "DHA".to_string(),
            bedrooms,
            price: 1.0,
            listing_month: 5,
            latitude: 31.5,
            longitude: 74.3,
        };
        Arc::new(Dataset::from_listings(vec![
            row(Purpose::ForSale, "Flat", 2),
            row(Purpose::ForSale, "House", 3),
            row(Purpose::ForSale, "House", 5),
            row(Purpose::ForRent, "House", 1),
        ]))
    }

    #[test]
    fn defaults_pick_first_valid_selections() {
        let state = AppState::new(dataset());
        assert_eq!(state.mode, AnalysisMode::Overview);
        // First property type alphabetically is "Flat"; its only For-Sale
        // bedroom count is 2.
        assert_eq!(state.trend_type, "Flat");
        assert_eq!(state.trend_bedrooms, 2);
    }

    #[test]
    fn bedrooms_clamp_when_domain_changes() {
        let mut state = AppState::new(dataset());
        state.trend_type = "House".to_string();
        state.clamp_trend_bedrooms();
        assert_eq!(state.trend_bedrooms, 3);

        state.trend_purpose = Purpose::ForRent;
        state.clamp_trend_bedrooms();
        assert_eq!(state.trend_bedrooms, 1);
    }

    #[test]
    fn all_modes_have_distinct_labels() {
        let labels: std::collections::BTreeSet<&str> =
            AnalysisMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels.len(), AnalysisMode::ALL.len());
    }
}
