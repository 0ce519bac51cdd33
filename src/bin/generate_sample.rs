//! Generate a deterministic synthetic listings CSV for trying out the
//! dashboard: `cargo run --bin generate_sample` writes `sample_listings.csv`.

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform float in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..n`.
    fn index(&mut self, n: usize) -> usize {
        (self.uniform() * n as f64) as usize
    }

    /// Pick an index from a weight table.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut target = self.uniform() * total;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }
}

struct City {
    name: &'static str,
    latitude: f64,
    longitude: f64,
    /// Relative price level vs the national base.
    price_factor: f64,
    locations: &'static [&'static str],
}

const CITIES: &[City] = &[
    City {
        name: "Karachi",
        latitude: 24.86,
        longitude: 67.01,
        price_factor: 1.25,
        locations: &["Clifton", "DHA Defence", "Gulshan-e-Iqbal", "North Nazimabad", "Bahria Town Karachi"],
    },
    City {
        name: "Lahore",
        latitude: 31.52,
        longitude: 74.36,
        price_factor: 1.15,
        locations: &["DHA Defence", "Gulberg", "Johar Town", "Bahria Town", "Model Town"],
    },
    City {
        name: "Islamabad",
        latitude: 33.69,
        longitude: 73.06,
        price_factor: 1.40,
        locations: &["F-7", "E-11", "G-13", "DHA Defence", "Bahria Town"],
    },
    City {
        name: "Rawalpindi",
        latitude: 33.60,
        longitude: 73.04,
        price_factor: 0.85,
        locations: &["Bahria Town Rawalpindi", "Satellite Town", "Chaklala Scheme"],
    },
    City {
        name: "Faisalabad",
        latitude: 31.42,
        longitude: 73.08,
        price_factor: 0.70,
        locations: &["Eden Valley", "Wapda City", "Susan Road"],
    },
];

/// (label, base sale price for one bedroom, bedroom range)
const PROPERTY_TYPES: &[(&str, f64, (u32, u32))] = &[
    ("House", 9_000_000.0, (2, 7)),
    ("Flat", 4_500_000.0, (1, 4)),
    ("Upper Portion", 3_500_000.0, (2, 5)),
    ("Lower Portion", 3_200_000.0, (2, 5)),
    ("Penthouse", 14_000_000.0, (3, 5)),
    ("Farm House", 25_000_000.0, (4, 8)),
];

/// Listing volume per month; summer months run hotter.
const MONTH_WEIGHTS: [f64; 12] = [
    0.6, 0.7, 0.9, 1.0, 1.2, 1.3, 1.4, 1.2, 1.0, 0.9, 0.7, 0.6,
];

const ROWS: usize = 5_000;
const OUTPUT: &str = "sample_listings.csv";

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(OUTPUT).context("creating output CSV")?;

    writer.write_record([
        "purpose",
        "property_type",
        "city",
        "location",
        "bedrooms",
        "price",
        "listing_month",
        "latitude",
        "longitude",
    ])?;

    for _ in 0..ROWS {
        let city = &CITIES[rng.index(CITIES.len())];
        let location = city.locations[rng.index(city.locations.len())];
        let (property_type, base_price, (min_beds, max_beds)) =
            PROPERTY_TYPES[rng.index(PROPERTY_TYPES.len())];
        let bedrooms = min_beds + rng.index((max_beds - min_beds + 1) as usize) as u32;
        let listing_month = rng.weighted(&MONTH_WEIGHTS) as u32 + 1;

        // Sales outnumber rentals roughly two to one.
        let for_sale = rng.uniform() < 0.68;
        let jitter = 0.6 + rng.uniform() * 0.8;
        let sale_price =
            base_price * city.price_factor * (0.5 + 0.5 * bedrooms as f64) * jitter;
        let price = if for_sale {
            sale_price.round()
        } else {
            // Monthly rent, a small fraction of the sale price.
            (sale_price * 0.004).round()
        };

        // A sliver of rows carries junk coordinates so the overview map's
        // bounding-box filter has something to drop.
        let (latitude, longitude) = if rng.uniform() < 0.01 {
            (0.0, 0.0)
        } else {
            (
                city.latitude + (rng.uniform() - 0.5) * 0.4,
                city.longitude + (rng.uniform() - 0.5) * 0.4,
            )
        };

        let bedrooms = bedrooms.to_string();
        let price = format!("{price}");
        let listing_month = listing_month.to_string();
        let latitude = format!("{latitude:.4}");
        let longitude = format!("{longitude:.4}");
        writer.write_record([
            if for_sale { "For Sale" } else { "For Rent" },
            property_type,
            city.name,
            location,
            &bedrooms,
            &price,
            &listing_month,
            &latitude,
            &longitude,
        ])?;
    }

    writer.flush().context("flushing output CSV")?;
    println!("Wrote {ROWS} listings to {OUTPUT}");
    Ok(())
}
