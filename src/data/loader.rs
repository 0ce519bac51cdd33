use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Dataset, Listing, Purpose, SchemaError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one listing per row, header row with column names
/// * `.json`    – `[{ "purpose": "For Sale", "city": ..., ... }, ...]`
/// * `.parquet` – flat Parquet file with the same columns
///
/// The fixed schema is `purpose, property_type, city, location, bedrooms,
/// price, listing_month, latitude, longitude`; any other column is ignored.
/// The input is assumed pre-cleaned, so a malformed file is a fatal error.
pub fn load(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut listings = Vec::new();
    for (row_no, result) in reader.deserialize::<Listing>().enumerate() {
        let listing = result.with_context(|| format!("CSV row {row_no}"))?;
        listing
            .validate()
            .with_context(|| format!("CSV row {row_no}"))?;
        listings.push(listing);
    }

    Ok(Dataset::from_listings(listings))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "purpose": "For Sale",
///     "property_type": "House",
///     "city": "Lahore",
///     "location": "DHA Defence",
///     "bedrooms": 3,
///     "price": 15000000,
///     "listing_month": 5,
///     "latitude": 31.46,
///     "longitude": 74.41
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let listings: Vec<Listing> = serde_json::from_str(&text).context("parsing JSON")?;

    for (row_no, listing) in listings.iter().enumerate() {
        listing
            .validate()
            .with_context(|| format!("JSON record {row_no}"))?;
    }

    Ok(Dataset::from_listings(listings))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file of listings. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut listings = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let col_index = |name: &str| -> Result<usize> {
            schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };

        let purpose = batch.column(col_index("purpose")?);
        let property_type = batch.column(col_index("property_type")?);
        let city = batch.column(col_index("city")?);
        let location = batch.column(col_index("location")?);
        let bedrooms = batch.column(col_index("bedrooms")?);
        let price = batch.column(col_index("price")?);
        let listing_month = batch.column(col_index("listing_month")?);
        let latitude = batch.column(col_index("latitude")?);
        let longitude = batch.column(col_index("longitude")?);

        for row in 0..batch.num_rows() {
            let purpose_label = string_value(purpose, row)
                .with_context(|| format!("Row {row}: reading 'purpose'"))?;
            let purpose = Purpose::parse_label(&purpose_label)
                .ok_or(SchemaError::UnknownPurpose(purpose_label))
                .with_context(|| format!("Row {row}"))?;

            let listing = Listing {
                purpose,
                property_type: string_value(property_type, row)
                    .with_context(|| format!("Row {row}: reading 'property_type'"))?,
                city: string_value(city, row)
                    .with_context(|| format!("Row {row}: reading 'city'"))?,
                location: string_value(location, row)
                    .with_context(|| format!("Row {row}: reading 'location'"))?,
                bedrooms: integer_value(bedrooms, row)
                    .with_context(|| format!("Row {row}: reading 'bedrooms'"))?
                    as u32,
                price: float_value(price, row)
                    .with_context(|| format!("Row {row}: reading 'price'"))?,
                listing_month: integer_value(listing_month, row)
                    .with_context(|| format!("Row {row}: reading 'listing_month'"))?
                    as u32,
                latitude: float_value(latitude, row)
                    .with_context(|| format!("Row {row}: reading 'latitude'"))?,
                longitude: float_value(longitude, row)
                    .with_context(|| format!("Row {row}: reading 'longitude'"))?,
            };
            listing.validate().with_context(|| format!("Row {row}"))?;
            listings.push(listing);
        }
    }

    Ok(Dataset::from_listings(listings))
}

// -- Parquet / Arrow helpers --

fn string_value(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            Ok(arr.value(row).to_string())
        }
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

fn integer_value(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::UInt32 => {
            let arr = col.as_any().downcast_ref::<UInt32Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        DataType::UInt64 => {
            let arr = col.as_any().downcast_ref::<UInt64Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        // Pandas writes integer columns with NaN gaps as floats.
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        other => bail!("Expected integer column, got {other:?}"),
    }
}

fn float_value(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in float column");
    }
    match col.data_type() {
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Ok(arr.value(row) as u8 as f64)
        }
        other => bail!("Expected float column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Purpose;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("housing-dashboard-test-{name}"));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const HEADER: &str =
        "purpose,property_type,city,location,bedrooms,price,listing_month,latitude,longitude";

    #[test]
    fn csv_happy_path() {
        let path = write_temp(
            "happy.csv",
            &format!(
                "{HEADER}\n\
                 For Sale,House,Lahore,DHA Defence,3,15000000,5,31.46,74.41\n\
                 For Rent,Flat,Karachi,Clifton,2,40000,6,24.81,67.03\n"
            ),
        );
        let ds = load(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.listings[0].purpose, Purpose::ForSale);
        assert_eq!(ds.listings[1].city, "Karachi");
        assert_eq!(ds.listings[0].price, 15_000_000.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn csv_passthrough_columns_are_ignored() {
        let path = write_temp(
            "passthrough.csv",
            &format!(
                "{HEADER},agency,baths\n\
                 For Sale,House,Lahore,DHA Defence,3,15000000,5,31.46,74.41,Acme,2\n"
            ),
        );
        let ds = load(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].bedrooms, 3);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn csv_unknown_purpose_is_fatal() {
        let path = write_temp(
            "bad-purpose.csv",
            &format!("{HEADER}\nAuction,House,Lahore,DHA Defence,3,15000000,5,31.46,74.41\n"),
        );
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unknown purpose label 'Auction'"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn csv_month_out_of_range_is_fatal() {
        let path = write_temp(
            "bad-month.csv",
            &format!("{HEADER}\nFor Sale,House,Lahore,DHA Defence,3,15000000,13,31.46,74.41\n"),
        );
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("out of range 1-12"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn json_records() {
        let path = write_temp(
            "records.json",
            r#"[
                {"purpose": "For Sale", "property_type": "House", "city": "Lahore",
                 "location": "DHA Defence", "bedrooms": 3, "price": 15000000,
                 "listing_month": 5, "latitude": 31.46, "longitude": 74.41}
            ]"#,
        );
        let ds = load(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].location, "DHA Defence");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unsupported_extension() {
        let err = load(Path::new("listings.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
