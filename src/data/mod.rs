/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Listing>, unique-value indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  filter → group → count/mean → derived table
///   └───────────┘
/// ```
pub mod aggregate;
pub mod loader;
pub mod model;
