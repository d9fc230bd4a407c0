/// Data layer: core types, loading, lookup and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Dataset (one Series per group)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  legend selection → visible series
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │   sync    │ ───▶ │  locate   │  nearest sample per series at the query time
///   └──────────┘      └──────────┘
///
///   aggregate: per-timepoint means for group trend lines
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod locate;
pub mod model;
pub mod sync;
