/// Data layer: loading, normalization, caching and date filtering.
///
/// Architecture:
/// ```text
///  path / URL (.csv, .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  read bytes (remote fetch with timeout)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → raw Table
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │  trim headers, parse Timestamp, add Scaling_Delta
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  probe which chart series exist
///   └──────────┘
///        │          (memoized per location by `cache`)
///        ▼
///   ┌──────────┐
///   │  filter   │  rows of the selected day
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod source;
