//! Data layer: core types, loading, filtering, ranking and the pivot.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .parquet / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawTable → clean → DepositDataset
//!   └──────────┘
//!        │  Arc<DepositDataset> (read-only)
//!        ├──────────────────────────┐
//!        ▼                          ▼
//!   ┌──────────┐               ┌──────────┐
//!   │  filter   │ type/agency/  │  pivot    │ agency + type over the
//!   │  ranking  │ year/month    │  month    │ month window → RankedPivot
//!   └──────────┘ → Ranking      └──────────┘
//! ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod month;
pub mod pivot;
pub mod ranking;
