//! # Miti Tibeb
//!
//! Data layer for the Miti Tibeb furniture storefront.
//!
//! The storefront pages render products, a ranked "popular materials" panel,
//! a share panel with referral links, and an admin dashboard. All business
//! logic lives behind a remote API; this crate is what the pages call to reach
//! it, and what turns raw responses into the state the pages render.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │   Backend HTTP API   │
//!                 └──────────┬───────────┘
//!                            │
//!                     ┌──────▼──────┐
//!                     │   Gateway   │  JSON, bearer credential, typed errors
//!                     └──┬───────┬──┘
//!            ProductSource│       │
//!              ┌──────────▼──┐  ┌─▼──────────────────┐
//!              │ Summary     │  │ Catalog / Dashboard │
//!              │ Controller  │  │ consumers           │
//!              └──────┬──────┘  └─────────┬──────────┘
//!                     │ Lifecycle<T>      │
//!                     ▼                   ▼
//!              Pending / Ready(T) / Failed(reason)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mtb summary                     # top 3 materials
//! mtb summary --field category    # rank another field
//! mtb product 42
//! mtb share 42 --name "Carved Bowl" --url https://shop.example/products/42
//! mtb dashboard
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`models`] | Product records, summaries, load state |
//! | [`error`] | Gateway and payload-shape errors |
//! | [`gateway`] | HTTP access to the backend |
//! | [`summary`] | Frequency ranking and descriptions |
//! | [`lifecycle`] | Load state with stale-result protection |
//! | [`controller`] | Fetch, rank, and publish summaries |
//! | [`catalog`] | Referral codes and share links |
//! | [`dashboard`] | Admin stats and recent activity |

pub mod catalog;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod models;
pub mod summary;
