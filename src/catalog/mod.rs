//! Purchasable plans and the price taxonomy.

pub mod plans;
pub mod price;

pub use plans::{Catalog, CatalogBuilder, Plan, PlanBuilder, PlanPrice};
pub use price::{PriceKind, UnknownPriceKind};
