//! Remote catalog API: transport capability, typed client and the
//! relation-payload normalization step.

pub mod client;
pub mod models;
pub mod relation;
pub mod transport;

pub use client::CatalogClient;
pub use models::{BoardId, CatalogItem, ColumnId, ItemId};
pub use relation::decode_linked_ids;
pub use transport::{HttpTransport, Transport};
