//! Collection mapping and document type.

use serde_json::{Map, Value};
use strum::{Display, EnumIter};

/// A schema-less document, passed through without interpretation.
pub type Document = Map<String, Value>;

/// Read-only collections exposed over HTTP.
///
/// Each variant maps to a fixed logical database and collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Resource {
    /// Store products.
    #[strum(serialize = "products")]
    Products,
    /// Sensor readings.
    #[strum(serialize = "sensor-data")]
    SensorData,
    /// Blog posts.
    #[strum(serialize = "blogs")]
    Blogs,
}

impl Resource {
    /// Logical database holding this collection.
    pub fn database(&self) -> &'static str {
        match self {
            Resource::Products => "Store",
            Resource::SensorData => "Sensor",
            Resource::Blogs => "Blog",
        }
    }

    /// Collection name inside [`Self::database`].
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Products => "Products",
            Resource::SensorData => "Data",
            Resource::Blogs => "Blogs",
        }
    }

    /// HTTP route serving this collection.
    pub fn route(&self) -> &'static str {
        match self {
            Resource::Products => "/api/Store",
            Resource::SensorData => "/api/data",
            Resource::Blogs => "/api/blogs",
        }
    }
}
