//! Route assignments and the route catalog used to name them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::de;

/// A route reference as returned by the per-user route assignment endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteRef {
    #[serde(rename = "Route_Id", default, deserialize_with = "de::string_or_empty")]
    pub route_id: String,
    #[serde(rename = "Route_Name", default, deserialize_with = "de::opt_id")]
    pub route_name: Option<String>,
}

/// Catalog row mapping a route id to its display name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteCatalogEntry {
    #[serde(rename = "Route_Id", default, deserialize_with = "de::string_or_empty")]
    pub route_id: String,
    #[serde(rename = "Route_Name", default, deserialize_with = "de::string_or_empty")]
    pub route_name: String,
}

/// Lookup table from Route_Id to Route_Name.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    names: HashMap<String, String>,
}

impl RouteCatalog {
    pub fn new(entries: Vec<RouteCatalogEntry>) -> Self {
        let names = entries
            .into_iter()
            .filter(|e| !e.route_id.is_empty())
            .map(|e| (e.route_id, e.route_name))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a route reference to a human-readable route.
    ///
    /// Catalog name wins; then the name embedded in the reference; then the id.
    pub fn resolve(&self, route: &RouteRef) -> ResolvedRoute {
        let route_name = self
            .names
            .get(&route.route_id)
            .filter(|name| !name.is_empty())
            .cloned()
            .or_else(|| route.route_name.clone())
            .unwrap_or_else(|| route.route_id.clone());
        ResolvedRoute {
            route_id: route.route_id.clone(),
            route_name,
        }
    }
}

/// A route with its display name resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub route_id: String,
    pub route_name: String,
}

/// Routes assigned to one attendance user for the queried date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub user_id: Option<String>,
    pub user_name: String,
    pub routes: Vec<ResolvedRoute>,
}
