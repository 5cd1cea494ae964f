//! Reference data used to populate location selectors.

use serde::{Deserialize, Serialize};

use crate::domain::types::{LocationId, LocationName, LocationSlug};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(alias = "_id")]
    pub id: LocationId,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewLocation {
    pub name: LocationSlug,
    #[serde(rename = "displayName")]
    pub display_name: LocationName,
}
