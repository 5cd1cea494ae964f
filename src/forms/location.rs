use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::location::NewLocation;
use crate::domain::types::{LocationName, LocationSlug};
use crate::forms::validation::{Rule, Schema, required};
use crate::forms::{FormError, FormFields, field_map};

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
/// New location on the admin Locations tab.
pub struct LocationForm {
    /// Machine name; slugified before saving.
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub display_name: String,
}

impl FormFields for LocationForm {
    fn schema(&self) -> Schema {
        Schema::from([
            ("name", Rule::new(required)),
            ("display_name", Rule::new(required)),
        ])
    }

    fn values(&self) -> HashMap<String, String> {
        field_map([
            ("name", self.name.as_str()),
            ("display_name", self.display_name.as_str()),
        ])
    }
}

impl TryFrom<LocationForm> for NewLocation {
    type Error = FormError;

    fn try_from(form: LocationForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewLocation {
            name: LocationSlug::new(form.name)?,
            display_name: LocationName::new(form.display_name)?,
        })
    }
}
