use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::booking::NewBooking;
use crate::domain::types::{ContactEmail, EventId, MobileNumber, PersonName};
use crate::forms::validation::{Rule, Schema, compose, email, mobile, required};
use crate::forms::{FormError, FormFields, field_map};

fn default_quantity() -> i64 {
    1
}

/// Reads a quantity typed into a URL. Anything unparsable counts as 0 so it
/// is clamped with a message rather than rejected.
pub fn parse_quantity(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
/// Contact details entered on the checkout page.
pub struct CheckoutForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub mobile: String,
    /// Carried through from the details page; re-clamped on every load.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Quantity picked on the event details page. Signed so that out-of-range
/// requests can be clamped with a message instead of rejected.
#[derive(Clone, Debug, Deserialize)]
pub struct QuantityForm {
    pub quantity: i64,
}

/// Validated checkout contact details.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutPayload {
    pub name: PersonName,
    pub email: ContactEmail,
    pub mobile: MobileNumber,
}

impl CheckoutPayload {
    pub fn into_booking(self, event_id: EventId, quantity: u32) -> NewBooking {
        NewBooking {
            event_id,
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            quantity,
        }
    }
}

impl FormFields for CheckoutForm {
    fn schema(&self) -> Schema {
        Schema::from([
            ("name", Rule::new(required)),
            ("email", compose([Rule::new(required), Rule::new(email)])),
            ("mobile", compose([Rule::new(required), Rule::new(mobile)])),
        ])
    }

    fn values(&self) -> HashMap<String, String> {
        let mut values = field_map([
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("mobile", self.mobile.as_str()),
        ]);
        values.insert("quantity".to_string(), self.quantity.to_string());
        values
    }
}

impl TryFrom<CheckoutForm> for CheckoutPayload {
    type Error = FormError;

    fn try_from(form: CheckoutForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(CheckoutPayload {
            name: PersonName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: ContactEmail::new(form.email)?,
            mobile: MobileNumber::new(form.mobile)?,
        })
    }
}
