use std::collections::HashMap;

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{ContactEmail, MobileNumber, PersonName};
use crate::domain::user::{Credentials, Registration};
use crate::forms::validation::{Rule, Schema, compose, email, mobile, password, required};
use crate::forms::{FormError, FormFields, field_map};

fn email_rule() -> Rule {
    compose([Rule::new(required), Rule::new(email)])
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
/// User login on the `/auth` page.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
/// Account registration on the `/auth` page.
pub struct RegisterForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub mobile: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct AdminLoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl FormFields for LoginForm {
    fn schema(&self) -> Schema {
        Schema::from([("email", email_rule()), ("password", Rule::new(required))])
    }

    fn values(&self) -> HashMap<String, String> {
        field_map([("email", self.email.as_str()), ("password", self.password.as_str())])
    }
}

impl FormFields for RegisterForm {
    fn schema(&self) -> Schema {
        Schema::from([
            ("name", Rule::new(required)),
            ("email", email_rule()),
            (
                "password",
                compose([Rule::new(required), Rule::new(password)]),
            ),
            ("mobile", compose([Rule::new(required), Rule::new(mobile)])),
        ])
    }

    fn values(&self) -> HashMap<String, String> {
        field_map([
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("mobile", self.mobile.as_str()),
        ])
    }
}

impl FormFields for AdminLoginForm {
    fn schema(&self) -> Schema {
        Schema::from([("email", email_rule()), ("password", Rule::new(required))])
    }

    fn values(&self) -> HashMap<String, String> {
        field_map([("email", self.email.as_str()), ("password", self.password.as_str())])
    }
}

fn credentials(email: String, password: String) -> Result<Credentials, FormError> {
    Ok(Credentials {
        email: ContactEmail::new(email)?,
        password,
    })
}

impl TryFrom<LoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        credentials(form.email, form.password)
    }
}

impl TryFrom<AdminLoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: AdminLoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        credentials(form.email, form.password)
    }
}

impl TryFrom<RegisterForm> for Registration {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Registration {
            name: PersonName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: ContactEmail::new(form.email)?,
            password: form.password,
            mobile: MobileNumber::new(form.mobile)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "Asha Rao".to_string(),
            email: "Asha@Example.com".to_string(),
            password: "Secret123".to_string(),
            mobile: "98765 43210".to_string(),
        }
    }

    #[test]
    fn registration_is_normalized() {
        let registration = Registration::try_from(register_form()).unwrap();
        assert_eq!(registration.email.as_str(), "asha@example.com");
        assert_eq!(registration.mobile.as_str(), "9876543210");
    }

    #[test]
    fn weak_password_fails_schema() {
        let form = RegisterForm {
            password: "secret".to_string(),
            ..register_form()
        };
        let mut state = form.state();
        assert!(!state.validate_all());
        assert_eq!(
            state.visible_error("password"),
            Some("Password must be at least 8 characters long")
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let mut state = LoginForm::default().state();
        assert!(!state.validate_all());
        assert_eq!(state.visible_error("email"), Some("This field is required"));
        assert_eq!(state.visible_error("password"), Some("This field is required"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form = LoginForm {
            email: "nope".to_string(),
            password: "x".to_string(),
        };
        assert!(Credentials::try_from(form).is_err());
    }
}
