use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::AgencyRegistration;
use crate::utils::country_code;

/// Public agency sign-up form.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAgencyRequest {
    #[validate(length(min = 1, max = 120, message = "Company name must be between 1 and 120 characters"))]
    pub company_name: String,
    #[validate(length(min = 1, max = 120, message = "Contact name is required"))]
    pub contact_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "Phone must be between 7 and 20 characters"))]
    pub phone: String,
    #[validate(custom(function = "country_code"))]
    pub country_code: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 300, message = "Address is required"))]
    pub address: String,
    #[validate(length(max = 50, message = "License number is too long"))]
    pub license_number: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub captcha_id: Uuid,
    #[validate(length(min = 1, max = 4, message = "Captcha answer is required"))]
    pub captcha_answer: String,
}

impl RegisterAgencyRequest {
    pub fn into_registration(self) -> AgencyRegistration {
        AgencyRegistration {
            company_name: self.company_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            country_code: self.country_code.to_ascii_uppercase(),
            city: self.city.trim().to_string(),
            address: self.address.trim().to_string(),
            license_number: self
                .license_number
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            password: self.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub agency_id: String,
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form() -> serde_json::Value {
        json!({
            "company_name": "Desert Rose Travel",
            "contact_name": "Amal Haddad",
            "email": "Ops@DesertRose.example",
            "phone": "+971 4 555 0101",
            "country_code": "ae",
            "city": "Dubai",
            "address": "Office 12, Al Quoz",
            "password": "correct-horse",
            "captcha_id": Uuid::new_v4(),
            "captcha_answer": "7"
        })
    }

    #[test]
    fn valid_form_is_normalized() {
        let request: RegisterAgencyRequest = serde_json::from_value(form()).unwrap();
        assert!(request.validate().is_ok());

        let registration = request.into_registration();
        assert_eq!(registration.email, "ops@desertrose.example");
        assert_eq!(registration.country_code, "AE");
        assert!(registration.license_number.is_none());
    }

    #[test]
    fn short_password_and_bad_country_fail() {
        let mut value = form();
        value["password"] = json!("short");
        value["country_code"] = json!("UAE");
        let request: RegisterAgencyRequest = serde_json::from_value(value).unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("country_code"));
    }
}
