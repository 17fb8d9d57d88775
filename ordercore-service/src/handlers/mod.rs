//! Request handlers, grouped by resource.
//!
//! Every handler parses its body into domain types at the boundary (a
//! failed parse is the 400), hands the typed values to the core, and maps
//! core errors through [`crate::error::ApiError`].

pub mod accounts;
pub mod cart;
pub mod orders;
pub mod products;

use ordercore::domain::ShippingAddress;
use ordercore::types::{AddressLine, CityName, CountryName, CustomText, StateName, ZipCode};
use serde::Deserialize;

use crate::error::ApiError;

/// Wire shape of a shipping address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressDto {
    /// First address line. Required.
    pub line1: String,
    /// Second address line. Optional.
    pub line2: Option<String>,
    /// City. Required.
    pub city: String,
    /// State. Required.
    pub state: String,
    /// Postal code. Required.
    pub zip: String,
    /// Country; defaulted when absent.
    pub country: Option<String>,
}

impl AddressDto {
    /// Parse into a domain address; any invalid component is the caller's
    /// 400.
    pub fn into_domain(self) -> Result<ShippingAddress, ApiError> {
        let line1 = AddressLine::try_new(self.line1)
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;
        let line2 = self
            .line2
            .filter(|line| !line.trim().is_empty())
            .map(AddressLine::try_new)
            .transpose()
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;
        let city = CityName::try_new(self.city)
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;
        let state = StateName::try_new(self.state)
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;
        let zip = ZipCode::try_new(self.zip)
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;
        let country = self
            .country
            .filter(|country| !country.trim().is_empty())
            .map(CountryName::try_new)
            .transpose()
            .map_err(|e| ApiError::bad_request(format!("Invalid shipping address: {e}")))?;

        Ok(ShippingAddress::new(line1, line2, city, state, zip, country))
    }
}

/// Parse optional customization text; empty strings read as absent.
pub(crate) fn parse_custom_text(text: Option<String>) -> Result<Option<CustomText>, ApiError> {
    text.filter(|t| !t.is_empty())
        .map(CustomText::try_new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
