use std::str::FromStr;

use serde::Serialize;
use shared::{
    domain::Address,
    validation::{Check, DateInput, ValidationList},
};

use crate::page::FormValues;

pub(crate) const FIRST_NAMES_MAX: usize = 53;
pub(crate) const LAST_NAME_MAX: usize = 61;
pub(crate) const OTHER_NAMES_MAX: usize = 50;
pub(crate) const ADDRESS_LINE_MAX: usize = 50;
pub(crate) const RESTRICTIONS_MAX: usize = 10_000;

/// Parses a radio/select field; absent or unknown values read as `None`.
pub(crate) fn read_choice<T: FromStr>(form: &FormValues, name: &str) -> Option<T> {
    form.get(name).parse().ok()
}

pub(crate) fn read_date(form: &FormValues, prefix: &str) -> DateInput {
    DateInput::new(
        form.get(&format!("{prefix}-day")),
        form.get(&format!("{prefix}-month")),
        form.get(&format!("{prefix}-year")),
    )
}

pub(crate) fn validate_choice<T>(
    errors: &mut ValidationList,
    name: &str,
    label: &str,
    value: Option<T>,
) {
    if value.is_none() {
        errors.add(name, shared::validation::FieldError::Select {
            label: label.to_string(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameForm {
    pub first_names: String,
    pub last_name: String,
}

impl NameForm {
    pub(crate) fn read(form: &FormValues) -> Self {
        Self {
            first_names: form.get("first-names").to_string(),
            last_name: form.get("last-name").to_string(),
        }
    }

    pub(crate) fn validate(&self) -> ValidationList {
        let mut errors = ValidationList::new();
        errors.string(
            "first-names",
            "firstNames",
            &self.first_names,
            &[Check::Empty, Check::StringTooLong(FIRST_NAMES_MAX)],
        );
        errors.string(
            "last-name",
            "lastName",
            &self.last_name,
            &[Check::Empty, Check::StringTooLong(LAST_NAME_MAX)],
        );
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressAction {
    PostcodeLookup,
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressForm {
    pub action: Option<AddressAction>,
    pub lookup_postcode: String,
    pub address: Address,
}

impl AddressForm {
    pub(crate) fn from_address(address: &Address) -> Self {
        Self {
            action: (!address.is_zero()).then_some(AddressAction::Manual),
            lookup_postcode: String::new(),
            address: address.clone(),
        }
    }

    pub(crate) fn read(form: &FormValues) -> Self {
        let action = match form.get("action") {
            "postcode-lookup" => Some(AddressAction::PostcodeLookup),
            "manual" => Some(AddressAction::Manual),
            _ => None,
        };
        let country = match form.get("address-country") {
            "" => "GB",
            country => country,
        };

        Self {
            action,
            lookup_postcode: form.get("lookup-postcode").to_uppercase(),
            address: Address {
                line1: form.get("address-line-1").to_string(),
                line2: form.get("address-line-2").to_string(),
                line3: form.get("address-line-3").to_string(),
                town: form.get("address-town").to_string(),
                postcode: form.get("address-postcode").to_uppercase(),
                country: country.to_string(),
            },
        }
    }

    pub(crate) fn validate(&self) -> ValidationList {
        let mut errors = ValidationList::new();
        match self.action {
            None => validate_choice::<AddressAction>(&mut errors, "action", "address", None),
            Some(AddressAction::PostcodeLookup) => {
                errors.string("lookup-postcode", "postcode", &self.lookup_postcode, &[Check::Empty]);
            }
            Some(AddressAction::Manual) => {
                let address = &self.address;
                errors.string(
                    "address-line-1",
                    "addressLine1",
                    &address.line1,
                    &[Check::Empty, Check::StringTooLong(ADDRESS_LINE_MAX)],
                );
                errors.string(
                    "address-line-2",
                    "addressLine2Label",
                    &address.line2,
                    &[Check::StringTooLong(ADDRESS_LINE_MAX)],
                );
                errors.string(
                    "address-line-3",
                    "addressLine3Label",
                    &address.line3,
                    &[Check::StringTooLong(ADDRESS_LINE_MAX)],
                );
                errors.string("address-town", "townOrCity", &address.town, &[Check::Empty]);
                if address.country == "GB" {
                    errors.string("address-postcode", "postcode", &address.postcode, &[Check::Empty]);
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_form_reports_fields_in_order() {
        let errors = NameForm::read(&FormValues::default()).validate();
        assert_eq!(errors.names(), vec!["first-names", "last-name"]);
    }

    #[test]
    fn manual_address_needs_line_town_and_postcode() {
        let form = AddressForm::read(&FormValues::from_pairs(&[("action", "manual")]));
        let errors = form.validate();
        assert_eq!(
            errors.names(),
            vec!["address-line-1", "address-town", "address-postcode"]
        );
    }

    #[test]
    fn lookup_postcode_is_upper_cased() {
        let form = AddressForm::read(&FormValues::from_pairs(&[
            ("action", "postcode-lookup"),
            ("lookup-postcode", "b14 7ed"),
        ]));
        assert_eq!(form.lookup_postcode, "B14 7ED");
        assert!(form.validate().is_empty());
    }
}
