use serde::Serialize;
use shared::{
    domain::{ActorUid, Address},
    error::ApiError,
    validation::{FieldError, ValidationList},
};
use tracing::debug;

use crate::{
    forms::{AddressAction, AddressForm},
    internal, ApiContext, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressData {
    pub form: AddressForm,
    pub addresses: Vec<Address>,
    pub full_name: String,
    pub id: Option<ActorUid>,
    pub errors: ValidationList,
}

pub(crate) enum AddressStep {
    Show(AddressData),
    Chosen(Address),
}

/// Shared by every page that asks for an address: a postcode lookup
/// re-renders with the results, a manual entry hands back the address.
pub(crate) async fn address_step(
    ctx: &ApiContext,
    req: &PageRequest,
    full_name: String,
    id: Option<ActorUid>,
    current: &Address,
) -> Result<AddressStep, ApiError> {
    let mut data = AddressData {
        form: AddressForm::from_address(current),
        addresses: Vec::new(),
        full_name,
        id,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(AddressStep::Show(data));
    }

    data.form = AddressForm::read(&req.form);
    data.errors = data.form.validate();
    if !data.errors.is_empty() {
        return Ok(AddressStep::Show(data));
    }

    match data.form.action {
        Some(AddressAction::PostcodeLookup) => {
            data.addresses = ctx
                .address_client
                .lookup_postcode(&data.form.lookup_postcode)
                .await
                .map_err(internal)?;
            debug!(found = data.addresses.len(), "postcode lookup");
            if data.addresses.is_empty() {
                data.errors
                    .add("lookup-postcode", FieldError::custom("couldNotFindAddresses"));
            }
            Ok(AddressStep::Show(data))
        }
        Some(AddressAction::Manual) => Ok(AddressStep::Chosen(data.form.address)),
        None => Ok(AddressStep::Show(data)),
    }
}
