use serde::Serialize;
use shared::{
    domain::{CertificateProviderRelationship, RelationshipLength},
    error::ApiError,
    path::Path,
    provided::{CertificateProvider, Provided},
    validation::{Check, FieldError, ValidationList},
};
use tracing::info;

use super::address::{address_step, AddressData, AddressStep};
use crate::{
    forms::{read_choice, validate_choice, NameForm},
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateProviderForm {
    pub name: NameForm,
    pub mobile: String,
    pub has_non_uk_mobile: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateProviderDetailsData {
    pub form: CertificateProviderForm,
    pub errors: ValidationList,
}

pub async fn certificate_provider_details(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<CertificateProviderDetailsData>, ApiError> {
    let provider = &provided.certificate_provider;
    let mut data = CertificateProviderDetailsData {
        form: CertificateProviderForm {
            name: NameForm {
                first_names: provider.first_names.clone(),
                last_name: provider.last_name.clone(),
            },
            mobile: provider.mobile.clone(),
            has_non_uk_mobile: provider.has_non_uk_mobile,
        },
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let has_non_uk_mobile = req.form.get("has-non-uk-mobile") == "1";
    data.form = CertificateProviderForm {
        name: NameForm::read(&req.form),
        mobile: if has_non_uk_mobile {
            req.form.get("non-uk-mobile").to_string()
        } else {
            req.form.get("mobile").to_string()
        },
        has_non_uk_mobile,
    };
    data.errors = data.form.name.validate();
    if has_non_uk_mobile {
        data.errors.string(
            "non-uk-mobile",
            "mobile",
            &data.form.mobile,
            &[Check::Empty, Check::NonUkMobile],
        );
    } else {
        data.errors
            .string("mobile", "mobile", &data.form.mobile, &[Check::Empty, Check::Mobile]);
    }
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let change = PendingChange::CertificateProvider {
        first_names: data.form.name.first_names,
        last_name: data.form.name.last_name,
        mobile: data.form.mobile,
        has_non_uk_mobile,
    };
    commit_or_warn(ctx, req, provided, change).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HowDoYouKnowData {
    pub full_name: String,
    pub relationship: Option<CertificateProviderRelationship>,
    pub relationship_length: Option<RelationshipLength>,
    pub errors: ValidationList,
}

/// A personal certificate provider must have known the donor for at least
/// two years.
pub async fn how_do_you_know_your_certificate_provider(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<HowDoYouKnowData>, ApiError> {
    let mut data = HowDoYouKnowData {
        full_name: provided.certificate_provider.full_name(),
        relationship: provided.certificate_provider.relationship,
        relationship_length: provided.certificate_provider.relationship_length,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.relationship = read_choice(&req.form, "how");
    validate_choice(&mut data.errors, "how", "howYouKnowCertificateProvider", data.relationship);
    if data.relationship == Some(CertificateProviderRelationship::Personally) {
        data.relationship_length = read_choice(&req.form, "how-long");
        validate_choice(
            &mut data.errors,
            "how-long",
            "howLongYouHaveKnownCertificateProvider",
            data.relationship_length,
        );
        if data.relationship_length == Some(RelationshipLength::LessThanTwoYears) {
            data.errors.add(
                "how-long",
                FieldError::custom("mustHaveKnownCertificateProviderTwoYears"),
            );
        }
    } else {
        data.relationship_length = None;
    }
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.certificate_provider.relationship = data.relationship;
    after.certificate_provider.relationship_length = data.relationship_length;
    let Transition { tasks, next } = transitions::certificate_provider(
        &after.tasks,
        Path::HowDoYouKnowYourCertificateProvider,
    );
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

pub async fn certificate_provider_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let provider = &provided.certificate_provider;
    if provider.first_names.is_empty() {
        return redirect(Path::CertificateProviderDetails.at(provided.lpa_id));
    }

    let step = address_step(ctx, req, provider.full_name(), None, &provider.address).await?;
    match step {
        AddressStep::Show(data) => Ok(Outcome::Render(data)),
        AddressStep::Chosen(address) => {
            let mut after = provided.clone();
            after.certificate_provider.address = address;
            let Transition { tasks, next } =
                transitions::certificate_provider(&after.tasks, Path::CertificateProviderAddress);
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotRelatedData {
    pub certificate_provider: CertificateProvider,
    pub errors: ValidationList,
}

/// Shown before checking when the certificate provider shares a surname or
/// address with the donor or an attorney. The donor either confirms they are
/// not related or starts again with a new certificate provider.
pub async fn confirm_your_certificate_provider_is_not_related(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<NotRelatedData>, ApiError> {
    let mut data = NotRelatedData {
        certificate_provider: provided.certificate_provider.clone(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    if req.form.get("action") == "choose-new" {
        after.certificate_provider = CertificateProvider::default();
        after.certificate_provider_not_related_confirmed_at = None;
        after.tasks.certificate_provider = Default::default();
        save(ctx, provided, after).await?;
        info!(lpa_id = %provided.lpa_id, "certificate provider cleared");
        return redirect(Path::CertificateProviderDetails.at(provided.lpa_id));
    }

    if req.form.get("confirm") != "1" {
        data.errors
            .add("confirm", FieldError::custom("theBoxToConfirmYourCertificateProviderIsNotRelated"));
        return Ok(Outcome::Render(data));
    }

    after.certificate_provider_not_related_confirmed_at = Some(ctx.now());
    save(ctx, provided, after).await?;
    redirect(Path::CheckYourLpa.at(provided.lpa_id))
}
