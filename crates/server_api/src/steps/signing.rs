use integrations::WitnessCodeRecipient;
use serde::Serialize;
use shared::{
    domain::{ActorType, IdentityState, PaymentState},
    error::ApiError,
    path::Path,
    provided::Provided,
    validation::{Check, FieldError, ValidationList},
    witness::{verify, Limiter, WitnessCodes, WITNESS_CODE_LENGTH},
};
use tracing::{info, warn};

use crate::{
    internal, redirect, save,
    transitions::{self, Transition},
    ApiContext, Outcome, PageRequest,
};

const WANT_TO_APPLY: &str = "want-to-apply";
const WANT_TO_SIGN: &str = "want-to-sign";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignYourLpaData {
    pub lpa: Provided,
    pub want_to_apply: bool,
    pub want_to_sign: bool,
    pub errors: ValidationList,
}

pub async fn sign_your_lpa(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<SignYourLpaData>, ApiError> {
    let mut data = SignYourLpaData {
        lpa: provided.clone(),
        want_to_apply: provided.want_to_apply_for_lpa,
        want_to_sign: provided.want_to_sign_lpa,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let ticked = req.form.get_all("sign-lpa");
    data.want_to_apply = ticked.contains(&WANT_TO_APPLY);
    data.want_to_sign = ticked.contains(&WANT_TO_SIGN);
    if !(data.want_to_apply && data.want_to_sign) {
        data.errors
            .add("sign-lpa", FieldError::custom("bothBoxesToSignAndApply"));
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.want_to_apply_for_lpa = true;
    after.want_to_sign_lpa = true;
    after.signed_at = Some(ctx.now());
    let Transition { tasks, next } = transitions::signed(&after.tasks);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    info!(lpa_id = %provided.lpa_id, "lpa signed");
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Witness {
    CertificateProvider,
    IndependentWitness,
}

impl Witness {
    fn recipient(self, provided: &Provided) -> WitnessCodeRecipient {
        match self {
            Self::CertificateProvider => WitnessCodeRecipient {
                actor_type: ActorType::CertificateProvider,
                full_name: provided.certificate_provider.full_name(),
                mobile: provided.certificate_provider.mobile.clone(),
            },
            Self::IndependentWitness => WitnessCodeRecipient {
                actor_type: ActorType::IndependentWitness,
                full_name: provided.independent_witness.full_name(),
                mobile: provided.independent_witness.mobile.clone(),
            },
        }
    }

    fn codes(self, provided: &Provided) -> &WitnessCodes {
        match self {
            Self::CertificateProvider => &provided.certificate_provider_codes,
            Self::IndependentWitness => &provided.independent_witness_codes,
        }
    }

    fn page(self) -> Path {
        match self {
            Self::CertificateProvider => Path::WitnessingAsCertificateProvider,
            Self::IndependentWitness => Path::WitnessingAsIndependentWitness,
        }
    }
}

/// Stores a new code for each witness, then texts them. Returns the saved
/// aggregate.
async fn issue_codes(
    ctx: &ApiContext,
    provided: &Provided,
    witnesses: &[Witness],
) -> Result<Provided, ApiError> {
    let now = ctx.now();
    let mut after = provided.clone();
    let mut issued = Vec::with_capacity(witnesses.len());
    for witness in witnesses {
        let code = ctx.code_generator.generate();
        match witness {
            Witness::CertificateProvider => after.certificate_provider_codes.push(code.clone(), now),
            Witness::IndependentWitness => after.independent_witness_codes.push(code.clone(), now),
        }
        issued.push((*witness, code));
    }

    let saved = save(ctx, provided, after).await?;
    for (witness, code) in issued {
        ctx.notification_sender
            .send_witness_code(&saved, &witness.recipient(&saved), &code)
            .await
            .map_err(internal)?;
        info!(lpa_id = %saved.lpa_id, witness = ?witness, "witness code sent");
    }
    Ok(saved)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessingYourSignatureData {
    pub certificate_provider_name: String,
    pub independent_witness_name: Option<String>,
}

/// Continuing sends a code to the certificate provider, and to the
/// independent witness when the donor could not sign themselves.
pub async fn witnessing_your_signature(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WitnessingYourSignatureData>, ApiError> {
    if !req.is_post() {
        return Ok(Outcome::Render(WitnessingYourSignatureData {
            certificate_provider_name: provided.certificate_provider.full_name(),
            independent_witness_name: provided
                .donor_cannot_sign()
                .then(|| provided.independent_witness.full_name()),
        }));
    }

    let now = ctx.now();
    let mut witnesses = Vec::new();
    if provided.certificate_provider_codes.can_request(now) {
        witnesses.push(Witness::CertificateProvider);
    }
    if provided.donor_cannot_sign() && provided.independent_witness_codes.can_request(now) {
        witnesses.push(Witness::IndependentWitness);
    }
    if !witnesses.is_empty() {
        issue_codes(ctx, provided, &witnesses).await?;
    }

    let Transition { next, .. } = transitions::witness_codes_sent(&provided.tasks);
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessCodeData {
    pub witness_name: String,
    pub code: String,
    pub errors: ValidationList,
}

pub async fn witnessing_as_certificate_provider(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WitnessCodeData>, ApiError> {
    witnessing(ctx, req, provided, Witness::CertificateProvider).await
}

pub async fn witnessing_as_independent_witness(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WitnessCodeData>, ApiError> {
    if !provided.donor_cannot_sign() {
        return redirect(Path::WitnessingAsCertificateProvider.at(provided.lpa_id));
    }
    witnessing(ctx, req, provided, Witness::IndependentWitness).await
}

async fn witnessing(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
    witness: Witness,
) -> Result<Outcome<WitnessCodeData>, ApiError> {
    let mut data = WitnessCodeData {
        witness_name: witness.recipient(provided).full_name,
        code: String::new(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.code = req.form.get("witness-code").to_string();
    data.errors.string(
        "witness-code",
        "theCodeWeSent",
        &data.code,
        &[Check::Empty, Check::StringLength(WITNESS_CODE_LENGTH)],
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let now = ctx.now();
    let mut after = provided.clone();
    let limiter = after
        .witness_code_limiter
        .get_or_insert_with(|| Limiter::for_witness_codes(now));
    let codes = match witness {
        Witness::CertificateProvider => &after.certificate_provider_codes,
        Witness::IndependentWitness => &after.independent_witness_codes,
    };

    if let Err(err) = verify(codes, limiter, &data.code, now) {
        save(ctx, provided, after).await?;
        warn!(lpa_id = %provided.lpa_id, witness = ?witness, %err, "witness code refused");
        data.errors
            .add("witness-code", FieldError::custom(err.label()));
        return Ok(Outcome::Render(data));
    }

    let Transition { tasks, next } = match witness {
        Witness::CertificateProvider => {
            after.witnessed_by_certificate_provider_at = Some(now);
            transitions::certificate_provider_witnessed(&after.tasks, after.donor_cannot_sign())
        }
        Witness::IndependentWitness => {
            after.witnessed_by_independent_witness_at = Some(now);
            transitions::independent_witness_witnessed(&after.tasks)
        }
    };
    after.tasks = tasks;
    info!(lpa_id = %provided.lpa_id, witness = ?witness, "signature witnessed");

    if next != Path::YouHaveSubmittedYourLpa {
        save(ctx, provided, after).await?;
        return redirect(next.at(provided.lpa_id));
    }

    after.submitted_at = Some(now);
    let saved = save(ctx, provided, after).await?;
    if saved.tasks.confirm_your_identity == IdentityState::Completed
        && saved.tasks.pay_for_lpa == PaymentState::Completed
    {
        ctx.lpa_store_client
            .send_lpa(&saved)
            .await
            .map_err(internal)?;
        info!(lpa_id = %saved.lpa_id, "lpa sent to the lpa store");
    }
    ctx.notification_sender
        .send_certificate_provider_prompt(&saved)
        .await
        .map_err(internal)?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendCodeData {
    pub witness_name: String,
    pub errors: ValidationList,
}

pub async fn resend_certificate_provider_code(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<ResendCodeData>, ApiError> {
    resend(ctx, req, provided, Witness::CertificateProvider).await
}

pub async fn resend_independent_witness_code(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<ResendCodeData>, ApiError> {
    if !provided.donor_cannot_sign() {
        return redirect(Path::ResendCertificateProviderCode.at(provided.lpa_id));
    }
    resend(ctx, req, provided, Witness::IndependentWitness).await
}

async fn resend(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
    witness: Witness,
) -> Result<Outcome<ResendCodeData>, ApiError> {
    let mut data = ResendCodeData {
        witness_name: witness.recipient(provided).full_name,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    if !witness.codes(provided).can_request(ctx.now()) {
        data.errors
            .add("request", FieldError::custom("pleaseWaitOneMinute"));
        return Ok(Outcome::Render(data));
    }

    issue_codes(ctx, provided, &[witness]).await?;
    redirect(witness.page().at(provided.lpa_id))
}
