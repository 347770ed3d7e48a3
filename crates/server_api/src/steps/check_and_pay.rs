use serde::Serialize;
use shared::{
    domain::{FeeType, PaymentState},
    error::ApiError,
    path::Path,
    provided::{PaymentDetail, Provided},
    validation::{Check, FieldError, ValidationList},
};
use tracing::info;

use crate::{
    forms::{read_choice, validate_choice},
    internal, redirect, save,
    transitions::{self, Transition},
    ApiContext, Outcome, PageRequest,
};

const EVIDENCE_DELIVERY: &str = "upload";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckYourLpaData {
    pub lpa: Provided,
    pub completed: bool,
    pub can_change: bool,
    pub errors: ValidationList,
}

/// The donor confirms everything is right. The first confirmation invites
/// the certificate provider; confirming again with nothing changed just
/// shows the saved page.
pub async fn check_your_lpa(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<CheckYourLpaData>, ApiError> {
    let mut data = CheckYourLpaData {
        lpa: provided.clone(),
        completed: provided.tasks.check_your_lpa.is_completed(),
        can_change: provided.can_change(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    if req.form.get("checked-and-happy") != "1" {
        data.errors.add(
            "checked-and-happy",
            FieldError::custom("theBoxIfYouHaveCheckedAndHappyToShareLpa"),
        );
        return Ok(Outcome::Render(data));
    }

    if data.completed && !provided.checked_hash_changed() {
        return redirect(Path::LpaDetailsSaved.at(provided.lpa_id));
    }

    let first_check = provided.checked_at.is_none();
    let mut after = provided.clone();
    after.checked_at = Some(ctx.now());
    after.checked_hash = Some(after.lpa_hash());
    let Transition { tasks, next } = transitions::check_your_lpa(&after.tasks);
    after.tasks = tasks;
    let saved = save(ctx, provided, after).await?;

    if first_check {
        ctx.notification_sender
            .send_certificate_provider_invite(&saved)
            .await
            .map_err(internal)?;
        if !saved.lpa_uid.is_empty() {
            ctx.event_client
                .send_certificate_provider_started(&saved.lpa_uid)
                .await
                .map_err(internal)?;
        }
        info!(lpa_id = %saved.lpa_id, "certificate provider invited");
    }

    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeTypeData {
    pub fee_type: Option<FeeType>,
    pub previous_application_number: String,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub async fn which_fee_type_are_you_applying_for(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<FeeTypeData>, ApiError> {
    let mut data = FeeTypeData {
        fee_type: provided.fee_type,
        previous_application_number: provided.previous_application_number.clone(),
        options: FeeType::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.fee_type = read_choice(&req.form, "fee-type");
    data.previous_application_number = req.form.get("previous-application-number").to_string();
    validate_choice(&mut data.errors, "fee-type", "whichFeeTypeYouAreApplyingFor", data.fee_type);
    let Some(fee_type) = data.fee_type else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.fee_type = Some(fee_type);
    after.previous_application_number = data.previous_application_number;
    let Transition { tasks, next } =
        transitions::fee_type_chosen(&after.tasks, fee_type, after.fee_amount());
    after.tasks = tasks;
    let saved = save(ctx, provided, after).await?;

    if !saved.lpa_uid.is_empty() {
        if saved.tasks.pay_for_lpa == PaymentState::Pending
            && provided.tasks.pay_for_lpa != PaymentState::Pending
        {
            ctx.event_client
                .send_reduced_fee_requested(&saved.lpa_uid, fee_type, EVIDENCE_DELIVERY)
                .await
                .map_err(internal)?;
            info!(lpa_id = %saved.lpa_id, %fee_type, "reduced fee requested");
        }
        if !saved.previous_application_number.is_empty()
            && saved.previous_application_number != provided.previous_application_number
        {
            ctx.event_client
                .send_previous_application_linked(
                    &saved.lpa_uid,
                    &saved.previous_application_number,
                )
                .await
                .map_err(internal)?;
        }
    }

    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayFeeData {
    pub amount_due: i64,
    pub payment_id: String,
    pub payment_reference: String,
    pub errors: ValidationList,
}

/// Records a payment taken by the card provider for the amount still due.
pub async fn pay_fee(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<PayFeeData>, ApiError> {
    if provided.fee_type.is_none() {
        return redirect(Path::WhichFeeTypeAreYouApplyingFor.at(provided.lpa_id));
    }

    let amount_due = provided.fee_amount();
    if amount_due == 0 {
        return redirect(Path::PaymentConfirmation.at(provided.lpa_id));
    }

    let mut data = PayFeeData {
        amount_due,
        payment_id: String::new(),
        payment_reference: String::new(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.payment_id = req.form.get("payment-id").to_string();
    data.payment_reference = req.form.get("payment-reference").to_string();
    data.errors
        .string("payment-id", "paymentId", &data.payment_id, &[Check::Empty]);
    data.errors.string(
        "payment-reference",
        "paymentReference",
        &data.payment_reference,
        &[Check::Empty],
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.payment_details.push(PaymentDetail {
        payment_reference: data.payment_reference,
        payment_id: data.payment_id,
        amount: amount_due,
    });
    let Transition { tasks, next } = transitions::payment_taken(&after.tasks);
    after.tasks = tasks;
    let saved = save(ctx, provided, after).await?;
    info!(lpa_id = %saved.lpa_id, amount = amount_due, "payment recorded");
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmationData {
    pub amount_paid: i64,
    pub reference: String,
    pub next: String,
}

/// Viewing the confirmation settles an in-progress payment; continuing goes
/// to the evidence page for reduced fees or back to the task list.
pub async fn payment_confirmation(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<PaymentConfirmationData>, ApiError> {
    let Some(payment) = provided.payment_details.last() else {
        return redirect(Path::PayFee.at(provided.lpa_id));
    };

    let mut after = provided.clone();
    let next = if provided.tasks.pay_for_lpa == PaymentState::InProgress {
        let Transition { tasks, next } =
            transitions::payment_confirmed(&after.tasks, after.fee_type);
        after.tasks = tasks;
        next
    } else if provided.tasks.pay_for_lpa == PaymentState::Pending {
        Path::EvidenceRequired
    } else {
        Path::TaskList
    };
    let saved = save(ctx, provided, after).await?;

    if saved.tasks.pay_for_lpa == PaymentState::Pending
        && provided.tasks.pay_for_lpa != PaymentState::Pending
        && !saved.lpa_uid.is_empty()
    {
        if let Some(fee_type) = saved.fee_type {
            ctx.event_client
                .send_reduced_fee_requested(&saved.lpa_uid, fee_type, EVIDENCE_DELIVERY)
                .await
                .map_err(internal)?;
            info!(lpa_id = %saved.lpa_id, %fee_type, "reduced fee requested");
        }
    }

    let next = next.at(provided.lpa_id);
    if req.is_post() {
        return redirect(next);
    }

    Ok(Outcome::Render(PaymentConfirmationData {
        amount_paid: saved.paid(),
        reference: payment.payment_reference.clone(),
        next: next.to_url(),
    }))
}
