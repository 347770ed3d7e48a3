use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    domain::{
        ActorType, ActorUid, Address, AttorneysAct, CanBeUsedWhen, CertificateProviderRelationship,
        ChannelPreference, FeeType, IdentityState, Lang, LifeSustainingTreatment, LpaId, LpaType,
        PaymentState, RelationshipLength, ReplacementAttorneysStepIn, SessionId, TaskState, YesNo,
        YesNoMaybe,
    },
    names::{full_name, names_equal},
    validation::is_under_18,
    witness::{Limiter, WitnessCodes},
};

pub const MAX_PEOPLE_TO_NOTIFY: usize = 5;
pub const FULL_FEE_PENCE: i64 = 8200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Donor {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub other_names: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
    pub email: String,
    pub mobile: String,
    pub thinks_can_sign: Option<YesNoMaybe>,
    pub can_sign: Option<YesNo>,
    pub contact_language_preference: Option<Lang>,
    pub lpa_language_preference: Option<Lang>,
}

impl Donor {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attorney {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub address: Address,
}

impl Attorney {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustCorporation {
    pub uid: ActorUid,
    pub name: String,
    pub company_number: String,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attorneys {
    pub attorneys: Vec<Attorney>,
    pub trust_corporation: Option<TrustCorporation>,
}

impl Attorneys {
    pub fn len(&self) -> usize {
        self.attorneys.len() + usize::from(self.trust_corporation.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, uid: ActorUid) -> Option<&Attorney> {
        self.attorneys.iter().find(|attorney| attorney.uid == uid)
    }

    /// Replaces the attorney with the same uid, or appends a new one.
    pub fn put(&mut self, attorney: Attorney) {
        match self.attorneys.iter_mut().find(|a| a.uid == attorney.uid) {
            Some(existing) => *existing = attorney,
            None => self.attorneys.push(attorney),
        }
    }

    pub fn remove(&mut self, uid: ActorUid) -> bool {
        let before = self.attorneys.len();
        self.attorneys.retain(|attorney| attorney.uid != uid);
        before != self.attorneys.len()
    }

    /// Every natural-person attorney has an address, and the trust
    /// corporation (if any) has one too.
    pub fn addresses_complete(&self) -> bool {
        self.attorneys
            .iter()
            .all(|attorney| !attorney.address.line1.is_empty())
            && self
                .trust_corporation
                .as_ref()
                .map_or(true, |tc| !tc.address.line1.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttorneyDecisions {
    pub how: Option<AttorneysAct>,
    pub details: String,
}

impl AttorneyDecisions {
    pub fn is_chosen(&self) -> bool {
        self.how.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateProvider {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub has_non_uk_mobile: bool,
    pub address: Address,
    pub relationship: Option<CertificateProviderRelationship>,
    pub relationship_length: Option<RelationshipLength>,
    pub carry_out_by: Option<ChannelPreference>,
}

impl CertificateProvider {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correspondent {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub email: String,
    pub organisation: String,
    pub telephone: String,
    pub want_address: Option<YesNo>,
    pub address: Address,
}

impl Correspondent {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonToNotify {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub address: Address,
}

impl PersonToNotify {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorisedSignatory {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
}

impl AuthorisedSignatory {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndependentWitness {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub mobile: String,
    pub has_non_uk_mobile: bool,
    pub address: Address,
}

impl IndependentWitness {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Voucher {
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tasks {
    pub your_details: TaskState,
    pub choose_attorneys: TaskState,
    pub choose_replacement_attorneys: TaskState,
    pub when_can_the_lpa_be_used: TaskState,
    pub life_sustaining_treatment: TaskState,
    pub restrictions: TaskState,
    pub certificate_provider: TaskState,
    pub people_to_notify: TaskState,
    pub add_correspondent: TaskState,
    pub choose_your_signatory: TaskState,
    pub check_your_lpa: TaskState,
    pub pay_for_lpa: PaymentState,
    pub confirm_your_identity: IdentityState,
    pub sign_the_lpa: TaskState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub payment_reference: String,
    pub payment_id: String,
    pub amount: i64,
}

/// One LPA being drafted by a donor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provided {
    pub lpa_id: LpaId,
    pub lpa_uid: String,
    pub session_id: SessionId,
    pub version: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    pub donor: Donor,
    #[serde(rename = "type")]
    pub lpa_type: Option<LpaType>,
    pub attorneys: Attorneys,
    pub attorney_decisions: AttorneyDecisions,
    pub want_replacement_attorneys: Option<YesNo>,
    pub replacement_attorneys: Attorneys,
    pub replacement_attorney_decisions: AttorneyDecisions,
    pub how_should_replacement_attorneys_step_in: Option<ReplacementAttorneysStepIn>,
    pub how_should_replacement_attorneys_step_in_details: String,
    pub when_can_the_lpa_be_used: Option<CanBeUsedWhen>,
    pub life_sustaining_treatment_option: Option<LifeSustainingTreatment>,
    pub restrictions: String,
    pub certificate_provider: CertificateProvider,
    pub certificate_provider_not_related_confirmed_at: Option<DateTime<Utc>>,
    pub do_you_want_to_notify_people: Option<YesNo>,
    pub people_to_notify: Vec<PersonToNotify>,
    pub add_correspondent: Option<YesNo>,
    pub correspondent: Correspondent,
    pub authorised_signatory: AuthorisedSignatory,
    pub independent_witness: IndependentWitness,
    pub voucher: Voucher,

    pub tasks: Tasks,

    pub fee_type: Option<FeeType>,
    pub previous_application_number: String,
    pub payment_details: Vec<PaymentDetail>,
    pub registering_with_court_of_protection: bool,
    pub identity_confirmed_at: Option<DateTime<Utc>>,

    pub checked_at: Option<DateTime<Utc>>,
    pub checked_hash: Option<String>,
    pub want_to_apply_for_lpa: bool,
    pub want_to_sign_lpa: bool,
    pub signed_at: Option<DateTime<Utc>>,

    pub certificate_provider_codes: WitnessCodes,
    pub witnessed_by_certificate_provider_at: Option<DateTime<Utc>>,
    pub independent_witness_codes: WitnessCodes,
    pub witnessed_by_independent_witness_at: Option<DateTime<Utc>>,
    pub witness_code_limiter: Option<Limiter>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub actor_type: ActorType,
    pub uid: ActorUid,
    pub first_names: String,
    pub last_name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Under18Actor {
    pub uid: ActorUid,
    pub actor_type: ActorType,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

/// The parts of an LPA the certificate provider is asked to check.
#[derive(Serialize)]
struct LpaContent<'a> {
    donor: &'a Donor,
    lpa_type: &'a Option<LpaType>,
    attorneys: &'a Attorneys,
    attorney_decisions: &'a AttorneyDecisions,
    replacement_attorneys: &'a Attorneys,
    replacement_attorney_decisions: &'a AttorneyDecisions,
    how_should_replacement_attorneys_step_in: &'a Option<ReplacementAttorneysStepIn>,
    when_can_the_lpa_be_used: &'a Option<CanBeUsedWhen>,
    life_sustaining_treatment_option: &'a Option<LifeSustainingTreatment>,
    restrictions: &'a str,
    certificate_provider: &'a CertificateProvider,
    people_to_notify: &'a [PersonToNotify],
    authorised_signatory: &'a AuthorisedSignatory,
    independent_witness: &'a IndependentWitness,
}

impl Provided {
    pub fn new(lpa_id: LpaId, session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            lpa_id,
            session_id,
            created_at: Some(now),
            updated_at: Some(now),
            donor: Donor {
                uid: ActorUid::new(),
                ..Donor::default()
            },
            ..Self::default()
        }
    }

    pub fn can_change(&self) -> bool {
        self.signed_at.is_none()
    }

    /// Name and date of birth are fixed once identity is confirmed.
    pub fn can_change_personal_details(&self) -> bool {
        self.can_change() && self.tasks.confirm_your_identity != IdentityState::Completed
    }

    pub fn donor_cannot_sign(&self) -> bool {
        self.donor.can_sign == Some(YesNo::No)
    }

    pub fn type_specific_task(&self) -> TaskState {
        match self.lpa_type {
            Some(LpaType::PersonalWelfare) => self.tasks.life_sustaining_treatment,
            _ => self.tasks.when_can_the_lpa_be_used,
        }
    }

    /// Everything in the "fill in the LPA" section is done.
    pub fn section1_completed(&self) -> bool {
        let tasks = &self.tasks;
        tasks.your_details.is_completed()
            && tasks.choose_attorneys.is_completed()
            && tasks.choose_replacement_attorneys.is_completed()
            && self.type_specific_task().is_completed()
            && tasks.restrictions.is_completed()
            && tasks.certificate_provider.is_completed()
            && tasks.people_to_notify.is_completed()
            && tasks.add_correspondent.is_completed()
            && (!self.donor_cannot_sign() || tasks.choose_your_signatory.is_completed())
    }

    pub fn completed_all_tasks(&self) -> bool {
        self.section1_completed()
            && self.tasks.check_your_lpa.is_completed()
            && self.tasks.pay_for_lpa == PaymentState::Completed
            && self.tasks.confirm_your_identity == IdentityState::Completed
            && self.tasks.sign_the_lpa.is_completed()
    }

    pub fn actors(&self) -> Vec<Actor> {
        let mut actors = vec![Actor {
            actor_type: ActorType::Donor,
            uid: self.donor.uid,
            first_names: self.donor.first_names.clone(),
            last_name: self.donor.last_name.clone(),
            address: self.donor.address.clone(),
        }];

        if !self.certificate_provider.first_names.is_empty()
            || !self.certificate_provider.last_name.is_empty()
        {
            actors.push(Actor {
                actor_type: ActorType::CertificateProvider,
                uid: self.certificate_provider.uid,
                first_names: self.certificate_provider.first_names.clone(),
                last_name: self.certificate_provider.last_name.clone(),
                address: self.certificate_provider.address.clone(),
            });
        }

        for (actor_type, list) in [
            (ActorType::Attorney, &self.attorneys),
            (ActorType::ReplacementAttorney, &self.replacement_attorneys),
        ] {
            actors.extend(list.attorneys.iter().map(|attorney| Actor {
                actor_type,
                uid: attorney.uid,
                first_names: attorney.first_names.clone(),
                last_name: attorney.last_name.clone(),
                address: attorney.address.clone(),
            }));
        }

        actors.extend(self.people_to_notify.iter().map(|person| Actor {
            actor_type: ActorType::PersonToNotify,
            uid: person.uid,
            first_names: person.first_names.clone(),
            last_name: person.last_name.clone(),
            address: person.address.clone(),
        }));

        if !self.authorised_signatory.first_names.is_empty() {
            actors.push(Actor {
                actor_type: ActorType::AuthorisedSignatory,
                uid: self.authorised_signatory.uid,
                first_names: self.authorised_signatory.first_names.clone(),
                last_name: self.authorised_signatory.last_name.clone(),
                address: Address::default(),
            });
        }

        if !self.independent_witness.first_names.is_empty() {
            actors.push(Actor {
                actor_type: ActorType::IndependentWitness,
                uid: self.independent_witness.uid,
                first_names: self.independent_witness.first_names.clone(),
                last_name: self.independent_witness.last_name.clone(),
                address: self.independent_witness.address.clone(),
            });
        }

        actors
    }

    pub fn under18_actor_details(&self, today: NaiveDate) -> Vec<Under18Actor> {
        [
            (ActorType::Attorney, &self.attorneys),
            (ActorType::ReplacementAttorney, &self.replacement_attorneys),
        ]
        .into_iter()
        .flat_map(|(actor_type, list)| {
            list.attorneys.iter().filter_map(move |attorney| {
                let date_of_birth = attorney.date_of_birth?;
                is_under_18(date_of_birth, today).then(|| Under18Actor {
                    uid: attorney.uid,
                    actor_type,
                    full_name: attorney.full_name(),
                    date_of_birth,
                })
            })
        })
        .collect()
    }

    /// The certificate provider appears to be related to the donor or an
    /// attorney: a shared last-name part, or the same address.
    pub fn certificate_provider_shares_details(&self) -> bool {
        let provider = &self.certificate_provider;
        let provider_parts: Vec<&str> = provider.last_name.split('-').map(str::trim).collect();

        let shares_last_name = |last_name: &str| {
            last_name.split('-').map(str::trim).any(|part| {
                !part.is_empty() && provider_parts.iter().any(|own| names_equal(own, part))
            })
        };

        if shares_last_name(&self.donor.last_name)
            || provider.address.same_place(&self.donor.address)
        {
            return true;
        }

        self.attorneys
            .attorneys
            .iter()
            .chain(self.replacement_attorneys.attorneys.iter())
            .any(|attorney| {
                shares_last_name(&attorney.last_name)
                    || provider.address.same_place(&attorney.address)
            })
    }

    pub fn correspondent_email(&self) -> &str {
        if self.correspondent.email.is_empty() {
            &self.donor.email
        } else {
            &self.correspondent.email
        }
    }

    pub fn fee_amount(&self) -> i64 {
        let due = match self.fee_type {
            Some(FeeType::HalfFee) => FULL_FEE_PENCE / 2,
            Some(FeeType::NoFee) | Some(FeeType::HardshipFee) => 0,
            Some(FeeType::FullFee) | None => FULL_FEE_PENCE,
        };
        (due - self.paid()).max(0)
    }

    pub fn paid(&self) -> i64 {
        self.payment_details.iter().map(|payment| payment.amount).sum()
    }

    /// Drops decisions that no longer apply after the attorney count changed.
    pub fn update_decisions(&mut self) {
        if self.attorneys.len() <= 1 {
            self.attorney_decisions = AttorneyDecisions::default();
        }
        if self.replacement_attorneys.len() <= 1 {
            self.replacement_attorney_decisions = AttorneyDecisions::default();
        }
        if self.replacement_attorneys.is_empty() {
            self.how_should_replacement_attorneys_step_in = None;
            self.how_should_replacement_attorneys_step_in_details.clear();
        }
    }

    pub fn lpa_hash(&self) -> String {
        let content = LpaContent {
            donor: &self.donor,
            lpa_type: &self.lpa_type,
            attorneys: &self.attorneys,
            attorney_decisions: &self.attorney_decisions,
            replacement_attorneys: &self.replacement_attorneys,
            replacement_attorney_decisions: &self.replacement_attorney_decisions,
            how_should_replacement_attorneys_step_in: &self.how_should_replacement_attorneys_step_in,
            when_can_the_lpa_be_used: &self.when_can_the_lpa_be_used,
            life_sustaining_treatment_option: &self.life_sustaining_treatment_option,
            restrictions: &self.restrictions,
            certificate_provider: &self.certificate_provider,
            people_to_notify: &self.people_to_notify,
            authorised_signatory: &self.authorised_signatory,
            independent_witness: &self.independent_witness,
        };
        // Serialising plain data structs cannot fail.
        let bytes = serde_json::to_vec(&content).unwrap_or_default();
        Sha256::digest(bytes)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    pub fn checked_hash_changed(&self) -> bool {
        self.checked_hash.as_deref() != Some(self.lpa_hash().as_str())
    }
}

#[cfg(test)]
#[path = "tests/provided_tests.rs"]
mod tests;
