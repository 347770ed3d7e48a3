use serde::Serialize;
use shared::{
    domain::{ActorUid, IdentityState, LpaType},
    error::ApiError,
    path::{Destination, Path},
    provided::Provided,
};

use crate::{ApiContext, Outcome, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListItem {
    pub name: &'static str,
    pub path: String,
    pub state: &'static str,
    pub count: usize,
}

impl TaskListItem {
    fn new(name: &'static str, destination: Destination, state: &'static str) -> Self {
        Self {
            name,
            path: destination.to_url(),
            state,
            count: 0,
        }
    }

    fn counted(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListSection {
    pub heading: &'static str,
    pub items: Vec<TaskListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListData {
    pub donor_full_name: String,
    pub lpa_type: Option<LpaType>,
    pub sections: Vec<TaskListSection>,
    pub completed_all_tasks: bool,
}

pub async fn task_list(
    ctx: &ApiContext,
    _req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<TaskListData>, ApiError> {
    Ok(Outcome::Render(TaskListData {
        donor_full_name: provided.donor.full_name(),
        lpa_type: provided.lpa_type,
        sections: sections(provided, ctx),
        completed_all_tasks: provided.completed_all_tasks(),
    }))
}

fn sections(provided: &Provided, ctx: &ApiContext) -> Vec<TaskListSection> {
    let lpa_id = provided.lpa_id;
    let tasks = &provided.tasks;

    let attorneys_path = if provided.attorneys.is_empty() {
        Path::EnterAttorney.at(lpa_id).with_id(ActorUid::new())
    } else {
        Path::ChooseAttorneysSummary.at(lpa_id)
    };
    let people_path = if provided.people_to_notify.is_empty() {
        Path::DoYouWantToNotifyPeople.at(lpa_id)
    } else {
        Path::ChoosePeopleToNotifySummary.at(lpa_id)
    };
    let type_specific = match provided.lpa_type {
        Some(LpaType::PersonalWelfare) => TaskListItem::new(
            "lifeSustainingTreatment",
            Path::LifeSustainingTreatment.at(lpa_id),
            tasks.life_sustaining_treatment.as_str(),
        ),
        _ => TaskListItem::new(
            "chooseWhenTheLpaCanBeUsed",
            Path::WhenCanTheLpaBeUsed.at(lpa_id),
            tasks.when_can_the_lpa_be_used.as_str(),
        ),
    };

    let mut fill_in = vec![
        TaskListItem::new(
            "provideYourDetails",
            Path::YourName.at(lpa_id),
            tasks.your_details.as_str(),
        ),
        TaskListItem::new(
            "chooseYourAttorneys",
            attorneys_path,
            tasks.choose_attorneys.as_str(),
        )
        .counted(provided.attorneys.len()),
        TaskListItem::new(
            "chooseYourReplacementAttorneys",
            Path::DoYouWantReplacementAttorneys.at(lpa_id),
            tasks.choose_replacement_attorneys.as_str(),
        )
        .counted(provided.replacement_attorneys.len()),
        type_specific,
        TaskListItem::new(
            "addRestrictionsToTheLpa",
            Path::Restrictions.at(lpa_id),
            tasks.restrictions.as_str(),
        ),
        TaskListItem::new(
            "chooseYourCertificateProvider",
            Path::CertificateProviderDetails.at(lpa_id),
            tasks.certificate_provider.as_str(),
        ),
        TaskListItem::new(
            "peopleToNotify",
            people_path,
            tasks.people_to_notify.as_str(),
        )
        .counted(provided.people_to_notify.len()),
        TaskListItem::new(
            "addCorrespondent",
            Path::AddCorrespondent.at(lpa_id),
            tasks.add_correspondent.as_str(),
        ),
    ];

    if provided.donor_cannot_sign() {
        fill_in.push(TaskListItem::new(
            "chooseYourSignatoryAndIndependentWitness",
            Path::YourAuthorisedSignatory.at(lpa_id),
            tasks.choose_your_signatory.as_str(),
        ));
    }

    fill_in.push(TaskListItem::new(
        "checkAndSendToYourCertificateProvider",
        check_path(provided, ctx).at(lpa_id),
        tasks.check_your_lpa.as_str(),
    ));

    let sign_path = if tasks.confirm_your_identity == IdentityState::Completed {
        Path::ReadYourLpa
    } else {
        Path::IdentityDetails
    };

    vec![
        TaskListSection {
            heading: "fillInTheLpa",
            items: fill_in,
        },
        TaskListSection {
            heading: "payForTheLpa",
            items: vec![TaskListItem::new(
                "payForTheLpa",
                Path::WhichFeeTypeAreYouApplyingFor.at(lpa_id),
                tasks.pay_for_lpa.as_str(),
            )],
        },
        TaskListSection {
            heading: "confirmYourIdentityAndSign",
            items: vec![
                TaskListItem::new(
                    "confirmYourIdentity",
                    Path::IdentityDetails.at(lpa_id),
                    tasks.confirm_your_identity.as_str(),
                ),
                TaskListItem::new(
                    "signTheLpa",
                    sign_path.at(lpa_id),
                    tasks.sign_the_lpa.as_str(),
                ),
            ],
        },
    ]
}

/// Where "check your LPA" leads: an under-age attorney blocks checking, and
/// a certificate provider who looks related must be confirmed first.
fn check_path(provided: &Provided, ctx: &ApiContext) -> Path {
    if !provided.under18_actor_details(ctx.today()).is_empty() {
        Path::YouCannotSignYourLpaYet
    } else if provided.certificate_provider_shares_details()
        && provided.certificate_provider_not_related_confirmed_at.is_none()
    {
        Path::ConfirmYourCertificateProviderIsNotRelated
    } else {
        Path::CheckYourLpa
    }
}
