//! In-memory collaborators for exercising steps end to end.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use integrations::{
    AddressClient, CodeGenerator, EventClient, InMemorySessionStore, LpaStoreClient,
    LpaStoreError, NotificationSender, WitnessCodeRecipient,
};
use shared::{
    domain::{
        ActorType, ActorUid, Address, IdentityState, LpaId, LpaType, PaymentState, SessionId,
        TaskState, YesNo, YesNoMaybe,
    },
    path::Path,
    protocol::{LpaEvent, RegisteredLpa},
    provided::{Attorney, Provided},
};
use storage::{DonorStore, Storage};

use crate::{handle, ApiContext, FormValues, PageOutcome, PageRequest};

pub(crate) struct CountingStore {
    inner: Storage,
    puts: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DonorStore for CountingStore {
    async fn create(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<Provided> {
        self.inner.create(session_id, now).await
    }

    async fn get(&self, lpa_id: LpaId) -> Result<Option<Provided>> {
        self.inner.get(lpa_id).await
    }

    async fn put(&self, provided: &Provided) -> Result<Provided> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(provided).await
    }
}

pub(crate) struct FakeAddressClient(pub Vec<Address>);

#[async_trait]
impl AddressClient for FakeAddressClient {
    async fn lookup_postcode(&self, _postcode: &str) -> Result<Vec<Address>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub(crate) struct RecordingEvents {
    pub events: Mutex<Vec<LpaEvent>>,
}

#[async_trait]
impl EventClient for RecordingEvents {
    async fn send(&self, event: LpaEvent) -> Result<()> {
        self.events.lock().expect("events lock").push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub codes: Mutex<Vec<(ActorType, String)>>,
    pub invites: AtomicUsize,
    pub prompts: AtomicUsize,
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_witness_code(
        &self,
        _provided: &Provided,
        recipient: &WitnessCodeRecipient,
        code: &str,
    ) -> Result<()> {
        self.codes
            .lock()
            .expect("codes lock")
            .push((recipient.actor_type, code.to_string()));
        Ok(())
    }

    async fn send_certificate_provider_invite(&self, _provided: &Provided) -> Result<()> {
        self.invites.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_certificate_provider_prompt(&self, _provided: &Provided) -> Result<()> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeLpaStore {
    pub registered: Mutex<Option<RegisteredLpa>>,
    pub sent: AtomicUsize,
}

#[async_trait]
impl LpaStoreClient for FakeLpaStore {
    async fn lpa(&self, _lpa_uid: &str) -> Result<RegisteredLpa, LpaStoreError> {
        self.registered
            .lock()
            .expect("registered lock")
            .clone()
            .ok_or(LpaStoreError::NotFound)
    }

    async fn send_lpa(&self, _provided: &Provided) -> Result<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FixedCode(pub &'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub(crate) const CODE: &str = "1234";

pub(crate) struct Harness {
    pub ctx: ApiContext,
    pub store: Arc<CountingStore>,
    pub events: Arc<RecordingEvents>,
    pub notifier: Arc<RecordingNotifier>,
    pub lpa_store: Arc<FakeLpaStore>,
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        let store = Arc::new(CountingStore {
            inner: Storage::new("sqlite::memory:").await.expect("db"),
            puts: AtomicUsize::new(0),
        });
        let events = Arc::new(RecordingEvents::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let lpa_store = Arc::new(FakeLpaStore::default());
        let now = Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .single()
                .expect("valid time"),
        ));

        let clock_now = Arc::clone(&now);
        let ctx = ApiContext {
            store: store.clone(),
            address_client: Arc::new(FakeAddressClient(vec![Address {
                line1: "1 High Street".into(),
                town: "Birmingham".into(),
                postcode: "B14 7ED".into(),
                country: "GB".into(),
                ..Address::default()
            }])),
            event_client: events.clone(),
            lpa_store_client: lpa_store.clone(),
            notification_sender: notifier.clone(),
            session_store: Arc::new(InMemorySessionStore::new()),
            code_generator: Arc::new(FixedCode(CODE)),
            clock: Arc::new(move || *clock_now.lock().expect("clock lock")),
        };

        Self {
            ctx,
            store,
            events,
            notifier,
            lpa_store,
            now,
        }
    }

    pub(crate) fn advance(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += Duration::minutes(minutes);
    }

    /// Creates an LPA, lets `edit` shape it and stores the result. The put
    /// counter starts from zero afterwards.
    pub(crate) async fn seed(&self, edit: impl FnOnce(&mut Provided)) -> Provided {
        let mut provided = self
            .ctx
            .store
            .create(SessionId::new(), self.ctx.now())
            .await
            .expect("create");
        edit(&mut provided);
        let stored = self.ctx.store.put(&provided).await.expect("seed put");
        self.store.puts.store(0, Ordering::SeqCst);
        stored
    }

    pub(crate) async fn load(&self, lpa_id: LpaId) -> Provided {
        self.ctx
            .store
            .get(lpa_id)
            .await
            .expect("get")
            .expect("some lpa")
    }

    pub(crate) async fn get(&self, lpa_id: LpaId, path: Path) -> PageOutcome {
        self.send(lpa_id, PageRequest::get(path)).await
    }

    pub(crate) async fn post(&self, lpa_id: LpaId, path: Path, form: &[(&str, &str)]) -> PageOutcome {
        self.send(lpa_id, PageRequest::post(path, FormValues::from_pairs(form)))
            .await
    }

    pub(crate) async fn send(&self, lpa_id: LpaId, req: PageRequest) -> PageOutcome {
        let provided = self.load(lpa_id).await;
        handle(&self.ctx, &req, &provided).await.expect("handle")
    }
}

pub(crate) fn redirect_of(outcome: &PageOutcome) -> &str {
    match outcome {
        PageOutcome::Redirect(target) => target,
        PageOutcome::Render { page, .. } => panic!("expected a redirect, rendered {page}"),
    }
}

pub(crate) fn data_of(outcome: &PageOutcome) -> &serde_json::Value {
    match outcome {
        PageOutcome::Render { data, .. } => data,
        PageOutcome::Redirect(target) => panic!("expected a render, redirected to {target}"),
    }
}

pub(crate) fn error_names(outcome: &PageOutcome) -> Vec<String> {
    data_of(outcome)["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|entry| entry["name"].as_str().expect("error name").to_string())
        .collect()
}

pub(crate) fn error_label(outcome: &PageOutcome, name: &str) -> String {
    data_of(outcome)["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .find(|entry| entry["name"] == name)
        .and_then(|entry| entry["error"]["label"].as_str())
        .expect("error label")
        .to_string()
}

fn address(line1: &str, postcode: &str) -> Address {
    Address {
        line1: line1.into(),
        town: "Birmingham".into(),
        postcode: postcode.into(),
        country: "GB".into(),
        ..Address::default()
    }
}

/// Fills in every task of the first section for a donor who can sign.
pub(crate) fn filled_in(provided: &mut Provided) {
    provided.lpa_uid = "M-1111-2222-3333".into();
    provided.lpa_type = Some(LpaType::PropertyAndAffairs);

    let donor = &mut provided.donor;
    donor.first_names = "Jamie".into();
    donor.last_name = "Smith".into();
    donor.date_of_birth = NaiveDate::from_ymd_opt(1960, 1, 2);
    donor.address = address("1 High Street", "B14 7ED");
    donor.email = "jamie@example.com".into();
    donor.thinks_can_sign = Some(YesNoMaybe::Yes);
    donor.can_sign = Some(YesNo::Yes);

    provided.attorneys.put(Attorney {
        uid: ActorUid::new(),
        first_names: "Robin".into(),
        last_name: "Jones".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1970, 3, 4),
        email: String::new(),
        address: address("2 Low Road", "B15 1AA"),
    });
    provided.want_replacement_attorneys = Some(YesNo::No);

    let provider = &mut provided.certificate_provider;
    provider.uid = ActorUid::new();
    provider.first_names = "Charlie".into();
    provider.last_name = "Brown".into();
    provider.mobile = "07700900000".into();
    provider.address = address("3 Mill Lane", "B16 2BB");

    provided.do_you_want_to_notify_people = Some(YesNo::No);
    provided.add_correspondent = Some(YesNo::No);

    let tasks = &mut provided.tasks;
    tasks.your_details = TaskState::Completed;
    tasks.choose_attorneys = TaskState::Completed;
    tasks.choose_replacement_attorneys = TaskState::Completed;
    tasks.when_can_the_lpa_be_used = TaskState::Completed;
    tasks.restrictions = TaskState::Completed;
    tasks.certificate_provider = TaskState::Completed;
    tasks.people_to_notify = TaskState::Completed;
    tasks.add_correspondent = TaskState::Completed;
}

/// A filled-in LPA that has been checked, paid for, confirmed and signed.
pub(crate) fn signed(provided: &mut Provided, at: DateTime<Utc>) {
    filled_in(provided);
    provided.checked_at = Some(at);
    provided.checked_hash = Some(provided.lpa_hash());
    provided.tasks.check_your_lpa = TaskState::Completed;
    provided.tasks.pay_for_lpa = PaymentState::Completed;
    provided.tasks.confirm_your_identity = IdentityState::Completed;
    provided.tasks.sign_the_lpa = TaskState::InProgress;
    provided.want_to_apply_for_lpa = true;
    provided.want_to_sign_lpa = true;
    provided.signed_at = Some(at);
}
