use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

id_newtype!(LpaId);
id_newtype!(ActorUid);
id_newtype!(SessionId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value {0:?}")]
pub struct UnknownValue(pub String);

/// Closed set of string-valued answers that appear both in form posts and in
/// the persisted aggregate.
macro_rules! form_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(UnknownValue(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

form_enum!(YesNo {
    Yes => "yes",
    No => "no",
});

form_enum!(YesNoMaybe {
    Yes => "yes",
    No => "no",
    Maybe => "maybe",
});

form_enum!(LpaType {
    PropertyAndAffairs => "property-and-affairs",
    PersonalWelfare => "personal-welfare",
});

form_enum!(CanBeUsedWhen {
    HasCapacity => "when-has-capacity",
    CapacityLost => "when-capacity-lost",
});

form_enum!(LifeSustainingTreatment {
    OptionA => "option-a",
    OptionB => "option-b",
});

form_enum!(AttorneysAct {
    Jointly => "jointly",
    JointlyAndSeverally => "jointly-and-severally",
    JointlyForSomeSeverallyForOthers => "jointly-for-some-severally-for-others",
});

form_enum!(ReplacementAttorneysStepIn {
    WhenAllCanNoLongerAct => "all",
    WhenOneCanNoLongerAct => "one",
    AnotherWay => "other",
});

form_enum!(Lang {
    En => "en",
    Cy => "cy",
});

form_enum!(CertificateProviderRelationship {
    Personally => "personally",
    Professionally => "professionally",
});

form_enum!(RelationshipLength {
    LessThanTwoYears => "lt-2-years",
    GreaterThanEqualToTwoYears => "gte-2-years",
});

form_enum!(ChannelPreference {
    Online => "online",
    Paper => "paper",
});

form_enum!(FeeType {
    FullFee => "full-fee",
    HalfFee => "half-fee",
    NoFee => "no-fee",
    HardshipFee => "hardship-fee",
});

form_enum!(ActorType {
    Donor => "donor",
    Attorney => "attorney",
    ReplacementAttorney => "replacement-attorney",
    TrustCorporation => "trust-corporation",
    ReplacementTrustCorporation => "replacement-trust-corporation",
    CertificateProvider => "certificate-provider",
    PersonToNotify => "person-to-notify",
    Correspondent => "correspondent",
    AuthorisedSignatory => "authorised-signatory",
    IndependentWitness => "independent-witness",
    Voucher => "voucher",
});

form_enum!(TaskState {
    NotStarted => "not-started",
    InProgress => "in-progress",
    Completed => "completed",
});

form_enum!(PaymentState {
    NotStarted => "not-started",
    InProgress => "in-progress",
    Pending => "pending",
    Approved => "approved",
    Denied => "denied",
    MoreEvidenceRequired => "more-evidence-required",
    Completed => "completed",
});

form_enum!(IdentityState {
    NotStarted => "not-started",
    InProgress => "in-progress",
    Pending => "pending",
    Completed => "completed",
    ProblemWithIdentity => "problem-with-identity",
});

impl Default for TaskState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl Default for PaymentState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl Default for IdentityState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl TaskState {
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }

    /// Marks a section as started without undoing an earlier completion.
    pub fn started(self) -> Self {
        match self {
            Self::Completed => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

impl ActorType {
    pub fn is_attorney_like(self) -> bool {
        matches!(
            self,
            Self::Attorney
                | Self::ReplacementAttorney
                | Self::TrustCorporation
                | Self::ReplacementTrustCorporation
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub town: String,
    pub postcode: String,
    pub country: String,
}

impl Address {
    pub fn is_zero(&self) -> bool {
        self == &Self::default()
    }

    /// Two addresses are treated as the same place when their first line and
    /// postcode agree, ignoring case and spacing.
    pub fn same_place(&self, other: &Address) -> bool {
        !self.line1.trim().is_empty()
            && fold(&self.line1) == fold(&other.line1)
            && fold(&self.postcode) == fold(&other.postcode)
    }

    pub fn lines(&self) -> Vec<&str> {
        [
            self.line1.as_str(),
            self.line2.as_str(),
            self.line3.as_str(),
            self.town.as_str(),
            self.postcode.as_str(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect()
    }
}

fn fold(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
