mod address;
mod attorneys;
mod certificate_provider;
mod check_and_pay;
mod content;
mod correspondent;
mod identity;
mod lpa_details;
mod people_to_notify;
mod progress;
mod replacement_attorneys;
mod signing;
mod signing_help;
mod task_list;
mod your_details;

pub use address::AddressData;
pub use attorneys::*;
pub use certificate_provider::*;
pub use check_and_pay::*;
pub use content::*;
pub use correspondent::*;
pub use identity::*;
pub use lpa_details::*;
pub use people_to_notify::*;
pub use progress::*;
pub use replacement_attorneys::*;
pub use signing::*;
pub use signing_help::*;
pub use task_list::*;
pub use your_details::*;
