use serde::Serialize;
use shared::{error::ApiError, path::Path, provided::Provided};

use crate::{ApiContext, Outcome, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentData {
    pub page: Path,
    pub donor_full_name: String,
    pub next: Option<String>,
    pub lpa: Option<Provided>,
}

/// Guidance pages with nothing to submit. Posting to one just moves on to
/// `next`, or to the task list.
pub async fn content(
    _ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<ContentData>, ApiError> {
    let page = req.path;
    if req.is_post() {
        let next = req
            .query
            .next
            .as_deref()
            .and_then(shared::path::parse_lpa_url)
            .filter(|destination| destination.lpa_id == provided.lpa_id)
            .unwrap_or_else(|| Path::TaskList.at(provided.lpa_id));
        return Ok(Outcome::Redirect(next));
    }

    let shows_lpa = matches!(page, Path::ReadYourLpa | Path::YouHaveSubmittedYourLpa);
    Ok(Outcome::Render(ContentData {
        page,
        donor_full_name: provided.donor.full_name(),
        next: req.query.next.clone(),
        lpa: shows_lpa.then(|| provided.clone()),
    }))
}
