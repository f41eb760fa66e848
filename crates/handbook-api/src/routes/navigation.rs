//! # Sidebar Navigation
//!
//! `GET /handbook/navigation/` describes every section and published policy
//! with the content href the browsing client should fetch for it. Sections
//! are ordered by number and policies by policy number.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use handbook_core::{policy_content_path, Handbook, INTRODUCTION_CONTENT_PATH, NAVIGATION_PATH};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavigationDocument {
    pub introduction: IntroductionLink,
    pub sections: Vec<NavigationSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntroductionLink {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavigationSection {
    /// Section number, e.g. `"1.0"`.
    pub number: String,
    pub title: String,
    pub policies: Vec<NavigationPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavigationPolicy {
    pub id: u64,
    /// Policy number, e.g. `"1.2"`.
    pub number: String,
    pub title: String,
    /// Content endpoint, `/handbook/policy/{id}/content/`.
    pub href: String,
}

impl NavigationDocument {
    pub fn from_handbook(handbook: &Handbook) -> Self {
        let sections = handbook
            .sections()
            .map(|section| NavigationSection {
                number: section.number.to_string(),
                title: section.title.clone(),
                policies: handbook
                    .policies_in(section.number)
                    .into_iter()
                    .filter(|p| p.published)
                    .map(|p| NavigationPolicy {
                        id: p.id.get(),
                        number: p.number.to_string(),
                        title: p.title.clone(),
                        href: policy_content_path(p.id),
                    })
                    .collect(),
            })
            .collect();
        Self {
            introduction: IntroductionLink {
                href: INTRODUCTION_CONTENT_PATH.to_string(),
            },
            sections,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route(NAVIGATION_PATH, get(navigation))
}

/// GET /handbook/navigation/: Sidebar structure.
#[utoipa::path(
    get,
    path = "/handbook/navigation/",
    responses(
        (status = 200, description = "Sections with their published policies", body = NavigationDocument),
    ),
    tag = "navigation"
)]
pub(crate) async fn navigation(State(state): State<AppState>) -> Json<NavigationDocument> {
    let handbook = state.handbook.read();
    Json(NavigationDocument::from_handbook(&handbook))
}
