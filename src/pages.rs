use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{access::AccessQuery, route_table};

/// Page
///
/// The console's feature screens. The gate treats them as opaque units to render; what each
/// page does is owned by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Page {
    Dashboard,
    Profile,
    Contacts,
    ContactImport,
    ContactDetails,
    Campaigns,
    CampaignCreate,
    CampaignDetails,
    Templates,
    TemplateEditor,
    Inbox,
    Automations,
    ChatbotBuilder,
    WidgetBuilder,
    Analytics,
    Team,
    Billing,
    Integrations,
    Settings,
}

/// The authenticated shell's route switch, first match wins.
/// `{name}` segments match any single non-empty segment.
/// The bare root shows the dashboard; the enforcer leaves `/` alone, so it must render.
pub const CONSOLE_ROUTES: &[(&str, Page)] = &[
    ("/", Page::Dashboard),
    ("/dashboard", Page::Dashboard),
    ("/profile", Page::Profile),
    ("/contacts", Page::Contacts),
    ("/contacts/import", Page::ContactImport),
    ("/contacts/{id}", Page::ContactDetails),
    ("/campaigns", Page::Campaigns),
    ("/campaigns/new", Page::CampaignCreate),
    ("/campaigns/{id}", Page::CampaignDetails),
    ("/templates", Page::Templates),
    ("/templates/{id}", Page::TemplateEditor),
    ("/inbox", Page::Inbox),
    ("/automations", Page::Automations),
    ("/chatbot-builder", Page::ChatbotBuilder),
    ("/widget-builder", Page::WidgetBuilder),
    ("/analytics", Page::Analytics),
    ("/team", Page::Team),
    ("/billing", Page::Billing),
    ("/integrations", Page::Integrations),
    ("/settings", Page::Settings),
];

/// match_route
///
/// Finds the route switch entry for `location`, returning its pattern and page.
/// A query string or fragment on the location is ignored, as is a single trailing slash.
pub fn match_route(location: &str) -> Option<(&'static str, Page)> {
    let path = route_table::pathname(location);
    CONSOLE_ROUTES
        .iter()
        .find(|(pattern, _)| pattern_matches(pattern, path))
        .copied()
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut expected = pattern.split('/');
    let mut actual = path.split('/');
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(want), Some(got)) => {
                let is_param = want.starts_with('{') && want.ends_with('}');
                if is_param {
                    if got.is_empty() {
                        return false;
                    }
                } else if want != got {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// NavLink
///
/// A sidebar entry in the authenticated shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

const SIDEBAR: &[(&str, &str)] = &[
    ("Dashboard", "/dashboard"),
    ("Inbox", "/inbox"),
    ("Contacts", "/contacts"),
    ("Campaigns", "/campaigns"),
    ("Templates", "/templates"),
    ("Automations", "/automations"),
    ("Chatbot Builder", "/chatbot-builder"),
    ("Widget Builder", "/widget-builder"),
    ("Analytics", "/analytics"),
    ("Team", "/team"),
    ("Integrations", "/integrations"),
    ("Billing", "/billing"),
    ("Settings", "/settings"),
];

/// sidebar
///
/// The sidebar links the session may follow. Links to routes it cannot access are hidden.
pub fn sidebar(access: &AccessQuery<'_>) -> Vec<NavLink> {
    SIDEBAR
        .iter()
        .filter(|(_, path)| access.can_access_route(path))
        .map(|(label, path)| NavLink {
            label: label.to_string(),
            path: path.to_string(),
        })
        .collect()
}
