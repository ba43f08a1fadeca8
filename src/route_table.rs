/// Route Permission Table
///
/// Maps console paths to the permission a session must hold to view them.
/// Matching is by exact string only: `/campaigns/{id}` and other parameterized paths never
/// appear here and are therefore unguarded.
///
/// Keys are written in dot form; the evaluator normalizes them before matching.
pub const ROUTE_PERMISSIONS: &[(&str, Option<&str>)] = &[
    ("/dashboard", None),
    ("/profile", None),
    ("/contacts", Some("contacts.view")),
    ("/contacts/import", Some("contacts.import")),
    ("/campaigns", Some("campaigns.view")),
    ("/campaigns/new", Some("campaigns.create")),
    ("/templates", Some("templates.view")),
    ("/inbox", Some("inbox.view")),
    ("/automations", Some("automations.view")),
    ("/chatbot-builder", Some("chatbot.view")),
    ("/widget-builder", Some("widget.view")),
    ("/analytics", Some("analytics.view")),
    ("/team", Some("team.view")),
    ("/billing", Some("billing.view")),
    ("/integrations", Some("integrations.view")),
    ("/settings", Some("settings.view")),
];

/// pathname
///
/// The path part of a location: query string and fragment removed, and a single trailing
/// slash dropped (except on `/` itself). Everything that consults the table keys on this.
pub fn pathname(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// requirement_for
///
/// Looks up the permission required for `path`. `None` means the path is unguarded, either
/// because the table says so or because the path is not in the table at all.
pub fn requirement_for(path: &str) -> Option<&'static str> {
    ROUTE_PERMISSIONS
        .iter()
        .find(|(route, _)| *route == path)
        .and_then(|(_, required)| *required)
}
