//! Validate Request Use Case
//!
//! Lists the placeholders a request references that the context cannot
//! resolve. The result is a warning source; sending is never blocked.

use graphit_domain::RequestOptions;

use crate::variable_resolver::extract_variable_names;

/// Where an unresolved placeholder was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSite {
    /// The endpoint template.
    Endpoint,
    /// An enabled header name or value.
    Header,
    /// An auth field.
    Auth,
    /// The variables text.
    Variables,
}

/// One unresolved placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariable {
    /// Placeholder name.
    pub name: String,
    /// First place it was referenced.
    pub site: PlaceholderSite,
}

/// Returns every unresolved placeholder, deduplicated, in first-seen order
/// across endpoint, headers, auth and variables.
#[must_use]
pub fn validate_request(options: &RequestOptions) -> Vec<MissingVariable> {
    let mut sources: Vec<(PlaceholderSite, &str)> =
        vec![(PlaceholderSite::Endpoint, options.endpoint.as_str())];
    for header in options.active_headers() {
        sources.push((PlaceholderSite::Header, header.key.as_str()));
        sources.push((PlaceholderSite::Header, header.value.as_str()));
    }
    sources.extend(
        options
            .auth
            .strings()
            .into_iter()
            .map(|s| (PlaceholderSite::Auth, s)),
    );
    sources.push((PlaceholderSite::Variables, options.variables.as_str()));

    let mut missing: Vec<MissingVariable> = Vec::new();
    for (site, text) in sources {
        for name in extract_variable_names(text) {
            if options.context.contains(&name) || missing.iter().any(|m| m.name == name) {
                continue;
            }
            missing.push(MissingVariable { name, site });
        }
    }
    missing
}
