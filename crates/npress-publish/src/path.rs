use npress_dag::split_path;

/// Pages in the publication's base language live at the mapping path
/// itself; every other language is filed under the translation prefix.
pub const DEFAULT_LANGUAGE: &str = "nl";

const TRANSLATION_PREFIX: &str = "/en";

/// Build the logical output path for a record from its mapping's path
/// template: apply the language prefix, substitute `{slug}`, and split into
/// segments, dropping empties.
#[must_use]
pub fn logical_path(path_template: &str, slug: &str, language: &str) -> Vec<String> {
    let prefixed = if language == DEFAULT_LANGUAGE {
        path_template.to_string()
    } else {
        format!("{TRANSLATION_PREFIX}{path_template}")
    };
    split_path(&prefixed.replace("{slug}", slug))
}
