//! Template interpretation for content-addressed page templates.
//!
//! Bodies are fetched by content address, scrubbed of legacy escape
//! artifacts, tokenized into tag and text spans, parsed into a small AST,
//! and evaluated against a JSON object context with handlebars-style
//! semantics: escaped and raw interpolation, conditional and iteration
//! blocks, scoped contexts, registered helpers, and partial expansion with
//! a fixed depth bound.
//!
//! Rendering is total over well-fetched input. Malformed tags, missing
//! paths, unknown helpers and failing helpers all degrade to empty or
//! literal text; only fetching or decoding the template itself can fail.

mod ast;
mod context;
mod error;
mod eval;
mod helpers;
mod lexer;
mod normalize;
mod parser;
mod partials;
mod tokens;

pub use ast::Node;
pub use context::is_truthy;
pub use context::lookup;
pub use context::value_to_text;
pub use context::Object;
pub use error::RenderError;
pub use eval::Renderer;
pub use helpers::HelperError;
pub use helpers::HelperFn;
pub use helpers::HelperInput;
pub use helpers::HelperRegistry;
pub use lexer::Lexer;
pub use normalize::clean_source;
pub use normalize::decode_entities;
pub use normalize::escape_html;
pub use normalize::tidy_output;
pub use parser::ParseError;
pub use parser::Parser;
pub use partials::PartialDescriptor;
pub use partials::PartialSet;
pub use tokens::Token;
pub use tokens::TokenKind;

use npress_store::ContentStore;

/// Fetch a template body by content address and scrub it for rendering.
pub fn fetch_template(store: &dyn ContentStore, address: &str) -> Result<String, RenderError> {
    let bytes = store.get(address)?;
    let text = String::from_utf8(bytes)?;
    Ok(clean_source(&text))
}

/// One-shot render of an already-fetched template body.
#[must_use]
pub fn render(
    template: &str,
    context: &Object,
    helpers: &HelperRegistry,
    partials: &PartialSet,
) -> String {
    Renderer::new(helpers, partials).render(template, context)
}

/// Fetch a template by content address, render it, and tidy the result.
pub fn render_page(
    store: &dyn ContentStore,
    address: &str,
    context: &Object,
    helpers: &HelperRegistry,
    partials: &PartialSet,
) -> Result<String, RenderError> {
    let template = fetch_template(store, address)?;
    Ok(tidy_output(&render(&template, context, helpers, partials)))
}
