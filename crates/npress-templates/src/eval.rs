use serde_json::Value;

use crate::ast::Node;
use crate::context::is_truthy;
use crate::context::lookup;
use crate::context::value_to_text;
use crate::context::Object;
use crate::helpers::HelperInput;
use crate::helpers::HelperRegistry;
use crate::lexer::Lexer;
use crate::normalize::escape_html;
use crate::parser::Parser;
use crate::partials::PartialSet;

/// Expansion bound for partial-of-partial chains and helper re-expansion.
/// A reference that does not resolve within the bound stays literal.
const MAX_EXPANSION_DEPTH: usize = 10;

/// AST evaluator over a context, a helper registry, and a resolved partial
/// set. Deterministic and side-effect free apart from whatever the caller's
/// helpers do.
///
/// Every per-construct failure (bad path, helper error, malformed tag)
/// degrades that construct to empty or literal text and rendering continues;
/// nothing here aborts a render.
pub struct Renderer<'a> {
    helpers: &'a HelperRegistry,
    partials: &'a PartialSet,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub fn new(helpers: &'a HelperRegistry, partials: &'a PartialSet) -> Self {
        Self { helpers, partials }
    }

    /// Expand `source` against `context`.
    #[must_use]
    pub fn render(&self, source: &str, context: &Object) -> String {
        let mut scope = context.clone();
        scope
            .entry("@root".to_string())
            .or_insert_with(|| Value::Object(context.clone()));
        self.render_fragment(source, &scope, 0)
    }

    fn render_fragment(&self, source: &str, scope: &Object, depth: usize) -> String {
        let tokens = Lexer::new(source).tokenize();
        let (nodes, errors) = Parser::new(source, tokens).parse();
        for error in errors {
            tracing::warn!(%error, "template construct degraded");
        }
        self.eval_nodes(&nodes, scope, depth)
    }

    fn eval_nodes(&self, nodes: &[Node], scope: &Object, depth: usize) -> String {
        nodes
            .iter()
            .map(|node| self.eval_node(node, scope, depth))
            .collect()
    }

    fn eval_node(&self, node: &Node, scope: &Object, depth: usize) -> String {
        match node {
            Node::Text(text) => text.clone(),

            Node::Variable { path, raw } => {
                let text = lookup(scope, path).map(value_to_text).unwrap_or_default();
                if *raw {
                    text
                } else {
                    escape_html(&text)
                }
            }

            Node::Conditional {
                cond,
                body,
                else_body,
            } => {
                let chosen = if is_truthy(lookup(scope, cond)) {
                    body
                } else {
                    else_body
                };
                self.eval_nodes(chosen, scope, depth)
            }

            Node::Negation {
                cond,
                body,
                else_body,
            } => {
                let chosen = if is_truthy(lookup(scope, cond)) {
                    else_body
                } else {
                    body
                };
                self.eval_nodes(chosen, scope, depth)
            }

            Node::Scoped { path, body } => match lookup(scope, path) {
                Some(Value::Object(fields)) => {
                    let mut inner = fields.clone();
                    if let Some(root) = scope.get("@root") {
                        inner
                            .entry("@root".to_string())
                            .or_insert_with(|| root.clone());
                    }
                    self.eval_nodes(body, &inner, depth)
                }
                _ => String::new(),
            },

            Node::Iteration { path, body } => self.eval_iteration(path, body, scope, depth),

            Node::HelperCall { name, args, raw } => {
                let Some(helper) = self.helpers.get(name) else {
                    tracing::warn!(helper = %name, "unknown helper call expands to nothing");
                    return String::new();
                };
                let resolved: Vec<Value> = args
                    .iter()
                    .take(2)
                    .map(|arg| resolve_arg(arg, scope))
                    .collect();
                let input = HelperInput {
                    args: &resolved,
                    body: None,
                    inverse: None,
                };
                match helper(&input) {
                    Ok(value) => {
                        let text = value_to_text(&value);
                        if *raw {
                            text
                        } else {
                            escape_html(&text)
                        }
                    }
                    Err(error) => {
                        tracing::warn!(helper = %name, %error, "helper call degraded");
                        String::new()
                    }
                }
            }

            Node::HelperBlock {
                name,
                args,
                body_text,
                else_text,
            } => {
                let Some(helper) = self.helpers.get(name) else {
                    tracing::warn!(helper = %name, "unknown block helper expands to nothing");
                    return String::new();
                };
                let resolved: Vec<Value> = args
                    .iter()
                    .take(2)
                    .map(|arg| resolve_arg(arg, scope))
                    .collect();
                let input = HelperInput {
                    args: &resolved,
                    body: Some(body_text),
                    inverse: Some(else_text),
                };
                match helper(&input) {
                    Ok(value) => {
                        let text = value_to_text(&value);
                        if depth >= MAX_EXPANSION_DEPTH {
                            text
                        } else {
                            self.render_fragment(&text, scope, depth + 1)
                        }
                    }
                    Err(error) => {
                        tracing::warn!(helper = %name, %error, "block helper degraded");
                        String::new()
                    }
                }
            }

            Node::Partial { name } => {
                if depth >= MAX_EXPANSION_DEPTH {
                    return format!("{{{{> {name}}}}}");
                }
                match self.partials.get(name) {
                    Some(body) => self.render_fragment(body, scope, depth + 1),
                    None => format!("{{{{> {name}}}}}"),
                }
            }
        }
    }

    fn eval_iteration(&self, path: &str, body: &[Node], scope: &Object, depth: usize) -> String {
        let Some(Value::Array(items)) = lookup(scope, path) else {
            tracing::debug!(path, "each target is not a sequence, expands to nothing");
            return String::new();
        };
        let items = items.clone();
        let key = path.trim().rsplit('.').next().unwrap_or(path).to_string();

        let mut out = String::new();
        for (index, item) in items.iter().enumerate() {
            let mut item_scope = scope.clone();
            item_scope.insert("@index".to_string(), Value::from(index));
            item_scope.insert("@first".to_string(), Value::Bool(index == 0));
            item_scope.insert("@last".to_string(), Value::Bool(index + 1 == items.len()));
            item_scope.insert("@key".to_string(), Value::String(key.clone()));
            item_scope.insert("this".to_string(), item.clone());
            // Item fields layer over the positional markers by design; a
            // same-named field shadows the marker.
            if let Value::Object(fields) = item {
                for (name, value) in fields {
                    item_scope.insert(name.clone(), value.clone());
                }
            }
            out.push_str(&self.eval_nodes(body, &item_scope, depth));
        }
        out
    }
}

/// Resolve one helper argument: quoted literal, then context path, then
/// numeric literal, then the raw token itself.
fn resolve_arg(token: &str, scope: &Object) -> Value {
    let token = token.trim();
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return Value::String(token[1..token.len() - 1].to_string());
        }
    }
    if let Some(value) = lookup(scope, token) {
        return value.clone();
    }
    if let Ok(n) = token.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = token.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(f) {
            return Value::Number(number);
        }
    }
    Value::String(token.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serde_json::Value;

    use super::*;
    use crate::helpers::HelperError;

    fn object(value: Value) -> Object {
        let Value::Object(map) = value else {
            panic!("test context must be an object")
        };
        map
    }

    fn render(template: &str, context: Value) -> String {
        let helpers = HelperRegistry::with_builtins();
        let partials = PartialSet::new();
        Renderer::new(&helpers, &partials).render(template, &object(context))
    }

    #[test]
    fn escapes_double_brace_output() {
        assert_eq!(
            render("{{v}}", json!({ "v": "<x>&\"" })),
            "&lt;x&gt;&amp;&quot;"
        );
    }

    #[test]
    fn triple_brace_output_is_raw() {
        assert_eq!(render("{{{v}}}", json!({ "v": "<x>&\"" })), "<x>&\"");
    }

    #[test]
    fn missing_variable_is_empty() {
        assert_eq!(render("[{{ghost}}]", json!({})), "[]");
    }

    #[test]
    fn conditional_truthiness_table() {
        let template = "{{#if v}}A{{else}}B{{/if}}";
        for falsy in [json!(0), json!(""), json!(null), json!(false), json!("0")] {
            assert_eq!(render(template, json!({ "v": falsy })), "B", "{falsy}");
        }
        assert_eq!(render(template, json!({})), "B");
        for truthy in [json!(1), json!("a"), json!(true)] {
            assert_eq!(render(template, json!({ "v": truthy })), "A", "{truthy}");
        }
    }

    #[test]
    fn negation_inverts_selection() {
        let template = "{{#unless v}}empty{{else}}present{{/unless}}";
        assert_eq!(render(template, json!({ "v": [] })), "present");
        assert_eq!(render(template, json!({ "v": "" })), "empty");
    }

    #[test]
    fn nested_same_name_conditionals() {
        let template = "{{#if a}}{{#if b}}both{{else}}only a{{/if}}{{else}}neither{{/if}}";
        assert_eq!(render(template, json!({ "a": 1, "b": 1 })), "both");
        assert_eq!(render(template, json!({ "a": 1 })), "only a");
        assert_eq!(render(template, json!({})), "neither");
    }

    #[test]
    fn iteration_positional_markers() {
        assert_eq!(
            render(
                "{{#each items}}{{@index}}:{{@first}} {{/each}}",
                json!({ "items": [{}, {}] })
            ),
            "0:true 1:false "
        );
    }

    #[test]
    fn iteration_last_marker_and_key() {
        assert_eq!(
            render(
                "{{#each post.tags}}{{@key}}={{this}}:{{@last}} {{/each}}",
                json!({ "post": { "tags": ["a", "b"] } })
            ),
            "tags=a:false tags=b:true "
        );
    }

    #[test]
    fn item_fields_shadow_parent_and_markers() {
        assert_eq!(
            render(
                "{{#each items}}{{name}} {{/each}}",
                json!({ "name": "outer", "items": [{ "name": "inner" }, {}] })
            ),
            "inner outer "
        );
    }

    #[test]
    fn iteration_over_non_sequence_is_empty() {
        assert_eq!(
            render("{{#each v}}x{{/each}}", json!({ "v": "not a list" })),
            ""
        );
    }

    #[test]
    fn scoped_context_switches_scope() {
        assert_eq!(
            render(
                "{{#with post}}{{slug}}{{/with}}",
                json!({ "post": { "slug": "first" } })
            ),
            "first"
        );
    }

    #[test]
    fn scoped_context_over_non_object_is_empty() {
        assert_eq!(
            render("{{#with post}}{{slug}}{{/with}}", json!({ "post": 7 })),
            ""
        );
    }

    #[test]
    fn helper_call_with_resolved_args() {
        let mut helpers = HelperRegistry::new();
        helpers.register("concat", |input: &HelperInput<'_>| {
            let a = input.arg(0).map(value_to_text).unwrap_or_default();
            let b = input.arg(1).map(value_to_text).unwrap_or_default();
            Ok(Value::String(format!("{a}{b}")))
        });
        let partials = PartialSet::new();
        let ctx = object(json!({ "name": "press" }));
        let out = Renderer::new(&helpers, &partials).render(r#"{{concat "n" name}}"#, &ctx);
        assert_eq!(out, "npress");
    }

    #[test]
    fn helper_call_output_is_escaped_unless_raw() {
        let mut helpers = HelperRegistry::new();
        helpers.register("tag", |_: &HelperInput<'_>| {
            Ok(Value::String("<b>".to_string()))
        });
        let partials = PartialSet::new();
        let renderer = Renderer::new(&helpers, &partials);
        let ctx = object(json!({}));
        assert_eq!(renderer.render("{{tag x}}", &ctx), "&lt;b&gt;");
        assert_eq!(renderer.render("{{{tag x}}}", &ctx), "<b>");
    }

    #[test]
    fn unknown_helper_call_expands_to_nothing() {
        assert_eq!(render("[{{frobnicate a b}}]", json!({ "a": 1 })), "[]");
    }

    #[test]
    fn bare_unknown_name_falls_through_to_variable_pass() {
        // No space, so it is a plain variable reference; unresolved
        // variables interpolate as empty text.
        assert_eq!(render("[{{frobnicate}}]", json!({})), "[]");
    }

    #[test]
    fn failing_helper_degrades_to_empty() {
        let mut helpers = HelperRegistry::new();
        helpers.register("boom", |_: &HelperInput<'_>| {
            Err(HelperError("no".to_string()))
        });
        let partials = PartialSet::new();
        let ctx = object(json!({}));
        let out = Renderer::new(&helpers, &partials).render("a{{boom x}}b", &ctx);
        assert_eq!(out, "ab");
    }

    #[test]
    fn block_helper_sees_raw_bodies_and_result_is_re_expanded() {
        let mut helpers = HelperRegistry::new();
        helpers.register("maybe", |input: &HelperInput<'_>| {
            let chosen = if is_truthy(input.arg(0)) {
                input.body
            } else {
                input.inverse
            };
            Ok(Value::String(chosen.unwrap_or_default().to_string()))
        });
        let partials = PartialSet::new();
        let ctx = object(json!({ "on": true, "name": "press" }));
        let out = Renderer::new(&helpers, &partials)
            .render("{{#maybe on}}yes {{name}}{{else}}no{{/maybe}}", &ctx);
        assert_eq!(out, "yes press");
    }

    #[test]
    fn builtin_eq_inside_conditional_block() {
        let template = "{{#eq post_type \"article\"}}{{/eq}}";
        // eq as a block helper returns its boolean; re-expansion leaves it.
        assert_eq!(render(template, json!({ "post_type": "article" })), "true");
    }

    #[test]
    fn partial_expansion_uses_current_context() {
        let helpers = HelperRegistry::new();
        let mut partials = PartialSet::new();
        partials.insert("header", "<h1>{{title}}</h1>");
        let ctx = object(json!({ "title": "npress" }));
        let out = Renderer::new(&helpers, &partials).render("{{> header}}", &ctx);
        insta::assert_snapshot!(out, @"<h1>npress</h1>");
    }

    #[test]
    fn unknown_partial_left_as_literal_tag() {
        assert_eq!(render("{{> ghost}}", json!({})), "{{> ghost}}");
    }

    #[test]
    fn self_referencing_partial_terminates_at_bound() {
        let helpers = HelperRegistry::new();
        let mut partials = PartialSet::new();
        partials.insert("loop", "x{{> loop}}");
        let ctx = object(json!({}));
        let out = Renderer::new(&helpers, &partials).render("{{> loop}}", &ctx);
        assert_eq!(out, format!("{}{{{{> loop}}}}", "x".repeat(10)));
    }

    #[test]
    fn partial_of_partial_chains_resolve() {
        let helpers = HelperRegistry::new();
        let mut partials = PartialSet::new();
        partials.insert("outer", "[{{> inner}}]");
        partials.insert("inner", "{{title}}");
        let ctx = object(json!({ "title": "t" }));
        let out = Renderer::new(&helpers, &partials).render("{{> outer}}", &ctx);
        assert_eq!(out, "[t]");
    }
}
