use serde_json::Value;

/// The name→value mapping a template is rendered against.
pub type Object = serde_json::Map<String, Value>;

/// Resolve a context path against the current scope.
///
/// `@`-prefixed names and `this` are read directly from the scope's root.
/// Every other path is tried against the current item (`this`) first when it
/// is an object, then against the scope root, so iteration bodies can name
/// item fields without qualifying them.
pub fn lookup<'a>(context: &'a Object, path: &str) -> Option<&'a Value> {
    let path = path.trim();

    if path.starts_with('@') {
        return context.get(path);
    }

    if path == "this" {
        return context.get("this");
    }

    if let Some(this) = context.get("this") {
        if this.is_object() {
            if let Some(value) = resolve_path(this, path) {
                return Some(value);
            }
        }
    }

    resolve_in(context, path)
}

/// Walk a dot path starting from the scope's root mapping.
fn resolve_in<'a>(object: &'a Object, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = object.get(parts.next()?)?;
    for part in parts {
        current = step(current, part)?;
    }
    Some(current)
}

/// Walk a dot path with `[n]` index segments (`a.b.[0].c`) from `value`.
fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        current = step(current, part)?;
    }
    Some(current)
}

fn step<'a>(current: &'a Value, part: &str) -> Option<&'a Value> {
    if let Some(index) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        let index: usize = index.parse().ok()?;
        return current.as_array()?.get(index);
    }
    current.as_object()?.get(part)
}

/// The truthiness rule for conditional constructs.
///
/// `false`, the empty string, the literal strings `"false"` and `"0"`,
/// numeric zero, and absent values are falsy; everything else, including
/// objects and arrays, is truthy.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !(s.is_empty() || s == "false" || s == "0"),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Interpolated form of a context value. Scalars render naturally; objects
/// and arrays interpolate as empty text rather than a debug dump.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            tracing::debug!("non-scalar value interpolated as empty text");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn context() -> Object {
        let Value::Object(map) = json!({
            "title": "hello",
            "post": { "slug": "first", "tags": ["a", "b"] },
            "items": [ { "name": "one" } ],
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn resolves_dot_paths() {
        let ctx = context();
        assert_eq!(lookup(&ctx, "post.slug"), Some(&json!("first")));
    }

    #[test]
    fn resolves_bracket_indexes() {
        let ctx = context();
        assert_eq!(lookup(&ctx, "post.tags.[1]"), Some(&json!("b")));
        assert_eq!(lookup(&ctx, "items.[0].name"), Some(&json!("one")));
    }

    #[test]
    fn missing_path_is_none() {
        let ctx = context();
        assert_eq!(lookup(&ctx, "post.missing"), None);
        assert_eq!(lookup(&ctx, "post.tags.[9]"), None);
    }

    #[test]
    fn item_scope_shadows_root() {
        let mut ctx = context();
        ctx.insert("this".to_string(), json!({ "title": "from item" }));
        assert_eq!(lookup(&ctx, "title"), Some(&json!("from item")));
        // Paths absent from the item fall through to the root.
        assert_eq!(lookup(&ctx, "post.slug"), Some(&json!("first")));
    }

    #[test]
    fn at_names_read_from_scope_root() {
        let mut ctx = context();
        ctx.insert("@index".to_string(), json!(3));
        assert_eq!(lookup(&ctx, "@index"), Some(&json!(3)));
    }

    #[test]
    fn truthiness_table() {
        for falsy in [json!(false), json!(""), json!("false"), json!("0"), json!(0), json!(null)] {
            assert!(!is_truthy(Some(&falsy)), "{falsy} should be falsy");
        }
        assert!(!is_truthy(None));
        for truthy in [json!(true), json!(1), json!("a"), json!({}), json!([])] {
            assert!(is_truthy(Some(&truthy)), "{truthy} should be truthy");
        }
    }

    #[test]
    fn scalar_text_forms() {
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(42)), "42");
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!({"a": 1})), "");
    }
}
