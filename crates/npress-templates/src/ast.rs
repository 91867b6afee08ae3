/// A parsed template construct.
///
/// Built transiently per render call and discarded afterwards. Nested blocks
/// of the same kind are resolved structurally by the recursive-descent
/// parser, so no back-reference matching is involved.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(String),
    Variable {
        path: String,
        raw: bool,
    },
    Conditional {
        cond: String,
        body: Vec<Node>,
        else_body: Vec<Node>,
    },
    Negation {
        cond: String,
        body: Vec<Node>,
        else_body: Vec<Node>,
    },
    Scoped {
        path: String,
        body: Vec<Node>,
    },
    Iteration {
        path: String,
        body: Vec<Node>,
    },
    HelperCall {
        name: String,
        args: Vec<String>,
        raw: bool,
    },
    /// Block-style helper call. The raw body slices are retained so the
    /// helper itself can decide how, and whether, to re-expand them.
    HelperBlock {
        name: String,
        args: Vec<String>,
        body_text: String,
        else_text: String,
    },
    Partial {
        name: String,
    },
}
