//! Minimal templating for agent documents.
//!
//! Supports exactly three constructs: `{{path}}` substitution,
//! `{{#if path}}...{{/if}}` conditionals, and `{{#each path}}...{{/each}}`
//! iteration with `{{this}}` bound inside the block. Nothing else; the
//! compiler owns document structure, templates only fill holes.

use serde_json::Value;

use crate::error::{Result, SwError};

/// Render a template against a JSON context. Unknown variables render as
/// empty strings so partial contexts stay usable; malformed block syntax is
/// an error.
pub fn render(template: &str, ctx: &Value) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    render_into(template, ctx, &mut out)?;
    Ok(out)
}

fn render_into(template: &str, ctx: &Value, out: &mut String) -> Result<()> {
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        if let Some(tag) = after.strip_prefix("#if ") {
            let (path, block, tail) = split_block(tag, "if")?;
            if truthy(lookup(ctx, path)) {
                render_into(block, ctx, out)?;
            }
            rest = tail;
        } else if let Some(tag) = after.strip_prefix("#each ") {
            let (path, block, tail) = split_block(tag, "each")?;
            if let Some(Value::Array(items)) = lookup(ctx, path) {
                for item in items {
                    let scoped = scope_with_this(ctx, item);
                    render_into(block, &scoped, out)?;
                }
            }
            rest = tail;
        } else {
            let end = after
                .find("}}")
                .ok_or_else(|| SwError::Template("unclosed '{{' variable".to_string()))?;
            let path = after[..end].trim();
            if let Some(value) = lookup(ctx, path) {
                out.push_str(&value_to_string(value));
            }
            rest = &after[end + 2..];
        }
    }

    out.push_str(rest);
    Ok(())
}

/// Split `{{#kind path}}block{{/kind}}` after the opening marker. Returns
/// the path, the inner block, and the remainder after the close tag.
/// Same-kind blocks nest.
fn split_block<'a>(tag: &'a str, kind: &str) -> Result<(&'a str, &'a str, &'a str)> {
    let path_end = tag
        .find("}}")
        .ok_or_else(|| SwError::Template(format!("unclosed '{{{{#{kind}' tag")))?;
    let path = tag[..path_end].trim();
    let body = &tag[path_end + 2..];

    let open_marker = format!("{{{{#{kind} ");
    let close_marker = format!("{{{{/{kind}}}}}");

    let mut depth = 1usize;
    let mut cursor = 0usize;
    loop {
        let next_open = body[cursor..].find(&open_marker);
        let next_close = body[cursor..].find(&close_marker);
        match (next_open, next_close) {
            (_, None) => {
                return Err(SwError::Template(format!(
                    "missing '{{{{/{kind}}}}}' for '{{{{#{kind} {path}}}}}'"
                )));
            }
            (Some(open_at), Some(close_at)) if open_at < close_at => {
                depth += 1;
                cursor += open_at + open_marker.len();
            }
            (_, Some(close_at)) => {
                depth -= 1;
                cursor += close_at + close_marker.len();
                if depth == 0 {
                    let block = &body[..cursor - close_marker.len()];
                    let tail = &body[cursor..];
                    return Ok((path, block, tail));
                }
            }
        }
    }
}

/// Dotted-path lookup into the context. `this` refers to the current
/// iteration scope installed by `{{#each}}`.
fn lookup<'a>(ctx: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = ctx;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn scope_with_this(ctx: &Value, item: &Value) -> Value {
    let mut scoped = match ctx {
        Value::Object(map) => Value::Object(map.clone()),
        _ => Value::Object(serde_json::Map::new()),
    };
    if let Value::Object(map) = &mut scoped {
        map.insert("this".to_string(), item.clone());
    }
    scoped
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        Value::Object(_) => String::new(),
    }
}
