//! Placeholder substitution for middleware fragments.
//!
//! Strings may contain `{name}` placeholders. Each placeholder whose name is
//! a resolved variable is replaced by its value; anything else, including
//! unmatched braces, is kept verbatim. Substituted values are not scanned
//! again.

use serde_json::Value;

use super::Variables;

/// Returns a copy of `template` with placeholders replaced.
pub fn substitute(template: &Value, variables: &Variables) -> Value {
    let mut value = template.clone();
    substitute_value(&mut value, variables);
    value
}

/// Replaces placeholders in a single value (recursively for arrays and objects).
/// Returns the number of substitutions made.
pub fn substitute_value(value: &mut Value, variables: &Variables) -> usize {
    match value {
        Value::String(s) => substitute_string(s, variables),
        Value::Array(items) => items
            .iter_mut()
            .map(|item| substitute_value(item, variables))
            .sum(),
        Value::Object(map) => map
            .values_mut()
            .map(|item| substitute_value(item, variables))
            .sum(),
        _ => 0,
    }
}

fn substitute_string(s: &mut String, variables: &Variables) -> usize {
    if !s.contains('{') {
        return 0;
    }

    let mut result = String::with_capacity(s.len());
    let mut substitutions = 0;
    let mut rest = s.as_str();

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        // The placeholder name runs to the next brace; another '{' first
        // means this one is literal.
        match after.find(|c: char| c == '{' || c == '}') {
            Some(close) if after[close..].starts_with('}') => {
                let name = &after[..close];
                match variables.get(name) {
                    Some(value) => {
                        result.push_str(value);
                        substitutions += 1;
                    }
                    None => {
                        result.push('{');
                        result.push_str(name);
                        result.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    *s = result;
    substitutions
}
