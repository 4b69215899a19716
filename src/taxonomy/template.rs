//! Name templates for generated nodes
//!
//! Supported expressions:
//! - `{n}` / `{n:03}`: the node's ordinal, optionally zero-padded
//! - `{name}`: the node's rendered name (descriptions only)
//! - `{parent}`: the parent's name
//! - `{lineage}`: names of lineage-marked ancestors joined by `-`

use super::TaxonomyError;

/// Values available while rendering one node
#[derive(Debug, Clone, Copy)]
pub(crate) struct TemplateVars<'a> {
    pub ordinal: usize,
    pub name: Option<&'a str>,
    pub parent: Option<&'a str>,
    pub lineage: &'a [String],
}

fn template_error(template: &str, message: impl Into<String>) -> TaxonomyError {
    TaxonomyError::Template {
        template: template.to_string(),
        message: message.into(),
    }
}

/// Render a template, replacing `{...}` expressions with values from `vars`.
pub(crate) fn render(template: &str, vars: &TemplateVars<'_>) -> Result<String, TaxonomyError> {
    let mut result = String::with_capacity(template.len() + 8);
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                let mut expr = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => expr.push(c),
                        None => return Err(template_error(template, "unclosed expression")),
                    }
                }
                result.push_str(&eval(expr.trim(), template, vars)?);
            }
            '}' => return Err(template_error(template, "unmatched '}'")),
            c => result.push(c),
        }
    }

    Ok(result)
}

fn eval(expr: &str, template: &str, vars: &TemplateVars<'_>) -> Result<String, TaxonomyError> {
    let (var, format) = match expr.split_once(':') {
        Some((var, format)) => (var.trim(), Some(format.trim())),
        None => (expr, None),
    };

    if var != "n" && format.is_some() {
        return Err(template_error(template, format!("'{}' takes no format", var)));
    }

    match var {
        "n" => match format {
            None => Ok(vars.ordinal.to_string()),
            Some(spec) => {
                let width: usize = spec
                    .strip_prefix('0')
                    .unwrap_or(spec)
                    .parse()
                    .map_err(|_| template_error(template, format!("bad width '{}'", spec)))?;
                Ok(format!("{:0width$}", vars.ordinal, width = width))
            }
        },
        "name" => vars
            .name
            .map(str::to_string)
            .ok_or_else(|| template_error(template, "{name} is only available in descriptions")),
        "parent" => vars
            .parent
            .map(str::to_string)
            .ok_or_else(|| template_error(template, "{parent} used on a root level")),
        "lineage" => {
            if vars.lineage.is_empty() {
                return Err(template_error(template, "{lineage} used with no lineage ancestors"));
            }
            Ok(vars.lineage.join("-"))
        }
        other => Err(template_error(template, format!("unknown variable '{}'", other))),
    }
}
