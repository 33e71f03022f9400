//! jq pre-selection of input documents (via jaq).
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid jq expression:\n{0}")]
    Load(String),
    #[error("jq evaluation failed: {0}")]
    Eval(String),
    #[error("jq produced non-JSON output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Run `filter_src` against `input`, returning every produced document.
pub fn select(filter_src: &str, input: &Value) -> Result<Vec<Value>, FilterError> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| FilterError::Load(describe_load_errors(errs)))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| FilterError::Load(describe_undefined(errs)))?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut selected = Vec::new();
    for item in outputs {
        let v = item.map_err(|e| FilterError::Eval(format!("{e:?}")))?;
        // Val renders as JSON text
        selected.push(serde_json::from_str::<Value>(&v.to_string())?);
    }
    tracing::debug!(filter = filter_src, documents = selected.len(), "jq selection");
    Ok(selected)
}

fn describe_load_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> String {
    errs.into_iter()
        .map(|(file, err)| format!("parse error: {err:?} in `{}`", file.code))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_undefined(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> String {
    errs.into_iter()
        .flat_map(|(file, list)| {
            list.into_iter()
                .map(move |(name, undef)| format!("undefined `{name}`: {undef:?} in `{}`", file.code))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_subdocuments() {
        let input = json!({"data": {"items": [{"a": 1}, {"b": 2}]}});
        let out = select(".data.items[]", &input).unwrap();
        assert_eq!(out, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn bad_filter_is_reported() {
        assert!(matches!(select(".[", &json!(null)), Err(FilterError::Load(_))));
        assert!(matches!(select("nosuchfn", &json!(null)), Err(FilterError::Load(_))));
    }
}
