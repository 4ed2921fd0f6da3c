use std::collections::BTreeMap;

use quarry_core::data::DataType;
use quarry_logging::warn;

use crate::{
    descriptor::{DefinitionWarning, ParamBinding, PlaceholderParam},
    err::{check, Result},
    method::{MethodDefinition, ParamTag},
    placeholder::{PlaceholderDefaults, Template},
};

/// The analyzed parameters of a method
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamsAnalysis {
    pub binding: ParamBinding,
    pub first_result: Option<usize>,
    pub max_results: Option<usize>,
    pub placeholders: BTreeMap<String, PlaceholderParam>,
}

/// State collected while walking the parameters
#[derive(Default)]
struct ParamsContext {
    /// Fixed by the first ordinary parameter
    ordinal: Option<bool>,
    params: Vec<usize>,
    named: BTreeMap<String, usize>,
    placeholders: BTreeMap<String, PlaceholderParam>,
    first_result: Option<usize>,
    max_results: Option<usize>,
}

pub(crate) fn analyze_parameters(
    def: &MethodDefinition,
    template: &Template,
    defaults: &PlaceholderDefaults,
    warnings: &mut Vec<DefinitionWarning>,
) -> Result<ParamsAnalysis> {
    let id = &def.id;
    let mut ctx = ParamsContext::default();

    for (pos, param) in def.params.iter().enumerate() {
        match &param.tag {
            None => bind_param(def, None, pos, &mut ctx, warnings)?,
            Some(ParamTag::Named(name)) => bind_param(def, Some(name), pos, &mut ctx, warnings)?,
            Some(ParamTag::FirstResult) => {
                check!(
                    id,
                    ctx.first_result.is_none(),
                    "Duplicate first result parameter definition"
                );
                check!(
                    id,
                    param.r#type.is_integer(),
                    "Integer must be used as first result parameter"
                );
                ctx.first_result = Some(pos);
            }
            Some(ParamTag::MaxResults) => {
                check!(
                    id,
                    ctx.max_results.is_none(),
                    "Duplicate max results parameter definition"
                );
                check!(
                    id,
                    param.r#type.is_integer(),
                    "Integer must be used as max results parameter"
                );
                ctx.max_results = Some(pos);
            }
            Some(ParamTag::Placeholder(name)) => {
                check!(
                    id,
                    template.has_placeholders(),
                    "Placeholder parameter used while query did not contain placeholders"
                );
                bind_placeholder(def, name, pos, &mut ctx, defaults.get(name), warnings)?;
            }
        }
    }

    if template.has_placeholders() {
        if let Err(err) = template.validate_bindings(ctx.placeholders.keys()) {
            return Err(crate::FinderError::definition(id, err.to_string()));
        }
    }

    let binding = match ctx.ordinal {
        Some(false) => ParamBinding::Named(ctx.named),
        // no-arg methods bind an empty ordinal list
        _ => ParamBinding::Ordinal(ctx.params),
    };

    Ok(ParamsAnalysis {
        binding,
        first_result: ctx.first_result,
        max_results: ctx.max_results,
        placeholders: ctx.placeholders,
    })
}

fn bind_param(
    def: &MethodDefinition,
    name: Option<&String>,
    pos: usize,
    ctx: &mut ParamsContext,
    warnings: &mut Vec<DefinitionWarning>,
) -> Result<()> {
    let ordinal = *ctx.ordinal.get_or_insert(name.is_none());

    if ordinal {
        ctx.params.push(pos);

        if let Some(name) = name {
            warn!(
                "Named parameter {} registered as ordinal. Either tag all parameters or remove the tags in finder method {}",
                name, def.id
            );
            warnings.push(DefinitionWarning::NamedParamAsOrdinal {
                name: name.clone(),
                position: pos,
            });
        }

        return Ok(());
    }

    let name = match name {
        Some(name) => name,
        None => {
            return Err(crate::FinderError::definition(
                &def.id,
                format!("Named parameter not tagged at position {}", pos),
            ))
        }
    };

    check!(
        &def.id,
        !ctx.named.contains_key(name),
        "Duplicate parameter {} declaration at position {}",
        name,
        pos
    );
    ctx.named.insert(name.clone(), pos);

    Ok(())
}

fn bind_placeholder(
    def: &MethodDefinition,
    name: &str,
    pos: usize,
    ctx: &mut ParamsContext,
    defaults: &[String],
    warnings: &mut Vec<DefinitionWarning>,
) -> Result<()> {
    let id = &def.id;
    let r#type = &def.params[pos].r#type;

    check!(
        id,
        !ctx.placeholders.contains_key(name),
        "Duplicate placeholder parameter {} declaration at position {}",
        name,
        pos
    );

    match r#type {
        DataType::Enum(_) => {
            check!(
                id,
                defaults.is_empty(),
                "Placeholder param '{}' at position {} is enum. Explicit defaults definition is not required",
                name,
                pos
            );
        }
        DataType::Utf8String(_) => {
            if defaults.is_empty() {
                warn!(
                    "No default values registered for placeholder parameter {}. Either use an enum or define placeholder values in finder method {}. Without explicit checks the query is vulnerable to injection.",
                    name, id
                );
                warnings.push(DefinitionWarning::UnguardedPlaceholder {
                    name: name.to_string(),
                });
            }
        }
        _ => {
            return Err(crate::FinderError::definition(
                id,
                format!(
                    "Unsupported placeholder '{}' type at position {}. Only string and enum could be used",
                    name, pos
                ),
            ))
        }
    }

    ctx.placeholders.insert(
        name.to_string(),
        PlaceholderParam {
            position: pos,
            r#type: r#type.clone(),
        },
    );

    Ok(())
}
