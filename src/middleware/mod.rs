//! Merging middleware fragments into an existing configuration.

mod definition;
mod error;
mod merge;
mod registry;
mod resolver;
mod substitute;

pub use definition::{
    Declarations, MiddlewareDefinition, MiddlewareVersion, Variant, VariableDecl, VariableKind,
    VariantSelector,
};
pub use error::MiddlewareError;
pub use merge::{merge, merge_into};
pub use registry::{load_definition, MiddlewareRegistry};
pub use resolver::{normalize_path, DefaultResolver, VariableResolver};
pub use substitute::{substitute, substitute_value};

use std::collections::BTreeMap;

use log::{debug, warn};
use serde_json::Value;

use crate::codec::{decode, encode};
use crate::config::{Config, ConfigError, Sections};

/// Resolved variable values, by name.
pub type Variables = BTreeMap<String, String>;

/// Selects a variant, substitutes `variables` into its fragment, and merges
/// the result into `existing` flat text.
///
/// `existing` may be absent, in which case the fragment is merged into the
/// three empty canonical sections. A split `existing` needs a target; use
/// [`MiddlewareMerge::target`] for that.
pub fn apply_middleware(
    definition: &MiddlewareDefinition,
    selector: &VariantSelector,
    variables: &Variables,
    existing: Option<&str>,
) -> Result<String, MiddlewareError> {
    let (version, variant) = definition.select(selector)?;
    debug!(
        "applying {} {} variant {}",
        definition.name, version.version, variant.name
    );
    apply_variant(variant, variables, existing, None)
}

/// Substitutes, merges and encodes one already-selected variant.
///
/// `target` names the sub-configuration of a split `existing` to merge into.
pub fn apply_variant(
    variant: &Variant,
    variables: &Variables,
    existing: Option<&str>,
    target: Option<&str>,
) -> Result<String, MiddlewareError> {
    let fragment = fragment_sections(variant, variables)?;
    let base = existing_config(existing)?;
    Ok(encode(&merge_into(base, target, fragment)?))
}

fn fragment_sections(variant: &Variant, variables: &Variables) -> Result<Sections, MiddlewareError> {
    if variant.config.is_empty() {
        return Ok(Sections::new());
    }

    let substituted = substitute(&Value::Object(variant.config.clone()), variables);
    let config = Config::from_value(&substituted).map_err(MiddlewareError::InvalidFragment)?;
    fragment_from_config(config, &variant.name)
}

/// Unwraps a fragment, which must be flat.
///
/// `origin` names the fragment in the error.
pub fn fragment_from_config(config: Config, origin: &str) -> Result<Sections, MiddlewareError> {
    match config {
        Config::Flat(sections) => Ok(sections),
        Config::Split(configs) if configs.is_empty() => Ok(Sections::new()),
        Config::Split(_) => Err(MiddlewareError::InvalidFragment(ConfigError::shape(
            origin,
            "fragment has no ProjectFiles, Groups or Others section",
        ))),
    }
}

fn existing_config(existing: Option<&str>) -> Result<Config, MiddlewareError> {
    let Some(text) = existing else {
        return Ok(Config::empty_flat());
    };

    let decoded = decode(text);
    if decoded.is_empty() && !text.trim().is_empty() {
        warn!("existing configuration has no section headers; merging into an empty configuration");
    }
    Config::from_decoded(&decoded).map_err(MiddlewareError::InvalidExisting)
}

/// Builder for a single middleware merge.
///
/// ```no_run
/// use ext_settings::middleware::{DefaultResolver, MiddlewareMerge, MiddlewareRegistry};
///
/// let registry = MiddlewareRegistry::load_dir("middlewares")?;
/// let text = MiddlewareMerge::new(registry.get("FreeRTOS")?)
///     .variant("CM4F")
///     .existing("[Groups]\nLib=main.c;\n")
///     .apply(&mut DefaultResolver::new().with_override("heap", "heap_4"))?;
/// std::fs::write(".extSettings", text).ok();
/// # Ok::<(), ext_settings::middleware::MiddlewareError>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .apply() is called"]
pub struct MiddlewareMerge<'a> {
    definition: &'a MiddlewareDefinition,
    version: Option<String>,
    variant: String,
    existing: Option<String>,
    target: Option<String>,
}

impl<'a> MiddlewareMerge<'a> {
    pub fn new(definition: &'a MiddlewareDefinition) -> Self {
        Self {
            definition,
            version: None,
            variant: String::new(),
            existing: None,
            target: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn selector(mut self, selector: VariantSelector) -> Self {
        self.version = selector.version;
        self.variant = selector.variant;
        self
    }

    /// Flat text of the configuration to merge into.
    pub fn existing(mut self, text: impl Into<String>) -> Self {
        self.existing = Some(text.into());
        self
    }

    /// Sub-configuration of a split configuration to merge into, created if
    /// missing.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Selects the variant, asks `resolver` for its variables, and merges.
    ///
    /// Selection happens before resolution so an unknown variant never
    /// triggers a prompt.
    pub fn apply(self, resolver: &mut dyn VariableResolver) -> Result<String, MiddlewareError> {
        let selector = VariantSelector {
            version: self.version,
            variant: self.variant,
        };
        let (version, variant) = self.definition.select(&selector)?;
        let variables = resolver.resolve(&variant.variables)?;
        debug!(
            "applying {} {} variant {} with {} variables",
            self.definition.name,
            version.version,
            variant.name,
            variables.len()
        );
        apply_variant(
            variant,
            &variables,
            self.existing.as_deref(),
            self.target.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition() -> MiddlewareDefinition {
        serde_json::from_value(json!({
            "name": "FreeRTOS",
            "versions": [{
                "version": "10.4.6",
                "variants": [{
                    "name": "CM4F",
                    "config": {
                        "ProjectFiles": {"HeaderPath": ["{root}/include"]},
                        "Groups": {"Middlewares/FreeRTOS": ["{root}/tasks.c", "{root}/portable/MemMang/{heap}.c"]},
                        "Others": {"Define": ["USE_FREERTOS"]}
                    },
                    "variables": {
                        "root": {"type": "path", "default": "./Middlewares/FreeRTOS"},
                        "heap": {"type": "choice", "choices": ["heap_1", "heap_4"], "default": "heap_4"}
                    }
                }, {
                    "name": "Empty"
                }, {
                    "name": "Split",
                    "config": {"Cortex_M4": {"Groups": {"X": ["x.c"]}}}
                }]
            }]
        }))
        .unwrap()
    }

    fn variables() -> Variables {
        [("root", "Middlewares/FreeRTOS"), ("heap", "heap_4")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_into_existing() {
        let existing = "[ProjectFiles]\nHeaderPath=../Inc;\n\n[Groups]\nLib=main.c;\n\n[Others]\nDefine=USE_HAL_DRIVER;\n\n";
        let out = apply_middleware(
            &definition(),
            &VariantSelector::new("CM4F"),
            &variables(),
            Some(existing),
        )
        .unwrap();

        assert_eq!(
            out,
            "[ProjectFiles]\n\
             HeaderPath=../Inc;Middlewares/FreeRTOS/include;\n\
             \n\
             [Groups]\n\
             Lib=main.c;\n\
             Middlewares/FreeRTOS=Middlewares/FreeRTOS/tasks.c;Middlewares/FreeRTOS/portable/MemMang/heap_4.c;\n\
             \n\
             [Others]\n\
             Define=USE_HAL_DRIVER;USE_FREERTOS;\n\
             \n"
        );
    }

    #[test]
    fn test_empty_base_yields_fragment() {
        let out = apply_middleware(&definition(), &VariantSelector::new("cm4f"), &variables(), None)
            .unwrap();

        let Config::Flat(sections) = crate::codec::decode_config(&out).unwrap() else {
            panic!("expected a flat configuration");
        };
        assert_eq!(
            sections.keys().collect::<Vec<_>>(),
            vec!["ProjectFiles", "Groups", "Others"]
        );
        assert_eq!(
            sections.get("Others").unwrap().get("Define").unwrap(),
            &vec!["USE_FREERTOS".to_string()]
        );
    }

    #[test]
    fn test_non_canonical_existing_sections_are_kept() {
        let def: MiddlewareDefinition = serde_json::from_value(json!({
            "name": "M",
            "versions": [{"version": "1", "variants": [{
                "name": "V",
                "config": {"Others": {"Define": ["USE_M"]}}
            }]}]
        }))
        .unwrap();

        let out = apply_middleware(
            &def,
            &VariantSelector::new("V"),
            &Variables::new(),
            Some("[Custom]\nKey=keep_me;\n\n"),
        )
        .unwrap();
        assert_eq!(
            out,
            "[Custom]\nKey=keep_me\n\n[ProjectFiles]\n\n[Groups]\n\n[Others]\nDefine=USE_M;\n\n"
        );
    }

    #[test]
    fn test_split_existing_requires_target() {
        let existing = "[Cortex_M4:Groups]\nLib=main.c;\n";
        let result = apply_middleware(
            &definition(),
            &VariantSelector::new("CM4F"),
            &variables(),
            Some(existing),
        );
        assert!(matches!(result, Err(MiddlewareError::TargetRequired(ref n)) if n == "Cortex_M4"));
    }

    #[test]
    fn test_split_existing_merges_into_target() {
        let def = definition();
        let existing = "[Cortex_M4:Groups]\nLib=main.c;\n\n[Cortex_M7:Others]\nDefine=CORE_CM7;\n\n";
        let out = MiddlewareMerge::new(&def)
            .variant("CM4F")
            .existing(existing)
            .target("Cortex_M4")
            .apply(&mut DefaultResolver::new())
            .unwrap();

        let config = crate::codec::decode_config(&out).unwrap();
        let Config::Split(configs) = config else {
            panic!("expected a split configuration");
        };
        assert_eq!(configs.keys().collect::<Vec<_>>(), vec!["Cortex_M4", "Cortex_M7"]);
        let m4 = configs.get("Cortex_M4").unwrap();
        assert_eq!(
            m4.get("Groups").unwrap().get("Lib"),
            Some(&vec!["main.c".to_string()])
        );
        assert_eq!(
            m4.get("Others").unwrap().get("Define"),
            Some(&vec!["USE_FREERTOS".to_string()])
        );
        assert_eq!(
            configs.get("Cortex_M7").unwrap().get("Others").unwrap().get("Define"),
            Some(&vec!["CORE_CM7".to_string()])
        );
    }

    #[test]
    fn test_headerless_existing_is_empty_base() {
        let out = apply_middleware(
            &definition(),
            &VariantSelector::new("CM4F"),
            &variables(),
            Some("HeaderPath=orphan;\n"),
        )
        .unwrap();
        let fresh =
            apply_middleware(&definition(), &VariantSelector::new("CM4F"), &variables(), None)
                .unwrap();
        assert_eq!(out, fresh);
    }

    #[test]
    fn test_mixed_existing_is_rejected() {
        let existing = "[Groups]\nLib=main.c;\n\n[Cortex_M4:Groups]\nLib=m4.c;\n";
        let result = apply_middleware(
            &definition(),
            &VariantSelector::new("CM4F"),
            &variables(),
            Some(existing),
        );
        assert!(matches!(result, Err(MiddlewareError::InvalidExisting(_))));
    }

    #[test]
    fn test_variant_without_config_adds_empty_sections() {
        let out = apply_middleware(&definition(), &VariantSelector::new("Empty"), &variables(), None)
            .unwrap();
        assert_eq!(out, "[ProjectFiles]\n\n[Groups]\n\n[Others]\n\n");
    }

    #[test]
    fn test_split_fragment_is_rejected() {
        let result =
            apply_middleware(&definition(), &VariantSelector::new("Split"), &variables(), None);
        assert!(matches!(result, Err(MiddlewareError::InvalidFragment(_))));
    }

    #[test]
    fn test_builder_resolves_variables() {
        let def = definition();
        let out = MiddlewareMerge::new(&def)
            .version("10.4.6")
            .variant("CM4F")
            .apply(&mut DefaultResolver::new().with_override("heap", "heap_1"))
            .unwrap();
        assert!(out.contains("Middlewares/FreeRTOS/portable/MemMang/heap_1.c;"));
        assert!(out.contains("HeaderPath=Middlewares/FreeRTOS/include;"));
    }

    #[test]
    fn test_builder_propagates_cancellation() {
        let def = definition();
        let mut cancel = |_: &Declarations| -> Result<Variables, MiddlewareError> {
            Err(MiddlewareError::SelectionCancelled)
        };
        let result = MiddlewareMerge::new(&def).variant("CM4F").apply(&mut cancel);
        assert!(matches!(result, Err(MiddlewareError::SelectionCancelled)));
    }

    #[test]
    fn test_builder_unknown_variant_skips_resolver() {
        let def = definition();
        let mut called = false;
        let mut resolver = |_: &Declarations| -> Result<Variables, MiddlewareError> {
            called = true;
            Ok(Variables::new())
        };
        let result = MiddlewareMerge::new(&def).variant("CM33").apply(&mut resolver);
        assert!(matches!(result, Err(MiddlewareError::VariantNotFound { .. })));
        assert!(!called);
    }
}
