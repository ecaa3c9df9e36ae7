use crate::config::{CanonicalSection, Config, Sections, Table};

use super::MiddlewareError;

/// Merges a middleware fragment into a flat configuration.
///
/// Each canonical section is created in `base` if missing. Keys present in
/// both are concatenated (base values first, no deduplication); new keys are
/// inserted. Sections outside the canonical set are ignored. Merging the
/// same fragment twice duplicates its entries.
pub fn merge(mut base: Sections, mut fragment: Sections) -> Sections {
    for canonical in CanonicalSection::ALL {
        let target = base.get_or_default(canonical.name());
        let Some(section) = fragment.remove(canonical.name()) else {
            continue;
        };

        for (key, values) in section {
            match target.get_mut(&key) {
                Some(existing) => existing.extend(values),
                None => {
                    target.insert(key, values);
                }
            }
        }
    }
    base
}

/// Merges a fragment into a whole configuration.
///
/// A flat configuration takes the fragment directly and `target` must be
/// `None`. A split one takes it into the sub-configuration named by
/// `target`, which is created at the end if missing. A configuration with
/// no entries at all adopts whichever shape `target` asks for.
pub fn merge_into(
    config: Config,
    target: Option<&str>,
    fragment: Sections,
) -> Result<Config, MiddlewareError> {
    match (config, target) {
        (Config::Flat(base), None) => Ok(Config::Flat(merge(base, fragment))),
        (Config::Split(mut configs), Some(name)) => {
            let slot = configs.get_or_default(name);
            *slot = merge(std::mem::take(slot), fragment);
            Ok(Config::Split(configs))
        }
        (config, Some(name)) if config.is_blank() => {
            let mut configs = Table::new();
            configs.insert(name, merge(Sections::new(), fragment));
            Ok(Config::Split(configs))
        }
        (config, None) if config.is_blank() => Ok(Config::Flat(merge(Sections::new(), fragment))),
        (Config::Flat(_), Some(name)) => Err(MiddlewareError::TargetOnFlat(name.to_string())),
        (Config::Split(configs), None) => Err(MiddlewareError::TargetRequired(
            configs.keys().collect::<Vec<_>>().join(", "),
        )),
    }
}
