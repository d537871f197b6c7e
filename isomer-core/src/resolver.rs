use crate::bean::{Accessor, BeanType};

pub const MUTATOR_PREFIX: &str = "set_";
pub const ACCESSOR_PREFIX: &str = "get_";
pub const BOOLEAN_ACCESSOR_PREFIX: &str = "is_";

/// Matches destination mutators to source accessors by name.
///
/// `set_<name>` is fed by `get_<name>` or `is_<name>`. Before comparing,
/// the first known suffix found at the end of either name is stripped, so
/// `get_address_dto` can feed `set_address` and the other way round.
#[derive(Debug, Clone, Default)]
pub struct AccessorResolver {
    suffixes: Vec<String>,
}

impl AccessorResolver {
    pub fn new(suffixes: Vec<String>) -> Self {
        AccessorResolver { suffixes }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Finds the accessor feeding `mutator` on `source` or one of its
    /// ancestors, returned together with the type that declares it.
    ///
    /// Returns `None` if the mutator name is not of the form `set_<name>` or
    /// no accessor matches; whether that is fatal is up to the caller.
    pub fn resolve(
        &self,
        source: &'static BeanType,
        mutator: &str,
    ) -> Option<(&'static BeanType, &'static Accessor)> {
        let property = mutator
            .strip_prefix(MUTATOR_PREFIX)
            .filter(|property| !property.is_empty())?;

        let getter = format!("{ACCESSOR_PREFIX}{property}");
        let boolean_getter = format!("{BOOLEAN_ACCESSOR_PREFIX}{property}");
        let getter = self.strip_suffix(&getter);
        let boolean_getter = self.strip_suffix(&boolean_getter);

        source.ancestry().find_map(|owner| {
            owner
                .accessors
                .iter()
                .find(|accessor| {
                    let name = self.strip_suffix(accessor.name);
                    name == getter || name == boolean_getter
                })
                .map(|accessor| (owner, accessor))
        })
    }

    /// Strips the first known suffix that `name` ends with.
    pub fn strip_suffix<'a>(&self, name: &'a str) -> &'a str {
        self.suffixes
            .iter()
            .filter(|suffix| !suffix.is_empty())
            .find_map(|suffix| name.strip_suffix(suffix.as_str()))
            .unwrap_or(name)
    }
}
