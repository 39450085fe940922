use std::collections::HashSet;

use tracing::debug;

use super::{InterfaceRegistry, RegistryError, RegistryResult};

/// Highest numeric suffix tried before giving up
pub const MAX_NAME_SUFFIX: u32 = 100_000;

/// Proposes unused interface names of the form `<prefix><n>`.
///
/// Nothing is reserved: two allocations before the first name is added to
/// the registry return the same candidate.
#[derive(Debug, Clone, Copy)]
pub struct NameAllocator<'a> {
    registry: &'a InterfaceRegistry,
    bound: u32,
}

impl<'a> NameAllocator<'a> {
    pub fn new(registry: &'a InterfaceRegistry) -> Self {
        Self {
            registry,
            bound: MAX_NAME_SUFFIX,
        }
    }

    pub fn with_bound(mut self, bound: u32) -> Self {
        self.bound = bound;
        self
    }

    pub fn free_name(&self, prefix: &str) -> RegistryResult<String> {
        let mut names = self.free_names(prefix, 1)?;
        names.pop().ok_or_else(|| RegistryError::NamesExhausted {
            prefix: prefix.to_string(),
            requested: 1,
            found: 0,
            bound: self.bound,
        })
    }

    /// The `count` lowest free names, ascending
    pub fn free_names(&self, prefix: &str, count: usize) -> RegistryResult<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.bound as usize + 1;
        if count > candidates {
            return Err(RegistryError::NamesExhausted {
                prefix: prefix.to_string(),
                requested: count,
                found: 0,
                bound: self.bound,
            });
        }
        let mut result = Vec::with_capacity(count);

        // same matching rule as `InterfaceRegistry::by_name`
        let taken: HashSet<&str> = self.registry.names().into_iter().collect();

        for suffix in 0..=self.bound {
            let candidate = format!("{}{}", prefix, suffix);
            if taken.contains(candidate.as_str()) {
                continue;
            }

            result.push(candidate);
            if result.len() == count {
                debug!("Allocated {:?} for prefix {}", result, prefix);
                return Ok(result);
            }
        }

        Err(RegistryError::NamesExhausted {
            prefix: prefix.to_string(),
            requested: count,
            found: result.len(),
            bound: self.bound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HardwareDescriptor, Interface, InterfaceType};

    fn registry_of(names: &[&str]) -> InterfaceRegistry {
        names
            .iter()
            .map(|name| Interface::named(*name, InterfaceType::Ethernet))
            .collect()
    }

    #[test]
    fn test_free_name_fills_gap() {
        let registry = registry_of(&["eth0", "eth1", "eth3"]);
        assert_eq!(registry.free_name("eth").unwrap(), "eth2");
    }

    #[test]
    fn test_free_names_ascending() {
        let registry = registry_of(&["eth0", "eth1", "eth3"]);
        assert_eq!(registry.free_names("eth", 2).unwrap(), vec!["eth2", "eth4"]);
    }

    #[test]
    fn test_free_name_on_empty_registry() {
        let registry = InterfaceRegistry::default();
        assert_eq!(registry.free_name("bond").unwrap(), "bond0");
        assert!(registry.free_names("bond", 0).unwrap().is_empty());
    }

    #[test]
    fn test_free_name_respects_detected_names() {
        let registry = InterfaceRegistry::new(vec![Interface::from_hardware(
            HardwareDescriptor::new(None, Some("br0".to_string())),
            InterfaceType::Bridge,
        )]);
        assert_eq!(registry.free_name("br").unwrap(), "br1");
    }

    #[test]
    fn test_free_name_is_not_reserved() {
        let registry = registry_of(&["eth0"]);
        assert_eq!(registry.free_name("eth").unwrap(), registry.free_name("eth").unwrap());
    }

    #[test]
    fn test_exhaustion() {
        let names: Vec<String> = (0..=5).map(|i| format!("dummy{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let registry = registry_of(&refs);

        let err = registry.name_allocator().with_bound(5).free_name("dummy").unwrap_err();
        assert_eq!(
            err,
            RegistryError::NamesExhausted {
                prefix: "dummy".to_string(),
                requested: 1,
                found: 0,
                bound: 5,
            }
        );
    }

    #[test]
    fn test_unsatisfiable_count_is_an_error() {
        let registry = InterfaceRegistry::default();
        let err = registry.free_names("eth", usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NamesExhausted { found: 0, requested: usize::MAX, bound: MAX_NAME_SUFFIX, .. }
        ));

        let err = registry.name_allocator().with_bound(2).free_names("eth", 4).unwrap_err();
        assert!(matches!(err, RegistryError::NamesExhausted { found: 0, requested: 4, .. }));
        assert_eq!(registry.name_allocator().with_bound(2).free_names("eth", 3).unwrap().len(), 3);
    }

    #[test]
    fn test_default_bound_is_last_suffix_tried() {
        let registry = InterfaceRegistry::default();
        assert_eq!(NameAllocator::new(&registry).bound, MAX_NAME_SUFFIX);
        assert_eq!(MAX_NAME_SUFFIX, 100_000);

        let mut registry = registry_of(&[]);
        registry.extend((0..MAX_NAME_SUFFIX).map(|i| Interface::named(format!("eth{}", i), InterfaceType::Ethernet)));
        assert_eq!(registry.free_name("eth").unwrap(), "eth100000");

        registry.push(Interface::named("eth100000", InterfaceType::Ethernet));
        assert!(matches!(
            registry.free_name("eth"),
            Err(RegistryError::NamesExhausted { bound: MAX_NAME_SUFFIX, .. })
        ));
    }

    #[test]
    fn test_partial_exhaustion_is_an_error() {
        let registry = registry_of(&["tap0", "tap2"]);
        let err = registry.name_allocator().with_bound(3).free_names("tap", 3).unwrap_err();
        assert!(matches!(err, RegistryError::NamesExhausted { found: 2, requested: 3, .. }));
    }
}
