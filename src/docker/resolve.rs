//! Typed network address resolution for command templates
//!
//! Config `command` entries may contain `{{identifier}}` placeholders.
//! Instead of rewriting raw strings against ad-hoc lookups, each
//! placeholder becomes an [`AddrRef`] resolved through the
//! [`AddrResolver`] seam: the bound machine, a named machine, or a
//! sibling container on the bound machine. A target that resolves to
//! nothing falls back to loopback — the one soft recovery in the whole
//! tool, kept so commands can reference not-yet-reachable targets.

use regex::Regex;

/// Fallback address for unresolvable placeholder targets.
pub const LOOPBACK: &str = "127.0.0.1";

/// What a placeholder points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrRef<'a> {
    /// `{{machine}}`: the machine the container is bound to.
    BoundMachine,
    /// `{{name}}`: a machine, or failing that a sibling container.
    Named(&'a str),
}

impl<'a> AddrRef<'a> {
    pub fn parse(identifier: &'a str) -> Self {
        if identifier == "machine" {
            AddrRef::BoundMachine
        } else {
            AddrRef::Named(identifier)
        }
    }
}

/// Address lookups backing placeholder resolution. The production
/// implementation shells out to docker/docker-machine; tests substitute
/// a fixed table.
pub trait AddrResolver {
    /// IP of the machine the container is bound to.
    fn bound_machine_ip(&self) -> Option<String>;
    /// IP of the machine called `name`.
    fn machine_ip(&self, name: &str) -> Option<String>;
    /// IP of the container called `name` on the bound machine.
    fn sibling_container_ip(&self, name: &str) -> Option<String>;
}

/// Resolve one reference to an address, falling back to loopback.
pub fn resolve_addr(resolver: &dyn AddrResolver, addr: AddrRef<'_>) -> String {
    let resolved = match addr {
        AddrRef::BoundMachine => resolver.bound_machine_ip(),
        AddrRef::Named(name) => resolver
            .machine_ip(name)
            .or_else(|| resolver.sibling_container_ip(name)),
    };
    resolved.unwrap_or_else(|| LOOPBACK.to_string())
}

/// Substitute every `{{identifier}}` in a command-argument template.
pub fn expand_placeholders(template: &str, resolver: &dyn AddrResolver) -> String {
    let pattern = Regex::new(r"\{\{([\w\-]+)\}\}").unwrap();
    pattern
        .replace_all(template, |caps: &regex::Captures<'_>| {
            resolve_addr(resolver, AddrRef::parse(caps.get(1).unwrap().as_str()))
        })
        .into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed-table resolver for tests.
    #[derive(Default)]
    pub struct StubResolver {
        pub bound: Option<String>,
        pub machines: HashMap<String, String>,
        pub containers: HashMap<String, String>,
    }

    impl AddrResolver for StubResolver {
        fn bound_machine_ip(&self) -> Option<String> {
            self.bound.clone()
        }
        fn machine_ip(&self, name: &str) -> Option<String> {
            self.machines.get(name).cloned()
        }
        fn sibling_container_ip(&self, name: &str) -> Option<String> {
            self.containers.get(name).cloned()
        }
    }

    #[test]
    fn test_machine_placeholder_uses_bound_ip() {
        let resolver = StubResolver {
            bound: Some("10.0.0.5".into()),
            ..Default::default()
        };
        assert_eq!(expand_placeholders("{{machine}}", &resolver), "10.0.0.5");
        assert_eq!(
            expand_placeholders("http://{{machine}}:8500", &resolver),
            "http://10.0.0.5:8500"
        );
    }

    #[test]
    fn test_named_placeholder_prefers_machine_over_container() {
        let mut resolver = StubResolver::default();
        resolver.machines.insert("db".into(), "10.0.0.7".into());
        resolver.containers.insert("db".into(), "172.17.0.3".into());
        assert_eq!(expand_placeholders("{{db}}", &resolver), "10.0.0.7");
    }

    #[test]
    fn test_named_placeholder_falls_through_to_sibling_container() {
        let mut resolver = StubResolver::default();
        resolver.containers.insert("cache".into(), "172.17.0.4".into());
        assert_eq!(expand_placeholders("{{cache}}", &resolver), "172.17.0.4");
    }

    #[test]
    fn test_unresolvable_placeholder_falls_back_to_loopback() {
        let resolver = StubResolver::default();
        assert_eq!(expand_placeholders("{{missing}}", &resolver), "127.0.0.1");
        assert_eq!(expand_placeholders("{{machine}}", &resolver), "127.0.0.1");
    }

    #[test]
    fn test_text_without_placeholders_passes_through() {
        let resolver = StubResolver::default();
        assert_eq!(
            expand_placeholders("--listen=0.0.0.0", &resolver),
            "--listen=0.0.0.0"
        );
    }
}
