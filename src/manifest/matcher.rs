//! Finding manifests and containers inside a document.

use super::selector::Selector;
use crate::fieldpath::{Path, PathElement};
use crate::yaml::{lookup, match_field, Comparison};
use serde_yaml::Value;
use tracing::trace;

const LIST_KIND: &str = "List";
const ITEMS: &str = "items";
const CONTAINERS: [&str; 4] = ["spec", "template", "spec", "containers"];

/// Manifest is a Kubernetes object found in a document, addressed by its
/// path from the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest<'a> {
    path: Path,
    value: &'a Value,
}

impl<'a> Manifest<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}

/// Container is one entry of a manifest's pod template container list.
#[derive(Debug, Clone, PartialEq)]
pub struct Container<'a> {
    path: Path,
    value: &'a Value,
}

impl<'a> Container<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}

/// Manifests iterates over the manifest candidates of one document.
#[derive(Debug, Clone)]
pub struct Manifests<'a> {
    root: &'a Value,
    /// Entries of a `List` document, or `None` when the root is the only candidate.
    items: Option<&'a [Value]>,
    position: usize,
}

impl<'a> Iterator for Manifests<'a> {
    type Item = Manifest<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position;
        match self.items {
            Some(items) => {
                let value = items.get(position)?;
                self.position += 1;
                Some(Manifest {
                    path: Path::new()
                        .with_field(ITEMS)
                        .with(PathElement::index(position)),
                    value,
                })
            }
            None if position == 0 => {
                self.position += 1;
                Some(Manifest {
                    path: Path::new(),
                    value: self.root,
                })
            }
            None => None,
        }
    }
}

/// Enumerates the manifests in `document`.
///
/// A document whose `kind` is exactly `List` yields each element of its
/// `items` sequence in order (nothing if `items` is missing). Any other
/// document yields itself.
pub fn enumerate(document: &Value) -> Manifests<'_> {
    let is_list = document.get("kind").and_then(Value::as_str) == Some(LIST_KIND);
    let items = is_list.then(|| {
        document
            .get(ITEMS)
            .and_then(Value::as_sequence)
            .map_or(&[] as &[Value], Vec::as_slice)
    });
    Manifests {
        root: document,
        items,
        position: 0,
    }
}

/// Reports whether `manifest` has the selector's kind, namespace and name.
///
/// Checks run in that order and stop at the first mismatch. Missing fields
/// are mismatches, not errors.
pub fn matches(selector: &Selector, manifest: &Manifest<'_>) -> bool {
    let checks = [
        (Path::fields(["kind"]), selector.kind.as_str(), Comparison::IgnoreCase),
        (Path::fields(["metadata", "namespace"]), selector.namespace.as_str(), Comparison::Exact),
        (Path::fields(["metadata", "name"]), selector.name.as_str(), Comparison::Exact),
    ];
    checks.iter().all(|(path, expected, comparison)| {
        let outcome = match_field(manifest.value, path, expected, *comparison);
        trace!(manifest = %manifest.path, field = %path, ?outcome, "compared field");
        outcome.is_match()
    })
}

/// Finds the first container named by the selector in a matching manifest.
///
/// Returns `None` if the manifest does not match, the selector names no
/// container, the manifest has no pod template containers, or none of them
/// has the requested name.
pub fn find_container<'a>(selector: &Selector, manifest: &Manifest<'a>) -> Option<Container<'a>> {
    let wanted = selector.container.as_deref()?;
    if !matches(selector, manifest) {
        return None;
    }
    let containers_path = Path::fields(CONTAINERS);
    let containers = lookup(manifest.value, &containers_path)?.as_sequence()?;
    let name = Path::fields(["name"]);
    containers
        .iter()
        .enumerate()
        .find(|(_, container)| match_field(container, &name, wanted, Comparison::Exact).is_match())
        .map(|(i, value)| Container {
            path: manifest
                .path
                .join(&containers_path)
                .with(PathElement::index(i)),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    const DEPLOYMENT: &str = r#"
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  template:
    spec:
      containers:
      - name: sidecar
        image: envoy:1
      - name: app
        image: old:1.0
      - name: app
        image: duplicate:1.0
"#;

    #[test]
    fn test_enumerate_plain_document_yields_itself() {
        let doc = parse(DEPLOYMENT);
        let manifests: Vec<_> = enumerate(&doc).collect();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].value(), &doc);
        assert!(manifests[0].path().is_empty());
    }

    #[test]
    fn test_enumerate_list_yields_items_in_order() {
        let doc = parse(
            "kind: List\nitems:\n- metadata: {name: a}\n- metadata: {name: b}\n- metadata: {name: c}\n",
        );
        let names: Vec<String> = enumerate(&doc)
            .map(|m| m.value()["metadata"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let paths: Vec<String> = enumerate(&doc).map(|m| m.path().to_string()).collect();
        assert_eq!(paths, vec![".items[0]", ".items[1]", ".items[2]"]);
    }

    #[test]
    fn test_enumerate_is_restartable() {
        let doc = parse("kind: List\nitems:\n- a: 1\n- b: 2\n");
        assert_eq!(enumerate(&doc).count(), 2);
        assert_eq!(enumerate(&doc).count(), 2);
    }

    #[test]
    fn test_enumerate_list_kind_is_case_sensitive() {
        let doc = parse("kind: list\nitems:\n- a: 1\n- b: 2\n");
        let manifests: Vec<_> = enumerate(&doc).collect();
        assert_eq!(manifests.len(), 1);
        assert!(manifests[0].path().is_empty());
    }

    #[test]
    fn test_enumerate_list_without_items() {
        let doc = parse("kind: List\n");
        assert_eq!(enumerate(&doc).count(), 0);
    }

    #[test]
    fn test_enumerate_null_document() {
        let doc = Value::Null;
        let manifests: Vec<_> = enumerate(&doc).collect();
        assert_eq!(manifests.len(), 1);
        assert!(!matches(&Selector::new("prod", "Deployment", "web"), &manifests[0]));
    }

    #[test]
    fn test_matches_kind_case_insensitive() {
        let doc = parse(DEPLOYMENT);
        let manifest = enumerate(&doc).next().unwrap();
        assert!(matches(&Selector::new("prod", "deployment", "web"), &manifest));
        assert!(matches(&Selector::new("prod", "DEPLOYMENT", "web"), &manifest));
        assert!(!matches(&Selector::new("Prod", "deployment", "web"), &manifest));
        assert!(!matches(&Selector::new("prod", "deployment", "Web"), &manifest));
        assert!(!matches(&Selector::new("prod", "StatefulSet", "web"), &manifest));
    }

    #[test]
    fn test_matches_missing_fields_is_false() {
        for yaml in [
            "metadata: {name: web, namespace: prod}",
            "kind: Deployment",
            "kind: Deployment\nmetadata: {name: web}",
            "kind: Deployment\nmetadata: {namespace: prod}",
            "kind: Deployment\nmetadata: null",
            "kind: 7\nmetadata: {name: web, namespace: prod}",
        ] {
            let doc = parse(yaml);
            let manifest = enumerate(&doc).next().unwrap();
            assert!(!matches(&Selector::new("prod", "Deployment", "web"), &manifest), "{}", yaml);
        }
    }

    #[test]
    fn test_find_container_first_match() {
        let doc = parse(DEPLOYMENT);
        let manifest = enumerate(&doc).next().unwrap();
        let selector = Selector::new("prod", "Deployment", "web").with_container("app");
        let container = find_container(&selector, &manifest).unwrap();
        assert_eq!(container.path().to_string(), ".spec.template.spec.containers[1]");
        assert_eq!(container.value()["image"].as_str(), Some("old:1.0"));
    }

    #[test]
    fn test_find_container_requires_manifest_match() {
        let doc = parse(DEPLOYMENT);
        let manifest = enumerate(&doc).next().unwrap();
        let selector = Selector::new("prod", "Deployment", "missing").with_container("app");
        assert!(find_container(&selector, &manifest).is_none());
    }

    #[test]
    fn test_find_container_absent_paths() {
        let selector = Selector::new("prod", "Service", "web").with_container("app");
        for yaml in [
            "kind: Service\nmetadata: {name: web, namespace: prod}\nspec:\n  ports: []\n",
            "kind: Service\nmetadata: {name: web, namespace: prod}\nspec:\n  template:\n    spec:\n      containers: null\n",
            "kind: Service\nmetadata: {name: web, namespace: prod}\nspec:\n  template:\n    spec:\n      containers:\n      - image: x\n",
        ] {
            let doc = parse(yaml);
            let manifest = enumerate(&doc).next().unwrap();
            assert!(find_container(&selector, &manifest).is_none(), "{}", yaml);
        }
    }

    #[test]
    fn test_find_container_without_container_selector() {
        let doc = parse(DEPLOYMENT);
        let manifest = enumerate(&doc).next().unwrap();
        assert!(find_container(&Selector::new("prod", "Deployment", "web"), &manifest).is_none());
    }
}
