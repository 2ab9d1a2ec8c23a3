use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{GlobalStore, Result, StateValue};

pub(crate) type ComputeFn = Rc<dyn Fn(&GlobalStore) -> Result<StateValue>>;

pub(crate) type KeyList = SmallVec<[String; 4]>;

pub(crate) struct DerivedDef {
    pub compute: ComputeFn,
    pub dependencies: KeyList,
}

/// source key -> derived keys that recompute when it changes.
///
/// Edges are only ever added; derived states cannot be deregistered.
#[derive(Default)]
pub(crate) struct DependencyGraph {
    dependents: HashMap<String, KeyList>,
    derived: HashMap<String, DerivedDef>,
}

impl DependencyGraph {
    pub fn is_derived(&self, key: &str) -> bool {
        self.derived.contains_key(key)
    }

    pub fn add_derived(&mut self, key: &str, def: DerivedDef) {
        for dep in &def.dependencies {
            let list = self.dependents.entry(dep.clone()).or_default();
            if !list.iter().any(|k| k == key) {
                list.push(key.to_string());
            }
        }
        self.derived.insert(key.to_string(), def);
    }

    pub fn dependents_of(&self, key: &str) -> KeyList {
        self.dependents.get(key).cloned().unwrap_or_default()
    }

    pub fn compute_fn(&self, key: &str) -> Option<ComputeFn> {
        self.derived.get(key).map(|d| d.compute.clone())
    }

    pub fn dependencies_of(&self, key: &str) -> Option<&[String]> {
        self.derived.get(key).map(|d| d.dependencies.as_slice())
    }

    /// Would adding `dep -> key` for every `dep` close a loop?
    ///
    /// Walks dependents from `key`; reaching any `dep` means `key` already
    /// feeds it. Returns the offending path `key -> ... -> dep -> key`.
    pub fn find_cycle(&self, key: &str, deps: &[String]) -> Option<Vec<String>> {
        if deps.iter().any(|d| d == key) {
            return Some(vec![key.to_string(), key.to_string()]);
        }
        let targets: HashSet<&str> = deps.iter().map(String::as_str).collect();
        let mut parent: HashMap<String, String> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::from([key.to_string()]);
        let mut stack = vec![key.to_string()];

        while let Some(node) = stack.pop() {
            for next in self.dependents.get(&node).into_iter().flatten() {
                if !seen.insert(next.clone()) {
                    continue;
                }
                parent.insert(next.clone(), node.clone());
                if targets.contains(next.as_str()) {
                    let mut path = vec![next.clone()];
                    let mut cur = next.clone();
                    while let Some(p) = parent.get(&cur) {
                        path.push(p.clone());
                        cur = p.clone();
                    }
                    path.reverse();
                    path.push(key.to_string());
                    return Some(path);
                }
                stack.push(next.clone());
            }
        }
        None
    }
}
