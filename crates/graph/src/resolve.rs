// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::{HashMap, HashSet};

use crate::component::{strip_version_suffix, Component};
use crate::dag::Dag;
use crate::error::GraphError;
use crate::reason::Reason;

/// A component scheduled to replace another. The replaced component is
/// uninstalled first and the undo log records it under the
/// replacement's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub replaced: String,
    pub replacement: String,
}

/// Resolve the install set from a starting list of user-checked
/// component names: pulls in every `dependencies` entry transitively,
/// then repeatedly adds components whose `auto_depend` list is fully
/// satisfied, until nothing changes.
pub fn resolve_install_set(
    components: &[Component],
    user_checked: &[String],
) -> Result<HashMap<String, Reason>, GraphError> {
    let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut set: HashMap<String, Reason> = HashMap::new();

    for name in user_checked {
        let mut visiting = Vec::new();
        resolve_dependencies(name, &by_name, &mut set, &mut visiting, Reason::UserSelected)?;
    }

    let max_rounds = components.len() + 1;
    let mut round = 0;
    loop {
        let mut added_any = false;
        for component in components {
            if set.contains_key(&component.name) || component.auto_depend.is_empty() {
                continue;
            }
            if component.auto_depend.iter().all(|dep| set.contains_key(dep)) {
                let mut visiting = Vec::new();
                resolve_dependencies(&component.name, &by_name, &mut set, &mut visiting, Reason::AutoDependency)?;
                added_any = true;
            }
        }
        if !added_any {
            break;
        }
        round += 1;
        if round > max_rounds {
            return Err(GraphError::Recursion("auto_depend resolution did not converge".to_string()));
        }
    }

    Ok(set)
}

fn resolve_dependencies(
    name: &str,
    by_name: &HashMap<&str, &Component>,
    set: &mut HashMap<String, Reason>,
    visiting: &mut Vec<String>,
    reason: Reason,
) -> Result<(), GraphError> {
    if set.contains_key(name) {
        return Ok(());
    }
    if let Some(a) = visiting.iter().find(|n| n.as_str() == name) {
        return Err(GraphError::DependencyCycle {
            a: a.clone(),
            b: name.to_string(),
        });
    }

    let Some(component) = by_name.get(name) else {
        let wanted = visiting.last().cloned().unwrap_or_else(|| name.to_string());
        return Err(GraphError::UnresolvedDependency {
            wanted,
            dependency: name.to_string(),
        });
    };

    visiting.push(name.to_string());
    for dep in &component.dependencies {
        let dep_name = strip_version_suffix(dep).to_string();
        resolve_dependencies(&dep_name, by_name, set, visiting, Reason::DependencyOf(name.to_string()))?;
    }
    visiting.pop();

    set.insert(name.to_string(), reason);
    Ok(())
}

/// Components in the install set that list `replaces` push the named
/// components onto the uninstall path first.
pub fn replacements_for(install_set: &HashMap<String, Reason>, components: &[Component]) -> Vec<Replacement> {
    let mut out = Vec::new();
    for component in components {
        if !install_set.contains_key(&component.name) {
            continue;
        }
        for replaced in &component.replaces {
            out.push(Replacement {
                replaced: replaced.clone(),
                replacement: component.name.clone(),
            });
        }
    }
    out
}

fn build_dependency_dag(components: &[Component]) -> Dag<String> {
    let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut ordered: Vec<&Component> = components.iter().collect();
    ordered.sort_by(|a, b| b.sort_priority.cmp(&a.sort_priority).then_with(|| a.name.cmp(&b.name)));

    let mut dag: Dag<String> = Dag::new();
    for component in &ordered {
        dag.add_node_or_get_index(component.name.clone());
    }
    for component in &ordered {
        let dependent = dag.add_node_or_get_index(component.name.clone());
        for dep in &component.dependencies {
            let dep_name = strip_version_suffix(dep).to_string();
            if !by_name.contains_key(dep_name.as_str()) {
                continue;
            }
            let dependency = dag.add_node_or_get_index(dep_name);
            // The graph is stored dependency -> dependent so that `Dag::topo()`'s
            // "edge source precedes target" order is directly an install order;
            // the spec describes the edge the other way round for cycle framing
            // but a cycle is symmetric either way.
            dag.add_edge(dependency, dependent);
        }
    }
    dag
}

/// Deterministic install order for a scheduled set: dependencies before
/// dependents, ties broken by `(sort_priority desc, name asc)`. Any
/// cycle among the scheduled components fails with `DependencyCycle`.
pub fn install_order(components: &[Component], scheduled: &HashSet<String>) -> Result<Vec<String>, GraphError> {
    let dag = build_dependency_dag(components);
    detect_cycle(components, scheduled)?;

    Ok(dag.topo().filter(|name| scheduled.contains(*name)).cloned().collect())
}

/// Uninstall order is the reverse of install order: dependents removed
/// before the dependencies they relied on.
pub fn uninstall_order(components: &[Component], scheduled: &HashSet<String>) -> Result<Vec<String>, GraphError> {
    let mut order = install_order(components, scheduled)?;
    order.reverse();
    Ok(order)
}

fn detect_cycle(components: &[Component], scheduled: &HashSet<String>) -> Result<(), GraphError> {
    let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut dag: Dag<String> = Dag::new();
    let mut names: Vec<&String> = scheduled.iter().collect();
    names.sort();
    for name in &names {
        dag.add_node_or_get_index((*name).clone());
    }
    for name in &names {
        let Some(component) = by_name.get(name.as_str()) else {
            continue;
        };
        let dependent = dag.add_node_or_get_index((*name).clone());
        for dep in &component.dependencies {
            let dep_name = strip_version_suffix(dep).to_string();
            if !scheduled.contains(&dep_name) {
                continue;
            }
            let dependency = dag.add_node_or_get_index(dep_name.clone());
            if dag.would_cycle(dependent, dependency) {
                return Err(GraphError::DependencyCycle {
                    a: (*name).clone(),
                    b: dep_name,
                });
            }
            dag.add_edge(dependent, dependency);
        }
    }
    Ok(())
}

/// Symmetric to [`resolve_install_set`]: start from user-unchecked
/// installed components, pull in every component that transitively
/// depends on one of them, then add components whose `auto_depend`
/// list is no longer satisfied by what remains installed -- unless a
/// replacement relationship is already taking care of them.
pub fn resolve_uninstall_set(
    components: &[Component],
    user_unchecked: &[String],
    replacements: &[Replacement],
) -> HashMap<String, Reason> {
    let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
    let dag = build_reverse_dependency_dag(components);

    let mut set: HashMap<String, Reason> = HashMap::new();
    for name in user_unchecked {
        set.insert(name.clone(), Reason::UserSelected);
    }

    for name in user_unchecked {
        let Some(index) = dag.get_index(name) else {
            continue;
        };
        for dependee in dag.dfs(index) {
            if dependee == name {
                continue;
            }
            set.entry(dependee.clone()).or_insert_with(|| Reason::DependencyOf(name.clone()));
        }
    }

    let max_rounds = components.len() + 1;
    let mut round = 0;
    loop {
        let mut added_any = false;
        for component in components {
            if !component.installed || set.contains_key(&component.name) || component.auto_depend.is_empty() {
                continue;
            }
            let still_satisfied = component.auto_depend.iter().all(|dep| {
                by_name
                    .get(dep.as_str())
                    .map(|d| d.installed && !set.contains_key(&d.name))
                    .unwrap_or(false)
            });
            if still_satisfied {
                continue;
            }
            let preempted = replacements.iter().any(|r| r.replaced == component.name);
            if preempted {
                continue;
            }
            set.insert(component.name.clone(), Reason::NoLongerAutoRequired);
            added_any = true;
        }
        if !added_any {
            break;
        }
        round += 1;
        if round > max_rounds {
            break;
        }
    }

    set
}

/// `dependency -> dependent` so a DFS from a dependency reaches every
/// component that (transitively) relies on it.
fn build_reverse_dependency_dag(components: &[Component]) -> Dag<String> {
    let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut dag: Dag<String> = Dag::new();
    for component in components {
        dag.add_node_or_get_index(component.name.clone());
    }
    for component in components {
        let dependent = dag.add_node_or_get_index(component.name.clone());
        for dep in &component.dependencies {
            let dep_name = strip_version_suffix(dep).to_string();
            if !by_name.contains_key(dep_name.as_str()) {
                continue;
            }
            let dependency = dag.add_node_or_get_index(dep_name);
            dag.add_edge(dependent, dependency);
        }
    }
    dag.transpose()
}

#[cfg(test)]
mod test {
    use super::*;

    fn comp(name: &str, deps: &[&str]) -> Component {
        let mut c = Component::new(name);
        c.dependencies = deps.iter().map(|d| d.to_string()).collect();
        c
    }

    #[test]
    fn install_set_pulls_in_transitive_dependencies_with_reasons() {
        let components = vec![comp("a", &["b"]), comp("b", &["c"]), comp("c", &[])];
        let set = resolve_install_set(&components, &["a".to_string()]).unwrap();
        assert_eq!(set.get("a"), Some(&Reason::UserSelected));
        assert_eq!(set.get("b"), Some(&Reason::DependencyOf("a".to_string())));
        assert_eq!(set.get("c"), Some(&Reason::DependencyOf("b".to_string())));
    }

    #[test]
    fn missing_dependency_is_unresolved() {
        let components = vec![comp("a", &["missing"])];
        let err = resolve_install_set(&components, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, GraphError::UnresolvedDependency { .. }));
    }

    #[test]
    fn dependency_cycle_is_detected_during_resolution() {
        let components = vec![comp("a", &["b"]), comp("b", &["a"])];
        let err = resolve_install_set(&components, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, GraphError::DependencyCycle { .. }));
    }

    #[test]
    fn auto_depend_joins_once_its_prerequisites_are_satisfied() {
        let mut addon = comp("addon", &[]);
        addon.auto_depend = vec!["base".to_string()];
        let components = vec![comp("base", &[]), addon];
        let set = resolve_install_set(&components, &["base".to_string()]).unwrap();
        assert_eq!(set.get("addon"), Some(&Reason::AutoDependency));
    }

    #[test]
    fn install_order_places_dependencies_before_dependents() {
        let components = vec![comp("a", &["b"]), comp("b", &["c"]), comp("c", &[])];
        let scheduled: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let order = install_order(&components, &scheduled).unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("c") < pos("b"));
        assert!(pos("b") < pos("a"));
    }

    #[test]
    fn uninstall_order_is_the_reverse_of_install_order() {
        let components = vec![comp("a", &["b"]), comp("b", &[])];
        let scheduled: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let install = install_order(&components, &scheduled).unwrap();
        let uninstall = uninstall_order(&components, &scheduled).unwrap();
        let mut reversed = install.clone();
        reversed.reverse();
        assert_eq!(uninstall, reversed);
    }

    #[test]
    fn uninstall_set_pulls_in_dependees_and_drops_unsatisfied_auto_depend() {
        let mut dependent = comp("dependent", &["base"]);
        dependent.installed = true;
        let mut addon = comp("addon", &[]);
        addon.auto_depend = vec!["base".to_string()];
        addon.installed = true;
        let mut base = comp("base", &[]);
        base.installed = true;
        let components = vec![base, dependent, addon];

        let set = resolve_uninstall_set(&components, &["base".to_string()], &[]);
        assert_eq!(set.get("base"), Some(&Reason::UserSelected));
        assert_eq!(set.get("dependent"), Some(&Reason::DependencyOf("base".to_string())));
        assert_eq!(set.get("addon"), Some(&Reason::NoLongerAutoRequired));
    }

    #[test]
    fn replacement_preempts_no_longer_auto_required() {
        let mut addon = comp("addon", &[]);
        addon.auto_depend = vec!["base".to_string()];
        addon.installed = true;
        let mut base = comp("base", &[]);
        base.installed = true;
        let components = vec![base, addon];
        let replacements = vec![Replacement {
            replaced: "addon".to_string(),
            replacement: "addon-v2".to_string(),
        }];

        let set = resolve_uninstall_set(&components, &["base".to_string()], &replacements);
        assert_eq!(set.get("addon"), None);
    }
}
