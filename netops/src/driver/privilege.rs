//! Privilege level tracking and graph navigation.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and finds routes between levels.
///
/// Levels form an undirected graph through their parent links; routes are
/// shortest paths found by BFS.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,

    /// Adjacency list for the privilege graph.
    graph: HashMap<String, HashSet<String>>,

    /// Current privilege level name, once a prompt has been seen.
    current: Option<String>,
}

impl PrivilegeManager {
    /// Create a new privilege manager from privilege level definitions.
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        let graph = Self::build_graph(&levels);
        Self {
            levels,
            graph,
            current: None,
        }
    }

    fn build_graph(levels: &IndexMap<String, PrivilegeLevel>) -> HashMap<String, HashSet<String>> {
        let mut graph: HashMap<String, HashSet<String>> = HashMap::new();

        for (name, level) in levels {
            graph.entry(name.clone()).or_default();

            if let Some(ref parent) = level.previous_priv {
                graph.entry(name.clone()).or_default().insert(parent.clone());
                graph.entry(parent.clone()).or_default().insert(name.clone());
            }
        }

        graph
    }

    /// The level whose pattern matches `prompt`, first defined wins.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Set the current level from a prompt; returns the level name.
    pub fn update_from_prompt(&mut self, prompt: &str) -> Result<String> {
        let name = self.determine_from_prompt(prompt)?.name.clone();
        self.current = Some(name.clone());
        Ok(name)
    }

    /// Get the current privilege level name.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Forget the current level (session closed).
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Get a privilege level by name.
    pub fn get(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// Shortest path from `from` to `to`, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        if from == to {
            return Ok(vec![from.to_string()]);
        }

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parent: HashMap<String, String> = HashMap::new();

        queue.push_back(from.to_string());
        visited.insert(from.to_string());

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to.to_string()];
                let mut node = to.to_string();

                while let Some(prev) = parent.get(&node) {
                    path.push(prev.clone());
                    node = prev.clone();
                }

                path.reverse();
                return Ok(path);
            }

            if let Some(neighbors) = self.graph.get(&current) {
                for neighbor in neighbors {
                    if visited.insert(neighbor.clone()) {
                        parent.insert(neighbor.clone(), current.clone());
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }

        Err(DriverError::NoPrivilegePath {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into())
    }

    /// Command (and possible password prompt) for one hop between adjacent levels.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<TransitionInfo> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.previous_priv.as_deref() == Some(from) {
            return Some(TransitionInfo {
                command: to_level.escalate_command.clone()?,
                auth_prompt: to_level.escalate_prompt.clone(),
            });
        }

        if from_level.previous_priv.as_deref() == Some(to) {
            return Some(TransitionInfo {
                command: from_level.deescalate_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }
}

/// One hop in the privilege graph.
#[derive(Debug, Clone)]
pub struct TransitionInfo {
    pub command: String,

    /// If `Some`, the device may ask for a password matching this pattern.
    pub auth_prompt: Option<Regex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_levels() -> IndexMap<String, PrivilegeLevel> {
        let user = PrivilegeLevel::new("user", r">\s*$").unwrap();

        let privileged = PrivilegeLevel::new("privileged", r"#\s*$")
            .unwrap()
            .with_parent("user")
            .with_escalate("enable")
            .with_deescalate("disable")
            .with_auth(r"[Pp]assword:\s*$")
            .unwrap()
            .with_not_contains("(config");

        let configuration = PrivilegeLevel::new("configuration", r"\(config[^)]*\)#\s*$")
            .unwrap()
            .with_parent("privileged")
            .with_escalate("configure terminal")
            .with_deescalate("end");

        let mut levels = IndexMap::new();
        levels.insert("user".to_string(), user);
        levels.insert("privileged".to_string(), privileged);
        levels.insert("configuration".to_string(), configuration);
        levels
    }

    #[test]
    fn test_determine_privilege() {
        let manager = PrivilegeManager::new(make_test_levels());

        assert_eq!(manager.determine_from_prompt("router>").unwrap().name, "user");
        assert_eq!(manager.determine_from_prompt("router#").unwrap().name, "privileged");
        assert_eq!(
            manager.determine_from_prompt("router(config-if)#").unwrap().name,
            "configuration"
        );
        assert!(manager.determine_from_prompt("login:").is_err());
    }

    #[test]
    fn test_update_from_prompt() {
        let mut manager = PrivilegeManager::new(make_test_levels());
        assert!(manager.current().is_none());

        manager.update_from_prompt("router#").unwrap();
        assert_eq!(manager.current(), Some("privileged"));

        assert!(manager.update_from_prompt("???").is_err());
        assert_eq!(manager.current(), Some("privileged"));
    }

    #[test]
    fn test_find_path() {
        let manager = PrivilegeManager::new(make_test_levels());

        let path = manager.find_path("user", "configuration").unwrap();
        assert_eq!(path, vec!["user", "privileged", "configuration"]);

        let path = manager.find_path("configuration", "user").unwrap();
        assert_eq!(path, vec!["configuration", "privileged", "user"]);

        let path = manager.find_path("user", "user").unwrap();
        assert_eq!(path, vec!["user"]);
    }

    #[test]
    fn test_no_path_to_unknown_level() {
        let manager = PrivilegeManager::new(make_test_levels());
        assert!(manager.find_path("user", "shell").is_err());
    }

    #[test]
    fn test_get_transition() {
        let manager = PrivilegeManager::new(make_test_levels());

        let trans = manager.get_transition("user", "privileged").unwrap();
        assert_eq!(trans.command, "enable");
        assert!(trans.auth_prompt.is_some());

        let trans = manager.get_transition("privileged", "user").unwrap();
        assert_eq!(trans.command, "disable");
        assert!(trans.auth_prompt.is_none());

        assert!(manager.get_transition("user", "configuration").is_none());
    }
}
