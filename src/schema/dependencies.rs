use super::types::TableSchema;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Orders a set of tables so that FK parents come before their children
pub struct DependencyResolver {
    tables: Vec<&'static TableSchema>,
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new(tables: &[&'static TableSchema]) -> Self {
        let deps = tables.iter().map(|t| (t.name, t.dependencies())).collect();

        Self {
            tables: tables.to_vec(),
            deps,
        }
    }

    /// Return the tables in dependency order (parents before children).
    /// Dependencies on tables outside the set are ignored.
    pub fn ordered(&self) -> Result<Vec<&'static TableSchema>> {
        let included: HashSet<&str> = self.tables.iter().map(|t| t.name).collect();
        let mut result = Vec::with_capacity(self.tables.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        // Walk in declaration order so the output is deterministic
        for table in &self.tables {
            if !visited.contains(table.name) {
                self.visit(
                    table.name,
                    &included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    /// Return the tables children-first, the order rows must be deleted in
    pub fn reverse_ordered(&self) -> Result<Vec<&'static TableSchema>> {
        let mut tables = self.ordered()?;
        tables.reverse();
        Ok(tables)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &HashSet<&'a str>,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(Error::CircularDependency(name.to_string()));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<&str> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                // Skip self-references
                if dep != name && included.contains(dep) {
                    self.visit(dep, included, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = self.tables.iter().find(|t| t.name == name).copied() {
            result.push(table);
        }

        Ok(())
    }
}
