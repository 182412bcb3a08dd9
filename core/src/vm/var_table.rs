use core::fmt;

use hashbrown::HashMap;

/// Run-time variable bindings, supplied by the caller for each execution.
///
/// `pop` and `store` instructions write into the table; `push` of a
/// variable reads from it.
///
/// # Examples
///
/// ```
/// use formula_core::vm::VarTable;
///
/// let mut vars: VarTable = [("x", 1.0)].into_iter().collect();
/// vars.set("y", 2.0);
/// assert_eq!(vars.get("x"), Some(1.0));
/// assert_eq!(vars.to_string(), "x = 1\ny = 2\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarTable {
    values: HashMap<String, f64>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Bind `name`, returning the value it replaced.
    pub fn set(&mut self, name: &str, value: f64) -> Option<f64> {
        match self.values.get_mut(name) {
            Some(slot) => Some(core::mem::replace(slot, value)),
            None => {
                self.values.insert(name.to_string(), value);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// Bindings sorted by name.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for VarTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, f64)> for VarTable {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        self.values
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl fmt::Display for VarTable {
    /// One `name = value` line per binding, sorted by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.sorted() {
            writeln!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}
