//! Tunable shader variables and their ordered table.
//!
//! A [`Variable`] is one numeric scalar extracted from shader source; the
//! [`VariableTable`] maps short names to variables with a single canonical
//! iteration order (lexicographic by name). Header generation and runtime
//! value packing both traverse the table through the same iterator, which is
//! what keeps constant-buffer fields bound to the right values.

use std::collections::BTreeMap;

/// One tunable scalar extracted from shader source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    /// Lower bound of the UI control range.
    pub min: f32,
    /// Upper bound of the UI control range.
    pub max: f32,
    /// Value a reset restores.
    pub start: f32,
    /// Control increment.
    pub step: f32,
    /// The current value.
    pub value: f32,
}

impl Variable {
    /// Build a variable from the named parameters of a declaration tag.
    ///
    /// Unspecified parameters default to `min=0`, `max=2`,
    /// `start=(min+max)/2`, `step=(max-min)*0.05`. Unknown parameter names
    /// are accepted and ignored. The current value starts at `start`.
    #[must_use]
    pub(crate) fn from_params(params: &[(String, f32)]) -> Self {
        let get = |key: &str| {
            params
                .iter()
                .find(|(name, _)| name == key)
                .map(|&(_, value)| value)
        };

        let min = get("min").unwrap_or(0.0);
        let max = get("max").unwrap_or(2.0);
        let start = get("start").unwrap_or((min + max) / 2.0);
        let step = get("step").unwrap_or((max - min) * 0.05);

        Self {
            min,
            max,
            start,
            step,
            value: start,
        }
    }
}

/// Ordered mapping from short variable name to [`Variable`].
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: BTreeMap<String, Variable>,
}

impl VariableTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all variables.
    pub fn clear(&mut self) {
        self.variables.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Set the current value of a variable. Returns `false` if the name is
    /// unknown.
    pub fn set_value(&mut self, name: &str, value: f32) -> bool {
        match self.variables.get_mut(name) {
            Some(variable) => {
                variable.value = value;
                true
            }
            None => false,
        }
    }

    /// Restore every variable's current value to its `start`.
    pub fn reset_values(&mut self) {
        for variable in self.variables.values_mut() {
            variable.value = variable.start;
        }
    }

    /// Insert a variable unless the name is already present.
    ///
    /// First declaration wins; returns `false` when an entry already existed
    /// and the new one was discarded.
    pub(crate) fn insert_first_wins(&mut self, name: String, variable: Variable) -> bool {
        match self.variables.entry(name) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(variable);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Iterate variables in canonical (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables
            .iter()
            .map(|(name, variable)| (name.as_str(), variable))
    }

    /// Current values in canonical order, zero-padded to a 16-byte boundary.
    ///
    /// An empty table packs to an empty block.
    #[must_use]
    pub fn packed_values(&self) -> Vec<f32> {
        if self.variables.is_empty() {
            return Vec::new();
        }
        let mut values: Vec<f32> = self.variables.values().map(|v| v.value).collect();
        // constant buffers are sized in 16-byte registers
        while values.len() % 4 != 0 {
            values.push(0.0);
        }
        values
    }

    /// [`Self::packed_values`] reinterpreted as bytes for upload.
    #[must_use]
    pub fn packed_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.packed_values()).to_vec()
    }
}
