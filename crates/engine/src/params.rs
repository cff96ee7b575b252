/// Ordered set of named single-precision parameters.
///
/// Declaration order is load-bearing: it is the order the values occupy in
/// the uniform layout, so `ParamSet` never reorders entries. Lookups are
/// linear — descriptor parameter counts are small (tens at most) and the
/// set is read once per frame, so a map would buy nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    entries: Vec<(&'static str, f32)>,
}

impl ParamSet {
    /// Builds a set from `(name, default)` pairs in declaration order.
    pub fn from_pairs(pairs: &[(&'static str, f32)]) -> Self {
        Self {
            entries: pairs.to_vec(),
        }
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current value of a parameter, if declared.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Overwrites a declared parameter. Returns false (and changes nothing)
    /// when the name is unknown; the key universe is fixed by the descriptor.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => {
                entry.1 = value;
                true
            }
            None => false,
        }
    }

    /// Applies caller overrides onto descriptor defaults. Unknown names are
    /// dropped with a warning rather than failing the whole engine bring-up.
    pub fn apply_overrides(&mut self, overrides: &[(String, f32)]) {
        for (name, value) in overrides {
            if !self.set(name, *value) {
                tracing::warn!(param = %name, "ignoring override for undeclared parameter");
            }
        }
    }

    /// Parameter values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    /// Parameter names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.entries.iter().copied()
    }
}
