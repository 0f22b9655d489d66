use std::collections::BTreeMap;
use url::form_urlencoded;

/// Placeholder for parameters with no discoverable seed value.
pub const FUZZ: &str = "FUZZ";

/// Multi-valued mapping of parameter name to candidate values.
///
/// Values keep discovery order per name. Names iterate in sorted order, which
/// is also the order they are encoded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    params: BTreeMap<String, Vec<String>>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.entry(name.into()).or_default().push(value.into());
    }

    /// Append every pair of an `application/x-www-form-urlencoded` query.
    pub fn add_query(&mut self, query: &str) {
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            self.add(name, value);
        }
    }

    /// Trim every value and replace blank ones with [`FUZZ`].
    pub fn normalize(&mut self) {
        for value in self.params.values_mut().flatten() {
            let trimmed = value.trim();
            *value = if trimmed.is_empty() {
                FUZZ.to_string()
            } else {
                trimmed.to_string()
            };
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Query-string form: sorted names, repeated names for multiple values.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, values) in &self.params {
            for value in values {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }

    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        params.add_query(query);
        params
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.add(name, value);
        }
        params
    }
}
