use std::collections::BTreeMap;
use std::fmt;

const MASK: &str = "********";

/// Header-name fragments whose values must never be printed.
const SENSITIVE_PATTERNS: &[&str] = &[
    "ACCESS-KEY",
    "ACCESS-SIGN",
    "ACCESS-SIGNATURE",
    "ACCESS-SECRET",
    "API-KEY",
    "API-SECRET",
    "APIKEY",
    "APISECRET",
    "AUTHORIZATION",
    "X-API-KEY",
    "X-API-SECRET",
    "X-AUTH-TOKEN",
    "X-MBX-APIKEY",
    "SIGNATURE",
];

/// Case-insensitive check against the sensitive header patterns.
///
/// Also applied to query parameter names, so `signature=` in a URL is masked.
pub fn is_sensitive_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| upper.contains(pattern))
}

/// Redacts known secret values from free text before it reaches a log line
/// or an error message.
#[derive(Clone, Default)]
pub struct SecretMasker {
    values: Vec<String>,
}

impl SecretMasker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value to redact. Empty values are ignored.
    pub fn add(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() && !self.values.contains(&value) {
            self.values.push(value);
            // longest first so a secret containing another is masked whole
            self.values.sort_by_key(|v| std::cmp::Reverse(v.len()));
        }
    }

    pub fn with(mut self, value: impl Into<String>) -> Self {
        self.add(value);
        self
    }

    pub fn mask(&self, text: &str) -> String {
        self.values
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SecretMasker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretMasker")
            .field("values", &self.values.len())
            .finish()
    }
}

/// Request header map whose `Debug` output masks sensitive values.
///
/// Names are matched case-insensitively; the first spelling inserted is kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    entries: BTreeMap<String, (String, String)>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(key, (name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` with real values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Values of every sensitive header, for feeding a `SecretMasker`.
    pub fn sensitive_values(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(name, _)| is_sensitive_name(name))
            .map(|(_, value)| value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(name, value)| {
                if is_sensitive_name(name) {
                    (name, MASK)
                } else {
                    (name, value)
                }
            }))
            .finish()
    }
}
