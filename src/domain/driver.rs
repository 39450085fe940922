use serde::{Deserialize, Serialize};

/// Kernel module driving a network device, with its option string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    /// Module options, e.g. "csum=1 debug=16"
    #[serde(default)]
    pub params: String,
}

impl Driver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: String::new(),
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }

    /// Split the option string into ordered key/value pairs.
    ///
    /// A token without `=` yields an empty value.
    pub fn params_map(&self) -> Vec<(String, String)> {
        self.params
            .split_whitespace()
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (token.to_string(), String::new()),
            })
            .collect()
    }

    /// Build a driver from option pairs, inverse of [`Driver::params_map`]
    pub fn from_params_map<K, V>(name: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(name).with_params(params)
    }
}
