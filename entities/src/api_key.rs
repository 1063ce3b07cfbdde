use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

/// Key that authorizes state-changing operator calls (purchases, forced syncs).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey").field("0", &"********").finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Default)]
pub struct ApiKeys(HashSet<ApiKey>);

impl ApiKeys {
    pub fn accepts(&self, provided_api_key: &str) -> bool {
        self.0.contains(&ApiKey::new(provided_api_key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ApiKey>> for ApiKeys {
    fn from(value: Vec<ApiKey>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for ApiKeys {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(ApiKey::new).collect())
    }
}
