use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentVersion {
    pub version: String,
    pub variant: Option<String>,
}

/// Library name -> version metadata, as reported by registered components.
#[derive(Debug, Default)]
pub struct VersionRegistry {
    entries: BTreeMap<String, ComponentVersion>,
}

impl VersionRegistry {
    /// Records a component version. Re-registering replaces the entry.
    pub fn register(&mut self, library: &str, version: &str, variant: Option<&str>) {
        self.entries.insert(
            library.to_string(),
            ComponentVersion { version: version.to_string(), variant: variant.map(str::to_string) },
        );
    }

    pub fn get(&self, library: &str) -> Option<&ComponentVersion> {
        self.entries.get(library)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentVersion)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
