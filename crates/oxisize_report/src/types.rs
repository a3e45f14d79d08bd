use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::{HashMap, HashSet};

/// Category of an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Class,
    Function,
    Variable,
    Enum,
}

impl SymbolKind {
    /// Category order used everywhere a report is assembled.
    pub const ORDERED: [SymbolKind; 4] =
        [SymbolKind::Class, SymbolKind::Function, SymbolKind::Variable, SymbolKind::Enum];

    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Class => "classes",
            SymbolKind::Function => "functions",
            SymbolKind::Variable => "variables",
            SymbolKind::Enum => "enums",
        }
    }
}

/// Exported symbol names of one module, split by category.
///
/// A name lands in at most one category; the first declaration seen wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberList {
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub variables: Vec<String>,
    pub enums: Vec<String>,
}

impl MemberList {
    /// Adds `name` under `kind` unless it is already listed anywhere.
    /// Returns false for duplicates.
    pub fn insert(&mut self, kind: SymbolKind, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.members_mut(kind).push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        SymbolKind::ORDERED.iter().any(|&k| self.members(k).iter().any(|n| n == name))
    }

    pub fn members(&self, kind: SymbolKind) -> &[String] {
        match kind {
            SymbolKind::Class => &self.classes,
            SymbolKind::Function => &self.functions,
            SymbolKind::Variable => &self.variables,
            SymbolKind::Enum => &self.enums,
        }
    }

    fn members_mut(&mut self, kind: SymbolKind) -> &mut Vec<String> {
        match kind {
            SymbolKind::Class => &mut self.classes,
            SymbolKind::Function => &mut self.functions,
            SymbolKind::Variable => &mut self.variables,
            SymbolKind::Enum => &mut self.enums,
        }
    }

    /// All (kind, name) pairs: classes, then functions, variables, enums.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolKind, &str)> + '_ {
        SymbolKind::ORDERED
            .into_iter()
            .flat_map(move |k| self.members(k).iter().map(move |n| (k, n.as_str())))
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len() + self.variables.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Symbol name to category lookup, built once per report.
#[derive(Debug, Clone, Default)]
pub struct SymbolTypeIndex {
    kinds: HashMap<String, SymbolKind>,
}

impl SymbolTypeIndex {
    pub fn get(&self, name: &str) -> Option<SymbolKind> {
        self.kinds.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl From<&MemberList> for SymbolTypeIndex {
    fn from(members: &MemberList) -> Self {
        let kinds = members.iter().map(|(k, n)| (n.to_string(), k)).collect();
        Self { kinds }
    }
}

/// Per-symbol result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportData {
    pub dependencies: Vec<String>,
    pub size: u64,
}

/// Export name to `ExportData`, serialized in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<(String, ExportData)>,
    seen: HashSet<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. A symbol that is already present keeps its first
    /// position and data.
    pub fn insert(&mut self, symbol: impl Into<String>, data: ExportData) {
        let symbol = symbol.into();
        if self.seen.insert(symbol.clone()) {
            self.entries.push((symbol, data));
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&ExportData> {
        self.entries.iter().find(|(s, _)| s == symbol).map(|(_, d)| d)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, data) in &self.entries {
            map.serialize_entry(symbol, data)?;
        }
        map.end()
    }
}
