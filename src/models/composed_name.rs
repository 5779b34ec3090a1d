use serde::Serialize;

/// Outcome of resolving one descriptor against one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub value: Option<String>,
    pub missing: bool,
    pub is_static: bool,
}

/// One column of a product's name breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamePart {
    pub name: String,
    /// Resolved value, or the `[FIELD]` placeholder when missing.
    pub value: String,
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedName {
    pub full_name: String,
    pub parts: Vec<NamePart>,
    pub any_missing: bool,
}
