use crate::models::{ComposedName, FieldDescriptor, NamePart, Product};

use super::field_resolver::FieldResolver;

/// Builds product names from an ordered descriptor list.
pub struct NameComposer<'a> {
    descriptors: &'a [FieldDescriptor],
    resolver: FieldResolver,
}

impl<'a> NameComposer<'a> {
    pub fn new(descriptors: &'a [FieldDescriptor]) -> Self {
        NameComposer {
            descriptors,
            resolver: FieldResolver,
        }
    }

    /// Column names of the field-bearing descriptors, in descriptor order.
    pub fn column_headers(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .filter_map(|descriptor| match descriptor {
                FieldDescriptor::Field(rule) => Some(rule.column_name().to_string()),
                FieldDescriptor::StaticText(_) => None,
            })
            .collect()
    }

    pub fn compose(&self, product: &Product) -> ComposedName {
        let mut tokens: Vec<String> = Vec::with_capacity(self.descriptors.len());
        let mut parts = Vec::new();
        let mut any_missing = false;

        for descriptor in self.descriptors {
            let resolved = self.resolver.resolve(product, descriptor);

            if resolved.is_static {
                if let Some(text) = resolved.value.filter(|text| !text.is_empty()) {
                    tokens.push(text);
                }
                continue;
            }

            let FieldDescriptor::Field(rule) = descriptor else {
                continue;
            };
            let shown = match resolved.value {
                Some(value) if !resolved.missing => value,
                _ => {
                    any_missing = true;
                    rule.placeholder()
                }
            };
            tokens.push(shown.clone());
            parts.push(NamePart {
                name: rule.column_name().to_string(),
                value: shown,
                missing: resolved.missing,
            });
        }

        ComposedName {
            full_name: tokens.join(" ").trim().to_string(),
            parts,
            any_missing,
        }
    }
}
