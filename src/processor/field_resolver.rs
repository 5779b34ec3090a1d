use crate::models::{
    DirectField, FieldDescriptor, FieldKind, FieldRule, Product, ResolvedField, SpecKey,
    SpecSection, scalar_text,
};
use serde_json::Value;

/// Resolves schema descriptors against product documents.
pub struct FieldResolver;

impl FieldResolver {
    pub fn resolve(&self, product: &Product, descriptor: &FieldDescriptor) -> ResolvedField {
        let rule = match descriptor {
            FieldDescriptor::StaticText(text) => {
                return ResolvedField {
                    value: Some(text.clone()),
                    missing: false,
                    is_static: true,
                };
            }
            FieldDescriptor::Field(rule) => rule,
        };

        let mut value = self.lookup(product, rule).filter(|v| !v.is_empty());

        if let (Some(text), Some(transform)) = (value.as_deref(), rule.transform) {
            value = transform.apply(text);
        }

        let missing = value.as_deref().is_none_or(str::is_empty);
        ResolvedField {
            value,
            missing,
            is_static: false,
        }
    }

    fn lookup(&self, product: &Product, rule: &FieldRule) -> Option<String> {
        match &rule.kind {
            FieldKind::Direct(DirectField::Marca) => product.marca.clone(),
            FieldKind::Direct(DirectField::NombreProducto) => product.nombre_producto.clone(),
            FieldKind::Category { index, subfield } => {
                let category = category_at(&product.categorias, *index)?;
                category.get(subfield.as_str()).and_then(scalar_text)
            }
            FieldKind::Specification { section, key } => {
                find_specification(&product.especificaciones, section, key)
            }
            FieldKind::Unresolvable { .. } => None,
        }
    }
}

/// Category at `index`; negative indexes count back from the end (`-1` is
/// the last one).
fn category_at(categories: &[Value], index: i64) -> Option<&Value> {
    let position = if index < 0 {
        i64::try_from(categories.len()).ok()? + index
    } else {
        index
    };
    usize::try_from(position).ok().and_then(|i| categories.get(i))
}

/// First `valor` whose `dato` matches `key` inside a section titled `section`,
/// scanning sections and then entries in document order.
fn find_specification(sections: &[SpecSection], section: &str, key: &SpecKey) -> Option<String> {
    sections
        .iter()
        .filter(|s| s.titulo_seccion.as_deref() == Some(section))
        .flat_map(|s| s.seccion_list.iter())
        .find(|entry| entry.dato.as_deref().is_some_and(|dato| key.matches(dato)))
        .and_then(|entry| scalar_text(&entry.valor))
}
