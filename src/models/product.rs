use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A catalog product document as exported from the document store.
///
/// Only the fields the naming rules read are modelled; anything else in the
/// document (`_id`, prices, images...) is ignored during deserialization.
/// Modelled fields are read leniently: scalars of any type become text, and
/// list elements of the wrong shape are dropped, so any JSON object yields a
/// product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_text")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub marca: Option<String>,
    #[serde(rename = "nombreProducto", default, deserialize_with = "lenient_text")]
    pub nombre_producto: Option<String>,
    /// Raw category elements; anything that is not an object has no sub-fields.
    #[serde(default, deserialize_with = "lenient_list")]
    pub categorias: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub especificaciones: Vec<SpecSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecSection {
    #[serde(rename = "tituloSeccion", default, deserialize_with = "lenient_text")]
    pub titulo_seccion: Option<String>,
    #[serde(rename = "seccionList", default, deserialize_with = "lenient_list")]
    pub seccion_list: Vec<SpecEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub dato: Option<String>,
    #[serde(default)]
    pub valor: Value,
}

impl Product {
    /// True when any of the product's categories carries the given `clave`.
    pub fn belongs_to(&self, category_key: &str) -> bool {
        self.categorias
            .iter()
            .any(|category| category.get("clave").and_then(Value::as_str) == Some(category_key))
    }
}

/// Text form of a scalar document value. Strings pass through, numbers and
/// booleans are rendered, everything else has no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// Non-array values read as an empty list; elements that do not fit `T` are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_export_document() {
        let product: Product = serde_json::from_value(json!({
            "_id": {"$oid": "65f0c0ffee"},
            "sku": "LAP-001",
            "marca": "Lenovo",
            "nombreProducto": "IdeaPad 3",
            "categorias": [
                {"clave": "tecnologia", "nombre": "Tecnología"},
                {"clave": "laptops", "nombre": "Laptops"}
            ],
            "especificaciones": [
                {
                    "tituloSeccion": "General",
                    "seccionList": [{"dato": "Color", "valor": "Gris"}]
                }
            ],
            "precio": 12999.0
        }))
        .unwrap();

        assert_eq!(product.sku.as_deref(), Some("LAP-001"));
        assert_eq!(product.nombre_producto.as_deref(), Some("IdeaPad 3"));
        assert_eq!(product.categorias.len(), 2);
        assert_eq!(product.especificaciones[0].seccion_list[0].valor, json!("Gris"));
    }

    #[test]
    fn test_null_collections_become_empty() {
        let product: Product = serde_json::from_value(json!({
            "sku": "X",
            "marca": null,
            "categorias": null,
            "especificaciones": [{"tituloSeccion": "General", "seccionList": null}]
        }))
        .unwrap();

        assert!(product.marca.is_none());
        assert!(product.categorias.is_empty());
        assert!(product.especificaciones[0].seccion_list.is_empty());
    }

    #[test]
    fn test_loosely_typed_fields_are_kept() {
        let product: Product = serde_json::from_value(json!({
            "sku": 12345,
            "marca": true,
            "nombreProducto": ["not", "text"],
            "categorias": [null, "suelta", {"clave": "laptops"}],
            "especificaciones": [
                null,
                {"tituloSeccion": 3, "seccionList": [{"dato": 7, "valor": "x"}, "roto"]},
                {"tituloSeccion": "General", "seccionList": {"dato": "Color"}}
            ]
        }))
        .unwrap();

        assert_eq!(product.sku.as_deref(), Some("12345"));
        assert_eq!(product.marca.as_deref(), Some("true"));
        assert_eq!(product.nombre_producto, None);
        assert_eq!(product.categorias.len(), 3);
        assert!(product.belongs_to("laptops"));
        assert_eq!(product.especificaciones.len(), 2);
        assert_eq!(product.especificaciones[0].titulo_seccion.as_deref(), Some("3"));
        assert_eq!(product.especificaciones[0].seccion_list.len(), 1);
        assert_eq!(product.especificaciones[0].seccion_list[0].dato.as_deref(), Some("7"));
        assert!(product.especificaciones[1].seccion_list.is_empty());
    }

    #[test]
    fn test_belongs_to_category() {
        let product: Product = serde_json::from_value(json!({
            "categorias": [{"clave": "tecnologia"}, {"clave": "laptops"}]
        }))
        .unwrap();

        assert!(product.belongs_to("laptops"));
        assert!(!product.belongs_to("celulares"));
        assert!(!Product::default().belongs_to("laptops"));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("16 GB")), Some("16 GB".to_string()));
        assert_eq!(scalar_text(&json!(16)), Some("16".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&json!(["a"])), None);
    }
}
