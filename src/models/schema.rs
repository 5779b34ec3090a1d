use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors raised while turning a schema document into typed descriptors.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("schema key `{0}` has the wrong type")]
    WrongType(&'static str),

    #[error("descriptor #{position}: {source}")]
    Descriptor {
        position: usize,
        #[source]
        source: DescriptorError,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum DescriptorError {
    #[error("descriptor is not an object")]
    NotAnObject,

    #[error("descriptor has neither `texto` nor `campo`")]
    MissingKind,

    #[error("`{0}` must be a string")]
    NotText(&'static str),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{campo}` requires `{path}`")]
    MissingKey { campo: String, path: &'static str },

    #[error("`index` must be an integer, got {0}")]
    InvalidIndex(String),

    #[error("`dato` must be a string or a list of strings")]
    InvalidSpecKey,
}

/// Text transformation applied to a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Mayuscula,
    Minuscula,
    Capitalize,
    Singular,
    Ninguna,
}

impl Transform {
    /// Parses a transformation name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "mayuscula" => Some(Transform::Mayuscula),
            "minuscula" => Some(Transform::Minuscula),
            "capitalize" => Some(Transform::Capitalize),
            "singular" => Some(Transform::Singular),
            "ninguna" => Some(Transform::Ninguna),
            _ => None,
        }
    }

    /// Like [`Transform::parse`], but unknown names fall back to the identity.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!("Unknown transformation '{}', leaving values unchanged", name);
            Transform::Ninguna
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectField {
    Marca,
    NombreProducto,
}

impl DirectField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectField::Marca => "marca",
            DirectField::NombreProducto => "nombreProducto",
        }
    }
}

/// Key (`dato`) matched inside a specification section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecKey {
    Single(String),
    AnyOf(Vec<String>),
}

impl SpecKey {
    pub fn matches(&self, dato: &str) -> bool {
        match self {
            SpecKey::Single(key) => key == dato,
            SpecKey::AnyOf(candidates) => candidates.iter().any(|candidate| candidate == dato),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Direct(DirectField),
    /// Negative indexes count from the end; `-1` selects the last category.
    Category { index: i64, subfield: String },
    Specification { section: String, key: SpecKey },
    /// Field the loader could not make sense of; it never resolves.
    Unresolvable { campo: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub transform: Option<Transform>,
}

impl FieldRule {
    /// Raw field identifier as written in the schema (`campo`).
    pub fn campo(&self) -> &str {
        match &self.kind {
            FieldKind::Direct(field) => field.as_str(),
            FieldKind::Category { .. } => "categorias",
            FieldKind::Specification { .. } => "especificaciones",
            FieldKind::Unresolvable { campo } => campo.as_str(),
        }
    }

    pub fn column_name(&self) -> &str {
        match &self.kind {
            FieldKind::Specification { key: SpecKey::Single(key), .. } => key.as_str(),
            FieldKind::Specification { key: SpecKey::AnyOf(candidates), .. } => candidates
                .first()
                .map(String::as_str)
                .unwrap_or("especificaciones"),
            _ => self.campo(),
        }
    }

    pub fn placeholder(&self) -> String {
        format!("[{}]", self.campo().to_uppercase())
    }
}

/// One element of a schema's naming structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDescriptor {
    StaticText(String),
    Field(FieldRule),
}

impl FieldDescriptor {
    pub fn field(kind: FieldKind) -> Self {
        FieldDescriptor::Field(FieldRule { kind, transform: None })
    }

    pub fn with_transform(self, transform: Transform) -> Self {
        match self {
            FieldDescriptor::Field(rule) => FieldDescriptor::Field(FieldRule {
                transform: Some(transform),
                ..rule
            }),
            text => text,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, DescriptorError> {
        let object = value.as_object().ok_or(DescriptorError::NotAnObject)?;

        if let Some(texto) = object.get("texto") {
            let text = texto.as_str().ok_or(DescriptorError::NotText("texto"))?;
            return Ok(FieldDescriptor::StaticText(text.to_string()));
        }

        let campo = match object.get("campo") {
            Some(Value::String(campo)) => campo.as_str(),
            Some(_) => return Err(DescriptorError::NotText("campo")),
            None => return Err(DescriptorError::MissingKind),
        };

        let transform = match object.get("transformacion") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(Transform::from_name(name)),
            Some(_) => return Err(DescriptorError::NotText("transformacion")),
        };

        let kind = match campo {
            "marca" => FieldKind::Direct(DirectField::Marca),
            "nombreProducto" => FieldKind::Direct(DirectField::NombreProducto),
            "categorias" => {
                let index = match object.get("index") {
                    None | Some(Value::Null) => 0,
                    Some(index) => index
                        .as_i64()
                        .ok_or_else(|| DescriptorError::InvalidIndex(index.to_string()))?,
                };
                let subfield = object
                    .get("subcampo")
                    .ok_or(DescriptorError::MissingKey {
                        campo: campo.to_string(),
                        path: "subcampo",
                    })?
                    .as_str()
                    .ok_or(DescriptorError::NotText("subcampo"))?;
                FieldKind::Category {
                    index,
                    subfield: subfield.to_string(),
                }
            }
            "especificaciones" => {
                let section = object
                    .get("condicion")
                    .and_then(|condicion| condicion.get("tituloSeccion"))
                    .ok_or(DescriptorError::MissingKey {
                        campo: campo.to_string(),
                        path: "condicion.tituloSeccion",
                    })?
                    .as_str()
                    .ok_or(DescriptorError::NotText("tituloSeccion"))?;
                let dato = object
                    .get("subcampo")
                    .and_then(|subcampo| subcampo.get("seccionList"))
                    .and_then(|list| list.get("condicion"))
                    .and_then(|condicion| condicion.get("dato"))
                    .ok_or(DescriptorError::MissingKey {
                        campo: campo.to_string(),
                        path: "subcampo.seccionList.condicion.dato",
                    })?;
                FieldKind::Specification {
                    section: section.to_string(),
                    key: parse_spec_key(dato)?,
                }
            }
            other => return Err(DescriptorError::UnknownField(other.to_string())),
        };

        let descriptor = FieldDescriptor::field(kind);
        Ok(match transform {
            Some(transform) => descriptor.with_transform(transform),
            None => descriptor,
        })
    }

    /// Lenient variant of [`FieldDescriptor::from_value`]: a malformed field
    /// degrades to [`FieldKind::Unresolvable`], and an entry without `campo`
    /// is dropped.
    pub fn from_value_lenient(value: &Value) -> Option<Self> {
        match Self::from_value(value) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                let campo = value.get("campo").and_then(Value::as_str)?;
                warn!("Descriptor for '{}' cannot be resolved: {}", campo, e);
                let transform = value
                    .get("transformacion")
                    .and_then(Value::as_str)
                    .map(Transform::from_name);
                Some(FieldDescriptor::Field(FieldRule {
                    kind: FieldKind::Unresolvable {
                        campo: campo.to_string(),
                    },
                    transform,
                }))
            }
        }
    }
}

fn parse_spec_key(dato: &Value) -> Result<SpecKey, DescriptorError> {
    match dato {
        Value::String(key) => Ok(SpecKey::Single(key.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(SpecKey::AnyOf)
            .ok_or(DescriptorError::InvalidSpecKey),
        _ => Err(DescriptorError::InvalidSpecKey),
    }
}

/// A naming schema for one product category.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Collection holding the products.
    pub collection: String,
    /// Category `clave` the products are filtered by.
    pub category_key: String,
    pub structure: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn from_value(value: &Value, strict: bool) -> Result<Self, SchemaError> {
        let collection = required_str(value, "coleccion")?;
        let category_key = required_str(value, "tipo")?;
        let entries = value
            .get("estructuraNombreProducto")
            .ok_or(SchemaError::MissingKey("estructuraNombreProducto"))?
            .as_array()
            .ok_or(SchemaError::WrongType("estructuraNombreProducto"))?;

        let structure = if strict {
            entries
                .iter()
                .enumerate()
                .map(|(position, entry)| {
                    FieldDescriptor::from_value(entry)
                        .map_err(|source| SchemaError::Descriptor { position, source })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            entries
                .iter()
                .filter_map(FieldDescriptor::from_value_lenient)
                .collect()
        };

        Ok(Schema {
            collection,
            category_key,
            structure,
        })
    }
}

fn required_str(value: &Value, key: &'static str) -> Result<String, SchemaError> {
    value
        .get(key)
        .ok_or(SchemaError::MissingKey(key))?
        .as_str()
        .map(str::to_string)
        .ok_or(SchemaError::WrongType(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_every_descriptor_kind() {
        assert_eq!(
            FieldDescriptor::from_value(&json!({"texto": "-"})).unwrap(),
            FieldDescriptor::StaticText("-".to_string())
        );
        assert_eq!(
            FieldDescriptor::from_value(&json!({"campo": "marca", "transformacion": "mayuscula"}))
                .unwrap(),
            FieldDescriptor::field(FieldKind::Direct(DirectField::Marca))
                .with_transform(Transform::Mayuscula)
        );
        assert_eq!(
            FieldDescriptor::from_value(&json!({"campo": "categorias", "index": -1, "subcampo": "nombre"}))
                .unwrap(),
            FieldDescriptor::field(FieldKind::Category {
                index: -1,
                subfield: "nombre".to_string()
            })
        );
        assert_eq!(
            FieldDescriptor::from_value(&json!({
                "campo": "especificaciones",
                "condicion": {"tituloSeccion": "General"},
                "subcampo": {"seccionList": {"condicion": {"dato": ["Color", "Colour"]}}}
            }))
            .unwrap(),
            FieldDescriptor::field(FieldKind::Specification {
                section: "General".to_string(),
                key: SpecKey::AnyOf(vec!["Color".to_string(), "Colour".to_string()])
            })
        );
    }

    #[test]
    fn test_category_index_defaults_to_first() {
        let descriptor =
            FieldDescriptor::from_value(&json!({"campo": "categorias", "subcampo": "nombre"}))
                .unwrap();
        assert_eq!(
            descriptor,
            FieldDescriptor::field(FieldKind::Category {
                index: 0,
                subfield: "nombre".to_string()
            })
        );
    }

    #[test]
    fn test_texto_wins_over_campo() {
        let descriptor =
            FieldDescriptor::from_value(&json!({"texto": "de", "campo": "marca"})).unwrap();
        assert!(matches!(descriptor, FieldDescriptor::StaticText(_)));
    }

    #[test]
    fn test_malformed_descriptors_are_rejected() {
        assert_eq!(
            FieldDescriptor::from_value(&json!({"campo": "precio"})),
            Err(DescriptorError::UnknownField("precio".to_string()))
        );
        assert_eq!(
            FieldDescriptor::from_value(&json!({})),
            Err(DescriptorError::MissingKind)
        );
        assert!(matches!(
            FieldDescriptor::from_value(&json!({"campo": "especificaciones"})),
            Err(DescriptorError::MissingKey { .. })
        ));
        assert!(matches!(
            FieldDescriptor::from_value(&json!({"campo": "categorias"})),
            Err(DescriptorError::MissingKey { .. })
        ));
        assert_eq!(
            FieldDescriptor::from_value(&json!({"campo": "categorias", "index": "x", "subcampo": "n"})),
            Err(DescriptorError::InvalidIndex("\"x\"".to_string()))
        );
    }

    #[test]
    fn test_lenient_degrades_to_unresolvable() {
        let descriptor = FieldDescriptor::from_value_lenient(&json!({"campo": "precio"})).unwrap();
        match descriptor {
            FieldDescriptor::Field(rule) => {
                assert_eq!(rule.campo(), "precio");
                assert_eq!(rule.placeholder(), "[PRECIO]");
            }
            other => panic!("unexpected descriptor {:?}", other),
        }

        assert!(FieldDescriptor::from_value_lenient(&json!({"index": 2})).is_none());
    }

    #[test]
    fn test_unknown_transform_is_identity() {
        assert_eq!(Transform::parse("titulo"), None);
        assert_eq!(Transform::from_name("titulo"), Transform::Ninguna);
    }

    #[test]
    fn test_column_names() {
        let rule = |descriptor: FieldDescriptor| match descriptor {
            FieldDescriptor::Field(rule) => rule,
            other => panic!("unexpected descriptor {:?}", other),
        };

        let single = rule(FieldDescriptor::field(FieldKind::Specification {
            section: "General".to_string(),
            key: SpecKey::Single("Color".to_string()),
        }));
        assert_eq!(single.column_name(), "Color");
        assert_eq!(single.placeholder(), "[ESPECIFICACIONES]");

        let empty = rule(FieldDescriptor::field(FieldKind::Specification {
            section: "General".to_string(),
            key: SpecKey::AnyOf(vec![]),
        }));
        assert_eq!(empty.column_name(), "especificaciones");

        let name = rule(FieldDescriptor::field(FieldKind::Direct(DirectField::NombreProducto)));
        assert_eq!(name.column_name(), "nombreProducto");
        assert_eq!(name.placeholder(), "[NOMBREPRODUCTO]");
    }

    #[test]
    fn test_schema_strict_and_lenient() {
        let document = json!({
            "coleccion": "productos",
            "tipo": "laptops",
            "estructuraNombreProducto": [
                {"campo": "marca"},
                {"campo": "precio"}
            ]
        });

        let err = Schema::from_value(&document, true).unwrap_err();
        assert!(matches!(err, SchemaError::Descriptor { position: 1, .. }));

        let schema = Schema::from_value(&document, false).unwrap();
        assert_eq!(schema.collection, "productos");
        assert_eq!(schema.category_key, "laptops");
        assert_eq!(schema.structure.len(), 2);
    }

    #[test]
    fn test_schema_requires_keys() {
        let err = Schema::from_value(&json!({"coleccion": "productos"}), true).unwrap_err();
        assert!(matches!(err, SchemaError::MissingKey("tipo")));

        let err = Schema::from_value(
            &json!({"coleccion": "productos", "tipo": "laptops", "estructuraNombreProducto": {}}),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::WrongType("estructuraNombreProducto")));
    }
}
