//! Schema declarations for resources and data sources

use std::collections::HashMap;

use super::types::Dynamic;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub attr_type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub default: Option<Dynamic>,
    pub conflicts_with: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

#[derive(Debug, Clone)]
pub struct DataSourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    fn new(name: &str, attr_type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                attr_type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                default: None,
                conflicts_with: Vec::new(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element)))
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.attribute.description = description.to_string();
        self
    }

    pub fn default_value(mut self, value: Dynamic) -> Self {
        self.attribute.default = Some(value);
        self
    }

    pub fn conflicts_with(mut self, other: &str) -> Self {
        self.attribute.conflicts_with.push(other.to_string());
        self
    }

    fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    attributes: HashMap<String, Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &str, builder: AttributeBuilder) -> Self {
        self.attributes.insert(name.to_string(), builder.build());
        self
    }

    pub fn build_resource(self, version: i64) -> ResourceSchema {
        ResourceSchema {
            version,
            attributes: self.attributes,
        }
    }

    pub fn build_data_source(self, version: i64) -> DataSourceSchema {
        DataSourceSchema {
            version,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags_and_metadata() {
        let schema = SchemaBuilder::new()
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this project"),
            )
            .attribute(
                "password",
                AttributeBuilder::string("password").optional().sensitive(),
            )
            .attribute(
                "forks",
                AttributeBuilder::number("forks")
                    .optional()
                    .default_value(Dynamic::Number(0.0)),
            )
            .build_resource(0);

        assert_eq!(schema.version, 0);
        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["password"].sensitive);
        assert_eq!(
            schema.attributes["forks"].default,
            Some(Dynamic::Number(0.0))
        );
    }

    #[test]
    fn conflicting_attributes_are_recorded() {
        let schema = SchemaBuilder::new()
            .attribute(
                "inventory_id",
                AttributeBuilder::string("inventory_id")
                    .optional()
                    .conflicts_with("ask_inventory_on_launch"),
            )
            .build_resource(0);

        assert_eq!(
            schema.attributes["inventory_id"].conflicts_with,
            vec!["ask_inventory_on_launch".to_string()]
        );
    }

    #[test]
    fn list_attributes_carry_element_type() {
        let schema = SchemaBuilder::new()
            .attribute(
                "extra_credential_ids",
                AttributeBuilder::list("extra_credential_ids", AttributeType::Number).optional(),
            )
            .build_data_source(0);

        assert_eq!(
            schema.attributes["extra_credential_ids"].attr_type,
            AttributeType::List(Box::new(AttributeType::Number))
        );
    }
}
