//! Attribute schemas composed from shared fragments
//!
//! Every resource kind describes its attributes with a [`Schema`]. Kinds of
//! the same family share most of their attributes: identity (`id`,
//! `app_id`), lifecycle (`status`) and a nested `target`. [`compose`]
//! assembles these fragments with the kind-specific target fields.
//!
//! Attributes live in a `BTreeMap`, so composing the same fragments twice
//! yields identical schemas, down to their serialized bytes.

use serde::Serialize;
use std::collections::BTreeMap;

/// Named attribute set
pub type Attributes = BTreeMap<String, Attribute>;

/// Whether a value comes from the user, the server, or may come from either
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
}

/// Plan-time behavior attached to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Changing the value forces the resource to be replaced
    RequiresReplace,
    /// Keep the prior state value when the plan has no known value
    UseStateForUnknown,
}

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "attributes", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Number,
    /// A single nested object
    SingleNested(Attributes),
    /// A list of nested objects
    ListNested(Attributes),
}

impl AttributeType {
    /// Nested attributes, for object types
    pub fn nested(&self) -> Option<&Attributes> {
        match self {
            Self::SingleNested(attrs) | Self::ListNested(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// A single schema attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub attr_type: AttributeType,
    pub presence: Presence,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    pub fn new(attr_type: AttributeType, presence: Presence, description: &str) -> Self {
        Self {
            attr_type,
            presence,
            description: description.to_string(),
            sensitive: false,
            plan_modifiers: Vec::new(),
        }
    }

    pub fn required_string(description: &str) -> Self {
        Self::new(AttributeType::String, Presence::Required, description)
    }

    pub fn optional_string(description: &str) -> Self {
        Self::new(AttributeType::String, Presence::Optional, description)
    }

    pub fn computed_string(description: &str) -> Self {
        Self::new(AttributeType::String, Presence::Computed, description)
    }

    pub fn optional_bool(description: &str) -> Self {
        Self::new(AttributeType::Bool, Presence::Optional, description)
    }

    pub fn single_nested(presence: Presence, attributes: Attributes, description: &str) -> Self {
        Self::new(AttributeType::SingleNested(attributes), presence, description)
    }

    pub fn list_nested(presence: Presence, attributes: Attributes, description: &str) -> Self {
        Self::new(AttributeType::ListNested(attributes), presence, description)
    }

    /// Changing this attribute forces replacement
    pub fn requires_replace(self) -> Self {
        self.with_modifier(PlanModifier::RequiresReplace)
    }

    /// Preserve the state value across applies that don't change it
    pub fn use_state_for_unknown(self) -> Self {
        self.with_modifier(PlanModifier::UseStateForUnknown)
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    fn with_modifier(mut self, modifier: PlanModifier) -> Self {
        if !self.plan_modifiers.contains(&modifier) {
            self.plan_modifiers.push(modifier);
            self.plan_modifiers.sort();
        }
        self
    }
}

/// Full attribute schema of a resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub markdown_description: String,
    pub attributes: Attributes,
}

impl Schema {
    pub fn builder(markdown_description: &str) -> SchemaBuilder {
        SchemaBuilder::new(markdown_description)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Serialize the schema to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Check structural invariants, returning every violation found
    ///
    /// - nested attributes have at least one child
    /// - `UseStateForUnknown` only appears on computed attributes
    /// - `RequiresReplace` never appears on computed-only attributes
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        validate_attributes("", &self.attributes, &mut problems);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

fn validate_attributes(prefix: &str, attributes: &Attributes, problems: &mut Vec<String>) {
    for (name, attr) in attributes {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        let computed = attr.presence == Presence::Computed;
        for modifier in &attr.plan_modifiers {
            match modifier {
                PlanModifier::UseStateForUnknown if !computed => {
                    problems.push(format!("{path}: use_state_for_unknown on non-computed attribute"));
                }
                PlanModifier::RequiresReplace if computed => {
                    problems.push(format!("{path}: requires_replace on computed attribute"));
                }
                _ => {}
            }
        }

        if let Some(nested) = attr.attr_type.nested() {
            if nested.is_empty() {
                problems.push(format!("{path}: nested attribute without children"));
            }
            validate_attributes(&path, nested, problems);
        }
    }
}

/// Builder that merges attribute fragments into a schema
///
/// Later fragments override earlier attributes with the same name.
pub struct SchemaBuilder {
    markdown_description: String,
    attributes: Attributes,
}

impl SchemaBuilder {
    pub fn new(markdown_description: &str) -> Self {
        Self {
            markdown_description: markdown_description.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn fragment(mut self, fragment: Attributes) -> Self {
        self.attributes.extend(fragment);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            markdown_description: self.markdown_description,
            attributes: self.attributes,
        }
    }
}

/// Identity fields: server-assigned `id` and owning `app_id`
pub fn identity_fragment(id_description: &str) -> Attributes {
    Attributes::from([
        (
            "id".to_string(),
            Attribute::computed_string(id_description).use_state_for_unknown(),
        ),
        (
            "app_id".to_string(),
            Attribute::required_string("The Ably application ID.").requires_replace(),
        ),
    ])
}

/// Lifecycle fields: optional `status`
pub fn lifecycle_fragment() -> Attributes {
    Attributes::from([(
        "status".to_string(),
        Attribute::optional_string("The status of the rule. Rules can be enabled or disabled."),
    )])
}

/// The required nested `target` attribute wrapping kind-specific fields
pub fn target_fragment(target: Attributes) -> Attributes {
    Attributes::from([(
        "target".to_string(),
        Attribute::single_nested(Presence::Required, target, "object (rule_source)"),
    )])
}

/// Compose the schema shared by target-carrying resource kinds
///
/// The result holds `id`, `app_id`, `status` and a required `target`
/// nesting `target_fields`.
pub fn compose(target_fields: Attributes, markdown_description: &str) -> Schema {
    compose_builder(target_fields, markdown_description).build()
}

/// Like [`compose`], but leaves the builder open for family fragments
pub fn compose_builder(target_fields: Attributes, markdown_description: &str) -> SchemaBuilder {
    SchemaBuilder::new(markdown_description)
        .fragment(identity_fragment("The rule ID."))
        .fragment(lifecycle_fragment())
        .fragment(target_fragment(target_fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_fields() -> Attributes {
        Attributes::from([
            ("url".to_string(), Attribute::required_string("Connection URL")),
            ("format".to_string(), Attribute::optional_string("Payload format")),
        ])
    }

    #[test]
    fn test_compose_contains_shared_fields() {
        let schema = compose(target_fields(), "An example rule");

        let id = schema.attribute("id").unwrap();
        assert_eq!(id.presence, Presence::Computed);
        assert_eq!(id.plan_modifiers, vec![PlanModifier::UseStateForUnknown]);

        let app_id = schema.attribute("app_id").unwrap();
        assert_eq!(app_id.presence, Presence::Required);
        assert_eq!(app_id.plan_modifiers, vec![PlanModifier::RequiresReplace]);

        assert_eq!(schema.attribute("status").unwrap().presence, Presence::Optional);

        let target = schema.attribute("target").unwrap();
        assert_eq!(target.presence, Presence::Required);
        let nested = target.attr_type.nested().unwrap();
        assert!(nested.contains_key("url"));
        assert!(nested.contains_key("format"));
    }

    #[test]
    fn test_compose_is_idempotent() {
        let a = compose(target_fields(), "An example rule");
        let b = compose(target_fields(), "An example rule");
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_composed_schema_validates() {
        assert!(compose(target_fields(), "x").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_misplaced_modifiers() {
        let schema = Schema::builder("bad")
            .attribute("name", Attribute::required_string("n").use_state_for_unknown())
            .attribute("id", Attribute::computed_string("i").requires_replace())
            .attribute(
                "target",
                Attribute::single_nested(Presence::Required, Attributes::new(), "t"),
            )
            .build();

        let problems = schema.validate().unwrap_err();
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_modifiers_are_deduplicated() {
        let attr = Attribute::computed_string("x")
            .use_state_for_unknown()
            .use_state_for_unknown();
        assert_eq!(attr.plan_modifiers.len(), 1);
    }

    #[test]
    fn test_builder_fragments_override() {
        let schema = compose_builder(target_fields(), "x")
            .attribute("status", Attribute::required_string("always set"))
            .build();
        assert_eq!(schema.attribute("status").unwrap().presence, Presence::Required);
    }

    #[test]
    fn test_schema_json_shape() {
        let json = compose(target_fields(), "x").to_json().unwrap();
        assert!(json.contains("\"type\": \"single_nested\""));
        assert!(json.contains("\"requires_replace\""));
    }
}
