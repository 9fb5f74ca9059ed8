//! Project-specific utilities live here.

use serde_json::{json, Value};

/// Names that describe one entity collection in the OpenAPI document.
pub struct CollectionDoc<'a> {
    pub path: &'a str,
    pub tag: &'a str,
    pub singular: &'a str,
    pub plural: &'a str,
    pub schema: &'a str,
    pub input_schema: &'a str,
    pub created_message: &'a str,
    pub listed_message: &'a str,
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn envelope(message_example: &str, key: &str, payload: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string", "example": message_example },
            key: payload
        },
        "required": ["message", key]
    })
}

/// OpenAPI fragment for a create + list collection with the given schemas.
pub fn collection_openapi(doc: &CollectionDoc<'_>, entity: Value, input: Value) -> Value {
    let entity_ref = json!({ "$ref": format!("#/components/schemas/{}", doc.schema) });

    json!({
        "paths": {
            doc.path: {
                "post": {
                    "summary": format!("Create a {}", doc.singular),
                    "tags": [doc.tag],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": format!("#/components/schemas/{}", doc.input_schema) }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": format!("{} created", doc.singular),
                            "content": {
                                "application/json": {
                                    "schema": envelope(doc.created_message, doc.singular, entity_ref.clone())
                                }
                            }
                        },
                        "400": error_response("Missing or mistyped field"),
                        "500": error_response("Internal server error")
                    }
                },
                "get": {
                    "summary": format!("List {}", doc.plural),
                    "tags": [doc.tag],
                    "responses": {
                        "200": {
                            "description": format!("All {}", doc.plural),
                            "content": {
                                "application/json": {
                                    "schema": envelope(
                                        doc.listed_message,
                                        doc.plural,
                                        json!({ "type": "array", "items": entity_ref })
                                    )
                                }
                            }
                        },
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                doc.schema: entity,
                doc.input_schema: input
            }
        }
    })
}

/// Schema for a string property with a description.
pub fn string_property(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

/// Schema properties every entity carries.
pub fn entity_schema(mut properties: serde_json::Map<String, Value>, required: &[&str]) -> Value {
    properties.insert(
        "id".to_string(),
        json!({ "type": "string", "description": "Generated unique identifier" }),
    );
    properties.insert(
        "createdAt".to_string(),
        json!({ "type": "string", "format": "date-time", "description": "When the record was created" }),
    );

    let mut all_required = vec!["id"];
    all_required.extend_from_slice(required);
    all_required.push("createdAt");

    json!({ "type": "object", "properties": properties, "required": all_required })
}

/// Schema for a create request body.
pub fn input_schema(properties: serde_json::Map<String, Value>, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_openapi_declares_both_operations() {
        let doc = CollectionDoc {
            path: "/things",
            tag: "Things",
            singular: "thing",
            plural: "things",
            schema: "Thing",
            input_schema: "CreateThing",
            created_message: "Thing created successfully",
            listed_message: "Things retrieved successfully",
        };
        let spec = collection_openapi(&doc, json!({}), json!({}));

        assert!(spec["paths"]["/things"]["post"]["responses"]["400"].is_object());
        assert!(spec["paths"]["/things"]["get"]["responses"]["200"].is_object());
        assert!(spec["components"]["schemas"]["CreateThing"].is_object());
        assert_eq!(
            spec["paths"]["/things"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"]["properties"]["message"]["example"],
            "Things retrieved successfully"
        );
    }

    #[test]
    fn entity_schema_adds_id_and_created_at() {
        let mut props = serde_json::Map::new();
        props.insert("name".to_string(), string_property("Name"));
        let schema = entity_schema(props, &["name"]);

        assert_eq!(schema["required"], json!(["id", "name", "createdAt"]));
        assert_eq!(schema["properties"]["createdAt"]["format"], "date-time");
    }
}
