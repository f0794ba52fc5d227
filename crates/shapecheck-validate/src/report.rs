use crate::validator::ValidationResult;

/// Render a short human-readable summary of a validation result.
pub fn render_summary(result: &ValidationResult) -> String {
    if result.is_valid() {
        return "Valid.".to_string();
    }

    let type_errors: Vec<String> = result
        .type_errors()
        .iter()
        .map(ToString::to_string)
        .collect();

    let lines = [
        format!(
            "Keys in data, but not in schema: {}",
            render_list(result.additional_keys())
        ),
        format!(
            "Keys in schema, but not in data: {}",
            render_list(result.missing_keys())
        ),
        format!(
            "Keys with different type from schema: {}",
            render_list(&type_errors)
        ),
    ];
    lines.join("\n")
}

fn render_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;
    use serde_json::json;
    use shapecheck_core::{SchemaNode, schema};

    #[test]
    fn valid_result_renders_single_line() {
        let result = validate(&schema::<String, _>([]), &serde_json::Map::new());
        assert_eq!(render_summary(&result), "Valid.");
    }

    #[test]
    fn invalid_result_lists_every_class() {
        let schema = schema([
            ("status", SchemaNode::str()),
            (
                "data",
                SchemaNode::nested([
                    ("id", SchemaNode::int()),
                    ("age", SchemaNode::int()),
                    ("token", SchemaNode::str()),
                ]),
            ),
        ]);
        let document = json!({
            "status": "OK",
            "data": {"id": 1, "age": "29", "username": "radorado"}
        });

        let result = validate(&schema, document.as_object().expect("object"));

        assert_eq!(
            render_summary(&result),
            "Keys in data, but not in schema: [data.username]\n\
             Keys in schema, but not in data: [data.token]\n\
             Keys with different type from schema: [data.age (expected int, got str)]"
        );
    }
}
