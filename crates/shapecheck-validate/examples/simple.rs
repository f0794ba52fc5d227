use serde_json::json;
use shapecheck_core::{Document, SchemaNode, schema};
use shapecheck_validate::{render_summary, validate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document: Document = serde_json::from_value(json!({
        "status": "OK",
        "data": {
            "id": 1,
            "email": "radorado@hacksoft.io",
            "age": "29",
            "username": "radorado"
        }
    }))?;

    let schema = schema([
        ("status", SchemaNode::str()),
        (
            "data",
            SchemaNode::nested([
                ("id", SchemaNode::int()),
                ("email", SchemaNode::str()),
                ("age", SchemaNode::int()),
                ("token", SchemaNode::str()),
            ]),
        ),
    ]);

    let result = validate(&schema, &document);
    println!("{}", render_summary(&result));
    Ok(())
}
