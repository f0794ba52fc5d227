use serde_json::json;
use shapecheck_core::{Document, SchemaNode, schema};
use shapecheck_validate::{render_summary, validate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schema([("data", SchemaNode::list_of(SchemaNode::int()))]);

    let documents = [json!({"data": [1, 2, 3]}), json!({"data": ["some_string"]})];

    for (idx, document) in documents.into_iter().enumerate() {
        let document: Document = serde_json::from_value(document)?;
        println!("Validating data_{} ...", idx + 1);
        println!("{}", render_summary(&validate(&schema, &document)));
    }
    Ok(())
}
