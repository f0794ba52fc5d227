use serde_json::{Value, json};
use shapecheck_core::{Document, Schema, parse_schema};
use shapecheck_validate::{render_summary, validate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = parse_schema(&json!({
        "type": "str",
        "message": "Optional[str]",
        "data": {"$optional": {"foo": "str"}}
    }))?;

    let documents = [
        json!({"type": "data", "message": null, "data": {"foo": "bar"}}),
        json!({"type": "info", "message": "Some info", "data": null}),
    ];

    for (idx, document) in documents.into_iter().enumerate() {
        println!("Validating data_{} ...", idx + 1);
        report(&schema, document)?;
    }
    Ok(())
}

fn report(schema: &Schema, document: Value) -> Result<(), serde_json::Error> {
    let document: Document = serde_json::from_value(document)?;
    println!("{}", render_summary(&validate(schema, &document)));
    Ok(())
}
