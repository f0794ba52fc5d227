use serde_json::json;
use shapecheck_core::{Document, parse_schema};
use shapecheck_validate::{render_summary, validate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = parse_schema(&json!({
        "type": "str",
        "message": [{
            "title": "str",
            "content": "str",
            "urgency": "Optional[str]"
        }]
    }))?;

    let documents = [
        json!({
            "type": "chat",
            "message": [{"title": "Graduation", "content": "Hello there!", "urgency": null}]
        }),
        json!({
            "type": "data",
            "message": [{
                "title": "Survey",
                "content": "N people answered your survey",
                "urgency": "very urgent"
            }]
        }),
        json!({
            "type": "chat",
            "message": [
                {"title": "Some title", "content": "Hello there!", "urgency": 1},
                {"title": "Reminder", "sender": "bot"}
            ]
        }),
    ];

    for (idx, document) in documents.into_iter().enumerate() {
        let document: Document = serde_json::from_value(document)?;
        println!("Validating data_{} ...", idx + 1);
        println!("{}", render_summary(&validate(&schema, &document)));
    }
    Ok(())
}
