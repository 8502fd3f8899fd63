use std::error::Error;

use tracing_subscriber::EnvFilter;
use xmlflat::{extract, xml_to_json_flat, ExtractOptions, HostOptions};

const ORDERS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<export>
    <orders>
        <order id="A-1">
            <customer>Ada</customer>
            <lines>
                <line sku="bolt">4</line>
                <line sku="nut">8</line>
            </lines>
        </order>
        <order id="A-2">
            <customer>Grace</customer>
            <note>leave at the door</note>
        </order>
    </orders>
    <archive>
        <order id="Z-9"><customer>old</customer></order>
    </archive>
</export>"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Repeated <line> siblings collapse to the first one per key.
    let records = extract(ORDERS, "orders/order", &ExtractOptions::default())?;
    println!("{} live orders, columns: {:?}", records.len(), records.columns());
    for record in &records {
        for (key, value) in record.iter() {
            println!("  {key:<32} {}", value.unwrap_or("<null>"));
        }
        println!();
    }

    let shallow = ExtractOptions::new().max_level(1).skip_leading_tag(true);
    let summary = extract(ORDERS, "order", &shallow)?;
    println!("all orders, one level deep: {:?}", summary.columns());

    let json = xml_to_json_flat(ORDERS, "archive/order", &HostOptions::default())?;
    println!("archive as JSON: {}", json.as_deref().unwrap_or("null"));
    Ok(())
}
