use chrono::NaiveDate;
use helios_xmlmapper::{
    CamelCaseConverter, EncoderConfig, MapperError, Result, SinkKind, TypeTag, Value, XmlEncoder,
    XmlSerializable, to_xml_string, to_xml_string_with,
};
use tracing_subscriber::EnvFilter;

const DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(XmlSerializable, Default)]
struct Person {
    name: Option<String>,
    active: Option<bool>,
    tags: Vec<String>,
}

#[derive(XmlSerializable, Default)]
struct Address {
    city: Option<String>,
    zip: Option<String>,
}

#[derive(XmlSerializable, Default)]
struct Customer {
    #[xml(attribute)]
    id: Option<u32>,
    name: Option<String>,
    address: Option<Address>,
    #[xml(rename = "createdAt", type = "Date")]
    created_at: Option<NaiveDate>,
}

#[derive(XmlSerializable, Default)]
struct Order {
    #[xml(attribute)]
    number: Option<String>,
    lines: Vec<OrderLine>,
}

#[derive(XmlSerializable)]
#[xml(rename = "line")]
struct OrderLine {
    #[xml(attribute)]
    sku: String,
    quantity: u32,
    price: f64,
}

fn ada() -> Person {
    Person {
        name: Some("Ada".to_string()),
        active: Some(true),
        tags: vec!["x".to_string(), "y".to_string()],
    }
}

fn iso_date_encoder() -> XmlEncoder {
    let mut encoder = XmlEncoder::compact();
    encoder.add_type(TypeTag::named("Date"), |_, value| {
        Ok(match value.downcast_ref::<NaiveDate>() {
            Some(date) => Value::string(date.format("%Y-%m-%d").to_string()),
            None => value,
        })
    });
    encoder
}

#[test]
fn test_person_scenario() -> Result<()> {
    init_tracing();
    let xml = XmlEncoder::compact().map(&ada())?;
    assert_eq!(
        xml,
        format!(
            "{DECL}<Person><name>Ada</name><active>1</active><tags>x</tags><tags>y</tags></Person>\n"
        )
    );
    Ok(())
}

#[test]
fn test_empty_instance_is_single_empty_root() -> Result<()> {
    let xml = XmlEncoder::compact().map(&Person::default())?;
    assert_eq!(xml, format!("{DECL}<Person/>\n"));

    let xml = to_xml_string(&Customer::default())?;
    assert_eq!(xml, format!("{DECL}<Customer/>\n"));
    Ok(())
}

#[test]
fn test_absent_properties_leave_no_trace() -> Result<()> {
    let customer = Customer {
        name: Some("Ada".to_string()),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&customer)?;
    assert_eq!(xml, format!("{DECL}<Customer><name>Ada</name></Customer>\n"));
    assert!(!xml.contains("id"));
    assert!(!xml.contains("address"));
    assert!(!xml.contains("createdAt"));
    Ok(())
}

#[test]
fn test_booleans_are_one_and_zero() -> Result<()> {
    let mut person = ada();
    person.active = Some(false);
    let xml = XmlEncoder::compact().map(&person)?;
    assert!(xml.contains("<active>0</active>"));
    assert!(!xml.contains("true"));
    assert!(!xml.contains("false"));
    Ok(())
}

#[test]
fn test_collection_produces_siblings_in_order() -> Result<()> {
    let person = Person {
        tags: (0..5).map(|i| format!("t{i}")).collect(),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&person)?;
    assert_eq!(
        xml,
        format!(
            "{DECL}<Person><tags>t0</tags><tags>t1</tags><tags>t2</tags><tags>t3</tags><tags>t4</tags></Person>\n"
        )
    );
    Ok(())
}

#[test]
fn test_empty_collection_writes_nothing() -> Result<()> {
    let person = Person {
        name: Some("Ada".to_string()),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&person)?;
    assert!(!xml.contains("tags"));
    Ok(())
}

#[test]
fn test_attribute_scenario() -> Result<()> {
    let customer = Customer {
        id: Some(42),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&customer)?;
    assert_eq!(xml, format!("{DECL}<Customer id=\"42\"/>\n"));
    assert!(!xml.contains("<id>"));
    Ok(())
}

#[test]
fn test_date_coercion_scenario() -> Result<()> {
    let customer = Customer {
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Default::default()
    };
    let xml = iso_date_encoder().map(&customer)?;
    assert_eq!(
        xml,
        format!("{DECL}<Customer><createdAt>2024-01-01</createdAt></Customer>\n")
    );
    Ok(())
}

#[test]
fn test_opaque_value_without_coercion_fails() {
    let customer = Customer {
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Default::default()
    };
    let err = XmlEncoder::compact().map(&customer).unwrap_err();
    assert!(matches!(
        err,
        MapperError::UnsupportedValue { ref property, kind: "opaque" } if property == "createdAt"
    ));
}

#[test]
fn test_nested_object_scenario() -> Result<()> {
    let customer = Customer {
        address: Some(Address {
            city: Some("X".to_string()),
            zip: None,
        }),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&customer)?;
    assert_eq!(
        xml,
        format!("{DECL}<Customer><address><city>X</city></address></Customer>\n")
    );
    Ok(())
}

#[test]
fn test_output_order_follows_declaration() -> Result<()> {
    let customer = Customer {
        id: Some(7),
        name: Some("Ada".to_string()),
        address: Some(Address {
            city: Some("X".to_string()),
            zip: Some("123".to_string()),
        }),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1),
    };
    let xml = iso_date_encoder().map(&customer)?;
    assert_eq!(
        xml,
        format!(
            "{DECL}<Customer id=\"7\"><name>Ada</name><address><city>X</city><zip>123</zip></address><createdAt>2024-01-01</createdAt></Customer>\n"
        )
    );
    Ok(())
}

#[test]
fn test_collection_of_objects() -> Result<()> {
    let order = Order {
        number: Some("A-1".to_string()),
        lines: vec![
            OrderLine {
                sku: "p1".to_string(),
                quantity: 2,
                price: 9.5,
            },
            OrderLine {
                sku: "p2".to_string(),
                quantity: 1,
                price: 20.0,
            },
        ],
    };
    let xml = to_xml_string(&order)?;
    assert_eq!(
        xml,
        format!(
            "{DECL}<Order number=\"A-1\">\n    \
             <lines sku=\"p1\">\n        <quantity>2</quantity>\n        <price>9.5</price>\n    </lines>\n    \
             <lines sku=\"p2\">\n        <quantity>1</quantity>\n        <price>20</price>\n    </lines>\n\
             </Order>\n"
        )
    );
    Ok(())
}

#[test]
fn test_container_rename_applies_to_root_only() -> Result<()> {
    let line = OrderLine {
        sku: "p1".to_string(),
        quantity: 1,
        price: 1.5,
    };
    let xml = XmlEncoder::compact().map(&line)?;
    assert!(xml.contains("<line sku=\"p1\">"));
    Ok(())
}

#[test]
fn test_name_converter() -> Result<()> {
    let encoder = XmlEncoder::compact().with_name_converter(CamelCaseConverter);
    let xml = encoder.map(&ada())?;
    assert!(xml.starts_with(&format!("{DECL}<person>")));
    assert!(xml.ends_with("</person>\n"));
    Ok(())
}

#[test]
fn test_text_is_escaped() -> Result<()> {
    let person = Person {
        name: Some("Ada & <Co>".to_string()),
        ..Default::default()
    };
    let xml = XmlEncoder::compact().map(&person)?;
    assert!(xml.contains("<name>Ada &amp; &lt;Co&gt;</name>"));
    Ok(())
}

#[test]
fn test_attribute_values_are_escaped() -> Result<()> {
    let order = Order {
        number: Some("\"A\" & <B>".to_string()),
        lines: vec![],
    };
    let xml = XmlEncoder::compact().map(&order)?;
    assert!(xml.contains("number=\"&quot;A&quot; &amp; &lt;B&gt;\""));
    Ok(())
}

#[test]
fn test_config_without_declaration() -> Result<()> {
    let config = EncoderConfig::compact().with_xml_declaration(false);
    let xml = to_xml_string_with(&ada(), &config)?;
    assert!(xml.starts_with("<Person>"));
    Ok(())
}

#[test]
fn test_config_from_json() -> Result<()> {
    let config: EncoderConfig = serde_json::from_str(
        r#"{ "indent": 2, "xml_declaration": false, "name_case": "kebab" }"#,
    )
    .expect("valid config");
    let customer = Customer {
        created_at: None,
        address: Some(Address {
            city: Some("X".to_string()),
            zip: None,
        }),
        ..Default::default()
    };
    let xml = to_xml_string_with(&customer, &config)?;
    assert_eq!(
        xml,
        "<customer>\n  <address>\n    <city>X</city>\n  </address>\n</customer>\n"
    );
    Ok(())
}

#[test]
fn test_encoder_shared_across_threads() -> Result<()> {
    let encoder = std::sync::Arc::new(iso_date_encoder());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let encoder = encoder.clone();
            std::thread::spawn(move || {
                let person = Person {
                    name: Some(format!("p{i}")),
                    ..Default::default()
                };
                encoder.map(&person)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let xml = handle.join().expect("thread panicked")?;
        assert_eq!(xml, format!("{DECL}<Person><name>p{i}</name></Person>\n"));
    }
    Ok(())
}

#[test]
fn test_map_to_writer_writes_nothing_on_failure() {
    let customer = Customer {
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Default::default()
    };
    let mut out = Vec::new();
    let result = XmlEncoder::compact().map_to_writer(&customer, &mut out);
    assert!(result.is_err());
    assert!(out.is_empty());
}

#[derive(XmlSerializable, Default)]
struct Labels {
    tags: Vec<Option<String>>,
}

#[test]
fn test_absent_collection_elements_keep_their_slot() -> Result<()> {
    init_tracing();
    let labels = Labels {
        tags: vec![Some("x".to_string()), None, Some("y".to_string())],
    };
    for config in [EncoderConfig::compact(), EncoderConfig::compact().with_sink(SinkKind::Stream)] {
        let xml = to_xml_string_with(&labels, &config)?;
        assert_eq!(
            xml,
            format!("{DECL}<Labels><tags>x</tags><tags/><tags>y</tags></Labels>\n")
        );
    }
    Ok(())
}

#[test]
fn test_only_elements_coerced_to_null_are_dropped() -> Result<()> {
    let labels = Labels {
        tags: vec![Some("x".to_string()), Some("drop".to_string()), None],
    };
    let mut encoder = XmlEncoder::compact();
    encoder.add_type(TypeTag::String, |_, value| {
        let unwanted = value.to_text().as_deref() == Some("drop");
        Ok(if unwanted { Value::Null } else { value })
    });
    let xml = encoder.map(&labels)?;
    assert_eq!(xml, format!("{DECL}<Labels><tags>x</tags><tags/></Labels>\n"));
    Ok(())
}

#[test]
fn test_non_finite_prices() -> Result<()> {
    let order = Order {
        number: None,
        lines: vec![
            OrderLine {
                sku: "a".to_string(),
                quantity: 1,
                price: f64::NAN,
            },
            OrderLine {
                sku: "b".to_string(),
                quantity: 1,
                price: f64::NEG_INFINITY,
            },
        ],
    };
    let xml = XmlEncoder::compact().map(&order)?;
    assert!(xml.contains("<price>NAN</price>"));
    assert!(xml.contains("<price>-INF</price>"));
    Ok(())
}
