use elemap::{ClassRegistry, MappedObject, Properties, Property, Result, Value, map_str};

#[derive(Default, Properties)]
struct Order {
    number: Property,
    item: Property,
    product_code: Property,
}
impl MappedObject for Order {}

#[derive(Default, Properties)]
struct Item {
    text: Property,
}
impl MappedObject for Item {}

fn registry() -> ClassRegistry {
    ClassRegistry::new().with::<Order>("order").with::<Item>("item")
}

#[test]
fn test_order_with_repeated_items() -> Result<()> {
    let objects = map_str("<order><item>A</item><item>B</item></order>", registry())?;
    assert_eq!(objects.len(), 1);

    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    let items: Vec<&Item> = order.item.objects::<Item>().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text.text(), Some("A"));
    assert_eq!(items[1].text.text(), Some("B"));
    Ok(())
}

#[test]
fn test_single_occurrence_stays_scalar() -> Result<()> {
    let objects = map_str("<order><item>A</item></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");

    assert!(matches!(order.item.get(), Some(Value::Object(_))));
    assert_eq!(order.item.values().len(), 1);
    Ok(())
}

#[test]
fn test_promotion_keeps_document_order() -> Result<()> {
    let xml = "<order><item>A</item><item>B</item><item>C</item></order>";
    let objects = map_str(xml, registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");

    assert!(order.item.get().is_some_and(Value::is_list));
    let texts: Vec<&str> = order
        .item
        .objects::<Item>()
        .filter_map(|item| item.text.text())
        .collect();
    assert_eq!(texts, ["A", "B", "C"]);
    Ok(())
}

#[test]
fn test_leaf_element_maps_as_text() -> Result<()> {
    let objects = map_str("<order><number>42</number></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("42"));
    Ok(())
}

#[test]
fn test_leaf_text_is_verbatim() -> Result<()> {
    let objects = map_str("<order><number> 42 </number></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some(" 42 "));
    Ok(())
}

#[test]
fn test_fragmented_character_data_concatenates() -> Result<()> {
    let objects = map_str("<order><number>4<![CDATA[2]]></number></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("42"));
    Ok(())
}

#[test]
fn test_predefined_entity_references_in_text() -> Result<()> {
    let objects = map_str("<order><number>A&amp;B &lt;ok&gt;</number></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("A&B <ok>"));
    Ok(())
}

#[test]
fn test_numeric_character_references_in_text() -> Result<()> {
    let objects = map_str("<order><number>x&#65;y&#x42;z</number></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("xAyBz"));
    Ok(())
}

#[test]
fn test_hyphenated_tag_maps_to_snake_case_property() -> Result<()> {
    let objects = map_str("<order><product-code>X1</product-code></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.product_code.text(), Some("X1"));
    Ok(())
}

#[test]
fn test_empty_element_maps_an_object() -> Result<()> {
    let objects = map_str("<order><item/></order>", registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");

    let item = order.item.object::<Item>().expect("an Item");
    assert!(!item.text.is_set());
    Ok(())
}

#[test]
fn test_unregistered_root_is_ignored() -> Result<()> {
    let objects = map_str("<unknown><x>1</x></unknown>", registry())?;
    assert!(objects.is_empty());
    Ok(())
}

#[test]
fn test_unregistered_subtree_does_not_disturb_siblings() -> Result<()> {
    let xml = "<order><mystery><deep>x</deep></mystery><number>7</number></order>";
    let objects = map_str(xml, registry())?;
    assert_eq!(objects.len(), 1);

    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("7"));
    Ok(())
}

#[test]
fn test_undeclared_property_is_skipped_silently() -> Result<()> {
    let objects = map_str("<order><nonexistent>x</nonexistent></order>", registry())?;
    assert_eq!(objects.len(), 1);
    Ok(())
}

#[test]
fn test_pretty_printed_document() -> Result<()> {
    let xml = "<?xml version=\"1.0\"?>\n<order>\n  <item>A</item>\n  <item>B</item>\n</order>\n";
    let objects = map_str(xml, registry())?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.item.values().len(), 2);
    Ok(())
}

#[test]
fn test_unclosed_tag_fails() {
    assert!(map_str("<order><item>A", registry()).is_err());
}

#[test]
fn test_mismatched_end_tag_fails() {
    assert!(map_str("<order><item>A</wrong></order>", registry()).is_err());
}

#[test]
fn test_maps_from_a_buffered_reader() -> Result<()> {
    use elemap::XmlMapper;

    let xml: &[u8] = b"<order><number>7</number></order>";
    let objects = XmlMapper::new(xml, registry()).parse()?;
    let order = objects[0].downcast_ref::<Order>().expect("an Order");
    assert_eq!(order.number.text(), Some("7"));
    Ok(())
}

#[test]
fn test_parse_is_deterministic() -> Result<()> {
    let xml = "<order><item>A</item><item>B</item><number>9</number></order>";
    let texts = |objects: &[Box<dyn MappedObject>]| -> Vec<String> {
        let order = objects[0].downcast_ref::<Order>().expect("an Order");
        order
            .item
            .objects::<Item>()
            .filter_map(|item| item.text.text())
            .map(str::to_owned)
            .collect()
    };

    let first = map_str(xml, registry())?;
    let second = map_str(xml, registry())?;
    assert_eq!(texts(&first), texts(&second));
    Ok(())
}
