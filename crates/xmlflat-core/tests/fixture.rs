use std::thread;

use xml_tree::Document;
use xmlflat_core::{ancestor_matches, extract, ExtractOptions, FlattenError, RecordSet};

const CATALOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<tag1>
    <tag2>
        <item1>1</item1>
        <item2>2</item2>
        <item3 Свойство1="Значение1" prop2="Property2" />
        <itemlist>
            <item3>3</item3>
            <Элемент4>4</Элемент4>
        </itemlist>
    </tag2>
    <tag2>
        <item1>11</item1>
        <item2>22</item2>
        <itemlist>
            <item3>33</item3>
            <Элемент4>44</Элемент4>
        </itemlist>
        <tag2>
            <item>tag2 in tag2</item>
        </tag2>
    </tag2>
</tag1>"#;

fn run(path: &str, options: ExtractOptions) -> RecordSet {
    extract(CATALOG, path, &options).expect("extract records")
}

#[test]
fn single_element_document() {
    let set = extract("<tag>1</tag>", "tag", &ExtractOptions::default()).expect("extract");
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].value("tag"), Some("1"));
}

#[test]
fn search_by_tag_name_anywhere() {
    let set = run("tag2", ExtractOptions::default());
    assert_eq!(set.len(), 3);
    assert_eq!(set[0].value("tag2_item1"), Some("1"));
    assert_eq!(set[0].value("tag2_itemlist_item3"), Some("3"));
    assert_eq!(set[1].value("tag2_itemlist_Элемент4"), Some("44"));
    assert_eq!(set[0].value("tag2_item3_attr_Свойство1"), Some("Значение1"));
    assert_eq!(set[0].value("tag2_item3_attr_prop2"), Some("Property2"));
    assert_eq!(set[0].value("tag2_item3"), Some(""));
    assert_eq!(set[1].get("tag2_item3_attr_prop2"), Some(None));
    assert_eq!(set[2].value("tag2_item"), Some("tag2 in tag2"));
}

#[test]
fn search_under_parent() {
    let set = run("tag1/tag2", ExtractOptions::default());
    assert_eq!(set.len(), 2);
    assert_eq!(set[0].value("tag1_tag2_item2"), Some("2"));
    assert_eq!(set[1].value("tag1_tag2_itemlist_item3"), Some("33"));
    assert_eq!(set[1].value("tag1_tag2_itemlist_Элемент4"), Some("44"));
    assert_eq!(set[1].value("tag1_tag2_tag2_item"), Some("tag2 in tag2"));
}

#[test]
fn search_anchored_at_document() {
    let set = run("[document]/tag1/tag2", ExtractOptions::default());
    assert_eq!(set.len(), 2);
    assert_eq!(set[0].value("[document]_tag1_tag2_item1"), Some("1"));
    assert!(run("[document]/tag2", ExtractOptions::default()).is_empty());
}

#[test]
fn first_level_only() {
    let set = run("tag2", ExtractOptions::new().max_level(1));
    assert!(!set[0].contains_key("tag2_itemlist_item3"));
    assert!(!set[0].contains_key("tag2_itemlist_Элемент4"));
    assert_eq!(set[0].value("tag2_item1"), Some("1"));
    assert_eq!(set[0].value("tag2_item3_attr_prop2"), Some("Property2"));
}

#[test]
fn whole_document() {
    let set = run("", ExtractOptions::default());
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].value("tag1_tag2_item1"), Some("1"));
    assert_eq!(set[0].value("tag1_tag2_itemlist_Элемент4"), Some("4"));
}

#[test]
fn allow_list_keeps_only_listed_columns() {
    let options = ExtractOptions::new().fields(["tag2_itemlist_Элемент4", "tag2_item2"]);
    let set = run("tag2", options);
    assert_eq!(set.columns(), ["tag2_item2", "tag2_itemlist_Элемент4"]);
    assert_eq!(set[0].value("tag2_itemlist_Элемент4"), Some("4"));
    assert!(!set[0].contains_key("tag2_item1"));
    assert_eq!(set[2].get("tag2_item2"), Some(None));
}

#[test]
fn skip_first_tag() {
    let set = run("tag2", ExtractOptions::new().skip_leading_tag(true));
    assert_eq!(set[0].value("item1"), Some("1"));
    assert_eq!(set[1].value("item2"), Some("22"));
    assert_eq!(set[0].value("item3_attr_prop2"), Some("Property2"));
    assert!(!set[0].contains_key("tag2_item1"));
}

#[test]
fn nested_same_name_only_outer_matches_under_parent() {
    let xml = "<tag1><tag2><tag2>x</tag2></tag2></tag1>";
    let set = extract(xml, "tag1/tag2", &ExtractOptions::default()).expect("extract");
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].value("tag1_tag2_tag2"), Some("x"));
}

#[test]
fn check_parent_primitive() {
    let xml = "
        <parent1>
            <parent2>
                <mytag1>1</mytag1>
            </parent2>
        </parent1>";
    let doc = Document::parse(xml).expect("parse xml");
    let mytag = doc.elements_named("mytag1").next().expect("mytag1");
    assert!(ancestor_matches(&doc, mytag, "[document]/parent1/parent2"));
    assert!(ancestor_matches(&doc, mytag, ["[document]", "parent1", "parent2"]));

    let parent1 = doc.elements_named("parent1").next().expect("parent1");
    assert!(ancestor_matches(&doc, parent1, "[document]"));

    let parent2 = doc.elements_named("parent2").next().expect("parent2");
    assert!(ancestor_matches(&doc, parent2, "parent1"));
    assert!(!ancestor_matches(&doc, parent2, "othertag"));
}

#[test]
fn every_record_has_identical_keys() {
    for path in ["tag2", "tag1/tag2", "item3", "itemlist", ""] {
        let set = run(path, ExtractOptions::default());
        let columns = set.columns();
        for record in &set {
            let keys: Vec<&str> = record.keys().collect();
            assert_eq!(keys, columns, "path {path:?}");
        }
    }
}

#[test]
fn malformed_document_is_an_error() {
    let err = extract("<tag1><tag2></tag1>", "tag2", &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, FlattenError::Parse(_)));
}

#[test]
fn parallel_extractions_agree() {
    let expected = run("tag2", ExtractOptions::default());
    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| run("tag2", ExtractOptions::default())))
            .collect();
        for handle in handles {
            let set = handle.join().expect("worker finished");
            assert_eq!(set, expected);
        }
    });
}
