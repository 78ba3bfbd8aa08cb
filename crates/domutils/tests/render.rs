//! Serializer behaviour on loaded trees, before and after edits.

use domutils::{get_text, Attributes, DomService, DomServiceConfig, RenderOptions};

const PAGE: &str = r#"{
  "type": "root",
  "children": [
    { "type": "directive", "name": "!doctype", "data": "!DOCTYPE html" },
    { "type": "tag", "name": "html", "children": [
      { "type": "tag", "name": "head", "children": [
        { "type": "tag", "name": "meta", "attribs": { "charset": "utf-8" } },
        { "type": "style", "name": "style", "children": [
          { "type": "text", "data": "a > b { color: red }" }
        ]}
      ]},
      { "type": "tag", "name": "body", "attribs": { "class": "main", "data-x": "1 & 2" }, "children": [
        { "type": "comment", "data": " nav " },
        { "type": "tag", "name": "p", "children": [
          { "type": "text", "data": "Fish & Chips" },
          { "type": "tag", "name": "br" },
          { "type": "text", "data": "café" }
        ]},
        { "type": "tag", "name": "input", "attribs": { "type": "checkbox", "checked": "" } },
        { "type": "tag", "name": "svg", "attribs": { "viewBox": "0 0 1 1" }, "children": [
          { "type": "tag", "name": "circle", "attribs": { "r": "1" } }
        ]}
      ]}
    ]}
  ]
}"#;

fn load(options: RenderOptions) -> DomService {
    let mut service = DomService::with_config(DomServiceConfig { render: options });
    let root = service.load_str(PAGE).unwrap();
    service.arena().verify_links(root).unwrap();
    service
}

#[test]
fn renders_html_mode_without_escaping() {
    let service = load(RenderOptions::default());

    assert_eq!(
        service.render_document().unwrap(),
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">",
            "<style>a > b { color: red }</style></head>",
            "<body class=\"main\" data-x=\"1 & 2\"><!-- nav -->",
            "<p>Fish & Chips<br>café</p>",
            "<input type=\"checkbox\" checked>",
            "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>",
            "</body></html>"
        )
    );
}

#[test]
fn renders_html_mode_with_escaping() {
    let service = load(RenderOptions {
        decode_entities: true,
        xml_mode: false,
    });

    assert_eq!(
        service.render_document().unwrap(),
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">",
            "<style>a > b { color: red }</style></head>",
            "<body class=\"main\" data-x=\"1 &amp; 2\"><!-- nav -->",
            "<p>Fish &amp; Chips<br>caf&#xE9;</p>",
            "<input type=\"checkbox\" checked>",
            "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>",
            "</body></html>"
        )
    );
}

#[test]
fn renders_xml_mode() {
    let service = load(RenderOptions {
        decode_entities: false,
        xml_mode: true,
    });

    assert_eq!(
        service.render_document().unwrap(),
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"/>",
            "<style>a > b { color: red }</style></head>",
            "<body class=\"main\" data-x=\"1 & 2\"><!-- nav -->",
            "<p>Fish & Chips<br/>café</p>",
            "<input type=\"checkbox\" checked/>",
            "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>",
            "</body></html>"
        )
    );
}

#[test]
fn edits_show_up_in_output() {
    let mut service = load(RenderOptions::default());
    let root = service.arena().root_id().unwrap();
    let arena = service.arena_mut();

    // Tag searches skip the root node itself, so start from its children
    let top = arena.children(root).to_vec();
    let body = arena.find_by_tag(&top, "body")[0];
    let p = arena.find_by_tag(&top, "p")[0];
    let input = arena.find_by_tag(&top, "input")[0];
    let svg = arena.find_by_tag(&top, "svg")[0];
    assert!(arena.find_by_tag(&[root], "body").is_empty());

    // Move the input in front of the paragraph, drop the svg
    arena.insert_before(p, input).unwrap();
    arena.detach(svg).unwrap();

    // Swap the comment for a heading
    let comment = arena.children(body)[0];
    let h1 = arena.create_tag("h1", Attributes::new());
    let title = arena.create_text("Menu");
    arena.append_child(h1, title).unwrap();
    arena.replace(comment, h1).unwrap();

    let hr = arena.create_tag("hr", Attributes::new());
    arena.insert_after(p, hr).unwrap();
    arena.verify_links(root).unwrap();

    assert_eq!(
        service.inner_html(body).unwrap(),
        concat!(
            "<h1>Menu</h1>",
            "<input type=\"checkbox\" checked>",
            "<p>Fish & Chips<br>café</p>",
            "<hr>"
        )
    );
    assert_eq!(service.outer_html(svg).unwrap(), "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"/></svg>");
}

#[test]
fn text_and_search_over_loaded_tree() {
    let service = load(RenderOptions::default());
    let arena = service.arena();
    let root = arena.root_id().unwrap();
    let html = arena.children(root)[1];

    assert_eq!(
        get_text(arena, &[html]),
        "a > b { color: red } nav Fish & Chipscafé"
    );

    let with_attrs = arena.filter(|n| !n.attributes.is_empty(), &[root], true, Some(2));
    assert_eq!(with_attrs.len(), 2);
    assert!(arena.exists_one(|n| n.attr("checked").is_some(), &[html]));
    assert_eq!(
        arena.find_one(|n| n.tag_name() == Some("circle"), &[html]).and_then(|id| arena.name(id)),
        Some("circle")
    );
}
