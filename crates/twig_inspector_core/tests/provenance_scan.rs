use twig_inspector_core::{parse_html, MarkerScope, NodeId, ProvenanceStore};

fn scan(html: &str) -> (twig_inspector_core::Document, ProvenanceStore) {
    let doc = parse_html(html);
    let toolbar = doc.first_element_by_class("sf-toolbar");
    let mut store = ProvenanceStore::new();
    store.rebuild(&doc, toolbar);
    (doc, store)
}

fn by_id(doc: &twig_inspector_core::Document, id: &str) -> NodeId {
    doc.element_by_id(id)
        .unwrap_or_else(|| panic!("element #{id} should exist"))
}

fn names(store: &ProvenanceStore, element: NodeId) -> Vec<String> {
    store
        .find(element)
        .map(|tracked| tracked.label_lines())
        .unwrap_or_default()
}

#[test]
fn single_page_marker_attributes_wrapped_div() {
    let (doc, store) = scan(
        "<!-- ┏━ page.html.twig [/_template/page.html.twig?line=3] #a1--><div id=\"x\">Hi</div><!-- ┗━ page.html.twig [/_template/page.html.twig?line=3] #a1-->",
    );

    let tracked = store.find(by_id(&doc, "x")).expect("div#x should be tracked");
    assert_eq!(tracked.provenance.len(), 1);
    assert_eq!(tracked.provenance[0].template_name, "page.html.twig");
    assert_eq!(tracked.provenance[0].link, "/_template/page.html.twig?line=3");
    assert_eq!(tracked.provenance[0].scope, MarkerScope::Template);
}

#[test]
fn only_elements_between_pairs_are_attributed() {
    let (doc, store) = scan(concat!(
        "<body>",
        "<p id=\"before\"></p>",
        "<!-- ┏━ a.html.twig [/_template/a.html.twig?line=1] #p1-->",
        "<p id=\"in-a\"></p>text",
        "<!-- ┗━ a.html.twig [/_template/a.html.twig?line=1] #p1-->",
        "<p id=\"between\"></p>",
        "<!-- ┏━ b.html.twig [/_template/b.html.twig?line=1] #p2-->",
        "<section id=\"in-b\"><span id=\"nested\"></span></section>",
        "<!-- ┗━ b.html.twig [/_template/b.html.twig?line=1] #p2-->",
        "<p id=\"after\"></p>",
        "</body>"
    ));

    assert_eq!(names(&store, by_id(&doc, "in-a")), vec!["a.html.twig"]);
    assert_eq!(names(&store, by_id(&doc, "in-b")), vec!["b.html.twig"]);
    for outside in ["before", "between", "after", "nested"] {
        assert!(
            store.find(by_id(&doc, outside)).is_none(),
            "#{outside} must not be tracked"
        );
    }
    assert_eq!(store.len(), 2);
}

#[test]
fn nested_markers_keep_outer_then_inner_order() {
    let (doc, store) = scan(concat!(
        "<body>",
        "<!-- ┏━ layout.html.twig [/_template/layout.html.twig?line=1] #t1-->",
        "<!-- ╭─ content [/_template/layout.html.twig?line=8] #b1-->",
        "<div id=\"target\"></div>",
        "<!-- ╰─ content [/_template/layout.html.twig?line=8] #b1-->",
        "<!-- ┗━ layout.html.twig [/_template/layout.html.twig?line=1] #t1-->",
        "</body>"
    ));

    let tracked = store.find(by_id(&doc, "target")).expect("tracked");
    let scopes: Vec<_> = tracked.provenance.iter().map(|e| e.scope).collect();
    assert_eq!(names(&store, by_id(&doc, "target")), vec!["layout.html.twig", "content"]);
    assert_eq!(scopes, vec![MarkerScope::Template, MarkerScope::Block]);
    assert_eq!(tracked.provenance[1].template, "layout.html.twig");
}

#[test]
fn same_template_twice_is_not_deduplicated() {
    let (doc, store) = scan(concat!(
        "<!-- ┏━ card.html.twig [/_template/card.html.twig?line=1] #c1-->",
        "<!-- ╭─ card.html.twig [/_template/card.html.twig?line=1] #c2-->",
        "<div id=\"d\"></div>",
        "<!-- ╰─ card.html.twig [/_template/card.html.twig?line=1] #c2-->",
        "<!-- ┗━ card.html.twig [/_template/card.html.twig?line=1] #c1-->"
    ));
    assert_eq!(
        names(&store, by_id(&doc, "d")),
        vec!["card.html.twig", "card.html.twig"]
    );
}

#[test]
fn toolbar_script_style_and_hidden_elements_are_excluded() {
    let (doc, store) = scan(concat!(
        "<body>",
        "<!-- ┏━ page.html.twig [/_template/page.html.twig?line=1] #e1-->",
        "<div id=\"shown\"></div>",
        "<script id=\"js\">var a = 1;</script>",
        "<style id=\"css\">p {}</style>",
        "<div id=\"hidden\" style=\"display: none\"></div>",
        "<div id=\"toolbar\" class=\"sf-toolbar\"></div>",
        "<!-- ┗━ page.html.twig [/_template/page.html.twig?line=1] #e1-->",
        "</body>"
    ));

    assert!(store.find(by_id(&doc, "shown")).is_some());
    for excluded in ["js", "css", "hidden", "toolbar"] {
        assert!(
            store.find(by_id(&doc, excluded)).is_none(),
            "#{excluded} must be excluded"
        );
    }
}

#[test]
fn lookup_is_stable_within_one_scan_and_across_rescans() {
    let html = concat!(
        "<!-- ┏━ a.twig [/_template/a.twig?line=1] #s1-->",
        "<i id=\"one\"></i><i id=\"two\"></i>",
        "<!-- ┗━ a.twig [/_template/a.twig?line=1] #s1-->"
    );
    let doc = parse_html(html);
    let mut store = ProvenanceStore::new();
    store.rebuild(&doc, None);

    let two = by_id(&doc, "two");
    let first = store.find(two).expect("tracked").index;
    let second = store.find(two).expect("tracked").index;
    assert_eq!(first, second);
    assert_eq!(first, 1);

    store.rebuild(&doc, None);
    assert_eq!(store.find(two).expect("tracked after rescan").index, first);
    assert_eq!(store.find(two).expect("tracked").provenance.len(), 1);
}

#[test]
fn mismatched_end_id_walks_to_end_of_siblings() {
    let doc = parse_html(concat!(
        "<body>",
        "<!-- ┏━ a.twig [/_template/a.twig?line=1] #good-->",
        "<div id=\"first\"></div>",
        "<!-- ┗━ a.twig [/_template/a.twig?line=1] #other-->",
        "<div id=\"second\"></div>",
        "</body>",
        "<div id=\"outside-body\"></div>"
    ));
    let mut store = ProvenanceStore::new();
    let summary = store.rebuild(&doc, None);

    assert_eq!(summary.markers, 1);
    assert_eq!(summary.unterminated, 1);
    assert!(store.find(by_id(&doc, "first")).is_some());
    assert!(store.find(by_id(&doc, "second")).is_some());
    assert!(store.find(by_id(&doc, "outside-body")).is_none());
}

#[test]
fn plain_comments_and_markerless_pages_attribute_nothing() {
    let (_, store) = scan("<body><!-- nav --><div></div><!--[if IE]>x<![endif]--></body>");
    assert!(store.is_empty());
}
