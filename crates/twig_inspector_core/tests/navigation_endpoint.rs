use std::fs;
use std::path::Path;
use twig_inspector_core::config::NavigationConfig;
use twig_inspector_core::navigation::StaticLocator;
use twig_inspector_core::{
    open_template, FileLinkFormatter, FilesystemLocator, NavigationError, NavigationRequest,
};

fn write_template(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create template dir");
    }
    fs::write(path, "{% block body %}{% endblock %}").expect("write template");
}

fn canonical(path: &Path) -> String {
    path.canonicalize()
        .expect("canonical path")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn marker_link_resolves_to_editor_url() {
    let roots = tempfile::tempdir().expect("temp dir");
    write_template(roots.path(), "emails/welcome.html.twig");

    let locator = FilesystemLocator::new(vec![roots.path().to_path_buf()]);
    let formatter = FileLinkFormatter::new("vscode");
    let request =
        NavigationRequest::from_link("/_template/emails%2Fwelcome.html.twig?line=12", "/_template/")
            .expect("link decodes");

    let url = open_template(&request, &locator, &formatter).expect("template opens");
    let file = canonical(&roots.path().join("emails/welcome.html.twig"));
    assert_eq!(url, format!("vscode://file/{file}:12"));
}

#[test]
fn namespaced_templates_use_their_own_roots() {
    let main = tempfile::tempdir().expect("main root");
    let admin = tempfile::tempdir().expect("admin root");
    write_template(admin.path(), "list.html.twig");

    let config = NavigationConfig {
        template_roots: vec![main.path().to_path_buf()],
        namespaced_roots: [("Admin".to_string(), vec![admin.path().to_path_buf()])]
            .into_iter()
            .collect(),
        ..NavigationConfig::default()
    };
    let locator = FilesystemLocator::from_config(&config);
    let formatter = FileLinkFormatter::new("editor://open?file=%f&line=%l");

    let url = open_template(
        &NavigationRequest::new("@Admin/list.html.twig", 3),
        &locator,
        &formatter,
    )
    .expect("namespaced template opens");
    let file = canonical(&admin.path().join("list.html.twig"));
    assert_eq!(url, format!("editor://open?file={file}&line=3"));

    let err = open_template(&NavigationRequest::new("@Shop/list.html.twig", 3), &locator, &formatter)
        .expect_err("unknown namespace");
    assert_eq!(err, NavigationError::TemplateNotFound("@Shop/list.html.twig".to_string()));
}

#[test]
fn rejections_carry_client_error_statuses() {
    let root = tempfile::tempdir().expect("temp dir");
    write_template(root.path(), "a.html.twig");
    let locator = FilesystemLocator::new(vec![root.path().to_path_buf()]);
    let formatter = FileLinkFormatter::new("vscode");

    let cases = [
        (NavigationRequest::new("", 1), 400),
        (NavigationRequest::new("../a.html.twig", 1), 400),
        (NavigationRequest::new("/etc/passwd", 1), 400),
        (NavigationRequest::new("a.html.twig", 0), 400),
        (NavigationRequest::new("a.html.twig", -4), 400),
        (NavigationRequest::new("missing.html.twig", 1), 404),
    ];
    for (request, status) in cases {
        let err = open_template(&request, &locator, &formatter)
            .expect_err("request must be rejected");
        assert_eq!(err.status(), status, "{} -> {err}", request.template);
    }
}

#[test]
fn non_numeric_line_is_rejected_after_decoding() {
    let root = tempfile::tempdir().expect("temp dir");
    write_template(root.path(), "a.html.twig");
    let locator = FilesystemLocator::new(vec![root.path().to_path_buf()]);

    let request = NavigationRequest::from_link("/_template/a.html.twig?line=x", "/_template/")
        .expect("link decodes");
    let err = open_template(&request, &locator, &FileLinkFormatter::new("vscode"))
        .expect_err("line 0 is invalid");
    assert_eq!(err, NavigationError::InvalidLine(0));
}

#[cfg(unix)]
#[test]
fn symlink_escaping_the_roots_is_rejected() {
    let root = tempfile::tempdir().expect("root");
    let outside = tempfile::tempdir().expect("outside");
    write_template(outside.path(), "secret.html.twig");
    std::os::unix::fs::symlink(
        outside.path().join("secret.html.twig"),
        root.path().join("link.html.twig"),
    )
    .expect("symlink");

    let locator = FilesystemLocator::new(vec![root.path().to_path_buf()]);
    let err = open_template(
        &NavigationRequest::new("link.html.twig", 1),
        &locator,
        &FileLinkFormatter::new("vscode"),
    )
    .expect_err("escaping symlink");
    assert!(matches!(err, NavigationError::OutsideRoots(_)));
    assert_eq!(err.status(), 400);
}

#[test]
fn static_locator_skips_root_containment() {
    let mut locator = StaticLocator::new();
    locator.insert("inline.html.twig", "/srv/app/var/cache/inline.html.twig");
    let formatter = FileLinkFormatter::new("phpstorm");

    let url = open_template(&NavigationRequest::new("inline.html.twig", 5), &locator, &formatter)
        .expect("static template opens");
    assert_eq!(url, "phpstorm://open?file=/srv/app/var/cache/inline.html.twig&line=5");
}
