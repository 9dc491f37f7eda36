use std::{fs, path::Path};

use prerender::{
    config::{OneOrMany, RawOptions, TestPattern, WriteFailurePolicy},
    read_config, Build, Options, OptionsInput, TemplatePlugin,
};

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn scenario() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    write(&templates, "index.tera", "<h1>{{ title }}</h1>");
    write(&templates, "about.tera", "<h2>About {{ title }}</h2>");
    write(&templates, "readme.md", "# not a template {{");
    write(
        dir.path(),
        "prerender.toml",
        r#"
        context = "templates"
        output = "public"
        test = "*.tera"

        [data]
        title = "Hi"
        "#,
    );

    dir
}

fn build_for(options: Options) -> Build {
    Build::new().with_hook(TemplatePlugin::new(options))
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[tokio::test]
async fn renders_matching_templates() {
    let dir = scenario();
    let options = read_config(dir.path()).await.unwrap();
    let report = build_for(options).run().await.unwrap();

    let public = dir.path().join("public");
    assert_eq!(sorted_names(&public), vec!["about.html", "index.html"]);
    assert_eq!(
        fs::read_to_string(public.join("index.html")).unwrap(),
        "<h1>Hi</h1>"
    );
    assert_eq!(
        fs::read_to_string(public.join("about.html")).unwrap(),
        "<h2>About Hi</h2>"
    );

    let mut written = report.written.clone();
    written.sort();
    assert_eq!(
        written,
        vec![public.join("about.html"), public.join("index.html")]
    );

    let templates = dir.path().join("templates");
    assert!(report.file_dependencies.contains(&templates));
    assert!(report
        .file_dependencies
        .contains(&templates.join("readme.md")));
}

#[tokio::test]
async fn unmatched_broken_templates_are_not_compiled() {
    let dir = scenario();
    let templates = dir.path().join("templates");
    write(&templates, "drafts/wip.tera", "{% if %}");
    write(&templates, "notes.txt", "{% if %}");

    build_for(read_config(dir.path()).await.unwrap())
        .run()
        .await
        .unwrap();

    let public = dir.path().join("public");
    assert_eq!(
        fs::read_to_string(public.join("index.html")).unwrap(),
        "<h1>Hi</h1>"
    );
    assert!(!public.join("drafts").exists());
}

#[tokio::test]
async fn rebuilding_is_idempotent() {
    let dir = scenario();
    let build = build_for(read_config(dir.path()).await.unwrap());
    let public = dir.path().join("public");

    build.run().await.unwrap();
    let first = fs::read(public.join("index.html")).unwrap();
    build.run().await.unwrap();
    let second = fs::read(public.join("index.html")).unwrap();

    assert_eq!(first, second);
    assert_eq!(sorted_names(&public), vec!["about.html", "index.html"]);
}

#[tokio::test]
async fn undefined_data_writes_nothing() {
    let dir = scenario();
    write(
        &dir.path().join("templates"),
        "broken.tera",
        "{{ not_in_data }}",
    );

    let result = build_for(read_config(dir.path()).await.unwrap()).run().await;

    assert!(result.is_err());
    assert!(!dir.path().join("public").exists());
}

#[tokio::test]
async fn bare_include_list_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "templates/partials/nav.tera", "<nav/>");
    write(
        dir.path(),
        "templates/page.tera",
        r#"{% include "partials/nav.tera" %}<p>page</p>"#,
    );

    let options = Options::from(OptionsInput::from(vec!["partials/*.tera".to_owned()]))
        .with_base_dir(dir.path());
    assert_eq!(options.include, vec!["partials/*.tera"]);

    build_for(options).run().await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("public/page.html")).unwrap(),
        "<nav/><p>page</p>"
    );
}

#[tokio::test]
async fn recursive_context_mirrors_layout() {
    let dir = tempfile::tempdir().unwrap();
    let context = dir.path().join("src");
    write(&context, "layout.tera", "<body>{% block main %}{% endblock %}</body>");
    write(
        &context,
        "docs/guide.tera",
        r#"{% extends "layout.tera" %}{% block main %}{{ name }}{% endblock %}"#,
    );

    let options = Options::from(OptionsInput::from(RawOptions {
        context: Some(context.clone()),
        output: Some(dir.path().join("out")),
        test: Some(TestPattern::Regex {
            regex: "^docs/".into(),
        }),
        include: Some(OneOrMany::One("*.tera".into())),
        recursive: true,
        data: Some(toml::from_str(r#"name = "guide""#).unwrap()),
        ..Default::default()
    }));

    build_for(options).run().await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("out/docs/guide.html")).unwrap(),
        "<body>guide</body>"
    );
    assert!(!dir.path().join("out/layout.html").exists());
}

#[tokio::test]
async fn names_without_source_suffix_keep_their_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "templates/robots.txt", "User-agent: {{ agent }}");

    let options = Options::from(OptionsInput::from(RawOptions {
        test: Some(TestPattern::Glob("*.txt".into())),
        data: Some(toml::from_str(r#"agent = "*""#).unwrap()),
        ..Default::default()
    }))
    .with_base_dir(dir.path());

    build_for(options).run().await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("public/robots.txt")).unwrap(),
        "User-agent: *"
    );
}

#[tokio::test]
async fn write_failures_follow_policy() {
    let dir = scenario();
    fs::write(dir.path().join("public"), "occupied").unwrap();

    let options = read_config(dir.path()).await.unwrap();
    assert!(build_for(options.clone()).run().await.is_err());

    let lenient = Options {
        on_write_error: WriteFailurePolicy::Log,
        ..options
    };
    let report = build_for(lenient).run().await.unwrap();
    assert!(report.written.is_empty());
}
