//! Generation scenarios over small designs, checked on the formatted output.

use blueprint_define::ApiDefinition;
use blueprint_define::prelude::*;
use blueprint_gen::config::GeneratorConfig;
use blueprint_gen::output::{Generation, generate_files};

fn widget_api() -> ApiDefinition {
    let mut design = Design::new();
    design.api("shop", |api| {
        api.title("Widget shop");
    });
    design.media_type("Widget", "application/vnd.widget+json", |mt| {
        mt.attributes(|a| {
            a.attribute("id", Primitive::Integer);
            a.attribute("name", Primitive::String);
            a.attribute("price", Primitive::Number);
            a.required(["id"]);
        });
        mt.view("default", |v| {
            v.attribute("id").attribute("name").attribute("price");
        });
        mt.view("tiny", |v| {
            v.attribute("id");
        });
    });
    design.resource("widget", |r| {
        r.base_path("/widgets");
        r.media_type("Widget");
        r.canonical_action("show");
        r.action("show", |a| {
            a.get("/:id");
            a.params(|p| {
                p.attribute("id", Primitive::Integer);
                p.required(["id"]);
            });
            a.response_template(OK, &["Widget"]);
            a.response("NotFound");
        });
    });
    design.run().expect("widget design is valid")
}

fn generate(api: &ApiDefinition, config: &GeneratorConfig) -> Generation {
    let generation = generate_files(api, config).expect("generation succeeds");
    assert!(generation.errors.is_empty(), "{:?}", generation.errors);
    generation
}

fn content<'a>(generation: &'a Generation, path: &str) -> &'a str {
    &generation
        .file(path)
        .unwrap_or_else(|| panic!("missing {path}"))
        .content
}

#[test]
fn integer_path_param_becomes_typed_field() {
    let generation = generate(&widget_api(), &GeneratorConfig::default());
    let widget = content(&generation, "src/widget.rs");
    assert!(widget.contains("pub struct ShowWidgetContext"));
    assert!(widget.contains("pub id: i64,"));
    assert!(widget.contains("blueprint_types::coerce::integer"));
    assert!(widget.contains("blueprint_types::coerce::param("));
}

#[test]
fn not_found_sends_empty_body() {
    let generation = generate(&widget_api(), &GeneratorConfig::default());
    let widget = content(&generation, "src/widget.rs");
    assert!(widget.contains("pub fn not_found(&self, resp: &mut dyn blueprint_types::ResponseSender)"));
    assert!(widget.contains("resp.send(404u16, None);"));
}

#[test]
fn several_views_require_a_choice() {
    let generation = generate(&widget_api(), &GeneratorConfig::default());
    let media_types = content(&generation, "src/media_types.rs");
    assert!(media_types.contains("pub enum WidgetView"));
    assert!(media_types.contains("DumpError::ViewRequired"));
    assert!(media_types.contains("fn dump_tiny(&self)"));
    assert!(media_types.contains("\"application/vnd.widget+json\""));
}

#[test]
fn runtime_crate_is_configurable() {
    let config = GeneratorConfig {
        runtime_crate: "shop_runtime".to_string(),
        ..GeneratorConfig::default()
    };
    let generation = generate(&widget_api(), &config);
    let widget = content(&generation, "src/widget.rs");
    assert!(widget.contains("shop_runtime::RequestAccessor"));
    assert!(!widget.contains("blueprint_types"));
}

#[test]
fn lib_carries_api_docs_and_modules() {
    let generation = generate(&widget_api(), &GeneratorConfig::default());
    let lib = content(&generation, "src/lib.rs");
    assert!(lib.contains("Widget shop"));
    assert!(lib.contains("pub mod media_types;"));
    assert!(lib.contains("pub mod widget;"));
    assert!(!lib.contains("pub mod user_types;"));
}

#[test]
fn generated_manifest_is_valid_toml() {
    let config = GeneratorConfig {
        emit_cargo_toml: true,
        package_name: Some("widget-shop".to_string()),
        ..GeneratorConfig::default()
    };
    let generation = generate(&widget_api(), &config);
    let manifest: toml::Table = content(&generation, "Cargo.toml").parse().unwrap();
    assert_eq!(manifest["package"]["name"].as_str(), Some("widget-shop"));
    assert!(manifest["dependencies"].get("blueprint-types").is_some());
}

#[test]
fn implicit_route_params_are_strings() {
    let mut design = Design::new();
    design.api("shop", |_| {});
    design.resource("order", |r| {
        r.base_path("/accounts/:accountID/orders");
        r.action("show", |a| {
            a.get("/:id");
            a.params(|p| {
                p.attribute("id", Primitive::Integer);
            });
            a.response("NoContent");
        });
    });
    let api = design.run().expect("order design is valid");
    let generation = generate(&api, &GeneratorConfig::default());
    let order = content(&generation, "src/order.rs");
    assert!(order.contains("pub account_id: String,"));
    assert!(order.contains("pub id: i64,"));
    assert!(order.contains("\"/accounts/:accountID/orders/:id\""));
}
