//! End-to-end tests for palette projection and its toolbox rendering.

use blockbridge::config::ShadowSpec;
use blockbridge::palette::project;
use blockbridge::{
    Arg, Capability, Colour, Config, EncodeInput, Form, Fragment, PaletteOptions, Registry,
    Template, Transducer, Value,
};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Helper: small registries
// ============================================================================

fn noop(_: &EncodeInput<'_>) -> blockbridge::Result<Fragment> {
    Ok(Fragment::statement(""))
}

fn form(type_name: &str, category: Option<&str>) -> Form {
    let template = Template::statement(type_name)
        .arg(Arg::number("LEVEL", 3.0))
        .arg(Arg::value("AMOUNT", Some(Capability::Number)));
    let form = Form::new(type_name, template, &format!("^{type_name}$"), noop).unwrap();
    match category {
        Some(category) => form.with_category(category),
        None => form,
    }
}

fn names(registry: &Registry, options: &PaletteOptions) -> Vec<String> {
    project(registry, options).categories.into_iter().map(|c| c.name).collect()
}

// ============================================================================
// 1. Built-in catalog
// ============================================================================

#[test]
fn test_builtin_category_order() {
    init_tracing();
    let catalog = Transducer::builtin().unwrap().palette();
    let order: Vec<_> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        order,
        ["Basic", "Input", "Music", "Led", "Logic", "Variables", "Math", "Uncategorized"]
    );
}

#[test]
fn test_every_form_listed_once() {
    let bridge = Transducer::builtin().unwrap();
    let catalog = bridge.palette();
    let listed: usize = catalog.categories.iter().map(|c| c.entries.len()).sum();
    let variables = bridge.registry().forms().filter(|f| f.category() == Some("Variables")).count();
    assert_eq!(listed + variables, bridge.registry().len());
}

#[test]
fn test_forms_without_category_land_in_uncategorized() {
    let catalog = Transducer::builtin().unwrap().palette();
    let entries: Vec<_> = catalog
        .category("Uncategorized")
        .unwrap()
        .entries
        .iter()
        .map(|e| e.type_name.as_str())
        .collect();
    assert_eq!(entries, ["microbit_accelerometer", "microbit_pin_read", "microbit_pin_write"]);
}

#[test]
fn test_entry_defaults_and_shadows() {
    let catalog = Transducer::builtin().unwrap().palette();
    let basic = catalog.category("Basic").unwrap();

    let show_number = basic.entries.iter().find(|e| e.type_name == "show_number").unwrap();
    assert_eq!(show_number.shadows["NUM"], ShadowSpec::new("math_number", "NUM", 0));

    let show_string = basic.entries.iter().find(|e| e.type_name == "show_string").unwrap();
    assert_eq!(show_string.shadows["TEXT"].value, Value::from("Hello!"));

    let pause = basic.entries.iter().find(|e| e.type_name == "pause").unwrap();
    assert_eq!(pause.fields["TIME"], Value::Int(1000));
}

// ============================================================================
// 2. Empty and unlisted categories
// ============================================================================

#[test]
fn test_empty_categories_omitted_except_dynamic() {
    let mut registry = Registry::new();
    registry.register(form("beep", Some("Music"))).unwrap();

    assert_eq!(names(&registry, &PaletteOptions::default()), ["Music", "Variables"]);
    assert!(project(&registry, &PaletteOptions::default())
        .category("Variables")
        .unwrap()
        .entries
        .is_empty());
}

#[test]
fn test_unlisted_category_comes_last() {
    let mut registry = Registry::new();
    registry.register(form("probe", Some("Sensors"))).unwrap();
    registry.register(form("blink", Some("Led"))).unwrap();

    let catalog = project(&registry, &PaletteOptions::default());
    let sensors = catalog.categories.last().unwrap();
    assert_eq!(sensors.name, "Sensors");
    assert_eq!(sensors.colour, Colour::Hex("#999999ff".into()));
    assert_eq!(sensors.label(), "📋 Sensors");
}

#[test]
fn test_configured_order_from_json() {
    let config = Config::from_json(
        r##"{
            "palette": {
                "categories": [
                    { "name": "Led", "colour": 10, "icon": "*" },
                    { "name": "Music", "colour": "#000000", "icon": "~" },
                    { "name": "Led", "colour": 20, "icon": "!" }
                ],
                "default_category": "Other"
            }
        }"##,
    )
    .unwrap();
    let mut registry = Registry::new();
    registry.register(form("beep", Some("Music"))).unwrap();
    registry.register(form("blink", Some("Led"))).unwrap();
    registry.register(form("loose", None)).unwrap();

    let catalog = project(&registry, &config.palette);
    assert_eq!(names(&registry, &config.palette), ["Led", "Music", "Other"]);
    assert_eq!(catalog.categories[0].colour, Colour::Hue(10.0));
}

#[test]
fn test_slot_shadows_from_json() {
    let config = Config::from_json(
        r#"{
            "palette": {
                "slot_shadows": {
                    "mix": { "INPUT": { "type_name": "text", "field": "TEXT", "value": "hum" } }
                }
            }
        }"#,
    )
    .unwrap();
    let mut registry = Registry::new();
    registry.register(form("beep", Some("Music"))).unwrap();
    let template = Template::statement("mix %1").arg(Arg::value("INPUT", None));
    registry
        .register(Form::new("mix", template, "^mix$", noop).unwrap().with_category("Music"))
        .unwrap();

    let catalog = project(&registry, &config.palette);
    let music = &catalog.category("Music").unwrap().entries;
    assert_eq!(music[0].shadows.get("AMOUNT"), Some(&ShadowSpec::new("math_number", "NUM", 0)));
    assert_eq!(music[1].shadows.get("INPUT"), Some(&ShadowSpec::new("text", "TEXT", "hum")));
}

// ============================================================================
// 3. Toolbox XML
// ============================================================================

#[test]
fn test_toolbox_xml_layout() {
    let mut registry = Registry::new();
    registry.register(form("beep", Some("Music"))).unwrap();

    let xml = project(&registry, &PaletteOptions::default()).to_toolbox_xml();
    assert_eq!(
        xml,
        concat!(
            r#"<xml xmlns="https://developers.google.com/blockly/xml" id="toolbox-categories" style="display: none">"#,
            "\n",
            r##"  <category name="🎵 Music" colour="#D32F2F">"##,
            "\n",
            r#"    <block type="beep">"#,
            "\n",
            r#"      <field name="LEVEL">3</field>"#,
            "\n",
            r#"      <value name="AMOUNT">"#,
            "\n",
            r#"        <shadow type="math_number">"#,
            "\n",
            r#"          <field name="NUM">0</field>"#,
            "\n",
            "        </shadow>\n",
            "      </value>\n",
            "    </block>\n",
            "  </category>\n",
            r##"  <category name="📦 Variables" colour="#A64D79" custom="VARIABLE"></category>"##,
            "\n",
            "</xml>",
        )
    );
}

#[test]
fn test_catalog_json_names_entries() {
    let json = Transducer::builtin().unwrap().palette().to_json().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &doc["categories"][0];
    assert_eq!(first["name"], "Basic");
    assert_eq!(first["entries"][0]["type_name"], "show_string");
}
