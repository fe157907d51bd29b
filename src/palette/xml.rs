//! Blockly toolbox XML rendering of a catalog.

use super::{Catalog, CatalogCategory, PaletteEntry};

const HEADER: &str =
    r#"<xml xmlns="https://developers.google.com/blockly/xml" id="toolbox-categories" style="display: none">"#;

impl Catalog {
    /// Toolbox document in the shape the editor host loads.
    pub fn to_toolbox_xml(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for category in &self.categories {
            write_category(&mut out, category);
        }
        out.push_str("</xml>");
        out
    }
}

fn write_category(out: &mut String, category: &CatalogCategory) {
    let open = format!(
        r#"  <category name="{}" colour="{}""#,
        escape(&category.label()),
        escape(&category.colour.to_string())
    );
    if let Some(custom) = &category.custom {
        out.push_str(&format!("{open} custom=\"{}\"></category>\n", escape(custom)));
        return;
    }
    out.push_str(&open);
    out.push_str(">\n");
    for entry in &category.entries {
        out.push_str("    ");
        out.push_str(&block_xml(entry));
        out.push('\n');
    }
    out.push_str("  </category>\n");
}

fn block_xml(entry: &PaletteEntry) -> String {
    let mut xml = format!(r#"<block type="{}">"#, escape(&entry.type_name));
    for (name, value) in &entry.fields {
        xml.push_str(&format!(
            "\n      <field name=\"{}\">{}</field>",
            escape(name),
            escape(&value.to_string())
        ));
    }
    for (slot, shadow) in &entry.shadows {
        xml.push_str(&format!(
            "\n      <value name=\"{}\">\n        <shadow type=\"{}\">\n          <field name=\"{}\">{}</field>\n        </shadow>\n      </value>",
            escape(slot),
            escape(&shadow.type_name),
            escape(&shadow.field),
            escape(&shadow.value.to_string()),
        ));
    }
    xml.push_str("\n    </block>");
    xml
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
