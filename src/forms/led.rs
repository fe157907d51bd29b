//! Led category: single-pixel control and raw 0/1 images.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::model::{fields, Arg, Capability, FieldMap, Template};
use crate::registry::Form;
use crate::Result;
use super::{group, parse_int};

const DARK_PATTERN: &str = "00000\n00000\n00000\n00000\n00000";

fn coordinates(template: Template) -> Template {
    template
        .arg(Arg::bounded("X", 0.0, 0.0, 4.0))
        .arg(Arg::bounded("Y", 0.0, 0.0, 4.0))
}

fn decode_xy(type_name: &str, caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([
        ("X", parse_int(type_name, caps, 1)?),
        ("Y", parse_int(type_name, caps, 2)?),
    ]))
}

fn call_xy(input: &EncodeInput<'_>, function: &str) -> String {
    format!("{function}({}, {})", input.field_or("X", "0"), input.field_or("Y", "0"))
}

// ============================================================================
// plot / unplot / toggle
// ============================================================================

pub(super) fn plot_led() -> Result<Form> {
    let template = coordinates(Template::statement("plot x: %1 y: %2")).tooltip("Turn on LED at (x, y)");
    Ok(Form::new("plot_led", template, r"led\.plot\((\d+),\s*(\d+)\)", |input| {
        Ok(Fragment::statement(call_xy(input, "led.plot") + "\n"))
    })?
    .with_category("Led")
    .gated()
    .with_decode(|caps| decode_xy("plot_led", caps)))
}

pub(super) fn unplot_led() -> Result<Form> {
    let template = coordinates(Template::statement("unplot x: %1 y: %2")).tooltip("Turn off LED at (x, y)");
    Ok(Form::new("unplot_led", template, r"led\.unplot\((\d+),\s*(\d+)\)", |input| {
        Ok(Fragment::statement(call_xy(input, "led.unplot") + "\n"))
    })?
    .with_category("Led")
    .gated()
    .with_decode(|caps| decode_xy("unplot_led", caps)))
}

pub(super) fn toggle_led() -> Result<Form> {
    let template = coordinates(Template::statement("toggle x: %1 y: %2")).tooltip("Toggle LED at (x, y)");
    Ok(Form::new("toggle_led", template, r"led\.toggle\((\d+),\s*(\d+)\)", |input| {
        Ok(Fragment::statement(call_xy(input, "led.toggle") + "\n"))
    })?
    .with_category("Led")
    .gated()
    .with_decode(|caps| decode_xy("toggle_led", caps)))
}

pub(super) fn point_led() -> Result<Form> {
    let template = coordinates(Template::expression("point x: %1 y: %2", Some(Capability::Boolean)))
        .tooltip("Check if LED at (x, y) is on");
    Ok(Form::new("point_led", template, r"led\.point\((\d+),\s*(\d+)\)", |input| {
        Ok(Fragment::expression(call_xy(input, "led.point"), Precedence::CALL))
    })?
    .with_category("Led")
    .with_decode(|caps| decode_xy("point_led", caps)))
}

// ============================================================================
// brightness / images
// ============================================================================

pub(super) fn plot_led_brightness() -> Result<Form> {
    let template = coordinates(Template::statement("plot x %1 y %2 brightness %3"))
        .arg(Arg::slider("BRIGHTNESS", 255.0, 0.0, 255.0))
        .tooltip("Plot an LED at (x,y) with brightness 0-255");
    Ok(Form::new(
        "plot_led_brightness",
        template,
        r"led\.plot_brightness\((\d+),\s*(\d+),\s*(\d+)\)",
        encode_plot_led_brightness,
    )?
    .with_category("Led")
    .gated()
    .with_decode(decode_plot_led_brightness))
}

fn decode_plot_led_brightness(caps: &Captures<'_>) -> Result<FieldMap> {
    let mut map = decode_xy("plot_led_brightness", caps)?;
    map.insert("BRIGHTNESS".into(), parse_int("plot_led_brightness", caps, 3)?);
    Ok(map)
}

fn encode_plot_led_brightness(input: &EncodeInput<'_>) -> Result<Fragment> {
    Ok(Fragment::statement(format!(
        "led.plot_brightness({}, {}, {})\n",
        input.field_or("X", "0"),
        input.field_or("Y", "0"),
        input.field_or("BRIGHTNESS", "255"),
    )))
}

pub(super) fn show_leds() -> Result<Form> {
    let template = Template::statement("show leds %1")
        .arg(Arg::multiline("PATTERN", DARK_PATTERN))
        .tooltip("Display pattern on LEDs");
    Ok(Form::new(
        "show_leds",
        template,
        r#"display\.show\(Image\(["']((?:[01]{5}(?:\n|\\n|:)?){5})["']\)\)"#,
        encode_show_leds,
    )?
    .with_category("Led")
    .gated()
    .with_decode(decode_show_leds))
}

/// Accepts rows separated by newlines, escaped `\n` or `:`.
fn decode_show_leds(caps: &Captures<'_>) -> Result<FieldMap> {
    let digits: Vec<char> = group(caps, 1).chars().filter(|c| matches!(c, '0' | '1')).collect();
    let rows: Vec<String> = digits.chunks(5).map(|row| row.iter().collect()).collect();
    Ok(fields([("PATTERN", rows.join("\n"))]))
}

/// Rows are joined with an escaped `\n` so the call stays on one line.
fn encode_show_leds(input: &EncodeInput<'_>) -> Result<Fragment> {
    let pattern = input.field_or("PATTERN", DARK_PATTERN).replace('\r', "");
    Ok(Fragment::statement(format!(
        "display.show(Image(\"{}\"))\n",
        pattern.replace('\n', "\\n")
    )))
}
