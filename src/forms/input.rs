//! Input category: button events and sensors.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::model::{fields, Arg, Capability, FieldMap, Template};
use crate::registry::Form;
use crate::Result;
use super::group;

const BUTTONS: [(&str, &str); 3] = [("A", "A"), ("B", "B"), ("A+B", "AB")];

fn decode_button(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("BUTTON", group(caps, 1).to_uppercase())]))
}

pub(super) fn on_button_pressed() -> Result<Form> {
    let template = Template::event("on button %1 pressed %2")
        .arg(Arg::dropdown("BUTTON", &BUTTONS))
        .arg(Arg::statement("DO"))
        .tooltip("Run when a button is pressed");
    Ok(Form::new(
        "on_button_pressed",
        template,
        r"(?i)^def\s+on_button_pressed_(a|b|ab)\s*\(\s*\)\s*:",
        encode_on_button_pressed,
    )?
    .with_category("Input")
    .container()
    .with_decode(decode_button))
}

/// Handler function followed by its registration call.
fn encode_on_button_pressed(input: &EncodeInput<'_>) -> Result<Fragment> {
    let button = input.field_or("BUTTON", "A");
    let function = format!("on_button_pressed_{}", button.to_lowercase());
    Ok(Fragment::statement(format!(
        "def {function}():\n{}{}\ninput.on_button_pressed(Button.{button}, {function})\n",
        input.globals_line(),
        input.body("DO"),
    )))
}

pub(super) fn button_is_pressed() -> Result<Form> {
    let template = Template::expression("button %1 is pressed", Some(Capability::Boolean))
        .arg(Arg::dropdown("BUTTON", &BUTTONS))
        .tooltip("Check whether a button is currently pressed");
    Ok(Form::new(
        "button_is_pressed",
        template,
        r"input\.button_is_pressed\(\s*Button\.(A|B|AB)\s*\)",
        |input| {
            let button = input.field_or("BUTTON", "A");
            Ok(Fragment::expression(format!("input.button_is_pressed(Button.{button})"), Precedence::CALL))
        },
    )?
    .with_category("Input")
    .with_decode(decode_button))
}

/// Sits outside every named category.
pub(super) fn microbit_accelerometer() -> Result<Form> {
    let template = Template::expression("accelerometer %1", Some(Capability::Number))
        .arg(Arg::dropdown("AXIS", &[("x", "x"), ("y", "y"), ("z", "z")]))
        .tooltip("Get accelerometer reading");
    Ok(Form::new(
        "microbit_accelerometer",
        template,
        r"accelerometer\.get_([xyz])\(\)",
        |input| {
            let axis = input.field_or("AXIS", "x");
            Ok(Fragment::expression(format!("accelerometer.get_{axis}()"), Precedence::CALL))
        },
    )?
    .with_decode(|caps| Ok(fields([("AXIS", group(caps, 1))]))))
}
