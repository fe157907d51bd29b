//! Analog pin access. These forms carry no category.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::model::{fields, Arg, Capability, FieldMap, Template};
use crate::registry::Form;
use crate::Result;
use super::{group, parse_int};

const PINS: [(&str, &str); 3] = [("0", "0"), ("1", "1"), ("2", "2")];

pub(super) fn microbit_pin_read() -> Result<Form> {
    let template = Template::expression("read analog pin %1", Some(Capability::Number))
        .arg(Arg::dropdown("PIN", &PINS))
        .tooltip("Read analog value from pin");
    Ok(Form::new("microbit_pin_read", template, r"pin(\d+)\.read_analog\(\)", encode_pin_read)?
        .with_decode(|caps| Ok(fields([("PIN", group(caps, 1))]))))
}

fn encode_pin_read(input: &EncodeInput<'_>) -> Result<Fragment> {
    let pin = input.field_or("PIN", "0");
    Ok(Fragment::expression(format!("pin{pin}.read_analog()"), Precedence::CALL))
}

pub(super) fn microbit_pin_write() -> Result<Form> {
    let template = Template::statement("write analog pin %1 value %2")
        .arg(Arg::dropdown("PIN", &PINS))
        .arg(Arg::bounded("VALUE", 512.0, 0.0, 1023.0))
        .tooltip("Write analog value to pin");
    Ok(Form::new(
        "microbit_pin_write",
        template,
        r"pin(\d+)\.write_analog\((\d+)\)",
        encode_pin_write,
    )?
    .with_decode(decode_pin_write))
}

fn decode_pin_write(caps: &Captures<'_>) -> Result<FieldMap> {
    let mut map = fields([("PIN", group(caps, 1))]);
    map.insert("VALUE".into(), parse_int("microbit_pin_write", caps, 2)?);
    Ok(map)
}

fn encode_pin_write(input: &EncodeInput<'_>) -> Result<Fragment> {
    Ok(Fragment::statement(format!(
        "pin{}.write_analog({})\n",
        input.field_or("PIN", "0"),
        input.field_or("VALUE", "512"),
    )))
}
