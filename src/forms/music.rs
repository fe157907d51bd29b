//! Music category.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment};
use crate::model::{fields, Arg, FieldMap, Template};
use crate::registry::Form;
use crate::Result;
use super::{group, parse_int};

const BEATS: [(&str, &str); 6] = [
    ("1", "1"),
    ("1/2", "0.5"),
    ("1/4", "0.25"),
    ("1/8", "0.125"),
    ("2", "2"),
    ("4", "4"),
];

pub(super) fn music_play_tone() -> Result<Form> {
    let template = Template::statement("play tone %1 for %2 beat %3")
        .arg(Arg::dropdown(
            "NOTE",
            &[
                ("Middle C", "262"),
                ("Middle D", "294"),
                ("Middle E", "330"),
                ("Middle F", "349"),
                ("Middle G", "392"),
                ("Middle A", "440"),
                ("Middle B", "494"),
            ],
        ))
        .arg(Arg::dropdown("DURATION", &BEATS))
        .arg(Arg::dropdown(
            "MODE",
            &[
                ("until done", "until_done"),
                ("in background", "background"),
                ("looping in background", "loop"),
            ],
        ))
        .tooltip("Play a tone of specific frequency and duration");
    Ok(Form::new(
        "music_play_tone",
        template,
        r"music\.play_tone\((\d+),\s*(\d+(?:\.\d+)?)\)",
        encode_play_tone,
    )?
    .with_category("Music")
    .with_decode(decode_play_tone))
}

fn decode_play_tone(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([
        ("NOTE", group(caps, 1)),
        ("DURATION", group(caps, 2)),
        ("MODE", "until_done"),
    ]))
}

/// Looping mode sustains the tone instead of playing it once.
fn encode_play_tone(input: &EncodeInput<'_>) -> Result<Fragment> {
    let freq = input.field_or("NOTE", "262");
    if input.field_text("MODE") == "loop" {
        return Ok(Fragment::statement(format!("music.ring_tone({freq})\n")));
    }
    let duration = input.field_or("DURATION", "1");
    Ok(Fragment::statement(format!("music.play_tone({freq}, {duration})\n")))
}

pub(super) fn music_ring_tone() -> Result<Form> {
    let template = Template::statement("ring tone (Hz) %1")
        .arg(Arg::bounded("FREQ", 262.0, 100.0, 10000.0))
        .tooltip("Continuously play a tone at the given frequency");
    Ok(Form::new("music_ring_tone", template, r"music\.ring_tone\((\d+)\)", |input| {
        Ok(Fragment::statement(format!("music.ring_tone({})\n", input.field_or("FREQ", "262"))))
    })?
    .with_category("Music")
    .with_decode(|caps| Ok(fields([("FREQ", parse_int("music_ring_tone", caps, 1)?)]))))
}

pub(super) fn music_rest() -> Result<Form> {
    let template = Template::statement("rest for %1 beat")
        .arg(Arg::dropdown("DURATION", &BEATS))
        .tooltip("Pause playback for a number of beats");
    Ok(Form::new("music_rest", template, r"music\.rest\((\d+(?:\.\d+)?)\)", |input| {
        Ok(Fragment::statement(format!("music.rest({})\n", input.field_or("DURATION", "1"))))
    })?
    .with_category("Music")
    .with_decode(|caps| Ok(fields([("DURATION", group(caps, 1))]))))
}
