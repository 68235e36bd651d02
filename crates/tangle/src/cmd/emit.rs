use serde::Serialize;
use tangle_frame::{encode_emit_event, Color, Event, EventValue};

use crate::cmd::EmitArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, to_hex, OutputFormat};

#[derive(Serialize)]
struct EmitOutput<'a> {
    event: &'a Event,
    lazy: bool,
    payload: String,
}

pub fn run(args: EmitArgs, format: OutputFormat) -> CliResult<i32> {
    let event = build_event(&args)?;
    let payload =
        encode_emit_event(&event, args.lazy).map_err(|err| frame_error("encode failed", err))?;

    match format {
        OutputFormat::Json => print_json(&EmitOutput {
            event: &event,
            lazy: args.lazy,
            payload: to_hex(&payload),
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", to_hex(&payload)),
        OutputFormat::Raw => print_raw(&payload),
    }
    Ok(SUCCESS)
}

fn build_event(args: &EmitArgs) -> CliResult<Event> {
    let value = if let Some(percentage) = args.percentage {
        EventValue::Percentage(percentage)
    } else if let Some(timestamp) = args.timestamp {
        EventValue::Timestamp(timestamp)
    } else if let Some(color) = &args.color {
        EventValue::Color(Color::from_hex(color).map_err(|err| frame_error("--color", err))?)
    } else if let Some(label) = &args.value_label {
        EventValue::Label(label.clone())
    } else {
        EventValue::None
    };

    let event = Event::new(args.label.as_str(), value, args.id);
    if args.lazy {
        return Ok(event);
    }
    Ok(event.with_timestamp(args.at))
}
