//! Literal encoders.
//!
//! Each encoder takes the literal's source text as produced by the tokenizer
//! and appends its tagged bytecode to a [`BufferWriter`].

use std::sync::LazyLock;

use regex::Regex;
use tangle_frame::flags::tngl;
use tangle_frame::{percentage_to_raw, BufferWriter, Color, LABEL_SIZE};

use crate::error::{CompileError, Result};

static DURATION_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-]?(?:\d+\.\d+|\d+|\.\d+))([dhmst])")
        .unwrap_or_else(|err| panic!("bad duration pattern: {err}"))
});

fn invalid(kind: &'static str, text: &str) -> CompileError {
    CompileError::InvalidLiteral {
        kind,
        text: text.to_string(),
    }
}

fn unit_millis(unit: &str) -> f64 {
    match unit {
        "d" => 86_400_000.0,
        "h" => 3_600_000.0,
        "m" => 60_000.0,
        "s" => 1_000.0,
        _ => 1.0,
    }
}

/// Sum of the `<signed-number><unit>` groups in `text`, in milliseconds.
///
/// Accumulated as `f64` and truncated to `i32` (saturating). Returns `None`
/// when `text` holds no group at all.
pub fn parse_timestamp(text: &str) -> Option<i32> {
    let mut total = 0.0f64;
    let mut any = false;
    for caps in DURATION_PART.captures_iter(text) {
        let value: f64 = caps[1].parse().ok()?;
        total += value * unit_millis(&caps[2]);
        any = true;
    }
    any.then_some(total as i32)
}

/// `TIMESTAMP_ZERO` for a zero duration, otherwise `TIMESTAMP` + `i32`.
pub fn compile_timestamp(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let millis = parse_timestamp(text).ok_or_else(|| invalid("timestamp", text))?;
    if millis == 0 {
        writer.write_flag(tngl::TIMESTAMP_ZERO)?;
    } else {
        writer.write_flag(tngl::TIMESTAMP)?;
        writer.write_i32(millis)?;
    }
    Ok(())
}

/// `+Infinity` / `Infinity` to `TIMESTAMP_MAX`, `-Infinity` to `TIMESTAMP_MIN`.
pub fn compile_infinity(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let flag = if text.starts_with('-') {
        tngl::TIMESTAMP_MIN
    } else {
        tngl::TIMESTAMP_MAX
    };
    writer.write_flag(flag)?;
    Ok(())
}

pub fn compile_color(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let color = Color::from_hex(text).map_err(|_| invalid("color", text))?;
    match color {
        Color::WHITE => writer.write_flag(tngl::COLOR_WHITE)?,
        Color::BLACK => writer.write_flag(tngl::COLOR_BLACK)?,
        _ => {
            writer.write_flag(tngl::COLOR)?;
            writer.write_slice(&color.to_bytes())?;
        }
    }
    Ok(())
}

pub fn compile_percentage(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let value: f64 = text
        .trim_end_matches('%')
        .parse()
        .map_err(|_| invalid("percentage", text))?;
    writer.write_flag(tngl::PERCENTAGE)?;
    writer.write_i32(percentage_to_raw(value))?;
    Ok(())
}

/// `LABEL` followed by a 5-byte slot holding the name after `$`.
///
/// Names shorter than five bytes do not clear the rest of the slot; the
/// writer's previous contents show through.
pub fn compile_label(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let name = text.strip_prefix('$').unwrap_or(text);
    writer.write_flag(tngl::LABEL)?;
    writer.write_bytes_unpadded(name.as_bytes(), LABEL_SIZE)?;
    Ok(())
}

/// `PIXELS` + `i16`, saturating at the `i16` bounds.
pub fn compile_pixels(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let count: i64 = text
        .trim_end_matches("px")
        .parse()
        .map_err(|_| invalid("pixels", text))?;
    let count = count.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    writer.write_flag(tngl::PIXELS)?;
    writer.write_i16(count)?;
    Ok(())
}

/// `0xNN` as one raw byte.
pub fn compile_byte(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| invalid("byte", text))?;
    let value = u8::from_str_radix(digits, 16).map_err(|_| invalid("byte", text))?;
    writer.write_u8(value)?;
    Ok(())
}

/// `'c'` as one signed byte holding the low 8 bits of the code point.
pub fn compile_char(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let c = text
        .strip_prefix('\'')
        .and_then(|rest| rest.chars().next())
        .ok_or_else(|| invalid("char", text))?;
    writer.write_i8(c as u32 as u8 as i8)?;
    Ok(())
}

/// `"text"` as its raw bytes followed by a NUL terminator.
pub fn compile_string(writer: &mut BufferWriter, text: &str) -> Result<()> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| invalid("string", text))?;
    writer.write_slice(inner.as_bytes())?;
    writer.write_u8(0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(f: fn(&mut BufferWriter, &str) -> Result<()>, text: &str) -> Vec<u8> {
        let mut writer = BufferWriter::new(64);
        f(&mut writer, text).unwrap();
        writer.as_bytes().to_vec()
    }

    #[test]
    fn timestamp_seconds() {
        let mut expected = vec![tngl::TIMESTAMP];
        expected.extend_from_slice(&1500i32.to_le_bytes());
        assert_eq!(encode(compile_timestamp, "1.5s"), expected);
    }

    #[test]
    fn zero_timestamp_uses_dedicated_tag() {
        assert_eq!(encode(compile_timestamp, "0s"), vec![tngl::TIMESTAMP_ZERO]);
        assert_eq!(encode(compile_timestamp, "1s-1000t"), vec![tngl::TIMESTAMP_ZERO]);
    }

    #[test]
    fn compound_duration_sums_units() {
        let expected = 1.2 * 86_400_000.0 + 9.0 * 3_600_000.0 + 2.0 * 60_000.0 + 7.2 * 1_000.0 - 123.0;
        assert_eq!(parse_timestamp("1.2d+9h2m7.2s-123t"), Some(expected as i32));
        assert_eq!(parse_timestamp("-.5s"), Some(-500));
        assert_eq!(parse_timestamp("nothing"), None);
    }

    #[test]
    fn huge_duration_saturates() {
        assert_eq!(parse_timestamp("100000d"), Some(i32::MAX));
    }

    #[test]
    fn infinity_maps_to_extremes() {
        assert_eq!(encode(compile_infinity, "Infinity"), vec![tngl::TIMESTAMP_MAX]);
        assert_eq!(encode(compile_infinity, "+Infinity"), vec![tngl::TIMESTAMP_MAX]);
        assert_eq!(encode(compile_infinity, "-Infinity"), vec![tngl::TIMESTAMP_MIN]);
    }

    #[test]
    fn colors() {
        assert_eq!(encode(compile_color, "#ffffff"), vec![tngl::COLOR_WHITE]);
        assert_eq!(encode(compile_color, "#FFFFFF"), vec![tngl::COLOR_WHITE]);
        assert_eq!(encode(compile_color, "#000000"), vec![tngl::COLOR_BLACK]);
        assert_eq!(encode(compile_color, "#ff8000"), vec![tngl::COLOR, 0xFF, 0x80, 0x00]);
    }

    #[test]
    fn percentage_is_clamped() {
        let full = encode(compile_percentage, "100%");
        assert_eq!(full[0], tngl::PERCENTAGE);
        assert_eq!(&full[1..], &i32::MAX.to_le_bytes());
        assert_eq!(encode(compile_percentage, "250%"), full);
        assert_eq!(&encode(compile_percentage, "-100%")[1..], &(-i32::MAX).to_le_bytes());
        assert_eq!(&encode(compile_percentage, "0%")[1..], &0i32.to_le_bytes());
    }

    #[test]
    fn label_takes_five_bytes() {
        assert_eq!(
            encode(compile_label, "$abcdefg"),
            vec![tngl::LABEL, b'a', b'b', b'c', b'd', b'e']
        );
    }

    #[test]
    fn short_label_keeps_stale_bytes() {
        let mut writer = BufferWriter::new(16);
        writer.write_slice(b"XXXXXXXX").unwrap();
        writer.reset();
        compile_label(&mut writer, "$ab").unwrap();
        assert_eq!(writer.as_bytes(), &[tngl::LABEL, b'a', b'b', b'X', b'X', b'X']);
    }

    #[test]
    fn pixels_and_bytes() {
        assert_eq!(encode(compile_pixels, "12px"), vec![tngl::PIXELS, 12, 0]);
        assert_eq!(encode(compile_pixels, "-1px"), vec![tngl::PIXELS, 0xFF, 0xFF]);
        assert_eq!(encode(compile_pixels, "99999px"), vec![tngl::PIXELS, 0xFF, 0x7F]);
        assert_eq!(encode(compile_byte, "0x1F"), vec![0x1F]);
        assert_eq!(encode(compile_char, "'A'"), vec![b'A']);
    }

    #[test]
    fn string_is_nul_terminated() {
        assert_eq!(encode(compile_string, "\"hi\""), vec![b'h', b'i', 0]);
        assert_eq!(encode(compile_string, "\"\""), vec![0]);
    }

    #[test]
    fn overflow_is_a_frame_error() {
        let mut writer = BufferWriter::new(2);
        let err = compile_timestamp(&mut writer, "5s").unwrap_err();
        assert!(matches!(err, CompileError::Frame(_)));
    }
}
