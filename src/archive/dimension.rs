//! CSS length parsing for image sizing

/// Points per CSS pixel
const PT_PER_PX: f32 = 0.75;

/// Converts CSS lengths into PDF points
///
/// A return value of `0.0` means "unknown": the renderer falls back to the
/// image's intrinsic size.
pub trait DimensionParser: Send + Sync {
    fn to_points(&self, value: &str) -> f32;
}

/// Parser for absolute CSS units
///
/// Bare numbers are pixels, as in HTML `width`/`height` attributes. `em` and
/// `rem` assume a 16px root font. Percentages depend on a containing block we
/// do not track, so they return 0 like any unparseable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssDimensionParser;

impl DimensionParser for CssDimensionParser {
    fn to_points(&self, value: &str) -> f32 {
        let value = value.trim().to_ascii_lowercase();
        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);

        let Ok(number) = number.parse::<f32>() else {
            return 0.0;
        };

        let factor = match unit.trim() {
            "" | "px" => PT_PER_PX,
            "pt" => 1.0,
            "pc" => 12.0,
            "in" => 72.0,
            "cm" => 28.35,
            "mm" => 2.835,
            "em" | "rem" => 12.0,
            _ => return 0.0,
        };

        let points = number * factor;
        if points.is_finite() && points > 0.0 {
            points
        } else {
            0.0
        }
    }
}

/// Reads one property from an inline `style` attribute
pub fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(value: &str) -> f32 {
        CssDimensionParser.to_points(value)
    }

    #[test]
    fn test_absolute_units() {
        assert_eq!(points("100px"), 75.0);
        assert_eq!(points("100"), 75.0);
        assert_eq!(points("12pt"), 12.0);
        assert_eq!(points("1in"), 72.0);
        assert_eq!(points("2pc"), 24.0);
        assert_eq!(points("2em"), 24.0);
        assert!((points("1cm") - 28.35).abs() < 0.001);
        assert!((points("10mm") - 28.35).abs() < 0.001);
        assert_eq!(points("  40PX "), 30.0);
    }

    #[test]
    fn test_unknown_values_fall_back_to_zero() {
        assert_eq!(points("50%"), 0.0);
        assert_eq!(points("auto"), 0.0);
        assert_eq!(points(""), 0.0);
        assert_eq!(points("10vw"), 0.0);
        assert_eq!(points("-5px"), 0.0);
    }

    #[test]
    fn test_style_property() {
        let style = "border: 0; WIDTH: 120px ;height:40px";
        assert_eq!(style_property(style, "width"), Some("120px"));
        assert_eq!(style_property(style, "height"), Some("40px"));
        assert_eq!(style_property(style, "margin"), None);
    }

    struct Fixed(f32);

    impl DimensionParser for Fixed {
        fn to_points(&self, _value: &str) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_parser_is_injectable() {
        let parser: Box<dyn DimensionParser> = Box::new(Fixed(10.0));
        assert_eq!(parser.to_points("whatever"), 10.0);
    }
}
