//! Content-stream operators and the operator grammar.
//!
//! An operator is its name plus the operands that preceded it (PDF content
//! streams are postfix). The grammar in [`validate_operands`] fixes which
//! operand shapes are legal per name, so shape is checked once at lex time
//! and everything downstream can pattern-match without re-validating.

use crate::object::Object;
use std::ops::Range;

/// One content-stream instruction: operands followed by an operator name.
///
/// Operators parsed from a stream carry the byte `span` they occupy in the
/// source (including the whitespace/comments separating them from their
/// predecessor); operators synthesized during a rewrite carry `None` and
/// are serialized canonically.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name (e.g. "Tj", "TJ", "Tf", "q")
    pub name: String,
    /// Operand values in source order
    pub operands: Vec<Object>,
    /// Byte range in the source stream, `None` for synthesized operators
    pub span: Option<Range<usize>>,
}

impl Operator {
    /// Create a synthesized operator (no source span).
    pub fn new(name: impl Into<String>, operands: Vec<Object>) -> Self {
        Self {
            name: name.into(),
            operands,
            span: None,
        }
    }

    /// Whether this operator paints text (`Tj`, `TJ`, `'`, `"`).
    pub fn is_show_text(&self) -> bool {
        matches!(self.name.as_str(), "Tj" | "TJ" | "'" | "\"")
    }

    /// Whether this operator selects the font (`Tf`).
    pub fn is_font_select(&self) -> bool {
        self.name == "Tf"
    }

    /// The single string operand of `Tj`, `'`, or `"` (its third operand).
    ///
    /// Returns `None` for `TJ` and non-show operators; `TJ` arrays are
    /// walked element-wise by callers.
    pub fn show_string(&self) -> Option<&[u8]> {
        match self.name.as_str() {
            "Tj" | "'" => self.operands.first().and_then(|o| o.as_string()),
            "\"" => self.operands.get(2).and_then(|o| o.as_string()),
            _ => None,
        }
    }
}

fn expect_count(name: &str, operands: &[Object], count: usize) -> Result<(), String> {
    if operands.len() != count {
        return Err(format!(
            "operator '{}' requires {} operand(s), got {}",
            name,
            count,
            operands.len()
        ));
    }
    Ok(())
}

fn expect_numbers(name: &str, operands: &[Object], count: usize) -> Result<(), String> {
    expect_count(name, operands, count)?;
    for obj in operands {
        if !obj.is_number() {
            return Err(format!(
                "operator '{}' requires numeric operands, got {}",
                name,
                obj.type_name()
            ));
        }
    }
    Ok(())
}

/// Validate operand count and types for an operator name.
///
/// Covers the operators the editor must understand precisely (text state,
/// text showing, positioning, graphics state) plus the common path and
/// color operators. Unknown names are accepted with whatever operands they
/// carry: the editor copies them through untouched, so lenient acceptance
/// here cannot corrupt anything.
pub fn validate_operands(name: &str, operands: &[Object]) -> Result<(), String> {
    match name {
        // Text object and graphics state
        "BT" | "ET" | "q" | "Q" | "T*" => expect_count(name, operands, 0),
        "cm" | "Tm" => expect_numbers(name, operands, 6),

        // Text positioning
        "Td" | "TD" => expect_numbers(name, operands, 2),

        // Text state
        "Tc" | "Tw" | "Tz" | "TL" | "Ts" => expect_numbers(name, operands, 1),
        "Tr" => {
            expect_count(name, operands, 1)?;
            match operands[0] {
                Object::Integer(_) => Ok(()),
                ref other => Err(format!(
                    "operator 'Tr' requires an integer operand, got {}",
                    other.type_name()
                )),
            }
        },
        "Tf" => {
            expect_count(name, operands, 2)?;
            if operands[0].as_name().is_none() {
                return Err(format!(
                    "operator 'Tf' requires a name operand, got {}",
                    operands[0].type_name()
                ));
            }
            if !operands[1].is_number() {
                return Err(format!(
                    "operator 'Tf' requires a numeric size, got {}",
                    operands[1].type_name()
                ));
            }
            Ok(())
        },

        // Text showing
        "Tj" | "'" => {
            expect_count(name, operands, 1)?;
            if operands[0].as_string().is_none() {
                return Err(format!(
                    "operator '{}' requires a string operand, got {}",
                    name,
                    operands[0].type_name()
                ));
            }
            Ok(())
        },
        "\"" => {
            expect_count(name, operands, 3)?;
            if !operands[0].is_number() || !operands[1].is_number() {
                return Err("operator '\"' requires two numeric spacing operands".to_string());
            }
            if operands[2].as_string().is_none() {
                return Err(format!(
                    "operator '\"' requires a string operand, got {}",
                    operands[2].type_name()
                ));
            }
            Ok(())
        },
        "TJ" => {
            expect_count(name, operands, 1)?;
            let array = operands[0].as_array().ok_or_else(|| {
                format!("operator 'TJ' requires an array operand, got {}", operands[0].type_name())
            })?;
            for elem in array {
                if !matches!(elem, Object::String(_)) && !elem.is_number() {
                    return Err(format!(
                        "'TJ' array elements must be strings or numbers, got {}",
                        elem.type_name()
                    ));
                }
            }
            Ok(())
        },

        // Path construction and painting
        "m" | "l" => expect_numbers(name, operands, 2),
        "c" => expect_numbers(name, operands, 6),
        "v" | "y" => expect_numbers(name, operands, 4),
        "re" => expect_numbers(name, operands, 4),
        "h" | "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" | "W" | "W*" => {
            expect_count(name, operands, 0)
        },

        // Line and rendering parameters
        "w" | "M" | "i" | "g" | "G" => expect_numbers(name, operands, 1),
        "J" | "j" => {
            expect_count(name, operands, 1)?;
            match operands[0] {
                Object::Integer(_) => Ok(()),
                ref other => Err(format!(
                    "operator '{}' requires an integer operand, got {}",
                    name,
                    other.type_name()
                )),
            }
        },
        "d" => {
            expect_count(name, operands, 2)?;
            if operands[0].as_array().is_none() {
                return Err("operator 'd' requires an array operand".to_string());
            }
            if !operands[1].is_number() {
                return Err("operator 'd' requires a numeric phase".to_string());
            }
            Ok(())
        },

        // Color
        "rg" | "RG" => expect_numbers(name, operands, 3),
        "k" | "K" => expect_numbers(name, operands, 4),

        // Named resources
        "Do" | "gs" | "sh" | "ri" | "cs" | "CS" | "BMC" => {
            expect_count(name, operands, 1)?;
            if operands[0].as_name().is_none() {
                return Err(format!(
                    "operator '{}' requires a name operand, got {}",
                    name,
                    operands[0].type_name()
                ));
            }
            Ok(())
        },
        "BDC" | "DP" => {
            expect_count(name, operands, 2)?;
            if operands[0].as_name().is_none() {
                return Err(format!("operator '{}' requires a name tag", name));
            }
            Ok(())
        },
        "EMC" => expect_count(name, operands, 0),

        // Variable operand counts (sc/SC/scn/SCN take 1-4 numbers plus an
        // optional pattern name) and operators we pass through untouched
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_text_classification() {
        assert!(Operator::new("Tj", vec![Object::String(b"x".to_vec())]).is_show_text());
        assert!(Operator::new("TJ", vec![Object::Array(vec![])]).is_show_text());
        assert!(Operator::new("'", vec![Object::String(b"x".to_vec())]).is_show_text());
        assert!(!Operator::new("Td", vec![]).is_show_text());
    }

    #[test]
    fn test_show_string_accessor() {
        let op = Operator::new("Tj", vec![Object::String(b"Hello".to_vec())]);
        assert_eq!(op.show_string(), Some(&b"Hello"[..]));

        let op = Operator::new(
            "\"",
            vec![Object::Integer(1), Object::Integer(0), Object::String(b"Line".to_vec())],
        );
        assert_eq!(op.show_string(), Some(&b"Line"[..]));

        let op = Operator::new("TJ", vec![Object::Array(vec![])]);
        assert_eq!(op.show_string(), None);
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_operands("Td", &[Object::Integer(1), Object::Integer(2)]).is_ok());
        assert!(validate_operands("Td", &[Object::Integer(1)]).is_err());
        assert!(validate_operands("q", &[]).is_ok());
        assert!(validate_operands("q", &[Object::Integer(1)]).is_err());
    }

    #[test]
    fn test_validate_tf_shape() {
        assert!(
            validate_operands("Tf", &[Object::Name("F1".to_string()), Object::Integer(12)]).is_ok()
        );
        assert!(validate_operands("Tf", &[Object::Integer(1), Object::Integer(12)]).is_err());
    }

    #[test]
    fn test_validate_tj_array_elements() {
        let good = Object::Array(vec![
            Object::String(b"Hel".to_vec()),
            Object::Integer(-50),
            Object::String(b"lo".to_vec()),
        ]);
        assert!(validate_operands("TJ", &[good]).is_ok());

        let bad = Object::Array(vec![Object::Name("oops".to_string())]);
        assert!(validate_operands("TJ", &[bad]).is_err());
    }

    #[test]
    fn test_validate_show_operand_type() {
        assert!(validate_operands("Tj", &[Object::Integer(5)]).is_err());
        assert!(validate_operands("Tj", &[Object::String(b"ok".to_vec())]).is_ok());
    }

    #[test]
    fn test_unknown_operator_is_accepted() {
        assert!(validate_operands("XyZ", &[Object::Integer(1)]).is_ok());
    }
}
