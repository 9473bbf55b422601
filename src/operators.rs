//! Scalar enumerants carried in node fields.
//!
//! They cross the native boundary as `Int` values; decoding an unknown value
//! is an error rather than a silent default.

use serde::{Deserialize, Serialize};

use crate::error::{PeerError, Result};
use crate::kind::NodeKind;
use crate::native::{NativeContext, NativeValue};
use crate::peer::NativeField;

macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($what:literal) {
            $($variant:ident = $value:literal => $text:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $value),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn from_i32(value: i32) -> Result<Self> {
                match value {
                    $($value => Ok($name::$variant),)*
                    _ => Err(PeerError::InvalidScalar {
                        what: $what,
                        value: value as i64,
                    }),
                }
            }

            pub fn as_i32(self) -> i32 {
                self as i32
            }

            /// Source spelling
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }

            pub fn from_source(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl NativeField for $name {
            fn pack(&self) -> NativeValue {
                NativeValue::Int(self.as_i32())
            }

            fn unpack(_ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
                match value {
                    NativeValue::Int(raw) => $name::from_i32(raw),
                    other => Err(PeerError::native(format!(
                        "expected {} from native, got {}",
                        $what,
                        other.type_name()
                    ))),
                }
            }
        }
    };
}

int_enum! {
    /// Operator token of binary, unary and assignment expressions.
    TokenType ("token type") {
        Plus = 1 => "+",
        Minus = 2 => "-",
        Multiply = 3 => "*",
        Divide = 4 => "/",
        Mod = 5 => "%",
        Exponentiation = 6 => "**",
        Equal = 10 => "==",
        NotEqual = 11 => "!=",
        StrictEqual = 12 => "===",
        NotStrictEqual = 13 => "!==",
        LessThan = 14 => "<",
        LessThanEqual = 15 => "<=",
        GreaterThan = 16 => ">",
        GreaterThanEqual = 17 => ">=",
        LeftShift = 20 => "<<",
        RightShift = 21 => ">>",
        UnsignedRightShift = 22 => ">>>",
        BitwiseAnd = 23 => "&",
        BitwiseOr = 24 => "|",
        BitwiseXor = 25 => "^",
        LogicalAnd = 30 => "&&",
        LogicalOr = 31 => "||",
        NullishCoalescing = 32 => "??",
        In = 33 => "in",
        Instanceof = 34 => "instanceof",
        Tilde = 40 => "~",
        ExclamationMark = 41 => "!",
        Typeof = 42 => "typeof",
        Void = 43 => "void",
        Delete = 44 => "delete",
        Substitution = 50 => "=",
        PlusEqual = 51 => "+=",
        MinusEqual = 52 => "-=",
        MultiplyEqual = 53 => "*=",
        DivideEqual = 54 => "/=",
        ModEqual = 55 => "%=",
        ExponentiationEqual = 56 => "**=",
        LeftShiftEqual = 57 => "<<=",
        RightShiftEqual = 58 => ">>=",
        UnsignedRightShiftEqual = 59 => ">>>=",
        BitwiseAndEqual = 60 => "&=",
        BitwiseOrEqual = 61 => "|=",
        BitwiseXorEqual = 62 => "^=",
        LogicalAndEqual = 63 => "&&=",
        LogicalOrEqual = 64 => "||=",
        NullishEqual = 65 => "??=",
    }
}

impl TokenType {
    pub fn is_logical(self) -> bool {
        matches!(self, TokenType::LogicalAnd | TokenType::LogicalOr)
    }

    /// Logical operators including `??`
    pub fn is_logical_extended(self) -> bool {
        self.is_logical() || self == TokenType::NullishCoalescing
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            TokenType::BitwiseAnd | TokenType::BitwiseOr | TokenType::BitwiseXor
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            TokenType::Plus
                | TokenType::Minus
                | TokenType::Multiply
                | TokenType::Divide
                | TokenType::Mod
                | TokenType::Exponentiation
        )
    }

    pub fn is_binary(self) -> bool {
        self.binary_precedence().is_some()
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            TokenType::Plus
                | TokenType::Minus
                | TokenType::Tilde
                | TokenType::ExclamationMark
                | TokenType::Typeof
                | TokenType::Void
                | TokenType::Delete
        )
    }

    pub fn is_assignment(self) -> bool {
        self.as_i32() >= TokenType::Substitution.as_i32()
    }

    /// Binding power of a binary operator; higher binds tighter.
    pub fn binary_precedence(self) -> Option<u8> {
        let precedence = match self {
            TokenType::NullishCoalescing => 1,
            TokenType::LogicalOr => 2,
            TokenType::LogicalAnd => 3,
            TokenType::BitwiseOr => 4,
            TokenType::BitwiseXor => 5,
            TokenType::BitwiseAnd => 6,
            TokenType::Equal
            | TokenType::NotEqual
            | TokenType::StrictEqual
            | TokenType::NotStrictEqual => 7,
            TokenType::LessThan
            | TokenType::LessThanEqual
            | TokenType::GreaterThan
            | TokenType::GreaterThanEqual
            | TokenType::In
            | TokenType::Instanceof => 8,
            TokenType::LeftShift | TokenType::RightShift | TokenType::UnsignedRightShift => 9,
            TokenType::Plus | TokenType::Minus => 10,
            TokenType::Multiply | TokenType::Divide | TokenType::Mod => 11,
            TokenType::Exponentiation => 12,
            _ => return None,
        };
        Some(precedence)
    }
}

int_enum! {
    VariableDeclarationKind ("declaration kind") {
        Let = 0 => "let",
        Const = 1 => "const",
        Var = 2 => "var",
    }
}

int_enum! {
    MemberExpressionKind ("member expression kind") {
        PropertyAccess = 0 => "property",
        ElementAccess = 1 => "element",
    }
}

int_enum! {
    PrimitiveType ("primitive type") {
        Boolean = 0 => "boolean",
        Byte = 1 => "byte",
        Char = 2 => "char",
        Short = 3 => "short",
        Int = 4 => "int",
        Long = 5 => "long",
        Float = 6 => "float",
        Double = 7 => "double",
        Void = 8 => "void",
    }
}

/// Source spelling of an `Int` field, selected by the field's schema name.
pub fn scalar_text(field: &str, raw: i32) -> Result<&'static str> {
    match field {
        "operator" => TokenType::from_i32(raw).map(TokenType::as_str),
        "declaration_kind" => {
            VariableDeclarationKind::from_i32(raw).map(VariableDeclarationKind::as_str)
        }
        "member_kind" => MemberExpressionKind::from_i32(raw).map(MemberExpressionKind::as_str),
        "primitive" => PrimitiveType::from_i32(raw).map(PrimitiveType::as_str),
        _ => Err(PeerError::InvalidScalar {
            what: "field",
            value: raw as i64,
        }),
    }
}

/// Checks `raw` against the enumerant set of one `Int` field. Operator slots
/// are narrowed per kind: a `BinaryExpression` takes only binary tokens.
pub fn check_scalar(kind: NodeKind, field: &str, raw: i32) -> Result<()> {
    let accepts = |what: &'static str, ok: fn(TokenType) -> bool| -> Result<()> {
        if ok(TokenType::from_i32(raw)?) {
            Ok(())
        } else {
            Err(PeerError::InvalidScalar {
                what,
                value: raw as i64,
            })
        }
    };
    match (kind, field) {
        (NodeKind::BinaryExpression, "operator") => accepts("binary operator", TokenType::is_binary),
        (NodeKind::UnaryExpression, "operator") => accepts("unary operator", TokenType::is_unary),
        (NodeKind::AssignmentExpression, "operator") => {
            accepts("assignment operator", TokenType::is_assignment)
        }
        _ => scalar_text(field, raw).map(|_| ()),
    }
}

/// Inverse of [`scalar_text`].
pub fn scalar_from_text(field: &str, text: &str) -> Option<i32> {
    match field {
        "operator" => TokenType::from_source(text).map(TokenType::as_i32),
        "declaration_kind" => {
            VariableDeclarationKind::from_source(text).map(VariableDeclarationKind::as_i32)
        }
        "member_kind" => MemberExpressionKind::from_source(text).map(MemberExpressionKind::as_i32),
        "primitive" => PrimitiveType::from_source(text).map(PrimitiveType::as_i32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for token in TokenType::ALL {
            assert_eq!(TokenType::from_i32(token.as_i32()), Ok(*token));
            assert_eq!(TokenType::from_source(token.as_str()), Some(*token));
        }
    }

    #[test]
    fn test_token_classes() {
        assert!(TokenType::LogicalOr.is_logical());
        assert!(!TokenType::NullishCoalescing.is_logical());
        assert!(TokenType::NullishCoalescing.is_logical_extended());
        assert!(TokenType::BitwiseXor.is_bitwise());
        assert!(TokenType::Mod.is_arithmetic());
        assert!(TokenType::PlusEqual.is_assignment());
        assert!(!TokenType::Plus.is_assignment());
        assert!(TokenType::Minus.is_unary() && TokenType::Minus.is_binary());
        assert!(!TokenType::Typeof.is_binary());
    }

    #[test]
    fn test_scalar_text_by_field() {
        assert_eq!(
            scalar_text("operator", 18),
            Err(PeerError::InvalidScalar {
                what: "token type",
                value: 18
            })
        );
        assert_eq!(scalar_text("operator", 12), Ok("==="));
        assert_eq!(scalar_text("primitive", 4), Ok("int"));
        assert_eq!(scalar_from_text("declaration_kind", "const"), Some(1));
        assert_eq!(scalar_from_text("member_kind", "+"), None);
    }

    #[test]
    fn test_check_scalar_per_kind() {
        let plus = TokenType::Plus.as_i32();
        assert!(check_scalar(NodeKind::BinaryExpression, "operator", plus).is_ok());
        assert!(check_scalar(NodeKind::UnaryExpression, "operator", plus).is_ok());
        assert_eq!(
            check_scalar(NodeKind::AssignmentExpression, "operator", plus),
            Err(PeerError::InvalidScalar {
                what: "assignment operator",
                value: 1
            })
        );
        assert_eq!(
            check_scalar(NodeKind::BinaryExpression, "operator", TokenType::Typeof.as_i32()),
            Err(PeerError::InvalidScalar {
                what: "binary operator",
                value: 42
            })
        );
        assert_eq!(
            check_scalar(NodeKind::BinaryExpression, "operator", 999),
            Err(PeerError::InvalidScalar {
                what: "token type",
                value: 999
            })
        );
        assert!(check_scalar(NodeKind::ETSPrimitiveType, "primitive", 9).is_err());
        assert!(check_scalar(NodeKind::VariableDeclaration, "declaration_kind", 2).is_ok());
    }

    #[test]
    fn test_invalid_scalar() {
        assert_eq!(
            VariableDeclarationKind::from_i32(7),
            Err(PeerError::InvalidScalar {
                what: "declaration kind",
                value: 7
            })
        );
    }
}
