//! Token types for the Verilog subset lexer.

/// A lexed token with its source byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind (and payload for identifiers/literals).
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// The kinds of token the lexer produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier.
    Ident(String),
    /// A numeric literal: parsed value and declared width, if sized.
    Number {
        /// The parsed value (x/z digits read as 0).
        value: u64,
        /// The declared width for sized literals like `4'b0101`.
        width: Option<u32>,
    },

    // Keywords
    /// `module`
    Module,
    /// `endmodule`
    Endmodule,
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `wire`
    Wire,
    /// `reg`
    Reg,
    /// `parameter`
    Parameter,
    /// `localparam`
    Localparam,
    /// `assign`
    Assign,
    /// `always`
    Always,
    /// `begin`
    Begin,
    /// `end`
    End,
    /// `if`
    If,
    /// `else`
    Else,
    /// `case`
    Case,
    /// `endcase`
    Endcase,
    /// `default`
    Default,
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
    /// `or` (sensitivity-list separator)
    OrKw,

    // Punctuation and operators
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semi,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `#`
    Hash,
    /// `@`
    At,
    /// `*`
    Star,
    /// `=`
    Assign1,
    /// `<=` (nonblocking assignment)
    LeAssign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// A short human-readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Number { value, .. } => format!("number `{value}`"),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.text()),
        }
    }

    fn text(&self) -> &'static str {
        match self {
            TokenKind::Module => "module",
            TokenKind::Endmodule => "endmodule",
            TokenKind::Input => "input",
            TokenKind::Output => "output",
            TokenKind::Inout => "inout",
            TokenKind::Wire => "wire",
            TokenKind::Reg => "reg",
            TokenKind::Parameter => "parameter",
            TokenKind::Localparam => "localparam",
            TokenKind::Assign => "assign",
            TokenKind::Always => "always",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Case => "case",
            TokenKind::Endcase => "endcase",
            TokenKind::Default => "default",
            TokenKind::Posedge => "posedge",
            TokenKind::Negedge => "negedge",
            TokenKind::OrKw => "or",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Hash => "#",
            TokenKind::At => "@",
            TokenKind::Star => "*",
            TokenKind::Assign1 => "=",
            TokenKind::LeAssign => "<=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::Ident(_) | TokenKind::Number { .. } | TokenKind::Eof => unreachable!(),
        }
    }
}

/// Looks up a keyword token for identifier text. Verilog keywords are
/// case-sensitive and always lowercase.
pub fn lookup_keyword(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "module" => TokenKind::Module,
        "endmodule" => TokenKind::Endmodule,
        "input" => TokenKind::Input,
        "output" => TokenKind::Output,
        "inout" => TokenKind::Inout,
        "wire" => TokenKind::Wire,
        "reg" => TokenKind::Reg,
        "parameter" => TokenKind::Parameter,
        "localparam" => TokenKind::Localparam,
        "assign" => TokenKind::Assign,
        "always" => TokenKind::Always,
        "begin" => TokenKind::Begin,
        "end" => TokenKind::End,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "case" => TokenKind::Case,
        "endcase" => TokenKind::Endcase,
        "default" => TokenKind::Default,
        "posedge" => TokenKind::Posedge,
        "negedge" => TokenKind::Negedge,
        "or" => TokenKind::OrKw,
        _ => return None,
    };
    Some(kind)
}
