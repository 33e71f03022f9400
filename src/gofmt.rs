//! Canonical (gofmt-equivalent) formatting for the Go declarations we emit.
//!
//! Supported input is a list of `type Name T` declarations where `T` is a
//! (possibly package-qualified) type name, `*T`, `[]T`, `map[K]V`,
//! `interface{}` or, at the top of a declaration, a `struct { ... }` body of
//! named or embedded fields with optional string tags. Anything else is
//! rejected with a positioned [`FormatError`], which is how syntactically
//! invalid field names (keys like `1abc`) surface.
//!
//! Output follows gofmt: tab indentation, struct fields aligned in columns
//! with tabwriter semantics (padding 1, empty columns discarded), one blank
//! line between declarations.
use once_cell::sync::Lazy;
use regex::Regex;

/// Positioned syntax error, `line:column: message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

const PADDING: usize = 1;

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

// Go identifiers take letters from the L* categories and digits from Nd only;
// `char::is_alphabetic` / `char::is_numeric` also admit Nl and No.
static UNICODE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}$").expect("static pattern compiles"));
static UNICODE_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Nd}$").expect("static pattern compiles"));

fn in_class(class: &Regex, c: char) -> bool {
    class.is_match(c.encode_utf8(&mut [0; 4]))
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && in_class(&UNICODE_LETTER, c))
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || (!c.is_ascii() && in_class(&UNICODE_DIGIT, c))
}

// ————————————————————————————————————————————————————————————————————————————
// LEXER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'a> {
    Ident(&'a str),
    /// digit-led run; never valid here, kept for error messages
    Number(&'a str),
    /// string literal including its quotes
    Str(&'a str),
    Punct(char),
    Newline,
    Eof,
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s) if is_keyword(s) => write!(f, "'{s}'"),
            Tok::Ident(s) | Tok::Number(s) | Tok::Str(s) => f.write_str(s),
            Tok::Punct(c) => write!(f, "'{c}'"),
            Tok::Newline => f.write_str("newline"),
            Tok::Eof => f.write_str("EOF"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    tok: Tok<'a>,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1, line_start: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn column(&self) -> usize {
        self.pos - self.line_start + 1
    }

    fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError { line: self.line, column: self.column(), message: message.into() }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn raw_string(&mut self) -> Result<&'a str, FormatError> {
        let start = self.pos;
        let Some(len) = self.src[start + 1..].find('`') else {
            return Err(self.error("raw string literal not terminated"));
        };
        let end = start + 1 + len + 1;
        let text = &self.src[start..end];
        // raw strings may span lines
        if let Some(last_nl) = text.rfind('\n') {
            self.line += text.matches('\n').count();
            self.line_start = start + last_nl + 1;
        }
        self.pos = end;
        Ok(text)
    }

    fn interpreted_string(&mut self) -> Result<&'a str, FormatError> {
        let start = self.pos;
        let mut escaped = false;
        for (i, c) in self.src[start + 1..].char_indices() {
            match c {
                '\n' => break,
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    self.pos = start + 1 + i + 1;
                    return Ok(&self.src[start..self.pos]);
                }
                _ => escaped = false,
            }
        }
        Err(self.error("string literal not terminated"))
    }

    fn tokenize(mut self) -> Result<Vec<Token<'a>>, FormatError> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column());
            let tok = match c {
                ' ' | '\t' | '\r' => {
                    self.pos += 1;
                    continue;
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.line_start = self.pos;
                    Tok::Newline
                }
                '/' if matches!(self.src[self.pos + 1..].chars().next(), Some('/' | '*')) => {
                    return Err(self.error("comments are not supported"));
                }
                '`' => Tok::Str(self.raw_string()?),
                '"' => Tok::Str(self.interpreted_string()?),
                c if is_letter(c) => Tok::Ident(self.take_while(|c| is_letter(c) || is_digit(c))),
                c if c.is_ascii_digit() => {
                    Tok::Number(self.take_while(|c| is_letter(c) || is_digit(c) || c == '.'))
                }
                '{' | '}' | '[' | ']' | '(' | ')' | '*' | '.' | ';' | ',' => {
                    self.pos += 1;
                    Tok::Punct(c)
                }
                other => return Err(self.error(format!("illegal character U+{:04X} {other:?}", other as u32))),
            };
            out.push(Token { tok, line, column });
        }
        out.push(Token { tok: Tok::Eof, line: self.line, column: self.column() });
        Ok(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SYNTAX
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeExpr<'a> {
    Name(&'a str, Option<&'a str>),
    Pointer(Box<TypeExpr<'a>>),
    Slice(Box<TypeExpr<'a>>),
    Map(Box<TypeExpr<'a>>, Box<TypeExpr<'a>>),
    Interface,
    Struct { fields: Vec<FieldDecl<'a>>, multiline: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldDecl<'a> {
    /// `None` for embedded fields
    name: Option<&'a str>,
    ty: TypeExpr<'a>,
    tag: Option<&'a str>,
    blank_before: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Decl<'a> {
    name: &'a str,
    ty: TypeExpr<'a>,
}

struct Parser<'a> {
    toks: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token<'a> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Token<'a> {
        let last = self.toks.len() - 1;
        self.toks[(self.pos + n).min(last)]
    }

    fn bump(&mut self) -> Token<'a> {
        let t = self.peek();
        if !matches!(t.tok, Tok::Eof) {
            self.pos += 1;
        }
        t
    }

    fn error(&self, at: Token<'a>, message: impl Into<String>) -> FormatError {
        FormatError { line: at.line, column: at.column, message: message.into() }
    }

    fn unexpected(&self, at: Token<'a>, expected: &str) -> FormatError {
        self.error(at, format!("expected {expected}, found {}", at.tok))
    }

    fn expect_punct(&mut self, c: char) -> Result<(), FormatError> {
        let t = self.peek();
        if t.tok == Tok::Punct(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(t, &format!("'{c}'")))
        }
    }

    fn expect_name(&mut self) -> Result<&'a str, FormatError> {
        let t = self.peek();
        match t.tok {
            Tok::Ident(s) if !is_keyword(s) => {
                self.bump();
                Ok(s)
            }
            _ => Err(self.unexpected(t, "'IDENT'")),
        }
    }

    /// Skip newlines and `;`, returning how many newlines went by.
    fn skip_separators(&mut self) -> usize {
        let mut newlines = 0;
        loop {
            match self.peek().tok {
                Tok::Newline => newlines += 1,
                Tok::Punct(';') => {}
                _ => return newlines,
            }
            self.bump();
        }
    }

    fn expect_terminator(&mut self, closing: Option<char>) -> Result<(), FormatError> {
        let t = self.peek();
        match t.tok {
            Tok::Newline | Tok::Punct(';') | Tok::Eof => Ok(()),
            Tok::Punct(c) if Some(c) == closing => Ok(()),
            _ => Err(self.unexpected(t, "';'")),
        }
    }

    fn parse_file(&mut self) -> Result<Vec<Decl<'a>>, FormatError> {
        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.peek().tok == Tok::Eof {
                return Ok(decls);
            }
            decls.push(self.parse_decl()?);
            self.expect_terminator(None)?;
        }
    }

    fn parse_decl(&mut self) -> Result<Decl<'a>, FormatError> {
        let t = self.peek();
        if t.tok != Tok::Ident("type") {
            return Err(self.unexpected(t, "declaration"));
        }
        self.bump();
        let name = self.expect_name()?;
        let ty = self.parse_type(true)?;
        Ok(Decl { name, ty })
    }

    fn parse_type_name(&mut self) -> Result<TypeExpr<'a>, FormatError> {
        let name = self.expect_name()?;
        if self.peek().tok == Tok::Punct('.') {
            self.bump();
            let sel = self.expect_name()?;
            return Ok(TypeExpr::Name(name, Some(sel)));
        }
        Ok(TypeExpr::Name(name, None))
    }

    fn parse_type(&mut self, allow_struct: bool) -> Result<TypeExpr<'a>, FormatError> {
        let t = self.peek();
        match t.tok {
            Tok::Ident("struct") if allow_struct => self.parse_struct(),
            Tok::Ident("struct") => Err(self.error(t, "inline struct types are not supported")),
            Tok::Ident("interface") => {
                self.bump();
                self.expect_punct('{')?;
                self.skip_separators();
                self.expect_punct('}')?;
                Ok(TypeExpr::Interface)
            }
            Tok::Ident("map") => {
                self.bump();
                self.expect_punct('[')?;
                let key = self.parse_type(false)?;
                self.expect_punct(']')?;
                let value = self.parse_type(false)?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            Tok::Ident(s) if !is_keyword(s) => self.parse_type_name(),
            Tok::Punct('*') => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type(false)?)))
            }
            Tok::Punct('[') => {
                self.bump();
                self.expect_punct(']')?;
                Ok(TypeExpr::Slice(Box::new(self.parse_type(false)?)))
            }
            _ => Err(self.unexpected(t, "type")),
        }
    }

    fn parse_struct(&mut self) -> Result<TypeExpr<'a>, FormatError> {
        self.bump();
        self.expect_punct('{')?;
        let mut fields = Vec::new();
        let mut multiline = false;
        loop {
            let newlines = self.skip_separators();
            multiline |= newlines > 0;
            if self.peek().tok == Tok::Punct('}') {
                self.bump();
                return Ok(TypeExpr::Struct { fields, multiline });
            }
            let blank_before = newlines > 1 && !fields.is_empty();
            fields.push(self.parse_field(blank_before)?);
            self.expect_terminator(Some('}'))?;
        }
    }

    fn parse_field(&mut self, blank_before: bool) -> Result<FieldDecl<'a>, FormatError> {
        let t = self.peek();
        let (name, ty) = match t.tok {
            Tok::Punct('*') => {
                self.bump();
                (None, TypeExpr::Pointer(Box::new(self.parse_type_name()?)))
            }
            Tok::Ident(s) if !is_keyword(s) => {
                let embedded = matches!(
                    self.peek_at(1).tok,
                    Tok::Newline | Tok::Eof | Tok::Str(_) | Tok::Punct(';' | '}' | '.')
                );
                if embedded {
                    (None, self.parse_type_name()?)
                } else {
                    self.bump();
                    let next = self.peek();
                    if next.tok == Tok::Punct(',') {
                        return Err(self.error(next, "field name lists are not supported"));
                    }
                    (Some(s), self.parse_type(false)?)
                }
            }
            _ => return Err(self.unexpected(t, "field name or embedded type")),
        };
        let tag = match self.peek().tok {
            Tok::Str(s) => {
                self.bump();
                Some(s)
            }
            _ => None,
        };
        Ok(FieldDecl { name, ty, tag, blank_before })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PRINTER
// ————————————————————————————————————————————————————————————————————————————

fn print_type(ty: &TypeExpr<'_>) -> String {
    match ty {
        TypeExpr::Name(name, None) => (*name).to_owned(),
        TypeExpr::Name(pkg, Some(sel)) => format!("{pkg}.{sel}"),
        TypeExpr::Pointer(inner) => format!("*{}", print_type(inner)),
        TypeExpr::Slice(inner) => format!("[]{}", print_type(inner)),
        TypeExpr::Map(k, v) => format!("map[{}]{}", print_type(k), print_type(v)),
        TypeExpr::Interface => "interface{}".to_owned(),
        TypeExpr::Struct { fields, multiline } => print_struct(fields, *multiline),
    }
}

fn print_struct(fields: &[FieldDecl<'_>], multiline: bool) -> String {
    if fields.is_empty() {
        return if multiline { "struct {\n}".to_owned() } else { "struct{}".to_owned() };
    }
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(fields.len());
    for field in fields {
        if field.blank_before {
            rows.push(Vec::new());
        }
        let ty = print_type(&field.ty);
        let mut row = match field.name {
            Some(name) => vec![name.to_owned(), ty],
            None if field.tag.is_some() => vec![ty, String::new()],
            None => vec![ty],
        };
        if let Some(tag) = field.tag {
            row.push(tag.to_owned());
        }
        rows.push(row);
    }

    let mut out = String::from("struct {\n");
    for line in align(&rows) {
        if !line.is_empty() {
            out.push('\t');
            out.push_str(&line);
        }
        out.push('\n');
    }
    out.push('}');
    out
}

/// Tabwriter-style column alignment. Every cell but the last of a row is
/// terminated; a column block is a run of consecutive rows that have a
/// terminated cell in that column, padded to the block's widest cell.
fn align(rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<Vec<usize>> = rows.iter().map(|r| vec![0; r.len()]).collect();
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

    for col in 0..columns {
        let terminated = |row: &Vec<String>| row.len() > col + 1;
        let mut i = 0;
        while i < rows.len() {
            if !terminated(&rows[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < rows.len() && terminated(&rows[i]) {
                i += 1;
            }
            let widest = rows[start..i].iter().map(|r| r[col].chars().count()).max().unwrap_or(0);
            // all-empty columns are discarded
            let width = if widest == 0 { 0 } else { widest + PADDING };
            for w in &mut widths[start..i] {
                w[col] = width;
            }
        }
    }

    rows.iter()
        .zip(&widths)
        .map(|(row, widths)| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < row.len() {
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
            line
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

/// Parse `src` as a list of type declarations and print it canonically.
/// The result ends with a single newline unless it is empty.
pub fn format_source(src: &str) -> Result<String, FormatError> {
    let toks = Lexer::new(src).tokenize()?;
    let decls = Parser { toks, pos: 0 }.parse_file()?;
    tracing::trace!(declarations = decls.len(), "formatting source");
    let mut out = decls
        .iter()
        .map(|d| format!("type {} {}", d.name, print_type(&d.ty)))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(src: &str) -> String {
        format_source(src).unwrap()
    }

    #[test]
    fn aligns_names_types_and_tags() {
        let src = "type J2S1 struct {\nTest1 interface{} `json:\"test1\"`\nTest2 string `json:\"test2\"`\nTest6 bool `json:\"test6\"`\n}";
        let want = "type J2S1 struct {\n\
                    \tTest1 interface{} `json:\"test1\"`\n\
                    \tTest2 string      `json:\"test2\"`\n\
                    \tTest6 bool        `json:\"test6\"`\n\
                    }\n";
        assert_eq!(fmt(src), want);
    }

    #[test]
    fn aligns_pointer_fields() {
        let src = "type J2S2 struct {\nDrink *string `json:\"drink\"`\nFood *string `json:\"food\"`\nTest string `json:\"test\"`\n}";
        let want = "type J2S2 struct {\n\
                    \tDrink *string `json:\"drink\"`\n\
                    \tFood  *string `json:\"food\"`\n\
                    \tTest  string  `json:\"test\"`\n\
                    }\n";
        assert_eq!(fmt(src), want);
    }

    #[test]
    fn last_cell_is_not_padded() {
        let src = "type T struct {\nA string\nLonger int\n}";
        assert_eq!(fmt(src), "type T struct {\n\tA      string\n\tLonger int\n}\n");
    }

    #[test]
    fn empty_structs() {
        assert_eq!(fmt("type J2S1 struct {\n}"), "type J2S1 struct {\n}\n");
        assert_eq!(fmt("type J2S1 struct {}"), "type J2S1 struct{}\n");
    }

    #[test]
    fn declarations_are_separated_by_one_blank_line() {
        let src = "\n\ntype J2S1 []J2S2\n\n\n\ntype J2S2   int\n";
        assert_eq!(fmt(src), "type J2S1 []J2S2\n\ntype J2S2 int\n");
    }

    #[test]
    fn type_forms() {
        assert_eq!(fmt("type A [][]interface{ }"), "type A [][]interface{}\n");
        assert_eq!(fmt("type A map[string]*time.Time"), "type A map[string]*time.Time\n");
        assert_eq!(fmt("type A *[]bool"), "type A *[]bool\n");
    }

    #[test]
    fn blank_line_between_fields_splits_alignment() {
        let src = "type T struct {\nA string `x`\n\nLonger int `y`\n}";
        assert_eq!(fmt(src), "type T struct {\n\tA string `x`\n\n\tLonger int `y`\n}\n");
    }

    #[test]
    fn embedded_fields() {
        let src = "type T struct {\nstring\n*pkg.Base\n}";
        assert_eq!(fmt(src), "type T struct {\n\tstring\n\t*pkg.Base\n}\n");
    }

    #[test]
    fn unicode_identifiers_measure_in_chars() {
        let src = "type T struct {\nÄpfel string `json:\"äpfel\"`\nB int `json:\"b\"`\n}";
        assert_eq!(
            fmt(src),
            "type T struct {\n\tÄpfel string `json:\"äpfel\"`\n\tB     int    `json:\"b\"`\n}\n"
        );
    }

    #[test]
    fn invalid_field_name_is_rejected() {
        let err = format_source("type J2S1 struct {\n1abc int `json:\"1abc\"`\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
        assert!(err.message.contains("1abc"), "{err}");
    }

    #[test]
    fn stray_tokens_are_rejected() {
        let err = format_source("type J2S1 struct {\nA b string `json:\"a b\"`\n}").unwrap_err();
        assert_eq!(err.to_string(), "2:5: expected ';', found string");

        let err = format_source("type type int").unwrap_err();
        assert_eq!(err.to_string(), "1:6: expected 'IDENT', found 'type'");
    }

    #[test]
    fn identifier_character_classes() {
        assert_eq!(fmt("type T struct {\nÄß int\nX٣ bool\n}"), "type T struct {\n\tÄß int\n\tX٣ bool\n}\n");

        // superscript two is No, roman numeral twelve is Nl
        let err = format_source("type T struct {\nA² int\n}").unwrap_err();
        assert_eq!(err.to_string(), "2:2: illegal character U+00B2 '²'");
        let err = format_source("type T struct {\nAⅫ int\n}").unwrap_err();
        assert_eq!(err.to_string(), "2:2: illegal character U+216B 'Ⅻ'");
    }

    #[test]
    fn unterminated_literals() {
        let err = format_source("type T struct {\nA int `json:\"a\"\n}").unwrap_err();
        assert_eq!(err.message, "raw string literal not terminated");
        let err = format_source("type T struct {\nA int \"json\n}").unwrap_err();
        assert_eq!(err.message, "string literal not terminated");
    }

    #[test]
    fn unsupported_constructs() {
        assert!(format_source("type T struct {\nA struct {\n}\n}").is_err());
        assert!(format_source("// note\ntype T int").is_err());
        assert!(format_source("var x int").is_err());
        assert!(format_source("type T [3]int").is_err());
    }

    #[test]
    fn empty_source() {
        assert_eq!(fmt(""), "");
        assert_eq!(fmt("\n\n"), "");
    }
}
