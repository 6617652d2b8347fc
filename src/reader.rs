// ABOUTME: Reader turning UTF-8 source text into S-expression objects

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::value,
    multi::many0,
    IResult, Parser,
};

use crate::error::Error;
use crate::symbol::Symbol;
use crate::value::Object;

/// Streams objects out of source text, one top-level form per `next` call.
/// Symbols are interned through the interpreter's intern table; the quote
/// sugar (`'x`, `` `x ``, `,x`, `,@x`) expands to the corresponding pairs.
/// End of input is the iterator ending; malformed input yields one
/// `ReaderError` and then stops.
pub struct Reader<'a> {
    input: &'a str,
    failed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(src: &'a str) -> Reader<'a> {
        Reader {
            input: src,
            failed: false,
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Object, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Ok((rest, ())) = ws_and_comments(self.input) {
            self.input = rest;
        }
        if self.input.is_empty() {
            return None;
        }
        match read_form(self.input) {
            Ok((rest, obj)) => {
                self.input = rest;
                Some(Ok(obj))
            }
            Err(_) => {
                self.failed = true;
                let snippet: String = self.input.chars().take(24).collect();
                Some(Err(Error::Reader(format!(
                    "malformed input at: {snippet}"
                ))))
            }
        }
    }
}

/// Reads every form in `src`, failing on the first malformed one.
pub fn read_all(src: &str) -> Result<Vec<Object>, Error> {
    Reader::new(src).collect()
}

// ============================================================================
// Form parsers
// ============================================================================

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

/// A comment runs from `;` to the end of the line.
fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn read_form(input: &str) -> IResult<&str, Object> {
    let (input, _) = ws_and_comments(input)?;
    alt((read_quoted, read_list, read_string, read_atom)).parse(input)
}

/// `'x`, `` `x ``, `,@x`, and `,x` expand to their two-element pair forms.
fn read_quoted(input: &str) -> IResult<&str, Object> {
    let (rest, head) = alt((tag("'"), tag("`"), tag(",@"), tag(","))).parse(input)?;
    let (rest, form) = read_form(rest)?;
    let name = match head {
        "'" => "quote",
        "`" => "quasiquote",
        ",@" => "unquote-splicing",
        _ => "unquote",
    };
    Ok((rest, Object::from_vec(vec![Object::symbol(name), form])))
}

/// A parenthesised list, with `. tail` support before the closing paren.
fn read_list(input: &str) -> IResult<&str, Object> {
    let (mut rest, _) = char('(')(input)?;
    let mut items = Vec::new();
    loop {
        if let Ok((r, ())) = ws_and_comments(rest) {
            rest = r;
        }
        if let Ok((r, _)) = char::<_, nom::error::Error<&str>>(')')(rest) {
            return Ok((r, Object::from_vec(items)));
        }
        if let Ok((r, ())) = dot_token(rest) {
            if items.is_empty() {
                return fail(rest);
            }
            let (r, tail) = read_form(r)?;
            let (r, _) = ws_and_comments(r)?;
            let (r, _) = char(')')(r)?;
            return Ok((r, Object::from_vec_dotted(items, tail)));
        }
        let (r, form) = read_form(rest)?;
        items.push(form);
        rest = r;
    }
}

/// A lone `.` followed by a delimiter marks a dotted tail.
fn dot_token(input: &str) -> IResult<&str, ()> {
    let (rest, _) = char('.')(input)?;
    match rest.chars().next() {
        None | Some('(') | Some(')') | Some('"') | Some(';') => Ok((rest, ())),
        Some(c) if c.is_whitespace() => Ok((rest, ())),
        _ => fail(input),
    }
}

/// A double-quoted string with the escape table `\"`, `\\`, `\t`, `\n`,
/// `\r`, `\xHH`, `\uHHHH`, `\UHHHHHHHH`.
fn read_string(input: &str) -> IResult<&str, Object> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();
    loop {
        let Some(c) = rest.chars().next() else {
            return fail(rest);
        };
        match c {
            '"' => return Ok((&rest[1..], Object::string(out))),
            '\\' => {
                let esc = &rest[1..];
                let Some(e) = esc.chars().next() else {
                    return fail(rest);
                };
                match e {
                    'n' => {
                        out.push('\n');
                        rest = &esc[1..];
                    }
                    't' => {
                        out.push('\t');
                        rest = &esc[1..];
                    }
                    'r' => {
                        out.push('\r');
                        rest = &esc[1..];
                    }
                    '"' => {
                        out.push('"');
                        rest = &esc[1..];
                    }
                    '\\' => {
                        out.push('\\');
                        rest = &esc[1..];
                    }
                    'x' => match hex_escape(&esc[1..], 2) {
                        Some((c, r)) => {
                            out.push(c);
                            rest = r;
                        }
                        None => return fail(rest),
                    },
                    'u' => match hex_escape(&esc[1..], 4) {
                        Some((c, r)) => {
                            out.push(c);
                            rest = r;
                        }
                        None => return fail(rest),
                    },
                    'U' => match hex_escape(&esc[1..], 8) {
                        Some((c, r)) => {
                            out.push(c);
                            rest = r;
                        }
                        None => return fail(rest),
                    },
                    _ => return fail(rest),
                }
            }
            c => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
}

fn hex_escape(input: &str, digits: usize) -> Option<(char, &str)> {
    if input.len() < digits || !input.as_bytes()[..digits].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let (hex, rest) = input.split_at(digits);
    let code = u32::from_str_radix(hex, 16).ok()?;
    Some((char::from_u32(code)?, rest))
}

/// A maximal run of non-delimiter characters; a token that reads fully as a
/// decimal integer is a number, anything else is an interned symbol.
fn read_atom(input: &str) -> IResult<&str, Object> {
    let (rest, token) = take_while1(is_atom_char)(input)?;
    if token == "." {
        return fail(input);
    }
    match parse_int(token) {
        Some(i) => Ok((rest, Object::Int(i))),
        None => Ok((rest, Object::Sym(Symbol::intern(token)))),
    }
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';' | '\'' | '`' | ',')
}

/// Decimal integer with optional sign; the accumulator wraps like all other
/// Int64 arithmetic.
fn parse_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut acc: i64 = 0;
    for b in digits.bytes() {
        acc = acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
    }
    Some(if negative { acc.wrapping_neg() } else { acc })
}

fn fail<T>(input: &str) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Fail,
    )))
}
