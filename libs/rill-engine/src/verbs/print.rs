use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "print",
    about = "Prints a line per record built from TEMPLATE, with $name or ${name} replaced by field values.",
    after_help = "Example: print 'x is $x and total is ${sum total}'"
)]
struct Args {
    /// Don't pass the record through after printing.
    #[arg(short = 'q')]
    quiet: bool,

    #[arg(value_name = "TEMPLATE")]
    template: String,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("print", args)?;
    let template =
        Template::parse(&args.template).map_err(|message| EngineError::Usage { verb: "print".into(), message })?;
    Ok(Box::new(Print { template, quiet: args.quiet, line: String::new() }))
}

#[derive(Debug, PartialEq)]
enum Piece {
    Literal(String),
    Field(String),
}

#[derive(Debug)]
struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    fn parse(text: &str) -> Result<Self, String> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
                let end = braced.find('}').ok_or_else(|| format!("unclosed ${{ in {text:?}"))?;
                (&braced[..end], end + 2)
            } else {
                let end = after.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(after.len());
                (&after[..end], end)
            };
            if name.is_empty() {
                // A lone `$` prints as itself.
                literal.push('$');
            } else {
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Field(name.to_string()));
            }
            rest = &after[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Absent fields render as empty text.
    fn render_into(&self, record: &Record, line: &mut String) {
        line.clear();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => line.push_str(text),
                Piece::Field(name) => {
                    if let Some(value) = record.get(name) {
                        line.push_str(&value.render());
                    }
                }
            }
        }
    }
}

struct Print {
    template: Template,
    quiet: bool,
    line: String,
}

impl Stage for Print {
    fn name(&self) -> &str {
        "print"
    }

    fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        self.template.render_into(&record, &mut self.line);
        out.text(self.line.as_str());
        if !self.quiet {
            out.record(record, ctx.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verbs::testing::run_verb;

    #[test]
    fn template_pieces() {
        let t = Template::parse("x=$x, y=${a b}; cost $ 5").expect("parse");
        assert_eq!(
            t.pieces,
            [
                Piece::Literal("x=".into()),
                Piece::Field("x".into()),
                Piece::Literal(", y=".into()),
                Piece::Field("a b".into()),
                Piece::Literal("; cost $ 5".into()),
            ]
        );
        assert!(Template::parse("${open").is_err());
    }

    #[test]
    fn lines_interleave_with_records() {
        let out = run_verb("print", &["sum is $s$t"], &["s=1,t=2", "s=3"]);
        assert_eq!(out, ["> sum is 12", "s=1,t=2", "> sum is 3", "s=3"]);
    }

    #[test]
    fn quiet_drops_records() {
        assert_eq!(run_verb("print", &["-q", "[$a]"], &["a=x", "b=y"]), ["> [x]", "> []"]);
    }
}
