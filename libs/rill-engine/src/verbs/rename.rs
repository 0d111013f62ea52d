use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "rename", about = "Renames specified fields.")]
struct Args {
    /// old,new[,old,new...]
    #[arg(value_delimiter = ',', value_name = "OLD,NEW,...")]
    pairs: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("rename", args)?;
    if args.pairs.is_empty() || args.pairs.len() % 2 != 0 {
        return Err(EngineError::Usage {
            verb: "rename".into(),
            message: format!("field names must come in old,new pairs, got {}", args.pairs.len()),
        });
    }
    let pairs = args.pairs.chunks(2).map(|p| (p[0].clone(), p[1].clone())).collect();
    Ok(Box::new(Rename { pairs }))
}

struct Rename {
    pairs: Vec<(String, String)>,
}

impl Stage for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        for (old, new) in &self.pairs {
            record.rename(old, new);
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn renames_in_place() {
        assert_eq!(run_verb("rename", &["a,x,c,y"], &["a=1,b=2,c=3"]), ["x=1,b=2,y=3"]);
    }

    #[test]
    fn existing_target_is_overwritten() {
        assert_eq!(run_verb("rename", &["a,b"], &["a=1,b=2,c=3"]), ["b=1,c=3"]);
    }

    #[test]
    fn odd_name_count_is_rejected() {
        assert!(crate::verbs::build_stage("rename", &["a,b,c".to_string()]).is_err());
    }
}
