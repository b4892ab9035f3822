use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bl", author, version, about = "Walk a file's history line by line with git blame", long_about = None)]
pub struct Args {
    /// File to blame
    pub file: PathBuf,

    /// Start at this revision instead of the working tree
    #[arg(short, long)]
    pub rev: Option<String>,

    /// Print the annotated blame to stdout and exit
    #[arg(long, conflicts_with = "json")]
    pub print: bool,

    /// Print the parsed blame as JSON and exit
    #[arg(long)]
    pub json: bool,

    /// Alternate config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// git executable to run
    #[arg(long)]
    pub git: Option<String>,
}

impl Args {
    pub fn is_interactive(&self) -> bool {
        !self.print && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_file_and_rev() {
        let args = Args::try_parse_from(["bl", "-r", "HEAD~2", "src/main.rs"]).unwrap();
        assert_eq!(args.file, PathBuf::from("src/main.rs"));
        assert_eq!(args.rev.as_deref(), Some("HEAD~2"));
        assert!(args.is_interactive());
    }

    #[test]
    fn test_print_and_json_conflict() {
        assert!(Args::try_parse_from(["bl", "--print", "--json", "a.rs"]).is_err());
        let args = Args::try_parse_from(["bl", "--json", "a.rs"]).unwrap();
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_file_is_required() {
        assert!(Args::try_parse_from(["bl"]).is_err());
    }
}
