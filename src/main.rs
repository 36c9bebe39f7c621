use anyhow::{anyhow, Result};
use colored::Colorize;
use ftree_core::cli::{Command, ColorMode, OutputFormat};
use ftree_core::{FileTree, Stat};

fn main() -> Result<()> {
    let args = ftree_core::parse_args();

    let use_colors = match args.color {
        ColorMode::Auto => atty::is(atty::Stream::Stdout),
        ColorMode::Always => true,
        ColorMode::Never => false,
    };

    // Each invocation opens a scratch tree, runs one subcommand against it,
    // and exits — the root binary carries no state between runs. `Driver`
    // is where a tree survives across multiple commands.
    let mut tree = FileTree::new();
    tree.initialize()?;

    run(&mut tree, &args.command, args.format, use_colors)
}

fn run(tree: &mut FileTree, command: &Command, format: OutputFormat, use_colors: bool) -> Result<()> {
    match command {
        Command::Init => {
            println!("{}", paint("tree initialized", use_colors));
        }
        Command::Destroy => {
            tree.destroy()?;
            println!("{}", paint("tree destroyed", use_colors));
        }
        Command::Mkdir { path } => {
            tree.insert_directory(path)?;
            println!("{}", paint(&format!("created directory {path}"), use_colors));
        }
        Command::Write { path, contents } => {
            let bytes = read_contents(contents)?;
            let len = bytes.len();
            tree.insert_file(path, bytes)?;
            println!("{}", paint(&format!("created file {path} ({len} bytes)"), use_colors));
        }
        Command::Replace { path, contents } => {
            let bytes = read_contents(contents)?;
            let old = tree
                .replace_file_contents(path, bytes)
                .ok_or_else(|| anyhow!("no such file: {path}"))?;
            println!(
                "{}",
                paint(&format!("replaced {path}, discarded {} old bytes", old.len()), use_colors)
            );
        }
        Command::Rm { path } => {
            tree.remove_file(path)?;
            println!("{}", paint(&format!("removed file {path}"), use_colors));
        }
        Command::Rmdir { path } => {
            tree.remove_directory(path)?;
            println!("{}", paint(&format!("removed directory {path}"), use_colors));
        }
        Command::Stat { path } => {
            let stat = tree.stat(path)?;
            print_stat(path, stat, use_colors);
        }
        Command::Ls => print_listing(tree, format)?,
        Command::Validate => print_validation(tree, use_colors),
    }
    Ok(())
}

fn read_contents(contents: &str) -> Result<Vec<u8>> {
    if contents == "-" {
        use std::io::Read;
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(contents.as_bytes().to_vec())
    }
}

fn print_stat(path: &str, stat: Stat, use_colors: bool) {
    let kind = if stat.is_file { "file" } else { "directory" };
    let line = format!("{path}: {kind}, {} bytes", stat.size);
    println!("{}", paint(&line, use_colors));
}

fn print_listing(tree: &FileTree, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            print!("{}", tree.serialize()?);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                println!("{}", ftree_core::json::to_json(tree)?);
            }
            #[cfg(not(feature = "json"))]
            {
                return Err(anyhow!("json output requires the `json` feature"));
            }
        }
    }
    Ok(())
}

fn print_validation(tree: &FileTree, use_colors: bool) {
    let violations = ftree_core::validate(tree);
    if violations.is_empty() {
        println!("{}", paint("tree is structurally valid", use_colors));
        return;
    }
    for violation in &violations {
        let line = format!("{violation:?}");
        if use_colors {
            eprintln!("{}", line.red());
        } else {
            eprintln!("{line}");
        }
    }
}

fn paint(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.green().to_string()
    } else {
        text.to_string()
    }
}
