use anyhow::{Result, bail};
use hotnote_config::Config;
use hotnote_engine::{
    CommentValidation, CommentValidator, TextQuoteResolver, ValidationResult, io,
    reconcile_comments,
};
use relative_path::RelativePathBuf;
use std::{env, path::PathBuf, process};

const USAGE: &str = "[--notes <notes-folder-path>] [--write] <note-path>";

#[derive(Debug, PartialEq)]
struct Args {
    notes_path: Option<PathBuf>,
    write: bool,
    note: RelativePathBuf,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut notes_path = None;
    let mut write = false;
    let mut note = None;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--write" => write = true,
            "--notes" => match args.next() {
                Some(path) => notes_path = Some(PathBuf::from(path)),
                None => bail!("--notes needs a folder path"),
            },
            flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
            path if note.is_none() => note = Some(RelativePathBuf::from(path)),
            extra => bail!("Unexpected argument {extra}"),
        }
    }

    match note {
        Some(note) => Ok(Args {
            notes_path,
            write,
            note,
        }),
        None => bail!("Missing note path"),
    }
}

/// One line per comment: `<id> <action> [from..to "text"]`
fn describe(doc: &str, validation: &CommentValidation) -> String {
    let action = match validation.result {
        ValidationResult::Keep(_) => "keep",
        ValidationResult::Snap(_) => "snap",
        ValidationResult::Delete => "delete",
    };
    match validation.result.position() {
        Some(position) => {
            let text: String = doc
                .chars()
                .skip(position.from)
                .take(position.len())
                .collect();
            format!(
                "{} {action} {}..{} {text:?}",
                validation.comment_id, position.from, position.to
            )
        }
        None => format!("{} {action}", validation.comment_id),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("hotnote-cli");
    let args = match parse_args(argv.get(1..).unwrap_or_default()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) if args.notes_path.is_some() => {
            log::warn!("Ignoring unreadable config file: {e}");
            None
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    // Determine notes path from CLI args or config file
    let from_config = args.notes_path.is_none();
    let notes_path = match (args.notes_path.clone(), &config) {
        (Some(path), _) => path,
        (None, Some(config)) => config.notes_path.clone(),
        (None, None) => {
            eprintln!("Error: No notes path provided and no config file found");
            eprintln!("Usage: {program} {USAGE}");
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }

    let snap_distance = config
        .as_ref()
        .map(|config| config.comments.snap_distance)
        .unwrap_or(hotnote_engine::DEFAULT_SNAP_DISTANCE);
    let validator = CommentValidator::new(TextQuoteResolver, snap_distance);

    let doc = io::read_file(&args.note, &notes_path)?;
    let mut comments = io::load_comments(&args.note, &notes_path)?;
    log::info!(
        "Validating {} comment(s) on {} (snap distance {snap_distance})",
        comments.len(),
        args.note
    );

    let results = reconcile_comments(&validator, &doc, &mut comments);
    for validation in &results {
        println!("{}", describe(&doc, validation));
    }

    if args.write {
        io::save_comments(&args.note, &notes_path, &comments)?;
        log::info!(
            "Saved {} comment(s) to {}",
            comments.len(),
            io::comments_path(&args.note)
        );
    }

    Ok(())
}
