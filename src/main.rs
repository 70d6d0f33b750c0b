use anyhow::{bail, Context, Result};
use recipe_box::config::{AppConfig, LogFormat};
use recipe_box::db;
use recipe_box::ingredient_parser::parse_ingredients;
use recipe_box::recipe::{process_recipe, RecipeInput};
use std::env;
use std::fs;
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  recipe-box parse [FILE]
  recipe-box import --user <id> --title <title> [--tags <tags>] [--url <url>] FILE
  recipe-box search --user <id> (--url <url> | WORDS...)";

/// Parsed command line
#[derive(Debug, PartialEq)]
enum Command {
    Parse {
        file: Option<String>,
    },
    Import {
        user: String,
        title: String,
        tags: Option<String>,
        url: Option<String>,
        file: String,
    },
    Search {
        user: String,
        url: Option<String>,
        words: Vec<String>,
    },
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        bail!("Missing command\n{USAGE}");
    };

    let mut user = None;
    let mut title = None;
    let mut tags = None;
    let mut url = None;
    let mut positional = Vec::new();

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--user" => &mut user,
            "--title" => &mut title,
            "--tags" => &mut tags,
            "--url" => &mut url,
            _ => {
                positional.push(arg.clone());
                continue;
            }
        };
        let value = iter
            .next()
            .with_context(|| format!("Missing value for {arg}\n{USAGE}"))?;
        *slot = Some(value.clone());
    }

    match command.as_str() {
        "parse" => Ok(Command::Parse {
            file: positional.into_iter().next(),
        }),
        "import" => Ok(Command::Import {
            user: user.with_context(|| format!("import needs --user\n{USAGE}"))?,
            title: title.with_context(|| format!("import needs --title\n{USAGE}"))?,
            tags,
            url,
            file: positional
                .into_iter()
                .next()
                .with_context(|| format!("import needs a FILE\n{USAGE}"))?,
        }),
        "search" => Ok(Command::Search {
            user: user.with_context(|| format!("search needs --user\n{USAGE}"))?,
            url,
            words: positional,
        }),
        other => bail!("Unknown command '{other}'\n{USAGE}"),
    }
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            Ok(text)
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_args(&args)?;

    match command {
        Command::Parse { file } => {
            let text = read_input(file.as_deref())?;
            let ingredients = parse_ingredients(&text)?;

            println!("{}", serde_json::to_string_pretty(&ingredients)?);
            for ingredient in &ingredients {
                println!("{ingredient}");
            }
        }
        Command::Import {
            user,
            title,
            tags,
            url,
            file,
        } => {
            let mut input = RecipeInput {
                title,
                ingredients: read_input(Some(file.as_str()))?,
                tags,
                ..Default::default()
            };
            input.details.url = url;
            let recipe = process_recipe(Some(&user), &input)?;

            let pool = db::connect(config.require_database_url()?, config.max_connections).await?;
            db::init_database_schema(&pool).await?;

            let stored = db::create_recipe(&pool, &recipe).await?;
            info!(recipe_id = stored.id, "Imported recipe");
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Command::Search { user, url, words } => {
            let pool = db::connect(config.require_database_url()?, config.max_connections).await?;
            db::init_database_schema(&pool).await?;

            match url {
                Some(url) => match db::find_recipe_by_url(&pool, &user, &url).await? {
                    Some(recipe) => println!("{}", serde_json::to_string_pretty(&recipe)?),
                    None => bail!("No recipe imported from {url}"),
                },
                None => {
                    let page =
                        db::search_recipes(&pool, &user, &words.join(" "), config.page_size, 0).await?;
                    println!("{}", serde_json::to_string_pretty(&page)?);
                }
            }
        }
    }

    Ok(())
}
