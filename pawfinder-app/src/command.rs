use pawfinder_common::Category;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(Option<String>),     // /search <text> | /search | plain text
    Category(Option<Category>), // /category <name> | /category off
    Locate,                     // /locate
    Rate { index: usize, stars: u8 }, // /rate <n> <stars>
    Categories,                 // /categories
    Help,                       // /help
    Quit,                       // /quit or /exit
    Invalid(String),
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /search <text>        search for dog-friendly places (plain text works too)
  /search               repeat the search with the current inputs
  /category <name|off>  filter by category; picking one searches immediately
  /categories           list categories
  /locate               use your current position
  /rate <n> <stars>     rate result n from 1 to 5 stars
  /help                 show this help
  /quit                 leave";

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Unknown(String::new());
    }
    if !trimmed.starts_with('/') {
        return Command::Search(Some(trimmed.to_string()));
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "/search" => Command::Search(rest.map(str::to_string)),
        "/category" => match rest {
            None => Command::Invalid("usage: /category <name|off>".into()),
            Some(name) if name.eq_ignore_ascii_case("off") => Command::Category(None),
            Some(name) => match name.parse::<Category>() {
                Ok(category) => Command::Category(Some(category)),
                Err(_) => Command::Invalid(format!("Unknown category: {name}")),
            },
        },
        "/locate" => Command::Locate,
        "/rate" => parse_rate(rest),
        "/categories" => Command::Categories,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn parse_rate(rest: Option<&str>) -> Command {
    const USAGE: &str = "usage: /rate <n> <stars>";
    let mut args = rest.unwrap_or_default().split_whitespace();
    let (Some(index), Some(stars), None) = (args.next(), args.next(), args.next()) else {
        return Command::Invalid(USAGE.into());
    };
    match (index.parse::<usize>(), stars.parse::<u8>()) {
        (Ok(index), Ok(stars)) if index > 0 => Command::Rate { index, stars },
        _ => Command::Invalid(USAGE.into()),
    }
}
