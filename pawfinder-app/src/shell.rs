use crate::command::{Command, HELP_TEXT, parse_command};
use crate::render::{self, DEFAULT_WIDTH, LOADING_TEXT};
use crate::session::{SearchOutcome, SearchSession, SearchState};
use anyhow::Result;
use pawfinder_common::PawError;
use pawfinder_places::{KeyValueStore, PlaceCard, RATED_THANKS, RatingBook};
use pawfinder_search::SearchResult;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Read commands from stdin until `/quit` or EOF. Errors from individual
/// commands are printed and the loop continues.
pub async fn run<S: KeyValueStore>(session: SearchSession, book: RatingBook<S>) -> Result<()> {
    println!("Dog Friendly Finder. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("pawfinder> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => println!("{HELP_TEXT}"),
            Command::Categories => println!("{}", render::render_categories(session.category())),
            Command::Unknown(text) if text.is_empty() => {}
            Command::Unknown(text) => println!("Unknown command: {text} (try /help)"),
            Command::Invalid(msg) => println!("{msg}"),
            Command::Search(text) => {
                if let Some(text) = text {
                    session.set_query(text);
                }
                println!("{LOADING_TEXT}");
                session.search().await;
                show_state(&session, &book).await;
            }
            Command::Category(category) => {
                if session.select_category(category).await.is_some() {
                    show_state(&session, &book).await;
                } else {
                    println!("Category filter cleared.");
                }
            }
            Command::Locate => match session.locate().await {
                Ok((coordinates, chained)) => {
                    println!("{}", render::coordinates_line(coordinates));
                    if chained == Some(SearchOutcome::Applied) {
                        show_state(&session, &book).await;
                    }
                }
                Err(e) => println!("{}", e.user_message()),
            },
            Command::Rate { index, stars } => rate(&session, &book, index, stars).await,
        }
    }

    info!("shell.exit");
    Ok(())
}

async fn cards_for<S: KeyValueStore>(result: &SearchResult, book: &RatingBook<S>) -> Vec<PlaceCard> {
    let mut cards = Vec::with_capacity(result.places.len());
    for place in &result.places {
        cards.push(PlaceCard::build(place, book).await);
    }
    cards
}

async fn show_state<S: KeyValueStore>(session: &SearchSession, book: &RatingBook<S>) {
    match session.state() {
        SearchState::Results(result) => {
            if let Some(c) = session.coordinates() {
                println!("{}", render::coordinates_line(c));
            }
            let cards = cards_for(&result, book).await;
            print!("{}", render::render_result(&result, &cards, DEFAULT_WIDTH));
        }
        SearchState::Error(msg) => println!("{msg}"),
        SearchState::Loading => println!("{LOADING_TEXT}"),
        SearchState::Idle => {}
    }
}

async fn rate<S: KeyValueStore>(session: &SearchSession, book: &RatingBook<S>, index: usize, stars: u8) {
    let SearchState::Results(result) = session.state() else {
        println!("Search first, then rate a result by its number.");
        return;
    };
    let Some(place) = result.places.get(index - 1) else {
        println!("No result number {index}.");
        return;
    };
    match book.rate_place(place, stars).await {
        Ok(()) => println!("{} {}  {RATED_THANKS}", place.title().unwrap_or_default(), render::stars(stars)),
        Err(e) => {
            if matches!(e, PawError::Storage(_)) {
                warn!(error = %e, "shell.rate.failed");
            }
            println!("{}", e.user_message());
        }
    }
}
